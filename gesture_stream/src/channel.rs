//! Per-channel smoothing and hysteresis configuration.
//!
//! Every gesture channel owns a [`SmoothingWindow`] — a fixed-capacity ring
//! buffer whose mean is the channel's strength for the current frame — and a
//! pair of [`Thresholds`] implementing hysteresis around the active boolean.

/// Nominal tracking-frame interval in milliseconds (120 fps device).
pub const FRAME_INTERVAL_MS: f32 = 1000.0 / 120.0;

// ════════════════════════════════════════════════════════════════════════════
// SmoothingWindow
// ════════════════════════════════════════════════════════════════════════════

/// Fixed-capacity ring buffer of recent strength samples.
///
/// The window mean is computed over however many samples are present, so a
/// freshly-created window responds immediately instead of averaging against
/// phantom zeros.  An empty window reports 0.0.
#[derive(Clone, Debug)]
pub struct SmoothingWindow {
    samples: Vec<f32>,
    capacity: usize,
    head: usize,
}

impl SmoothingWindow {
    /// Create a window sized for `debounce_ms` of samples at the nominal
    /// frame rate.  Capacity is clamped to at least one sample, so a zero or
    /// negative debounce degrades to "no smoothing" rather than a fault.
    pub fn for_debounce(debounce_ms: f32) -> Self {
        let capacity = ((debounce_ms / FRAME_INTERVAL_MS) as isize).max(1) as usize;
        SmoothingWindow {
            samples: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Push one raw sample, overwriting the oldest when full, and return the
    /// new window mean.
    pub fn push(&mut self, sample: f32) -> f32 {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.head] = sample;
            self.head = (self.head + 1) % self.capacity;
        }
        self.mean()
    }

    /// Arithmetic mean of the current contents; 0.0 when empty.
    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all buffered samples (hand lost tracking).
    pub fn clear(&mut self) {
        self.samples.clear();
        self.head = 0;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// Hysteresis bounds for one channel.
///
/// A channel engages when its smoothed strength exceeds `engage` and stays
/// active until the strength drops to `release` or below.  `release` sits
/// below `engage` so a signal hovering near the boundary cannot flicker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub engage: f32,
    pub release: f32,
}

impl Thresholds {
    pub fn new(engage: f32, release: f32) -> Self {
        Thresholds { engage, release }
    }

    /// The hysteresis rule: which bound applies depends on the current state.
    pub fn check(&self, smoothed: f32, was_active: bool) -> bool {
        smoothed > if was_active { self.release } else { self.engage }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        // Sensitivity defaults carried over from the original hand component.
        Thresholds { engage: 0.95, release: 0.75 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ChannelConfig
// ════════════════════════════════════════════════════════════════════════════

/// Full configuration for one smoothed channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelConfig {
    /// Smoothing window length, in milliseconds of samples.
    pub debounce_ms: f32,
    pub thresholds: Thresholds,
}

impl ChannelConfig {
    pub fn new(debounce_ms: f32, engage: f32, release: f32) -> Self {
        ChannelConfig {
            debounce_ms,
            thresholds: Thresholds::new(engage, release),
        }
    }

    pub fn window(&self) -> SmoothingWindow {
        SmoothingWindow::for_debounce(self.debounce_ms)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            debounce_ms: 100.0,
            thresholds: Thresholds::default(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_capacity_from_debounce() {
        // 100 ms at 120 fps → 12 samples
        let w = SmoothingWindow::for_debounce(100.0);
        assert_eq!(w.capacity(), 12);
    }

    #[test]
    fn window_capacity_clamped_to_one() {
        assert_eq!(SmoothingWindow::for_debounce(0.0).capacity(), 1);
        assert_eq!(SmoothingWindow::for_debounce(-50.0).capacity(), 1);
    }

    #[test]
    fn empty_window_mean_is_zero() {
        let w = SmoothingWindow::for_debounce(100.0);
        assert_eq!(w.mean(), 0.0);
    }

    #[test]
    fn partial_window_averages_existing_samples_only() {
        let mut w = SmoothingWindow::for_debounce(100.0); // capacity 12
        w.push(1.0);
        w.push(0.5);
        // Mean over 2 samples, not over capacity 12.
        assert!((w.mean() - 0.75).abs() < 1e-6);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn full_window_overwrites_oldest() {
        let mut w = SmoothingWindow::for_debounce(25.0); // capacity 3
        w.push(0.0);
        w.push(0.0);
        w.push(0.0);
        w.push(1.0); // replaces the first 0.0
        assert!((w.mean() - 1.0 / 3.0).abs() < 1e-6);
        w.push(1.0);
        w.push(1.0);
        assert!((w.mean() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn clear_empties_the_window() {
        let mut w = SmoothingWindow::for_debounce(100.0);
        w.push(0.9);
        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.mean(), 0.0);
    }

    #[test]
    fn hysteresis_uses_engage_when_inactive() {
        let t = Thresholds::new(0.95, 0.75);
        assert!(!t.check(0.90, false)); // below engage
        assert!(t.check(0.96, false));
    }

    #[test]
    fn hysteresis_uses_release_when_active() {
        let t = Thresholds::new(0.95, 0.75);
        assert!(t.check(0.80, true)); // below engage, above release → stays
        assert!(!t.check(0.75, true)); // at release → ends (strict >)
    }
}
