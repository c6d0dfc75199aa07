//! Software-rendered monitor window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │ LEFT HAND                    │ RIGHT HAND                   │
//! │  pinch [█████████░░|·]  ●    │  pinch [██░░░░░░░░░|·]  ○    │
//! │  grab  [██░░░░░░░░░|·]  ○    │  ...                         │
//! │  hold / open / tap bars      │                              │
//! │  palm: dorsal   tracking ●   │                              │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │ widgets: ▣ ▣ ▣   (gold border = held)                       │
//! │ recent events                                               │
//! │ status bar                                                  │
//! │ key legend                                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use gesture_stream::HandType;

use crate::sim::{SimControls, SimInput};

use std::sync::mpsc::Sender;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 1100;
pub const WIN_H: usize = 560;
const PANEL_W: usize = WIN_W / 2;
const PANEL_Y: usize = 40;
const BAR_X: usize = 70;
const BAR_W: usize = 340;
const BAR_H: usize = 18;
const BAR_STEP: usize = 34;
const WIDGET_Y: usize = 280;
const WIDGET_SIZE: usize = 28;
const LOG_Y: usize = 330;
const STATUS_Y: usize = WIN_H - 36;
const BG_COLOR: u32 = 0xFF1A1A2E;
const PANEL_BG: u32 = 0xFF16213E;
const BAR_BG: u32 = 0xFF0F3460;
const BAR_FILL: u32 = 0xFF53A8B6;
const BAR_FILL_HOT: u32 = 0xFFFFD700;
const LAMP_ON: u32 = 0xFF7CFC00;
const LAMP_OFF: u32 = 0xFF444466;
const HELD_BORDER: u32 = 0xFFFFD700;
const TEXT_BG: u32 = 0xFF0F3460;

// ════════════════════════════════════════════════════════════════════════════
// Readouts — snapshots the app hands to the renderer each frame
// ════════════════════════════════════════════════════════════════════════════

/// One channel bar: smoothed value plus its threshold ticks.
#[derive(Clone, Debug)]
pub struct BarReadout {
    pub name: &'static str,
    pub value: f32,
    pub engage: f32,
    pub release: f32,
    pub active: bool,
    /// Display scale; tap runs over a negative range.
    pub lo: f32,
    pub hi: f32,
}

/// Everything the renderer shows for one hand.
#[derive(Clone, Debug)]
pub struct HandReadout {
    pub label: &'static str,
    pub tracked: bool,
    pub bars: Vec<BarReadout>,
    /// `None` until the turn channel has seen a signed frame.
    pub palmar: Option<bool>,
}

/// One spawned widget in the strip.
#[derive(Clone, Copy, Debug)]
pub struct WidgetReadout {
    pub color: u32,
    pub held: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Leap Rig — Gesture Playground Monitor",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard input and forward it to the simulator.
    /// Returns false when the app should quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if one_shot(&self.window, Key::Q) {
            let _ = self.sim_tx.send(SimInput::Quit);
            return false;
        }
        if one_shot(&self.window, Key::F) {
            let _ = self.sim_tx.send(SimInput::FlipPalm(HandType::Left));
        }
        if one_shot(&self.window, Key::G) {
            let _ = self.sim_tx.send(SimInput::ToggleTracking(HandType::Left));
        }
        if one_shot(&self.window, Key::U) {
            let _ = self.sim_tx.send(SimInput::FlipPalm(HandType::Right));
        }
        if one_shot(&self.window, Key::I) {
            let _ = self.sim_tx.send(SimInput::ToggleTracking(HandType::Right));
        }
        if one_shot(&self.window, Key::W) {
            let _ = self.sim_tx.send(SimInput::SaveLayout);
        }
        if one_shot(&self.window, Key::C) {
            let _ = self.sim_tx.send(SimInput::ClearLayout);
        }

        // Held strength controls, sampled every frame.
        let down = |w: &Window, k: Key| w.is_key_down(k);
        let controls = SimControls {
            pinch: [down(&self.window, Key::A), down(&self.window, Key::J)],
            grab: [down(&self.window, Key::S), down(&self.window, Key::K)],
            tap: [down(&self.window, Key::D), down(&self.window, Key::L)],
        };
        let _ = self.sim_tx.send(SimInput::Controls(controls));

        true
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        left: &HandReadout,
        right: &HandReadout,
        widgets: &[WidgetReadout],
        events: &[String],
        status: &str,
    ) {
        self.buf.fill(BG_COLOR);

        self.draw_hand_panel(left, 0);
        self.draw_hand_panel(right, PANEL_W);

        self.draw_widget_strip(widgets);
        self.draw_event_log(events);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(status, 10, STATUS_Y + 10, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "left: a=pinch s=grab d=tap f=flip g=track   right: j=pinch k=grab l=tap u=flip i=track   w=save c=clear q=quit",
            10,
            WIN_H - 16,
            0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Hand panel ────────────────────────────────────────────────────────

    fn draw_hand_panel(&mut self, hand: &HandReadout, x0: usize) {
        self.fill_rect(x0 + 6, PANEL_Y - 28, PANEL_W - 12, 250, PANEL_BG);
        self.draw_label(hand.label, x0 + 14, PANEL_Y - 20, 0xFFAADDFF);

        // Tracking lamp beside the label
        let lamp = if hand.tracked { LAMP_ON } else { 0xFFCC3333 };
        self.fill_rect(x0 + 14 + 60, PANEL_Y - 22, 8, 8, lamp);

        for (i, bar) in hand.bars.iter().enumerate() {
            let y = PANEL_Y + i * BAR_STEP;
            self.draw_channel_bar(bar, x0, y);
        }

        // Palm facing readout
        let facing = match hand.palmar {
            Some(true) => "palm: palmar",
            Some(false) => "palm: dorsal",
            None => "palm: unseeded",
        };
        let y = PANEL_Y + hand.bars.len() * BAR_STEP + 6;
        self.draw_label(facing, x0 + 14, y, 0xFFFFBBAA);
    }

    fn draw_channel_bar(&mut self, bar: &BarReadout, x0: usize, y: usize) {
        let span = bar.hi - bar.lo;
        let norm = |v: f32| ((v - bar.lo) / span).clamp(0.0, 1.0);

        self.draw_label(bar.name, x0 + 14, y + 5, 0xFFCCCCCC);

        let bx = x0 + BAR_X;
        self.fill_rect(bx, y, BAR_W, BAR_H, BAR_BG);

        let fill = (BAR_W as f32 * norm(bar.value)) as usize;
        let color = if bar.active { BAR_FILL_HOT } else { BAR_FILL };
        self.fill_rect(bx, y, fill, BAR_H, color);

        // Threshold ticks: engage solid, release dim.
        let ex = bx + (BAR_W as f32 * norm(bar.engage)) as usize;
        let rx = bx + (BAR_W as f32 * norm(bar.release)) as usize;
        for dy in 0..BAR_H {
            self.set_pixel(ex.min(WIN_W - 1), y + dy, 0xFFFFFFFF);
            self.set_pixel(rx.min(WIN_W - 1), y + dy, 0xFF999999);
        }

        // Active lamp
        let lamp = if bar.active { LAMP_ON } else { LAMP_OFF };
        self.fill_rect(bx + BAR_W + 10, y + 4, 10, 10, lamp);
        self.draw_border(bx, y, BAR_W, BAR_H, 0xFF000000);
    }

    // ── Widget strip ──────────────────────────────────────────────────────

    fn draw_widget_strip(&mut self, widgets: &[WidgetReadout]) {
        self.draw_label("widgets:", 10, WIDGET_Y + 8, 0xFFCCCCCC);
        for (i, w) in widgets.iter().enumerate() {
            let x = 80 + i * (WIDGET_SIZE + 8);
            if x + WIDGET_SIZE >= WIN_W {
                break;
            }
            self.fill_rect(x, WIDGET_Y, WIDGET_SIZE, WIDGET_SIZE, w.color);
            let border = if w.held { HELD_BORDER } else { 0xFF000000 };
            self.draw_border(x, WIDGET_Y, WIDGET_SIZE, WIDGET_SIZE, border);
            if w.held {
                self.draw_border(
                    x.saturating_sub(1),
                    WIDGET_Y - 1,
                    WIDGET_SIZE + 2,
                    WIDGET_SIZE + 2,
                    HELD_BORDER,
                );
            }
        }
    }

    // ── Event log ─────────────────────────────────────────────────────────

    fn draw_event_log(&mut self, events: &[String]) {
        self.draw_label("events", 10, LOG_Y, 0xFFFFD700);
        for (i, line) in events.iter().rev().enumerate() {
            let y = LOG_Y + 14 + i * 12;
            if y + 12 >= STATUS_Y {
                break;
            }
            self.draw_label(line, 16, y, 0xFFBBBBBB);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(WIN_W) {
            if y < WIN_H {
                self.buf[y * WIN_W + col] = color;
            }
            if y + h - 1 < WIN_H {
                self.buf[(y + h - 1) * WIN_W + col] = color;
            }
        }
        for row in y..(y + h).min(WIN_H) {
            if x < WIN_W {
                self.buf[row * WIN_W + x] = color;
            }
            if x + w - 1 < WIN_W {
                self.buf[row * WIN_W + x + w - 1] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Minimal bitmap font — 3×5 characters for label rendering.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > WIN_W {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Parse a `#rrggbb` attribute string into an ARGB pixel.
pub fn parse_color(hex: &str) -> u32 {
    let raw = hex.trim_start_matches('#');
    u32::from_str_radix(raw, 16)
        .map(|rgb| 0xFF000000 | rgb)
        .unwrap_or(0xFF888888)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_handles_hash_prefix_and_garbage() {
        assert_eq!(parse_color("#ff0000"), 0xFFFF0000);
        assert_eq!(parse_color("00ff00"), 0xFF00FF00);
        assert_eq!(parse_color("not-a-color"), 0xFF888888);
    }
}
