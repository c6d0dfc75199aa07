//! Hand attachment identifiers.

use std::fmt;

/// Process-lifetime-unique identifier for one hand attachment.
///
/// Gesture event payloads carry this so downstream components (e.g. a
/// holdable object) can tell which hand a release came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandId(pub u32);

impl fmt::Display for HandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hand#{}", self.0)
    }
}

/// Session-scoped allocator for [`HandId`]s.
///
/// Owned by whoever creates hand attachments; not a process global.  IDs
/// start at 1 and are never reused within a session.
#[derive(Debug)]
pub struct HandIdAllocator {
    next: u32,
}

impl HandIdAllocator {
    pub fn new() -> Self {
        HandIdAllocator { next: 1 }
    }

    pub fn mint(&mut self) -> HandId {
        let id = HandId(self.next);
        self.next += 1;
        id
    }
}

impl Default for HandIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_unique() {
        let mut alloc = HandIdAllocator::new();
        let a = alloc.mint();
        let b = alloc.mint();
        assert_eq!(a, HandId(1));
        assert_eq!(b, HandId(2));
        assert_ne!(a, b);
    }

    #[test]
    fn separate_allocators_are_independent() {
        let mut a = HandIdAllocator::new();
        let mut b = HandIdAllocator::new();
        assert_eq!(a.mint(), b.mint());
    }
}
