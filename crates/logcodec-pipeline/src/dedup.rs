//! Redelivery detection.
//!
//! Live subscriptions may deliver a log twice (reconnects, overlapping
//! backfills). Keys are `txHash:logIndex`; only the most recent `window`
//! keys are remembered.

use std::collections::{HashSet, VecDeque};

#[derive(Debug)]
pub struct Deduplicator {
    window: usize,
    enabled: bool,
    seen: HashSet<String>,
    order: VecDeque<String>,
}

impl Deduplicator {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            enabled: true,
            seen: HashSet::with_capacity(window.min(1 << 16)),
            order: VecDeque::new(),
        }
    }

    /// Treats every key as new.
    pub fn disabled() -> Self {
        Self {
            window: 0,
            enabled: false,
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns `true` the first time `key` is seen within the window.
    pub fn observe(&mut self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }
        if self.seen.contains(key) {
            return false;
        }
        if self.order.len() == self.window {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.to_string());
        self.order.push_back(key.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_sighting_is_a_duplicate() {
        let mut d = Deduplicator::new(10);
        assert!(d.observe("0xaa:1"));
        assert!(d.observe("0xaa:2"));
        assert!(!d.observe("0xaa:1"));
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn oldest_key_falls_out_of_the_window() {
        let mut d = Deduplicator::new(2);
        assert!(d.observe("a"));
        assert!(d.observe("b"));
        assert!(d.observe("c"));
        assert_eq!(d.len(), 2);
        // "a" was evicted, so it counts as new again
        assert!(d.observe("a"));
        assert!(!d.observe("c"));
    }

    #[test]
    fn disabled_never_reports_duplicates() {
        let mut d = Deduplicator::disabled();
        assert!(d.observe("k"));
        assert!(d.observe("k"));
        assert!(d.is_empty());
    }
}
