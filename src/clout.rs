//! # Clout Window
//! Fixed-size rolling history of per-cycle clout values (newest first).
//!
//! Every push shifts the older values one slot toward the tail and the
//! oldest value falls off. The window never grows or shrinks.

use serde::{Deserialize, Serialize};

/// Number of cycles kept per hotword.
pub const CLOUT_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CloutWindow {
    slots: [f64; CLOUT_SLOTS],
}

impl CloutWindow {
    /// Zero-filled window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a stored sequence (newest first).
    pub fn from_slots(slots: [f64; CLOUT_SLOTS]) -> Self {
        Self { slots }
    }

    /// Record a new value into slot 0, discarding the oldest.
    pub fn push(&mut self, value: f64) {
        self.slots.copy_within(0..CLOUT_SLOTS - 1, 1);
        self.slots[0] = value;
    }

    /// Most recent value.
    pub fn current_top(&self) -> f64 {
        self.slots[0]
    }

    /// History, newest first.
    pub fn as_sequence(&self) -> [f64; CLOUT_SLOTS] {
        self.slots
    }
}
