//! Active character sequence and cursor, independent of rendering

use serde::{Deserialize, Serialize};

/// Tracks the practice sequence and the current position in it.
///
/// The current character is always `sequence[current_index]`, or nothing
/// when the sequence is empty. Movement is clamped and never wraps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    active_sequence: Vec<String>,
    current_index: usize,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(raw: &str) -> Self {
        let mut state = Self::new();
        state.set_text(raw);
        state
    }

    /// Replace the sequence with the non-whitespace characters of `raw`
    /// and reset the position to 0.
    pub fn set_text(&mut self, raw: &str) {
        self.active_sequence = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect();
        self.current_index = 0;
    }

    /// Returns true if the position moved
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.active_sequence.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Returns true if the position moved
    pub fn prev(&mut self) -> bool {
        if self.current_index > 0 && !self.active_sequence.is_empty() {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `index` if it is in bounds, otherwise leave the position alone
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.active_sequence.len() {
            let moved = index != self.current_index;
            self.current_index = index;
            moved
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.active_sequence
            .get(self.current_index)
            .map(String::as_str)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.active_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_sequence.is_empty()
    }

    pub fn sequence(&self) -> &[String] {
        &self.active_sequence
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.active_sequence.is_empty() || self.current_index + 1 == self.active_sequence.len()
    }
}
