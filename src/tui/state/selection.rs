//! Menu cursor

use crate::tui::event::TuiEvent;

/// Cursor over a list of `count` entries, wrapping at both ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    selected: usize,
    count: usize,
}

impl SelectionState {
    pub fn with_count(count: usize) -> Self {
        Self { selected: 0, count }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Change the entry count, keeping the cursor in range
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    pub fn select(&mut self, index: usize) {
        if self.count > 0 {
            self.selected = index % self.count;
        }
    }

    pub fn next(&mut self) {
        if self.count > 0 {
            self.selected = (self.selected + 1) % self.count;
        }
    }

    pub fn prev(&mut self) {
        if self.count > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.count - 1);
        }
    }

    /// Move on up/down keys. Returns whether the key was consumed.
    pub fn handle(&mut self, event: &TuiEvent) -> bool {
        if event.is_up() {
            self.prev();
        } else if event.is_down() {
            self.next();
        } else {
            return false;
        }
        true
    }
}
