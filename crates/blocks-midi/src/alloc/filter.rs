//! MPE duplicate-note filter.
//!
//! The same physical note can reach the allocator through more than one input
//! path. While the filter is active, a note seen again inside its retention
//! window is treated as the note already sounding rather than a new note-on.

use serde::{Deserialize, Serialize};

use crate::range::NOTE_COUNT;

/// How long an admitted note stays in the filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateWindow {
    /// Until the note is deassigned or stolen.
    #[default]
    UntilRelease,
    /// Until released, or until this many allocator steps have elapsed since
    /// the note was admitted.
    Assignments(u32),
}

#[derive(Debug)]
pub struct DuplicateFilter {
    window: DuplicateWindow,
    /// Note number → allocator sequence at admission
    admitted: [Option<u64>; NOTE_COUNT],
}

impl DuplicateFilter {
    pub fn new(window: DuplicateWindow) -> Self {
        Self {
            window,
            admitted: [None; NOTE_COUNT],
        }
    }

    #[inline]
    pub fn window(&self) -> DuplicateWindow {
        self.window
    }

    /// Changing the window keeps admitted notes; the new bound applies on the next lookup.
    pub fn set_window(&mut self, window: DuplicateWindow) {
        self.window = window;
    }

    /// Check if `note` was admitted within the window ending at `sequence`.
    ///
    /// Expired entries are dropped as a side effect.
    pub fn contains(&mut self, note: u8, sequence: u64) -> bool {
        let Some(entry) = self.admitted.get_mut(note as usize) else {
            return false;
        };
        let Some(admitted_at) = *entry else {
            return false;
        };
        match self.window {
            DuplicateWindow::UntilRelease => true,
            DuplicateWindow::Assignments(steps) => {
                if sequence.saturating_sub(admitted_at) <= u64::from(steps) {
                    true
                } else {
                    *entry = None;
                    false
                }
            }
        }
    }

    pub fn admit(&mut self, note: u8, sequence: u64) {
        if let Some(entry) = self.admitted.get_mut(note as usize) {
            *entry = Some(sequence);
        }
    }

    pub fn forget(&mut self, note: u8) {
        if let Some(entry) = self.admitted.get_mut(note as usize) {
            *entry = None;
        }
    }

    pub fn clear(&mut self) {
        self.admitted = [None; NOTE_COUNT];
    }

    pub fn len(&self) -> usize {
        self.admitted.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.admitted.iter().all(Option::is_none)
    }
}
