//! Serializable allocator settings.

use serde::{Deserialize, Serialize};

use crate::alloc::{DuplicateWindow, StealPolicy};
use crate::error::{Error, Result};
use crate::range::ChannelRange;

/// Allocator settings as stored in a program's configuration.
///
/// Missing fields take their defaults: an MPE lower zone over channels 1-16,
/// duplicate filter off, least-recently-used stealing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    pub use_mpe: bool,
    pub low_channel: u8,
    pub high_channel: u8,
    pub duplicate_filter: bool,
    pub duplicate_window: DuplicateWindow,
    pub steal_policy: StealPolicy,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            use_mpe: true,
            low_channel: 1,
            high_channel: 16,
            duplicate_filter: false,
            duplicate_window: DuplicateWindow::default(),
            steal_policy: StealPolicy::default(),
        }
    }
}

impl AllocatorConfig {
    /// Strict check, for settings authored ahead of time.
    pub fn validate(&self) -> Result<ChannelRange> {
        if self.duplicate_window == DuplicateWindow::Assignments(0) {
            return Err(Error::InvalidConfig(
                "duplicate_window must span at least one assignment".to_string(),
            ));
        }
        ChannelRange::new(self.use_mpe, self.low_channel, self.high_channel)
    }
}
