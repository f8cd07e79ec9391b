//! MIDI channel allocation for outgoing notes.
//!
//! Under MPE every sounding note gets a member channel of its own so per-note
//! pitch bend, pressure and timbre stay independent. In legacy mode notes are
//! spread across the whole range.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::AllocatorConfig;
use crate::range::{ChannelRange, NOTE_COUNT};

mod filter;
mod pool;
mod table;

pub use filter::{DuplicateFilter, DuplicateWindow};
pub use pool::ChannelPool;
pub use table::{AssignmentTable, ChannelSlot};

/// Which sounding note gives up its channel when the pool is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StealPolicy {
    /// The channel claimed or retriggered longest ago.
    #[default]
    LeastRecentlyUsed,
    /// Walk the pool in channel order, one channel per steal.
    RoundRobin,
}

/// How a channel was obtained for a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentKind {
    /// Claimed a free channel.
    Fresh,
    /// The note was already sounding; its channel is returned again.
    Retrigger,
    /// Suppressed by the duplicate filter; the note is already sounding.
    Duplicate,
    /// Took the channel of `note`, which is no longer assigned.
    Stolen { note: u8 },
    /// Note number outside 0-127; nothing was recorded.
    Unroutable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub channel: u8,
    pub kind: AssignmentKind,
}

/// Assigns MIDI channels to note-on events.
///
/// Owned by the program's event-handling context. All calls are synchronous
/// and allocation-free; none of them fail.
///
/// # Example
/// ```
/// use blocks_midi::ChannelAllocator;
///
/// let mut allocator = ChannelAllocator::default();
/// allocator.set_channel_range(true, 1, 5);
///
/// let channel = allocator.assign_channel(60);
/// assert_eq!(channel, 2);
/// allocator.deassign_channel(60, channel);
/// ```
#[derive(Debug)]
pub struct ChannelAllocator {
    table: AssignmentTable,
    filter: Option<DuplicateFilter>,
    duplicate_window: DuplicateWindow,
    steal_policy: StealPolicy,
    steal_cursor: usize,
    sequence: u64,
}

impl ChannelAllocator {
    pub fn new(range: ChannelRange) -> Self {
        Self {
            table: AssignmentTable::new(ChannelPool::new(range)),
            filter: None,
            duplicate_window: DuplicateWindow::default(),
            steal_policy: StealPolicy::default(),
            steal_cursor: 0,
            sequence: 0,
        }
    }

    /// Out-of-range channels in `config` are clamped as in [`set_channel_range`](Self::set_channel_range).
    pub fn from_config(config: &AllocatorConfig) -> Self {
        let mut allocator = Self::new(ChannelRange::default());
        allocator.set_channel_range(config.use_mpe, config.low_channel, config.high_channel);
        allocator.set_duplicate_window(config.duplicate_window);
        allocator.set_steal_policy(config.steal_policy);
        allocator.use_mpe_duplicate_filter(config.duplicate_filter);
        allocator
    }

    // ==================== Configuration ====================

    /// Replace the channel range, clamping invalid bounds into 1..=16.
    ///
    /// All assignments and the duplicate filter window are discarded. Callers
    /// must have sent note-offs for outstanding notes beforehand. Returns the
    /// range actually applied.
    pub fn set_channel_range(&mut self, use_mpe: bool, low: u8, high: u8) -> ChannelRange {
        let range = match ChannelRange::new(use_mpe, low, high) {
            Ok(range) => range,
            Err(e) => {
                let range = ChannelRange::clamped(use_mpe, low, high);
                warn!(
                    "{}; using {}..={}",
                    e,
                    range.low(),
                    range.high()
                );
                range
            }
        };
        self.apply_range(range);
        range
    }

    /// Replace the channel range with an already validated one.
    pub fn apply_range(&mut self, range: ChannelRange) {
        debug!(
            "Channel range set to {}..={} (mpe: {})",
            range.low(),
            range.high(),
            range.use_mpe()
        );
        self.table = AssignmentTable::new(ChannelPool::new(range));
        self.steal_cursor = 0;
        self.sequence = 0;
        if let Some(ref mut filter) = self.filter {
            filter.clear();
        }
    }

    /// Enable or disable the MPE duplicate filter.
    ///
    /// Enabling an inactive filter starts with an empty window; disabling
    /// discards it.
    pub fn use_mpe_duplicate_filter(&mut self, active: bool) {
        match (active, self.filter.is_some()) {
            (true, false) => {
                debug!("MPE duplicate filter enabled ({:?})", self.duplicate_window);
                self.filter = Some(DuplicateFilter::new(self.duplicate_window));
            }
            (false, true) => {
                debug!("MPE duplicate filter disabled");
                self.filter = None;
            }
            _ => {}
        }
    }

    #[inline]
    pub fn is_duplicate_filter_active(&self) -> bool {
        self.filter.is_some()
    }

    pub fn set_duplicate_window(&mut self, window: DuplicateWindow) {
        self.duplicate_window = window;
        if let Some(ref mut filter) = self.filter {
            filter.set_window(window);
        }
    }

    #[inline]
    pub fn duplicate_window(&self) -> DuplicateWindow {
        self.duplicate_window
    }

    pub fn set_steal_policy(&mut self, policy: StealPolicy) {
        self.steal_policy = policy;
    }

    #[inline]
    pub fn steal_policy(&self) -> StealPolicy {
        self.steal_policy
    }

    // ==================== Allocation ====================

    /// Channel to use for a note-on of `note`.
    #[inline]
    pub fn assign_channel(&mut self, note: u8) -> u8 {
        self.assign(note).channel
    }

    /// Like [`assign_channel`](Self::assign_channel), also reporting how the
    /// channel was obtained.
    ///
    /// A stolen note is unassigned here; sending its note-off is up to the caller.
    pub fn assign(&mut self, note: u8) -> Assignment {
        if note as usize >= NOTE_COUNT {
            warn!("Note number {} out of range, using control channel", note);
            return Assignment {
                channel: self.control_channel(),
                kind: AssignmentKind::Unroutable,
            };
        }

        self.sequence += 1;
        let sequence = self.sequence;

        if let Some(ref mut filter) = self.filter {
            if filter.contains(note, sequence) {
                if let Some(channel) = self.table.channel_for_note(note) {
                    trace!("Duplicate note {} filtered (channel {})", note, channel);
                    return Assignment {
                        channel,
                        kind: AssignmentKind::Duplicate,
                    };
                }
                filter.forget(note);
            }
        }

        let assignment = if let Some(channel) = self.table.touch(note, sequence) {
            Assignment {
                channel,
                kind: AssignmentKind::Retrigger,
            }
        } else if let Some(index) = self.table.free_slot() {
            self.table.claim(index, note, sequence);
            let channel = self.table.slots()[index].channel;
            trace!("Note {} assigned to channel {}", note, channel);
            Assignment {
                channel,
                kind: AssignmentKind::Fresh,
            }
        } else {
            self.steal(note, sequence)
        };

        if let Some(ref mut filter) = self.filter {
            filter.admit(note, sequence);
        }
        assignment
    }

    fn steal(&mut self, note: u8, sequence: u64) -> Assignment {
        let len = self.table.slots().len();
        let index = match self.steal_policy {
            StealPolicy::LeastRecentlyUsed => self.table.least_recently_used().unwrap_or(0),
            StealPolicy::RoundRobin => {
                let index = self.steal_cursor % len;
                self.steal_cursor = (index + 1) % len;
                index
            }
        };

        let channel = self.table.slots()[index].channel;
        let kind = match self.table.claim(index, note, sequence) {
            Some(stolen) => {
                debug!(
                    "Pool exhausted: note {} steals channel {} from note {}",
                    note, channel, stolen
                );
                if let Some(ref mut filter) = self.filter {
                    filter.forget(stolen);
                }
                AssignmentKind::Stolen { note: stolen }
            }
            None => AssignmentKind::Fresh,
        };
        Assignment { channel, kind }
    }

    /// Release `note` if it is still assigned to `channel`.
    ///
    /// Stale calls (note already released, or stolen onto another channel)
    /// are ignored. Returns whether an assignment was removed.
    pub fn deassign_channel(&mut self, note: u8, channel: u8) -> bool {
        if self.table.release(note, channel) {
            if let Some(ref mut filter) = self.filter {
                filter.forget(note);
            }
            trace!("Note {} released from channel {}", note, channel);
            true
        } else {
            debug!("Stale deassignment of note {} on channel {}", note, channel);
            false
        }
    }

    /// Channel for messages not tied to one note: always the range's low channel.
    #[inline]
    pub fn control_channel(&self) -> u8 {
        self.table.pool().range().control_channel()
    }

    /// Drop every assignment, keeping range and policies.
    pub fn reset(&mut self) {
        self.table.clear();
        self.steal_cursor = 0;
        if let Some(ref mut filter) = self.filter {
            filter.clear();
        }
    }

    // ==================== Queries ====================

    #[inline]
    pub fn range(&self) -> ChannelRange {
        self.table.pool().range()
    }

    #[inline]
    pub fn channel_for_note(&self, note: u8) -> Option<u8> {
        self.table.channel_for_note(note)
    }

    #[inline]
    pub fn note_on_channel(&self, channel: u8) -> Option<u8> {
        self.table.note_on_channel(channel)
    }

    /// `(note, channel)` pairs of sounding notes, in channel order.
    pub fn active_notes(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.table.active_notes()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.table.active_count()
    }

    /// Maximum number of simultaneously assigned notes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.pool().len()
    }

    /// Read-only view of the slots, for diagnostics.
    pub fn table(&self) -> &AssignmentTable {
        &self.table
    }
}

impl Default for ChannelAllocator {
    fn default() -> Self {
        Self::new(ChannelRange::default())
    }
}
