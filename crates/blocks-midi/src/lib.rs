//! MIDI channel assignment for touch/LED block controllers.
//!
//! Maps note-on events from simultaneous touches onto a small, reconfigurable
//! pool of MIDI channels, following MPE zone rules or spreading notes across a
//! legacy range. Pure state: no I/O, no allocation on the note path.
//!
//! # Example
//!
//! ```
//! use blocks_midi::{AssignmentKind, ChannelAllocator};
//!
//! let mut allocator = ChannelAllocator::default();
//! allocator.set_channel_range(true, 1, 3);
//! allocator.use_mpe_duplicate_filter(true);
//!
//! assert_eq!(allocator.assign_channel(60), 2);
//! assert_eq!(allocator.assign(60).kind, AssignmentKind::Duplicate);
//! assert_eq!(allocator.assign_channel(64), 3);
//!
//! // Pool exhausted: the least recently used note gives up its channel
//! let stolen = allocator.assign(67);
//! assert_eq!(stolen.kind, AssignmentKind::Stolen { note: 60 });
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod range;
pub use range::{ChannelRange, MAX_CHANNEL, MIN_CHANNEL, NOTE_COUNT};

pub mod alloc;
pub use alloc::{
    Assignment, AssignmentKind, AssignmentTable, ChannelAllocator, ChannelPool, ChannelSlot,
    DuplicateFilter, DuplicateWindow, StealPolicy,
};

pub mod config;
pub use config::AllocatorConfig;
