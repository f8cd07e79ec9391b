//! # Blocks - Program Runtime for Touch/LED Block Controllers
//!
//! ## Architecture
//!
//! Blocks is an umbrella crate that coordinates:
//! - **blocks-midi** - Channel assignment (channel pool, MPE allocation, duplicate filter)
//! - **blocks-midi-io** - MIDI output (message encoding, sinks, per-program note output)
//!
//! ## Quick Start
//!
//! ```
//! use blocks::prelude::*;
//!
//! // Created once in the program's initialise()
//! let mut program = MidiProgram::builder()
//!     .channel_range(true, 1, 16)
//!     .duplicate_filter(true)
//!     .build(Vec::<MidiOutputMessage>::new())?;
//!
//! // Touch callbacks
//! let channel = program.note_on(60, 100);
//! program.aftertouch(60, 80);
//! program.note_off(60, 0);
//!
//! assert_eq!(channel, 2);
//! # Ok::<(), blocks::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Channel assignment and MIDI output, with config loading
//! - `config` - TOML config files for the allocator

/// Re-export of blocks-midi for direct access
pub use blocks_midi as channels;

/// Re-export of blocks-midi-io for direct access
pub use blocks_midi_io as midi;

pub mod error;
pub use error::{Error, Result};

pub use blocks_midi::{
    AllocatorConfig, Assignment, AssignmentKind, ChannelAllocator, ChannelRange, DuplicateWindow,
    StealPolicy,
};
pub use blocks_midi_io::{
    midi_output_channel, MidiOutputConsumer, MidiOutputMessage, MidiOutputProducer, MidiProgram,
    MidiProgramBuilder, MidiSink,
};

pub mod prelude {
    pub use crate::{
        AssignmentKind, ChannelAllocator, ChannelRange, DuplicateWindow, MidiOutputMessage,
        MidiProgram, MidiSink, StealPolicy,
    };
}
