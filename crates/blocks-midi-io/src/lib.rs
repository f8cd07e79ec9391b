//! MIDI output for block programs.
//!
//! Provides short-message encoding, the sink boundary to the transport, a
//! lock-free output channel, config loading, and [`MidiProgram`], which pairs
//! a channel allocator with a sink.
//!
//! Feature gates: `config` (TOML config loading).

pub mod error;
pub use error::{Error, Result};

mod system;
pub use system::{MidiProgram, MidiProgramBuilder};

pub mod output;
pub use output::{MidiOutputMessage, MidiSink};

pub mod output_collector;
pub use output_collector::{
    midi_output_channel, midi_output_channel_with_capacity, MidiOutputConsumer,
    MidiOutputProducer,
};

#[cfg(feature = "config")]
pub mod config;

pub use blocks_midi::{
    AllocatorConfig, Assignment, AssignmentKind, ChannelAllocator, ChannelRange, DuplicateWindow,
    StealPolicy,
};
