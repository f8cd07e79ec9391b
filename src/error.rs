//! Centralized error type for the blocks umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Channel assignment: {0}")]
    Channels(#[from] blocks_midi::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] blocks_midi_io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
