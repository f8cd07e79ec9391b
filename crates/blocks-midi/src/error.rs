//! Error types for channel allocation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid channel range {low}..={high} (channels must satisfy 1 <= low <= high <= 16)")]
    InvalidChannelRange { low: u8, high: u8 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
