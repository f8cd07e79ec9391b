//! TOML loading for [`AllocatorConfig`].
//!
//! ```toml
//! use_mpe = true
//! low_channel = 1
//! high_channel = 8
//! duplicate_filter = true
//! duplicate_window = { assignments = 4 }
//! steal_policy = "round_robin"
//! ```

use std::path::Path;

use blocks_midi::AllocatorConfig;
use tracing::debug;

use crate::error::Result;

/// Parse and validate a TOML document. Missing keys take their defaults.
pub fn from_toml_str(contents: &str) -> Result<AllocatorConfig> {
    let config: AllocatorConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load(path: impl AsRef<Path>) -> Result<AllocatorConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config = from_toml_str(&contents)?;
    debug!("Loaded allocator config from {}", path.display());
    Ok(config)
}
