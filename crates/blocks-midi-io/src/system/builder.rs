//! MidiProgram builder for configuring channel assignment.

#[cfg(feature = "config")]
use std::path::PathBuf;

use blocks_midi::{AllocatorConfig, ChannelAllocator, DuplicateWindow, StealPolicy};

use crate::error::Result;
use crate::output::MidiSink;

use super::MidiProgram;

/// Settings from `.config()` or `.config_file()` form the base and are
/// validated strictly; the individual setters override them and clamp.
#[derive(Default)]
pub struct MidiProgramBuilder {
    base: Option<AllocatorConfig>,
    #[cfg(feature = "config")]
    config_file: Option<PathBuf>,
    range: Option<(bool, u8, u8)>,
    duplicate_filter: Option<bool>,
    duplicate_window: Option<DuplicateWindow>,
    steal_policy: Option<StealPolicy>,
}

impl MidiProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default: MPE over channels 1-16
    pub fn channel_range(mut self, use_mpe: bool, low: u8, high: u8) -> Self {
        self.range = Some((use_mpe, low, high));
        self
    }

    /// Default: off
    pub fn duplicate_filter(mut self, active: bool) -> Self {
        self.duplicate_filter = Some(active);
        self
    }

    /// Default: `DuplicateWindow::UntilRelease`
    pub fn duplicate_window(mut self, window: DuplicateWindow) -> Self {
        self.duplicate_window = Some(window);
        self
    }

    /// Default: `StealPolicy::LeastRecentlyUsed`
    pub fn steal_policy(mut self, policy: StealPolicy) -> Self {
        self.steal_policy = Some(policy);
        self
    }

    pub fn config(mut self, config: AllocatorConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Read base settings from a TOML file at build time. Takes precedence
    /// over `.config()`.
    #[cfg(feature = "config")]
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn build<S: MidiSink>(self, sink: S) -> Result<MidiProgram<S>> {
        let mut config = self.base_config()?;

        if let Some((use_mpe, low, high)) = self.range {
            config.use_mpe = use_mpe;
            config.low_channel = low;
            config.high_channel = high;
        }
        if let Some(active) = self.duplicate_filter {
            config.duplicate_filter = active;
        }
        if let Some(window) = self.duplicate_window {
            config.duplicate_window = window;
        }
        if let Some(policy) = self.steal_policy {
            config.steal_policy = policy;
        }

        Ok(MidiProgram::new(ChannelAllocator::from_config(&config), sink))
    }

    fn base_config(&self) -> Result<AllocatorConfig> {
        #[cfg(feature = "config")]
        let from_file = self.config_file.as_ref().map(crate::config::load).transpose()?;
        #[cfg(not(feature = "config"))]
        let from_file: Option<AllocatorConfig> = None;

        if let Some(config) = from_file {
            return Ok(config);
        }

        match self.base {
            Some(ref config) => {
                config.validate()?;
                Ok(config.clone())
            }
            None => Ok(AllocatorConfig::default()),
        }
    }
}
