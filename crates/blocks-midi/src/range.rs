//! Channel range configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest MIDI channel (1-based).
pub const MIN_CHANNEL: u8 = 1;
/// Highest MIDI channel (1-based).
pub const MAX_CHANNEL: u8 = 16;
/// Number of addressable MIDI notes.
pub const NOTE_COUNT: usize = 128;

/// Contiguous block of MIDI channels (1-16) available for note allocation.
///
/// Under MPE the first channel is the control channel and the remaining
/// channels each carry one sounding note. In legacy mode every channel in the
/// range is allocatable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChannelRange")]
pub struct ChannelRange {
    use_mpe: bool,
    low: u8,
    high: u8,
}

impl ChannelRange {
    /// Strict constructor: rejects bounds outside `1 <= low <= high <= 16`.
    pub fn new(use_mpe: bool, low: u8, high: u8) -> Result<Self> {
        if low < MIN_CHANNEL || high > MAX_CHANNEL || low > high {
            return Err(Error::InvalidChannelRange { low, high });
        }
        Ok(Self { use_mpe, low, high })
    }

    /// Forces the bounds into a valid window.
    ///
    /// Each bound is clamped to 1..=16; if `low` then exceeds `high`, `high`
    /// is raised to `low`.
    pub fn clamped(use_mpe: bool, low: u8, high: u8) -> Self {
        let low = low.clamp(MIN_CHANNEL, MAX_CHANNEL);
        let high = high.clamp(MIN_CHANNEL, MAX_CHANNEL).max(low);
        Self { use_mpe, low, high }
    }

    /// MPE lower zone spanning all 16 channels.
    pub fn mpe_full() -> Self {
        Self {
            use_mpe: true,
            low: MIN_CHANNEL,
            high: MAX_CHANNEL,
        }
    }

    #[inline]
    pub fn use_mpe(&self) -> bool {
        self.use_mpe
    }

    #[inline]
    pub fn low(&self) -> u8 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> u8 {
        self.high
    }

    /// Number of channels in the range, control channel included.
    #[inline]
    pub fn len(&self) -> usize {
        (self.high - self.low) as usize + 1
    }

    /// Always false; a range holds at least one channel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The first channel of the range, in both MPE and legacy mode.
    #[inline]
    pub fn control_channel(&self) -> u8 {
        self.low
    }

    #[inline]
    pub fn contains(&self, channel: u8) -> bool {
        channel >= self.low && channel <= self.high
    }

    /// Check if a channel is reserved for control traffic and never carries a note.
    ///
    /// A single-channel MPE range has no member channels, so its only channel
    /// is shared and not reserved.
    #[inline]
    pub fn is_reserved(&self, channel: u8) -> bool {
        self.use_mpe && self.low < self.high && channel == self.low
    }

    /// Channels that notes may be assigned to.
    pub fn member_channels(&self) -> std::ops::RangeInclusive<u8> {
        if self.use_mpe && self.low < self.high {
            (self.low + 1)..=self.high
        } else {
            self.low..=self.high
        }
    }
}

/// Unchecked wire form; deserialized ranges pass through [`ChannelRange::new`].
#[derive(Deserialize)]
struct RawChannelRange {
    use_mpe: bool,
    low: u8,
    high: u8,
}

impl TryFrom<RawChannelRange> for ChannelRange {
    type Error = Error;

    fn try_from(raw: RawChannelRange) -> Result<Self> {
        ChannelRange::new(raw.use_mpe, raw.low, raw.high)
    }
}

impl Default for ChannelRange {
    fn default() -> Self {
        Self::mpe_full()
    }
}
