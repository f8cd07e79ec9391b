//! The set of channels notes can be allocated to.

use smallvec::SmallVec;

use crate::range::ChannelRange;

/// Allocatable channels derived from a [`ChannelRange`], in ascending order.
#[derive(Clone, Debug)]
pub struct ChannelPool {
    range: ChannelRange,
    channels: SmallVec<[u8; 16]>,
}

impl ChannelPool {
    pub fn new(range: ChannelRange) -> Self {
        Self {
            range,
            channels: range.member_channels().collect(),
        }
    }

    #[inline]
    pub fn range(&self) -> ChannelRange {
        self.range
    }

    #[inline]
    pub fn channels(&self) -> &[u8] {
        &self.channels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Position of `channel` in the pool, if it is allocatable.
    #[inline]
    pub fn index_of(&self, channel: u8) -> Option<usize> {
        let first = *self.channels.first()?;
        let index = channel.checked_sub(first)? as usize;
        (index < self.channels.len()).then_some(index)
    }
}
