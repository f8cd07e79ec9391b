//! Note-to-channel assignment table.

use smallvec::SmallVec;

use super::pool::ChannelPool;
use crate::range::NOTE_COUNT;

/// One allocatable channel and the note currently sounding on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelSlot {
    pub channel: u8,
    pub assigned_note: Option<u8>,
    /// Allocator sequence at the slot's last claim or retrigger.
    pub last_used: u64,
}

impl ChannelSlot {
    fn new(channel: u8) -> Self {
        Self {
            channel,
            assigned_note: None,
            last_used: 0,
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.assigned_note.is_none()
    }
}

/// Bidirectional map between live notes and the slots of a [`ChannelPool`].
///
/// Every occupied slot has a `note_to_channel` entry pointing back at it, and
/// every `note_to_channel` entry names an occupied slot holding that note.
#[derive(Debug)]
pub struct AssignmentTable {
    pool: ChannelPool,
    /// Ascending by channel, one per pool channel
    slots: SmallVec<[ChannelSlot; 16]>,
    /// Note number → channel (or None if not sounding)
    note_to_channel: [Option<u8>; NOTE_COUNT],
}

impl AssignmentTable {
    pub fn new(pool: ChannelPool) -> Self {
        let slots = pool.channels().iter().copied().map(ChannelSlot::new).collect();
        Self {
            pool,
            slots,
            note_to_channel: [None; NOTE_COUNT],
        }
    }

    #[inline]
    pub fn pool(&self) -> &ChannelPool {
        &self.pool
    }

    #[inline]
    pub fn slots(&self) -> &[ChannelSlot] {
        &self.slots
    }

    #[inline]
    pub fn channel_for_note(&self, note: u8) -> Option<u8> {
        self.note_to_channel.get(note as usize).copied().flatten()
    }

    #[inline]
    pub fn note_on_channel(&self, channel: u8) -> Option<u8> {
        let index = self.pool.index_of(channel)?;
        self.slots[index].assigned_note
    }

    /// Index of the lowest-numbered free channel.
    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(ChannelSlot::is_free)
    }

    /// Index of the slot with the oldest stamp; ties go to the lowest channel.
    pub fn least_recently_used(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(index, _)| index)
    }

    /// Give slot `index` to `note`, stamping it with `sequence`.
    ///
    /// Returns the note evicted from the slot, if any. The caller guarantees
    /// `note < 128`.
    pub fn claim(&mut self, index: usize, note: u8, sequence: u64) -> Option<u8> {
        // A note lives on one channel at a time
        if let Some(previous) = self.channel_for_note(note) {
            self.release(note, previous);
        }

        let slot = &mut self.slots[index];
        let evicted = slot.assigned_note.replace(note);
        slot.last_used = sequence;
        let channel = slot.channel;

        if let Some(old) = evicted {
            self.note_to_channel[old as usize] = None;
        }
        self.note_to_channel[note as usize] = Some(channel);
        evicted
    }

    /// Restamp the slot holding `note` and return its channel.
    pub fn touch(&mut self, note: u8, sequence: u64) -> Option<u8> {
        let channel = self.channel_for_note(note)?;
        let index = self.pool.index_of(channel)?;
        self.slots[index].last_used = sequence;
        Some(channel)
    }

    /// Remove `note` only if it is currently mapped to `channel`.
    pub fn release(&mut self, note: u8, channel: u8) -> bool {
        if self.channel_for_note(note) != Some(channel) {
            return false;
        }
        if let Some(index) = self.pool.index_of(channel) {
            self.slots[index].assigned_note = None;
        }
        self.note_to_channel[note as usize] = None;
        true
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    /// `(note, channel)` pairs in ascending channel order.
    pub fn active_notes(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.assigned_note.map(|note| (note, slot.channel)))
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = ChannelSlot::new(slot.channel);
        }
        self.note_to_channel = [None; NOTE_COUNT];
    }

    /// Check that both directions of the mapping agree.
    pub fn is_consistent(&self) -> bool {
        let forward = self.slots.iter().all(|slot| match slot.assigned_note {
            Some(note) => self.note_to_channel[note as usize] == Some(slot.channel),
            None => true,
        });
        let backward = self
            .note_to_channel
            .iter()
            .enumerate()
            .all(|(note, channel)| match channel {
                Some(channel) => self.note_on_channel(*channel) == Some(note as u8),
                None => true,
            });
        forward && backward
    }
}
