//! Lock-free hand-off of outgoing MIDI from the event callbacks to the transport.

use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use tracing::warn;

use crate::output::{MidiOutputMessage, MidiSink};

const DEFAULT_CAPACITY: usize = 256;

/// Producer side -- push messages from the event callbacks.
pub struct MidiOutputProducer {
    producer: HeapProd<MidiOutputMessage>,
    dropped: u64,
}

impl MidiOutputProducer {
    /// Returns `false` if the ring buffer is full.
    #[inline]
    pub fn push(&mut self, message: MidiOutputMessage) -> bool {
        self.producer.try_push(message).is_ok()
    }

    /// Messages discarded because the buffer was full.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl MidiSink for MidiOutputProducer {
    fn send(&mut self, message: MidiOutputMessage) {
        if !self.push(message) {
            self.dropped += 1;
            warn!("MIDI output buffer full, message dropped");
        }
    }
}

/// Consumer side -- drain messages on the transport side.
pub struct MidiOutputConsumer {
    consumer: HeapCons<MidiOutputMessage>,
}

impl MidiOutputConsumer {
    #[inline]
    pub fn pop(&mut self) -> Option<MidiOutputMessage> {
        self.consumer.try_pop()
    }

    pub fn drain_all(&mut self) -> Vec<MidiOutputMessage> {
        let mut messages = Vec::with_capacity(self.consumer.occupied_len());
        while let Some(message) = self.consumer.try_pop() {
            messages.push(message);
        }
        messages
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.consumer.is_empty()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.consumer.occupied_len()
    }
}

pub fn midi_output_channel() -> (MidiOutputProducer, MidiOutputConsumer) {
    midi_output_channel_with_capacity(DEFAULT_CAPACITY)
}

pub fn midi_output_channel_with_capacity(
    capacity: usize,
) -> (MidiOutputProducer, MidiOutputConsumer) {
    let rb = HeapRb::new(capacity);
    let (producer, consumer) = rb.split();
    (
        MidiOutputProducer {
            producer,
            dropped: 0,
        },
        MidiOutputConsumer { consumer },
    )
}
