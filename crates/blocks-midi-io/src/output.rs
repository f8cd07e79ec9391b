//! Short MIDI messages and the sink they are sent to.

use smallvec::SmallVec;

use blocks_midi::{MAX_CHANNEL, MIN_CHANNEL};

/// An encoded 2- or 3-byte channel voice message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputMessage {
    pub bytes: SmallVec<[u8; 3]>,
}

/// Status byte for a 1-based channel (clamped to 1-16).
#[inline]
fn status(kind: u8, channel: u8) -> u8 {
    kind | (channel.clamp(MIN_CHANNEL, MAX_CHANNEL) - 1)
}

impl MidiOutputMessage {
    fn short(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::short(&[status(0x90, channel), note & 0x7F, velocity & 0x7F])
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::short(&[status(0x80, channel), note & 0x7F, velocity & 0x7F])
    }

    pub fn poly_aftertouch(channel: u8, note: u8, pressure: u8) -> Self {
        Self::short(&[status(0xA0, channel), note & 0x7F, pressure & 0x7F])
    }

    pub fn control_change(channel: u8, cc_number: u8, value: u8) -> Self {
        Self::short(&[status(0xB0, channel), cc_number & 0x7F, value & 0x7F])
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::short(&[status(0xC0, channel), program & 0x7F])
    }

    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self::short(&[status(0xD0, channel), pressure & 0x7F])
    }

    /// `value`: signed 14-bit (-8192 to 8191).
    pub fn pitch_bend(channel: u8, value: i16) -> Self {
        let unsigned = (i32::from(value) + 8192).clamp(0, 16383) as u16;
        let lsb = (unsigned & 0x7F) as u8;
        let msb = ((unsigned >> 7) & 0x7F) as u8;
        Self::short(&[status(0xE0, channel), lsb, msb])
    }

    /// 1-based channel, or None for a malformed message.
    pub fn channel(&self) -> Option<u8> {
        self.bytes.first().map(|status| (status & 0x0F) + 1)
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self.bytes.as_slice(), [s, _, v] if s & 0xF0 == 0x90 && *v > 0)
    }

    /// Note-off, or note-on with velocity 0.
    pub fn is_note_off(&self) -> bool {
        match self.bytes.as_slice() {
            [s, _, _] if s & 0xF0 == 0x80 => true,
            [s, _, v] if s & 0xF0 == 0x90 => *v == 0,
            _ => false,
        }
    }

    /// Note number of note and poly-aftertouch messages.
    pub fn note(&self) -> Option<u8> {
        match self.bytes.as_slice() {
            [s, note, _] if matches!(s & 0xF0, 0x80 | 0x90 | 0xA0) => Some(*note),
            _ => None,
        }
    }
}

/// Destination for outgoing short messages.
///
/// Channels are 1-based. Implementations must not block: sinks are driven
/// from the touch and MIDI callbacks.
pub trait MidiSink {
    fn send(&mut self, message: MidiOutputMessage);

    fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(MidiOutputMessage::note_on(channel, note, velocity));
    }

    fn send_note_off(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(MidiOutputMessage::note_off(channel, note, velocity));
    }

    /// Polyphonic aftertouch for `note`.
    fn send_aftertouch(&mut self, channel: u8, note: u8, pressure: u8) {
        self.send(MidiOutputMessage::poly_aftertouch(channel, note, pressure));
    }

    fn send_channel_pressure(&mut self, channel: u8, pressure: u8) {
        self.send(MidiOutputMessage::channel_pressure(channel, pressure));
    }

    fn send_cc(&mut self, channel: u8, cc_number: u8, value: u8) {
        self.send(MidiOutputMessage::control_change(channel, cc_number, value));
    }

    fn send_pitch_bend(&mut self, channel: u8, value: i16) {
        self.send(MidiOutputMessage::pitch_bend(channel, value));
    }
}

/// Captures messages, e.g. for tests or offline rendering.
impl MidiSink for Vec<MidiOutputMessage> {
    fn send(&mut self, message: MidiOutputMessage) {
        self.push(message);
    }
}

impl<S: MidiSink + ?Sized> MidiSink for &mut S {
    fn send(&mut self, message: MidiOutputMessage) {
        (**self).send(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_voice_encoding() {
        assert_eq!(MidiOutputMessage::note_on(1, 60, 100).bytes.as_slice(), &[0x90, 60, 100]);
        assert_eq!(MidiOutputMessage::note_off(16, 60, 0).bytes.as_slice(), &[0x8F, 60, 0]);
        assert_eq!(MidiOutputMessage::poly_aftertouch(2, 64, 90).bytes.as_slice(), &[0xA1, 64, 90]);
        assert_eq!(MidiOutputMessage::control_change(3, 74, 127).bytes.as_slice(), &[0xB2, 74, 127]);
        assert_eq!(MidiOutputMessage::program_change(10, 5).bytes.as_slice(), &[0xC9, 5]);
        assert_eq!(MidiOutputMessage::channel_pressure(4, 80).bytes.as_slice(), &[0xD3, 80]);
    }

    #[test]
    fn test_channel_and_data_clamping() {
        // Channel 0 clamps to channel 1, 20 clamps to 16
        assert_eq!(MidiOutputMessage::note_on(0, 60, 100).bytes[0], 0x90);
        assert_eq!(MidiOutputMessage::note_on(20, 60, 100).bytes[0], 0x9F);
        // Data bytes are masked to 7 bits
        assert_eq!(MidiOutputMessage::note_on(1, 0xFF, 0x80).bytes.as_slice(), &[0x90, 0x7F, 0x00]);
    }

    #[test]
    fn test_pitch_bend_encoding() {
        assert_eq!(MidiOutputMessage::pitch_bend(1, 0).bytes.as_slice(), &[0xE0, 0x00, 0x40]);
        assert_eq!(MidiOutputMessage::pitch_bend(1, -8192).bytes.as_slice(), &[0xE0, 0x00, 0x00]);
        assert_eq!(MidiOutputMessage::pitch_bend(1, 8191).bytes.as_slice(), &[0xE0, 0x7F, 0x7F]);
        // Out-of-range values saturate
        assert_eq!(MidiOutputMessage::pitch_bend(1, i16::MAX).bytes.as_slice(), &[0xE0, 0x7F, 0x7F]);
    }

    #[test]
    fn test_message_inspection() {
        let on = MidiOutputMessage::note_on(5, 60, 100);
        assert!(on.is_note_on());
        assert!(!on.is_note_off());
        assert_eq!(on.channel(), Some(5));
        assert_eq!(on.note(), Some(60));

        assert!(MidiOutputMessage::note_on(5, 60, 0).is_note_off());
        assert!(MidiOutputMessage::note_off(5, 60, 0).is_note_off());
        assert_eq!(MidiOutputMessage::control_change(5, 74, 1).note(), None);
    }

    #[test]
    fn test_vec_sink_helpers() {
        let mut sink: Vec<MidiOutputMessage> = Vec::new();
        sink.send_note_on(2, 60, 100);
        sink.send_cc(1, 7, 127);
        sink.send_pitch_bend(2, 0);

        assert_eq!(sink.len(), 3);
        assert!(sink[0].is_note_on());
        assert_eq!(sink[1].channel(), Some(1));
    }
}
