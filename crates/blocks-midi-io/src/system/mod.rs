//! Per-program MIDI output with automatic channel assignment.
//!
//! ## Quick Start
//!
//! ```
//! use blocks_midi_io::{MidiOutputMessage, MidiProgram};
//!
//! let mut program = MidiProgram::builder()
//!     .channel_range(true, 1, 5)
//!     .duplicate_filter(true)
//!     .build(Vec::<MidiOutputMessage>::new())?;
//!
//! // Touch down: channel picked for us and note-on sent
//! let channel = program.note_on(60, 100);
//! program.pitch_bend(60, 2048);
//!
//! // Touch up
//! program.note_off(60, 0);
//! assert_eq!(program.sink().len(), 3);
//! # Ok::<(), blocks_midi_io::Error>(())
//! ```

mod builder;

pub use builder::MidiProgramBuilder;

use blocks_midi::{
    Assignment, AssignmentKind, ChannelAllocator, ChannelRange, DuplicateWindow, StealPolicy,
};
use tracing::{debug, trace, warn};

use crate::output::MidiSink;

/// CC74, the MPE per-note timbre (slide) controller.
const TIMBRE_CC: u8 = 74;

/// Owns a program's channel allocator and its output sink.
///
/// Created once when the program initialises and held by the touch/MIDI
/// event handlers. Channels are only handed out through these methods.
pub struct MidiProgram<S: MidiSink> {
    allocator: ChannelAllocator,
    sink: S,
}

impl MidiProgram<Vec<crate::MidiOutputMessage>> {
    /// Create a new program builder.
    ///
    /// Lives on the `Vec` sink so `MidiProgram::builder()` needs no type
    /// annotation. The builder is not tied to `Vec`: [`MidiProgramBuilder::build`]
    /// accepts any [`MidiSink`], and the sink passed there fixes the type.
    pub fn builder() -> MidiProgramBuilder {
        MidiProgramBuilder::default()
    }
}

impl<S: MidiSink> MidiProgram<S> {
    pub fn new(allocator: ChannelAllocator, sink: S) -> Self {
        Self { allocator, sink }
    }

    // ==================== Channel Assignment ====================

    /// Release every sounding note, then replace the channel range.
    ///
    /// Out-of-range bounds are clamped; the applied range is returned.
    pub fn set_channel_range(&mut self, use_mpe: bool, low: u8, high: u8) -> ChannelRange {
        self.release_all(0);
        self.allocator.set_channel_range(use_mpe, low, high)
    }

    /// Channel for a note-on the caller sends itself.
    #[inline]
    pub fn assign_channel(&mut self, note: u8) -> u8 {
        self.allocator.assign_channel(note)
    }

    #[inline]
    pub fn deassign_channel(&mut self, note: u8, channel: u8) -> bool {
        self.allocator.deassign_channel(note, channel)
    }

    #[inline]
    pub fn control_channel(&self) -> u8 {
        self.allocator.control_channel()
    }

    #[inline]
    pub fn use_mpe_duplicate_filter(&mut self, active: bool) {
        self.allocator.use_mpe_duplicate_filter(active);
    }

    #[inline]
    pub fn set_duplicate_window(&mut self, window: DuplicateWindow) {
        self.allocator.set_duplicate_window(window);
    }

    #[inline]
    pub fn set_steal_policy(&mut self, policy: StealPolicy) {
        self.allocator.set_steal_policy(policy);
    }

    /// Read-only access to the allocator state.
    pub fn allocator(&self) -> &ChannelAllocator {
        &self.allocator
    }

    // ==================== Note Output ====================

    /// Assign a channel to `note` and send its note-on.
    ///
    /// A stolen note is silenced first, and a retriggered note is ended before
    /// it sounds again, so receivers never stack voices. Duplicates caught by
    /// the filter are not sent again. Returns the note's channel.
    pub fn note_on(&mut self, note: u8, velocity: u8) -> u8 {
        let Assignment { channel, kind } = self.allocator.assign(note);
        match kind {
            AssignmentKind::Fresh => {
                self.sink.send_note_on(channel, note, velocity);
            }
            AssignmentKind::Retrigger => {
                self.sink.send_note_off(channel, note, 0);
                self.sink.send_note_on(channel, note, velocity);
            }
            AssignmentKind::Stolen { note: stolen } => {
                self.sink.send_note_off(channel, stolen, 0);
                self.sink.send_note_on(channel, note, velocity);
            }
            AssignmentKind::Duplicate => {
                trace!("Suppressed duplicate note-on for note {}", note);
            }
            AssignmentKind::Unroutable => {
                warn!("Note-on for note {} dropped", note);
            }
        }
        channel
    }

    /// Send note-off for `note` on its channel and release the channel.
    ///
    /// Notes that are not sounding (already released or stolen) are ignored.
    pub fn note_off(&mut self, note: u8, velocity: u8) {
        let Some(channel) = self.allocator.channel_for_note(note) else {
            debug!("Note-off for inactive note {}", note);
            return;
        };
        self.sink.send_note_off(channel, note, velocity);
        self.allocator.deassign_channel(note, channel);
    }

    /// Per-note pressure: channel pressure under MPE, poly aftertouch otherwise.
    pub fn aftertouch(&mut self, note: u8, pressure: u8) {
        let Some(channel) = self.allocator.channel_for_note(note) else {
            return;
        };
        if self.allocator.range().use_mpe() {
            self.sink.send_channel_pressure(channel, pressure);
        } else {
            self.sink.send_aftertouch(channel, note, pressure);
        }
    }

    /// Pitch bend on the note's channel. `value`: -8192 to 8191.
    pub fn pitch_bend(&mut self, note: u8, value: i16) {
        if let Some(channel) = self.allocator.channel_for_note(note) {
            self.sink.send_pitch_bend(channel, value);
        }
    }

    /// Timbre (CC74) on the note's channel.
    pub fn timbre(&mut self, note: u8, value: u8) {
        if let Some(channel) = self.allocator.channel_for_note(note) {
            self.sink.send_cc(channel, TIMBRE_CC, value);
        }
    }

    /// Control change on the control channel.
    pub fn control_change(&mut self, cc_number: u8, value: u8) {
        let channel = self.allocator.control_channel();
        self.sink.send_cc(channel, cc_number, value);
    }

    /// Send note-off for every sounding note and clear all assignments.
    pub fn release_all(&mut self, velocity: u8) {
        for (note, channel) in self.allocator.active_notes() {
            self.sink.send_note_off(channel, note, velocity);
        }
        self.allocator.reset();
    }

    // ==================== Sink Access ====================

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
