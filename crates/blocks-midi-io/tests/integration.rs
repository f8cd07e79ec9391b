//! Integration tests for blocks-midi-io.
//!
//! These tests drive a program the way the touch and MIDI callbacks do and
//! check what reaches the transport side of the output channel.

use blocks_midi_io::{
    midi_output_channel, midi_output_channel_with_capacity, AssignmentKind, DuplicateWindow,
    MidiOutputMessage, MidiProgram, StealPolicy,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ---------------------------------------------------------------------------
// 1. Touch gestures through the ring buffer
// ---------------------------------------------------------------------------

/// Chord played and released: each note on its own member channel.
#[test]
fn test_chord_over_output_channel() {
    init_tracing();
    let (producer, mut consumer) = midi_output_channel();
    let mut program = MidiProgram::builder()
        .channel_range(true, 1, 16)
        .build(producer)
        .unwrap();

    let c = program.note_on(60, 100);
    let e = program.note_on(64, 100);
    let g = program.note_on(67, 100);
    assert_eq!((c, e, g), (2, 3, 4));

    program.pitch_bend(64, 4096);
    for note in [60, 64, 67] {
        program.note_off(note, 0);
    }

    let messages = consumer.drain_all();
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[3], MidiOutputMessage::pitch_bend(3, 4096));
    assert!(messages[4..].iter().all(MidiOutputMessage::is_note_off));
    assert_eq!(program.allocator().active_count(), 0);
}

/// Two input paths report the same touch; with the filter on it sounds once.
#[test]
fn test_mpe_duplicate_paths_sound_once() {
    let (producer, mut consumer) = midi_output_channel();
    let mut program = MidiProgram::builder()
        .duplicate_filter(true)
        .duplicate_window(DuplicateWindow::UntilRelease)
        .build(producer)
        .unwrap();

    let a = program.note_on(62, 100);
    let b = program.note_on(62, 100);
    assert_eq!(a, b);

    // Both paths send their note-off; only the first reaches the transport
    program.note_off(62, 0);
    program.note_off(62, 0);

    let messages = consumer.drain_all();
    assert_eq!(
        messages,
        vec![
            MidiOutputMessage::note_on(a, 62, 100),
            MidiOutputMessage::note_off(a, 62, 0),
        ]
    );
}

/// More touches than member channels: oldest touch is cut off, not the new one.
#[test]
fn test_voice_steal_on_small_zone() {
    let (producer, mut consumer) = midi_output_channel();
    let mut program = MidiProgram::builder()
        .channel_range(true, 1, 3)
        .steal_policy(StealPolicy::LeastRecentlyUsed)
        .build(producer)
        .unwrap();

    program.note_on(60, 100);
    program.note_on(62, 100);
    let channel = program.note_on(64, 100);
    assert_eq!(channel, 2);
    assert!(program.allocator().channel_for_note(60).is_none());

    let messages = consumer.drain_all();
    assert_eq!(
        &messages[2..],
        &[
            MidiOutputMessage::note_off(2, 60, 0),
            MidiOutputMessage::note_on(2, 64, 100),
        ]
    );
}

/// A saturated output buffer drops messages without disturbing allocation.
#[test]
fn test_full_output_buffer_keeps_allocating() {
    let (producer, consumer) = midi_output_channel_with_capacity(1);
    let mut program = MidiProgram::builder().build(producer).unwrap();

    program.note_on(60, 100);
    program.note_on(61, 100);
    assert_eq!(program.allocator().active_count(), 2);
    assert_eq!(program.sink().dropped(), 1);
    assert_eq!(consumer.pending_count(), 1);
}

// ---------------------------------------------------------------------------
// 2. Caller-driven assignment
// ---------------------------------------------------------------------------

/// A program sending its own messages uses the allocator operations directly.
#[test]
fn test_manual_assignment_scenario() {
    let mut program = MidiProgram::builder()
        .channel_range(true, 1, 5)
        .build(Vec::<MidiOutputMessage>::new())
        .unwrap();

    assert_eq!(program.assign_channel(60), 2);
    assert_eq!(program.assign_channel(64), 3);
    program.deassign_channel(60, 2);
    assert_eq!(program.assign_channel(67), 2);
    assert_eq!(program.control_channel(), 1);
}

#[test]
fn test_reconfigure_mid_performance() {
    let mut program = MidiProgram::builder()
        .build(Vec::<MidiOutputMessage>::new())
        .unwrap();

    program.note_on(60, 100);
    program.note_on(72, 100);
    let applied = program.set_channel_range(false, 5, 30);
    assert_eq!((applied.low(), applied.high()), (5, 16));

    let offs = program.sink()[2..].to_vec();
    assert_eq!(offs.len(), 2);
    assert!(offs.iter().all(MidiOutputMessage::is_note_off));

    assert_eq!(program.note_on(60, 100), 5);
    assert_eq!(program.control_channel(), 5);
}

#[test]
fn test_assignment_kinds_visible_through_allocator() {
    let mut allocator = blocks_midi_io::ChannelAllocator::default();
    allocator.set_channel_range(false, 1, 2);
    allocator.use_mpe_duplicate_filter(true);

    assert_eq!(allocator.assign(1).kind, AssignmentKind::Fresh);
    assert_eq!(allocator.assign(1).kind, AssignmentKind::Duplicate);
    assert_eq!(allocator.assign(2).kind, AssignmentKind::Fresh);
    assert_eq!(allocator.assign(3).kind, AssignmentKind::Stolen { note: 1 });
}

// ---------------------------------------------------------------------------
// 3. Config file
// ---------------------------------------------------------------------------

#[cfg(feature = "config")]
#[test]
fn test_program_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocks.toml");
    std::fs::write(
        &path,
        "use_mpe = true\nlow_channel = 1\nhigh_channel = 3\nsteal_policy = \"round_robin\"\n",
    )
    .unwrap();

    let mut program = MidiProgram::builder()
        .config_file(&path)
        .build(Vec::<MidiOutputMessage>::new())
        .unwrap();

    assert_eq!(program.note_on(60, 100), 2);
    assert_eq!(program.note_on(62, 100), 3);
    // Round-robin steals channel 2 first, then channel 3
    assert_eq!(program.note_on(64, 100), 2);
    assert_eq!(program.note_on(65, 100), 3);
}

#[cfg(feature = "config")]
#[test]
fn test_malformed_config_file_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "low_channel = \"one\"").unwrap();

    let result = MidiProgram::builder()
        .config_file(&path)
        .build(Vec::<MidiOutputMessage>::new());
    assert!(matches!(result, Err(blocks_midi_io::Error::ConfigParse(_))));
}
