// MIDI rendering of voiced progressions.
//
// Writes a progression (one pitch list per chord) as a Standard MIDI File so
// it can be auditioned offline. Each chord is held for one 4/4 bar and all of
// its notes start together. Output is SMF Format 1: a tempo track plus a
// single chord track on channel 0.
//
// Uses the `midly` crate for encoding. Live playback and scheduling belong to
// the game's audio layer, not this crate.

use crate::error::FretwiseError;
use crate::pitch::Pitch;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// One chord per 4/4 bar.
const TICKS_PER_CHORD: u32 = TICKS_PER_QUARTER as u32 * 4;

const NOTE_VELOCITY: u8 = 80;

/// General MIDI programs for the instruments the engine voices for.
pub const PROGRAM_PIANO: u8 = 0;
pub const PROGRAM_NYLON_GUITAR: u8 = 24;
pub const PROGRAM_FINGERED_BASS: u8 = 33;

/// Encode `chords` and write them to `path`.
pub fn write_progression_midi(
    chords: &[Vec<Pitch>],
    tempo_bpm: u16,
    program: u8,
    path: &Path,
) -> Result<(), FretwiseError> {
    let smf = progression_to_smf(chords, tempo_bpm, program);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path, &buf).map_err(|source| FretwiseError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Build the in-memory SMF for a progression.
fn progression_to_smf(chords: &[Vec<Pitch>], tempo_bpm: u16, program: u8) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut tempo_track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / tempo_bpm.max(1) as u32;
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(end_of_track());
    smf.tracks.push(tempo_track);

    let channel = u4::new(0);
    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Chords")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(program.min(127)),
            },
        },
    });

    // Ticks since the last emitted event.
    let mut pending: u32 = 0;
    for chord in chords {
        let keys: Vec<u7> = chord.iter().map(|&p| to_key(p)).collect();
        if keys.is_empty() {
            pending += TICKS_PER_CHORD;
            continue;
        }

        for (i, &key) in keys.iter().enumerate() {
            let delta = if i == 0 { pending } else { 0 };
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key,
                        vel: u7::new(NOTE_VELOCITY),
                    },
                },
            });
        }
        for (i, &key) in keys.iter().enumerate() {
            let delta = if i == 0 { TICKS_PER_CHORD } else { 0 };
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key,
                        vel: u7::new(0),
                    },
                },
            });
        }
        pending = 0;
    }

    track.push(end_of_track());
    smf.tracks.push(track);
    smf
}

fn to_key(pitch: Pitch) -> u7 {
    u7::new(pitch.clamp(0, 127) as u8)
}

fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}
