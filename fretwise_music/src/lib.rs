// Fretwise Music Engine
//
// Chord-progression generation and instrument voicing for an ear-training
// game. A round asks the engine for a diatonic progression in C major at one
// of three difficulty levels, then voices each chord for the instrument the
// player hears it on. Progressions follow functional harmony (tonic,
// predominant, dominant), end on a cadence, and avoid repeating what the
// session has heard recently.
//
// Architecture:
// - harmony.rs: Scale degrees, difficulty levels, function pools, templates,
//   cadence catalogue and generation parameters (the data-driven rule table)
// - memory.rs: Per-session bounded history of progression signatures plus
//   per-degree usage counts
// - progression.rs: Template-driven progression builder with cadence splicing,
//   ordering repair and history-aware retries
// - pitch.rs: Degree-to-pitch mapping, chord qualities, Roman numerals and
//   note-name conversions
// - interval.rs: Interval sets of a chord relative to its root
// - fretboard.rs: Guitar tuning, voicing contexts, shape representation and
//   tab rendering
// - guitar.rs: Exhaustive fretboard shape search with weighted scoring,
//   open-voicing fallback and register fitting
// - bass.rs: Rule-based bass voicing (low root plus upper chord tones)
// - config.rs: JSON engine configuration with validation
// - midi.rs: MIDI file output for voiced progressions
// - error.rs: Error type for configuration and file I/O
//
// All randomness flows through a caller-supplied `rand::Rng`, so output is
// deterministic given a seeded generator (see fretwise_prng).

pub mod bass;
pub mod config;
pub mod error;
pub mod fretboard;
pub mod guitar;
pub mod harmony;
pub mod interval;
pub mod memory;
pub mod midi;
pub mod pitch;
pub mod progression;
