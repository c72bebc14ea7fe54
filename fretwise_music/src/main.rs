// Fretwise CLI: generate and voice practice progressions.
//
// Runs the same pipeline a game round does: generate a progression for the
// chosen difficulty (consulting session memory so consecutive rounds differ),
// spell each degree as a C-major triad, and voice it for the chosen
// instrument. Optionally writes the voiced progression to MIDI.
//
// Usage:
//   cargo run -p fretwise_music -- [--difficulty easy|medium|hard] [--count N]
//     [--seed N] [--instrument piano|guitar|bass] [--context trainer|resource]
//     [--config rules.json] [--midi out.mid] [--tempo BPM]
//
// Set RUST_LOG=debug (or trace) to see generation retries and shape scores.

use fretwise_music::bass::voice_bass_chord;
use fretwise_music::config::EngineConfig;
use fretwise_music::fretboard::VoicingContext;
use fretwise_music::guitar::{find_guitar_shape, voice_guitar_chord_with};
use fretwise_music::harmony::{Difficulty, ScaleDegree};
use fretwise_music::memory::SessionMemory;
use fretwise_music::midi::{
    PROGRAM_FINGERED_BASS, PROGRAM_NYLON_GUITAR, PROGRAM_PIANO, write_progression_midi,
};
use fretwise_music::pitch::{Pitch, degree_to_pitch_chord, pitch_to_note_name, roman_numeral};
use fretwise_music::progression::{generate_progression, signature};
use fretwise_prng::SessionRng;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instrument {
    Piano,
    Guitar,
    Bass,
}

impl Instrument {
    fn program(self) -> u8 {
        match self {
            Instrument::Piano => PROGRAM_PIANO,
            Instrument::Guitar => PROGRAM_NYLON_GUITAR,
            Instrument::Bass => PROGRAM_FINGERED_BASS,
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let difficulty_name: String = parse_flag(&args, "--difficulty").unwrap_or_default();
    let context_name: String = parse_flag(&args, "--context").unwrap_or_default();
    let instrument_name: String = parse_flag(&args, "--instrument").unwrap_or_default();
    let difficulty = parse_difficulty(&difficulty_name);
    let context = parse_context(&context_name);
    let instrument = parse_instrument(&instrument_name);
    let count: usize = parse_flag(&args, "--count").unwrap_or(4);
    let seed: u64 = parse_flag(&args, "--seed").unwrap_or_else(rand::random);
    let tempo: u16 = parse_flag(&args, "--tempo").unwrap_or(80);
    let config_path: Option<String> = parse_flag(&args, "--config");
    let midi_path: Option<String> = parse_flag(&args, "--midi");

    let config = match &config_path {
        Some(path) => match EngineConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    println!("=== Fretwise ===");
    println!("Difficulty: {difficulty}");
    println!("Instrument: {instrument:?} ({context})");
    println!("Seed: {seed}");
    println!();

    let mut rng = SessionRng::new(seed);
    let mut memory = SessionMemory::for_params(&config.rules.params);
    let mut all_chords: Vec<Vec<Pitch>> = Vec::new();

    for round in 1..=count {
        let degrees = generate_progression(difficulty, &config.rules, &mut memory, &mut rng);
        let numerals: Vec<String> = degrees.iter().map(|&d| roman_numeral(d)).collect();
        println!("Round {round}: {}  ({})", signature(&degrees), numerals.join(" "));

        for &degree in &degrees {
            let voiced = voice_degree(degree, instrument, context, &config);
            let detail = describe(degree, &voiced, instrument, context, &config);
            println!("  {:<5} {detail}", roman_numeral(degree));
            all_chords.push(voiced);
        }
        println!();
    }

    let used: Vec<String> = (1..=7)
        .map(|d| format!("{}:{}", roman_numeral(d), memory.usage(d)))
        .collect();
    println!("Degree usage: {}", used.join(" "));

    if let Some(path) = midi_path {
        match write_progression_midi(&all_chords, tempo, instrument.program(), Path::new(&path)) {
            Ok(()) => println!("Wrote {} chords to {path}", all_chords.len()),
            Err(e) => {
                eprintln!("Error writing MIDI: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn voice_degree(
    degree: ScaleDegree,
    instrument: Instrument,
    context: VoicingContext,
    config: &EngineConfig,
) -> Vec<Pitch> {
    let chord = degree_to_pitch_chord(degree);
    match instrument {
        Instrument::Piano => chord,
        Instrument::Guitar => voice_guitar_chord_with(&chord, None, context, &config.guitar),
        Instrument::Bass => voice_bass_chord(chord[0], &chord, context),
    }
}

/// Note names, plus tab for guitar when a fretted shape exists.
fn describe(
    degree: ScaleDegree,
    voiced: &[Pitch],
    instrument: Instrument,
    context: VoicingContext,
    config: &EngineConfig,
) -> String {
    let names: Vec<String> = voiced.iter().map(|&p| pitch_to_note_name(p)).collect();
    let names = names.join(" ");
    if instrument != Instrument::Guitar {
        return names;
    }
    let chord = degree_to_pitch_chord(degree);
    match find_guitar_shape(&chord, None, context, &config.guitar) {
        Some(shape) => format!("{:<18} {}", shape.shape.tab(), names),
        None => format!("{:<18} {}", "(open voicing)", names),
    }
}

fn parse_difficulty(name: &str) -> Difficulty {
    if name.is_empty() {
        return Difficulty::Easy;
    }
    name.parse::<Difficulty>().unwrap_or_else(|e| {
        eprintln!("{e}. Using easy.");
        Difficulty::Easy
    })
}

fn parse_context(name: &str) -> VoicingContext {
    if name.is_empty() {
        return VoicingContext::Trainer;
    }
    name.parse::<VoicingContext>().unwrap_or_else(|e| {
        eprintln!("{e}. Using trainer.");
        VoicingContext::Trainer
    })
}

fn parse_instrument(name: &str) -> Instrument {
    match name.to_lowercase().as_str() {
        "" | "piano" => Instrument::Piano,
        "guitar" => Instrument::Guitar,
        "bass" => Instrument::Bass,
        other => {
            eprintln!("Unknown instrument '{other}'. Using piano.");
            Instrument::Piano
        }
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
