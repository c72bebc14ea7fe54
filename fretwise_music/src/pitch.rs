// Scale degrees to sounding pitches, plus note-name helpers.
//
// Pitches are MIDI-style semitone numbers with middle C = 60. The game works
// in C major, so degree roots come from a fixed table (C D E F G A B in the
// octave above 60) and chord quality from the diatonic triad pattern:
// I, IV, V major; ii, iii, vi minor; vii° diminished.
//
// The note-name helpers are small: a letter, an optional single
// sharp or flat, an optional octave number. Accidentals shift the letter's
// diatonic offset by one semitone. That covers the game's note vocabulary;
// it is not a general enharmonic speller (Cb, E#, double accidentals).

use crate::harmony::{DEGREE_COUNT, ScaleDegree};
use serde::{Deserialize, Serialize};

/// Semitone pitch, 60 = middle C.
pub type Pitch = i32;

/// Reference pitch for degree 1.
pub const REFERENCE_PITCH: Pitch = 60;

/// Octave assumed when a note name carries none.
pub const DEFAULT_OCTAVE: i32 = 4;

/// Root pitch of each degree's triad, degree 1 first.
const DEGREE_ROOTS: [Pitch; DEGREE_COUNT] = [60, 62, 64, 65, 67, 69, 71];

/// Natural note letters with their semitone offset above C.
const DIATONIC_OFFSETS: [(char, i32); DEGREE_COUNT] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch class (0-11) of any pitch, including negative ones.
pub fn pitch_class(pitch: Pitch) -> u8 {
    pitch.rem_euclid(12) as u8
}

/// Triad quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
}

impl ChordQuality {
    /// Semitones above the root for root, third and fifth.
    pub fn intervals(self) -> [u8; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
            ChordQuality::Diminished => [0, 3, 6],
        }
    }

    /// Diatonic quality of the triad built on `degree` in a major key.
    pub fn of_degree(degree: ScaleDegree) -> ChordQuality {
        match normalize_degree(degree) {
            1 | 4 | 5 => ChordQuality::Major,
            7 => ChordQuality::Diminished,
            _ => ChordQuality::Minor,
        }
    }
}

/// Wrap any degree into 1..=7 (8 → 1, 0 → 7).
fn normalize_degree(degree: ScaleDegree) -> ScaleDegree {
    ((degree as i32 - 1).rem_euclid(DEGREE_COUNT as i32) + 1) as ScaleDegree
}

/// Root-position triad for a scale degree, ascending.
///
/// Out-of-range degrees wrap around the scale rather than failing.
pub fn degree_to_pitch_chord(degree: ScaleDegree) -> Vec<Pitch> {
    let degree = normalize_degree(degree);
    let root = DEGREE_ROOTS[degree as usize - 1];
    ChordQuality::of_degree(degree)
        .intervals()
        .iter()
        .map(|&iv| root + iv as Pitch)
        .collect()
}

/// Roman numeral label: upper case for major, lower for minor, `°` for
/// diminished.
pub fn roman_numeral(degree: ScaleDegree) -> String {
    const NUMERALS: [&str; DEGREE_COUNT] = ["I", "II", "III", "IV", "V", "VI", "VII"];
    let degree = normalize_degree(degree);
    let numeral = NUMERALS[degree as usize - 1];
    match ChordQuality::of_degree(degree) {
        ChordQuality::Major => numeral.to_string(),
        ChordQuality::Minor => numeral.to_lowercase(),
        ChordQuality::Diminished => format!("{}°", numeral.to_lowercase()),
    }
}

/// Letter name of a degree in C major.
pub fn degree_to_note_name(degree: ScaleDegree) -> &'static str {
    match normalize_degree(degree) {
        1 => "C",
        2 => "D",
        3 => "E",
        4 => "F",
        5 => "G",
        6 => "A",
        _ => "B",
    }
}

/// Split a note name into (diatonic index, accidental, octave).
fn parse_note_name(name: &str) -> Option<(usize, i32, Option<i32>)> {
    let mut chars = name.trim().chars().peekable();
    let letter = chars.next()?.to_ascii_uppercase();
    let index = DIATONIC_OFFSETS.iter().position(|&(l, _)| l == letter)?;

    let accidental = match chars.peek() {
        Some('#') => {
            chars.next();
            1
        }
        Some('b') => {
            chars.next();
            -1
        }
        _ => 0,
    };

    let rest: String = chars.collect();
    let octave = if rest.is_empty() {
        None
    } else {
        Some(rest.parse::<i32>().ok()?)
    };
    Some((index, accidental, octave))
}

/// Degree (1-7) named by a note's letter in C major. Accidentals are
/// ignored: `"F#"` is degree 4.
pub fn note_name_to_degree(name: &str) -> Option<ScaleDegree> {
    parse_note_name(name).map(|(index, _, _)| index as ScaleDegree + 1)
}

/// Pitch of a note name such as `"C"`, `"F#3"` or `"Bb5"`. Octave 4 is the
/// middle-C octave and is assumed when omitted.
pub fn note_name_to_pitch(name: &str) -> Option<Pitch> {
    let (index, accidental, octave) = parse_note_name(name)?;
    let octave = octave.unwrap_or(DEFAULT_OCTAVE);
    Some((octave + 1) * 12 + DIATONIC_OFFSETS[index].1 + accidental)
}

/// Sharp-spelled name with octave, e.g. `61` → `"C#4"`.
pub fn pitch_to_note_name(pitch: Pitch) -> String {
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", SHARP_NAMES[pitch_class(pitch) as usize], octave)
}
