// Fretboard geometry shared by the guitar and bass voicing builders.
//
// A guitar shape is six per-string choices (muted or a fret number) on a
// standard-tuned neck, lowest string first. This module owns the tuning, the
// shape type and its derived measurements (sounding pitches, fret span, tab
// notation), and the playable-floor rule including the drop-D exception.
//
// `VoicingContext` also lives here: it selects between the ear-trainer
// register and the chord-resource (reference chart) register and carries the
// context-dependent search limits.

use crate::pitch::{Pitch, pitch_class};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strings on the guitar.
pub const STRING_COUNT: usize = 6;

/// Open-string pitches, low E to high E (E2 A2 D3 G3 B3 E4).
pub const STANDARD_TUNING: [Pitch; STRING_COUNT] = [40, 45, 50, 55, 59, 64];

/// Highest fret considered for placing the chord root.
pub const MAX_ROOT_FRET: u8 = 14;

/// How far below the normal floor a D root may go (drop-D tuning).
pub const DROP_D_ALLOWANCE: Pitch = 1;

const D_PITCH_CLASS: u8 = 2;

/// Where a voicing will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicingContext {
    /// In-game ear-training playback: low, full-bodied shapes.
    Trainer,
    /// Chord reference charts: compact mid-neck shapes in a fixed register.
    Resource,
}

impl VoicingContext {
    /// Strings allowed to carry the lowest (root) note of a guitar shape.
    pub fn root_strings(self) -> &'static [usize] {
        match self {
            VoicingContext::Trainer => &[0, 1, 2],
            VoicingContext::Resource => &[2, 3],
        }
    }

    /// Widest fret stretch above the root fret.
    pub fn max_span(self) -> u8 {
        match self {
            VoicingContext::Trainer => 4,
            VoicingContext::Resource => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VoicingContext::Trainer => "trainer",
            VoicingContext::Resource => "resource",
        }
    }
}

impl fmt::Display for VoicingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VoicingContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trainer" => Ok(VoicingContext::Trainer),
            "resource" => Ok(VoicingContext::Resource),
            other => Err(format!("unknown voicing context '{other}'")),
        }
    }
}

/// What one string does in a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FretChoice {
    Muted,
    Fretted(u8),
}

impl FretChoice {
    pub fn fret(self) -> Option<u8> {
        match self {
            FretChoice::Muted => None,
            FretChoice::Fretted(f) => Some(f),
        }
    }
}

/// A full six-string shape, lowest string first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoicingShape {
    pub frets: [FretChoice; STRING_COUNT],
}

impl VoicingShape {
    pub fn muted() -> Self {
        VoicingShape {
            frets: [FretChoice::Muted; STRING_COUNT],
        }
    }

    /// `(string, pitch)` for every sounding string, low string first.
    pub fn sounding(&self, tuning: &[Pitch; STRING_COUNT]) -> Vec<(usize, Pitch)> {
        self.frets
            .iter()
            .enumerate()
            .filter_map(|(string, choice)| {
                choice.fret().map(|f| (string, tuning[string] + f as Pitch))
            })
            .collect()
    }

    /// Distinct sounding pitches, ascending.
    pub fn sounding_pitches(&self, tuning: &[Pitch; STRING_COUNT]) -> Vec<Pitch> {
        let mut pitches: Vec<Pitch> = self.sounding(tuning).into_iter().map(|(_, p)| p).collect();
        pitches.sort_unstable();
        pitches.dedup();
        pitches
    }

    pub fn sounding_count(&self) -> usize {
        self.frets.iter().filter(|c| c.fret().is_some()).count()
    }

    pub fn open_count(&self) -> usize {
        self.frets
            .iter()
            .filter(|&&c| c == FretChoice::Fretted(0))
            .count()
    }

    /// Highest fret used, 0 for open/muted-only shapes.
    pub fn max_fret(&self) -> u8 {
        self.frets.iter().filter_map(|c| c.fret()).max().unwrap_or(0)
    }

    /// Stretch between the lowest and highest stopped (non-open) frets.
    pub fn fret_span(&self) -> u8 {
        let stopped = self.frets.iter().filter_map(|c| c.fret()).filter(|&f| f > 0);
        let (low, high) = stopped.fold((u8::MAX, 0u8), |(lo, hi), f| (lo.min(f), hi.max(f)));
        if high == 0 { 0 } else { high - low }
    }

    /// Tab notation, low string first: `x32010`. Frets of 10 and above
    /// switch the whole string to dash-separated form: `x-10-12-12-x-x`.
    pub fn tab(&self) -> String {
        let parts: Vec<String> = self
            .frets
            .iter()
            .map(|c| match c {
                FretChoice::Muted => "x".to_string(),
                FretChoice::Fretted(f) => f.to_string(),
            })
            .collect();
        if self.max_fret() >= 10 {
            parts.join("-")
        } else {
            parts.concat()
        }
    }
}

impl fmt::Display for VoicingShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tab())
    }
}

/// Lowest pitch of class `root_pc` at or above `floor`, where a D root may
/// reach `DROP_D_ALLOWANCE` semitones further down.
pub fn min_playable_pitch(root_pc: u8, floor: Pitch) -> Pitch {
    let floor = adjusted_floor(root_pc, floor);
    let up = (root_pc as Pitch - floor).rem_euclid(12);
    floor + up
}

/// The playable floor for a root, after the drop-D exception.
pub fn adjusted_floor(root_pc: u8, floor: Pitch) -> Pitch {
    if root_pc % 12 == D_PITCH_CLASS {
        floor - DROP_D_ALLOWANCE
    } else {
        floor
    }
}

/// Lowest fret (≤ `MAX_ROOT_FRET`) on `string` sounding class `root_pc` at
/// or above `min_pitch`.
pub fn lowest_root_fret(
    tuning: &[Pitch; STRING_COUNT],
    string: usize,
    root_pc: u8,
    min_pitch: Pitch,
) -> Option<u8> {
    let open = *tuning.get(string)?;
    (0..=MAX_ROOT_FRET).find(|&f| {
        let p = open + f as Pitch;
        pitch_class(p) == root_pc % 12 && p >= min_pitch
    })
}
