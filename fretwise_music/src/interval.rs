// Root-relative interval sets.
//
// Both voicing builders reason about a chord as "which semitone offsets above
// the root does it contain", independent of octave. `IntervalSet` is that
// view: a 12-slot membership table with accessors for the chord members the
// voicing heuristics care about.

use crate::pitch::{Pitch, pitch_class};

/// Root-relative pitch classes present in a chord. Always contains 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSet {
    present: [bool; 12],
}

impl IntervalSet {
    /// Intervals of `pitches` above `root_pc`, plus the root itself.
    pub fn from_chord(pitches: &[Pitch], root_pc: u8) -> Self {
        let mut present = [false; 12];
        present[0] = true;
        for &p in pitches {
            present[Self::offset(p, root_pc) as usize] = true;
        }
        IntervalSet { present }
    }

    /// Interval of `pitch` above `root_pc`, in 0..12.
    pub fn offset(pitch: Pitch, root_pc: u8) -> u8 {
        (pitch_class(pitch) + 12 - root_pc % 12) % 12
    }

    pub fn contains(&self, interval: u8) -> bool {
        self.present[(interval % 12) as usize]
    }

    /// Present intervals, ascending.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..12u8).filter(move |&iv| self.present[iv as usize])
    }

    /// Major third if present, else minor third.
    pub fn third(&self) -> Option<u8> {
        [4, 3].into_iter().find(|&iv| self.contains(iv))
    }

    /// Perfect fifth, else diminished, else augmented.
    pub fn fifth(&self) -> Option<u8> {
        [7, 6, 8].into_iter().find(|&iv| self.contains(iv))
    }

    /// Minor seventh, else major seventh.
    pub fn seventh(&self) -> Option<u8> {
        [10, 11].into_iter().find(|&iv| self.contains(iv))
    }

    /// Ninth- and eleventh-family tones the chord asks for: 9, b9, 11, and
    /// #11 (tritone alongside a perfect fifth, so it is not the fifth of a
    /// diminished chord).
    pub fn extensions(&self) -> Vec<u8> {
        let mut out: Vec<u8> = [2, 1, 5].into_iter().filter(|&iv| self.contains(iv)).collect();
        if self.contains(6) && self.contains(7) {
            out.push(6);
        }
        out
    }

    /// Highest-priority extension, if any.
    pub fn extension(&self) -> Option<u8> {
        self.extensions().first().copied()
    }
}
