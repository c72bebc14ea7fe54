// Per-session anti-repetition memory.
//
// A practice session owns one `SessionMemory` and lends it mutably to every
// `generate_progression` call. The generator consults the rolling signature
// history to avoid handing out a progression the player just heard, and
// records each accepted progression here.
//
// The per-degree usage counters are bookkeeping only: degree selection in
// progression.rs stays uniform and never reads them.
//
// Serializable so a persistence layer can carry history across sessions;
// nothing in this crate stores it.

use crate::harmony::{DEGREE_COUNT, GenerationParams, ScaleDegree, is_valid_degree};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rolling record of recently generated progressions.
///
/// Invariant: `history.len() <= capacity` after every public method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMemory {
    history: VecDeque<String>,
    capacity: usize,
    usage: [u32; DEGREE_COUNT],
}

impl SessionMemory {
    /// Empty memory remembering at most `capacity` signatures.
    pub fn with_capacity(capacity: usize) -> Self {
        SessionMemory {
            history: VecDeque::with_capacity(capacity),
            capacity,
            usage: [0; DEGREE_COUNT],
        }
    }

    /// Empty memory sized from the generator parameters.
    pub fn for_params(params: &GenerationParams) -> Self {
        SessionMemory::with_capacity(params.history_size)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Whether `signature` is among the remembered progressions.
    pub fn contains(&self, signature: &str) -> bool {
        self.history.iter().any(|s| s == signature)
    }

    /// Remembered signatures, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// How many times `degree` has appeared in accepted progressions.
    pub fn usage(&self, degree: ScaleDegree) -> u32 {
        if is_valid_degree(degree) {
            self.usage[degree as usize - 1]
        } else {
            0
        }
    }

    /// Remember an accepted progression, evicting the oldest signature when
    /// over capacity, and bump usage counts for its degrees.
    pub fn record(&mut self, signature: String, degrees: &[ScaleDegree]) {
        self.history.push_back(signature);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        for &degree in degrees {
            if is_valid_degree(degree) {
                self.usage[degree as usize - 1] += 1;
            }
        }
    }

    /// Forget everything, keeping the capacity.
    pub fn clear(&mut self) {
        self.history.clear();
        self.usage = [0; DEGREE_COUNT];
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        SessionMemory::for_params(&GenerationParams::default())
    }
}
