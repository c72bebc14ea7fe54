// Functional-harmony rule table.
//
// Static, read-only data that drives progression generation: which scale
// degrees belong to each harmonic function, which cadences close a phrase at
// each difficulty, the per-difficulty function templates, and the tuning
// parameters of the generator (history size, retry budget, probabilities).
//
// Everything here is plain data. `HarmonyRules::default()` is the built-in
// table the game ships with; `config.rs` can replace it wholesale or in part
// from JSON. progression.rs is the only consumer that interprets the data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Diatonic scale degree, 1 (tonic) through 7 (leading tone).
pub type ScaleDegree = u8;

/// Number of diatonic scale degrees.
pub const DEGREE_COUNT: usize = 7;

/// True if `degree` names a diatonic scale degree.
pub fn is_valid_degree(degree: ScaleDegree) -> bool {
    (1..=DEGREE_COUNT as u8).contains(&degree)
}

/// How hard a practice round is. Controls progression length, template
/// complexity and which cadences may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Harmonic role of a chord within a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordFunction {
    /// Rest/arrival: I, vi, iii.
    Tonic,
    /// Motion away from the tonic: ii, IV.
    Predominant,
    /// Tension that wants to resolve home: V, vii°.
    Dominant,
}

/// Scale degrees available to each chord function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionPools {
    pub tonic: Vec<ScaleDegree>,
    pub predominant: Vec<ScaleDegree>,
    pub dominant: Vec<ScaleDegree>,
}

impl FunctionPools {
    pub fn get(&self, function: ChordFunction) -> &[ScaleDegree] {
        match function {
            ChordFunction::Tonic => &self.tonic,
            ChordFunction::Predominant => &self.predominant,
            ChordFunction::Dominant => &self.dominant,
        }
    }

    /// The function whose pool contains `degree`, checked tonic first.
    pub fn function_of(&self, degree: ScaleDegree) -> Option<ChordFunction> {
        [
            ChordFunction::Tonic,
            ChordFunction::Predominant,
            ChordFunction::Dominant,
        ]
        .into_iter()
        .find(|&function| self.get(function).contains(&degree))
    }

    pub fn is_predominant(&self, degree: ScaleDegree) -> bool {
        self.predominant.contains(&degree)
    }

    pub fn is_dominant(&self, degree: ScaleDegree) -> bool {
        self.dominant.contains(&degree)
    }
}

impl Default for FunctionPools {
    fn default() -> Self {
        FunctionPools {
            tonic: vec![1, 6, 3],
            predominant: vec![2, 4],
            dominant: vec![5, 7],
        }
    }
}

/// Shape of a progression at one difficulty.
///
/// Defaults differ per difficulty, so a template named in a config file must
/// give every field; it replaces the built-in template as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTemplate {
    /// Shortest draft length (before the cadence is spliced in).
    pub min_length: usize,
    /// Longest draft length.
    pub max_length: usize,
    /// Function order walked by the generator; continued by forced logic
    /// once exhausted.
    pub functions: Vec<ChordFunction>,
    /// Whether a step may repeat the previous function in place.
    pub allow_repeats: bool,
    /// Whether the deceptive cadence may close the phrase.
    pub allow_deceptive: bool,
}

/// Per-difficulty templates. Difficulties left out of a config keep their
/// built-in template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTemplates {
    pub easy: DifficultyTemplate,
    pub medium: DifficultyTemplate,
    pub hard: DifficultyTemplate,
}

impl DifficultyTemplates {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyTemplate {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

impl Default for DifficultyTemplates {
    fn default() -> Self {
        use ChordFunction::{Dominant as D, Predominant as PD, Tonic as T};
        DifficultyTemplates {
            easy: DifficultyTemplate {
                min_length: 3,
                max_length: 4,
                functions: vec![T, PD, D, T],
                allow_repeats: false,
                allow_deceptive: false,
            },
            medium: DifficultyTemplate {
                min_length: 4,
                max_length: 6,
                functions: vec![T, PD, D, T, PD, D],
                allow_repeats: true,
                allow_deceptive: true,
            },
            hard: DifficultyTemplate {
                min_length: 5,
                max_length: 8,
                functions: vec![T, T, PD, PD, D, T, PD, D],
                allow_repeats: true,
                allow_deceptive: true,
            },
        }
    }
}

/// Kinds of phrase endings in the cadence catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceKind {
    /// V → I.
    Authentic,
    /// V → vi.
    Deceptive,
    /// Ends on V.
    Half,
}

/// One catalogued cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceRule {
    pub kind: CadenceKind,
    pub degrees: Vec<ScaleDegree>,
    pub difficulties: Vec<Difficulty>,
}

impl CadenceRule {
    pub fn allows(&self, difficulty: Difficulty) -> bool {
        self.difficulties.contains(&difficulty)
    }
}

/// Tuning knobs of the progression generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Number of recent progression signatures remembered per session.
    pub history_size: usize,
    /// Candidates built per call before giving up on novelty.
    pub max_attempts: usize,
    /// Chance that a step repeats the previous function (repeat-enabled
    /// difficulties only).
    pub repeat_probability: f64,
    /// Chance of closing with the deceptive cadence when allowed.
    pub deceptive_probability: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            history_size: 8,
            max_attempts: 12,
            repeat_probability: 0.35,
            deceptive_probability: 0.30,
        }
    }
}

/// The complete rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyRules {
    pub pools: FunctionPools,
    pub cadences: Vec<CadenceRule>,
    pub templates: DifficultyTemplates,
    pub params: GenerationParams,
}

impl HarmonyRules {
    pub fn pool(&self, function: ChordFunction) -> &[ScaleDegree] {
        self.pools.get(function)
    }

    pub fn template(&self, difficulty: Difficulty) -> &DifficultyTemplate {
        self.templates.get(difficulty)
    }

    /// First catalogued cadence of the given kind.
    pub fn cadence(&self, kind: CadenceKind) -> Option<&CadenceRule> {
        self.cadences.iter().find(|c| c.kind == kind)
    }

    /// All cadences usable at `difficulty`.
    pub fn cadences_for(&self, difficulty: Difficulty) -> impl Iterator<Item = &CadenceRule> {
        self.cadences.iter().filter(move |c| c.allows(difficulty))
    }

    pub fn function_of(&self, degree: ScaleDegree) -> Option<ChordFunction> {
        self.pools.function_of(degree)
    }
}

impl Default for HarmonyRules {
    fn default() -> Self {
        use Difficulty::{Easy, Hard, Medium};
        HarmonyRules {
            pools: FunctionPools::default(),
            cadences: vec![
                CadenceRule {
                    kind: CadenceKind::Authentic,
                    degrees: vec![5, 1],
                    difficulties: vec![Easy, Medium, Hard],
                },
                CadenceRule {
                    kind: CadenceKind::Deceptive,
                    degrees: vec![5, 6],
                    difficulties: vec![Medium, Hard],
                },
                CadenceRule {
                    kind: CadenceKind::Half,
                    degrees: vec![1, 5],
                    difficulties: vec![Medium, Hard],
                },
            ],
            templates: DifficultyTemplates::default(),
            params: GenerationParams::default(),
        }
    }
}
