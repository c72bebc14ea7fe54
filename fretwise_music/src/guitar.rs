// Guitar voicing search.
//
// Turns an abstract chord (a pitch set plus its root) into something a
// guitarist could actually fret. The search:
//
// 1. Reduces the chord to root-relative intervals (`IntervalSet`).
// 2. For each allowed root string (context-dependent), places the root at its
//    lowest fret on that string that is not below the playable floor.
// 3. Builds, for every other string, the candidate list: each fret within
//    `[root_fret, root_fret + span]` that sounds a chord tone, plus muted.
//    Resource shapes mute every string below the root string.
// 4. Walks all combinations depth-first (six levels, one per string) and
//    scores each complete shape with `score_shape`, keeping the best shape
//    that sounds at least three strings and three distinct pitches.
//
// The scoring weights are tuned by ear, not derived. They live in
// `GuitarWeights` with named fields so a change is visible as a behavioral
// change; the reference-output tests below pin the current tuning.
//
// If no shape qualifies, `open_voicing` stacks the chord tones upward from
// the root instead. Resource output is finally transposed by octaves into a
// fixed chart register.

use crate::fretboard::{
    FretChoice, STANDARD_TUNING, STRING_COUNT, VoicingContext, VoicingShape, lowest_root_fret,
    min_playable_pitch,
};
use crate::interval::IntervalSet;
use crate::pitch::{Pitch, REFERENCE_PITCH, pitch_class};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Fewest sounding strings (and distinct pitches) a shape must have.
pub const MIN_SOUNDING_STRINGS: usize = 3;

/// Roots below this are "low" for the open voicing: close intervals get
/// lifted an octave so the bottom does not turn to mud.
pub const LOW_ROOT_THRESHOLD: Pitch = 48;

/// Smallest gap between adjacent notes of the open voicing.
pub const MIN_OPEN_GAP: Pitch = 3;

/// Resource charts keep every note within this register.
pub const RESOURCE_FLOOR: Pitch = 45;
pub const RESOURCE_CEILING: Pitch = 84;

/// Scoring weights for candidate shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuitarWeights {
    /// Per distinct chord tone covered.
    pub chord_tone: f64,
    /// Per sounding string.
    pub sounding_string: f64,
    /// Lowest sounding note is the root.
    pub root_in_bass: f64,
    /// Chord's third is covered.
    pub third_present: f64,
    /// Chord has a third and the shape drops it.
    pub third_missing: f64,
    /// Perfect fifth covered.
    pub perfect_fifth: f64,
    /// Diminished/augmented fifth covered (it defines the quality).
    pub altered_fifth: f64,
    /// Seventh covered.
    pub seventh: f64,
    /// Applied once when the stopped-fret span exceeds `wide_span_limit`.
    pub wide_span: f64,
    pub wide_span_limit: u8,
    /// Per fret of the highest fret used.
    pub fret_height: f64,
    /// Per open string.
    pub open_string: f64,
    /// Resource context: per required 9th/11th-family tone left out.
    pub missing_extension: f64,
}

impl Default for GuitarWeights {
    fn default() -> Self {
        GuitarWeights {
            chord_tone: 10.0,
            sounding_string: 1.0,
            root_in_bass: 6.0,
            third_present: 4.0,
            third_missing: -12.0,
            perfect_fifth: 2.0,
            altered_fifth: 3.0,
            seventh: 3.0,
            wide_span: -10.0,
            wide_span_limit: 4,
            fret_height: -0.25,
            open_string: 0.5,
            missing_extension: -8.0,
        }
    }
}

/// A winning shape with the data needed to explain it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredShape {
    pub shape: VoicingShape,
    pub root_string: usize,
    pub root_fret: u8,
    pub score: f64,
}

impl ScoredShape {
    /// Distinct sounding pitches, ascending.
    pub fn pitches(&self) -> Vec<Pitch> {
        self.shape.sounding_pitches(&STANDARD_TUNING)
    }
}

/// Voice a chord for guitar with the default weights.
///
/// `root_pitch` defaults to the lowest input pitch. Always returns an
/// ascending, duplicate-free, non-empty list.
pub fn voice_guitar_chord(
    pitches: &[Pitch],
    root_pitch: Option<Pitch>,
    context: VoicingContext,
) -> Vec<Pitch> {
    voice_guitar_chord_with(pitches, root_pitch, context, &GuitarWeights::default())
}

/// Voice a chord for guitar with explicit weights.
pub fn voice_guitar_chord_with(
    pitches: &[Pitch],
    root_pitch: Option<Pitch>,
    context: VoicingContext,
    weights: &GuitarWeights,
) -> Vec<Pitch> {
    let root = resolve_root(pitches, root_pitch);

    let mut voiced = match find_guitar_shape(pitches, Some(root), context, weights) {
        Some(best) => {
            trace!(
                "{context} shape {} on string {} scored {:.2}",
                best.shape, best.root_string, best.score
            );
            best.pitches()
        }
        None => {
            debug!("no playable {context} shape for root {root}; using open voicing");
            let chord = IntervalSet::from_chord(pitches, pitch_class(root));
            let floor = min_playable_pitch(pitch_class(root), STANDARD_TUNING[0]);
            open_voicing(lift_to_floor(root, floor), &chord)
        }
    };

    if context == VoicingContext::Resource {
        fit_register(&mut voiced, RESOURCE_FLOOR, RESOURCE_CEILING);
    }
    voiced
}

/// Search every allowed root string for the best-scoring playable shape.
pub fn find_guitar_shape(
    pitches: &[Pitch],
    root_pitch: Option<Pitch>,
    context: VoicingContext,
    weights: &GuitarWeights,
) -> Option<ScoredShape> {
    let root = resolve_root(pitches, root_pitch);
    let root_pc = pitch_class(root);
    let chord = IntervalSet::from_chord(pitches, root_pc);
    let floor = min_playable_pitch(root_pc, STANDARD_TUNING[0]);

    let mut best: Option<ScoredShape> = None;

    for &root_string in context.root_strings() {
        let Some(root_fret) = lowest_root_fret(&STANDARD_TUNING, root_string, root_pc, floor) else {
            continue;
        };
        let candidates = string_candidates(root_string, root_fret, root_pc, &chord, context);

        let mut current = VoicingShape::muted();
        enumerate_shapes(&candidates, 0, &mut current, &mut |shape| {
            if !qualifies(shape) {
                return;
            }
            let score = score_shape(shape, root_pc, &chord, context, weights);
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(ScoredShape {
                    shape: *shape,
                    root_string,
                    root_fret,
                    score,
                });
            }
        });
    }

    best
}

/// Per-string choices for one root placement.
fn string_candidates(
    root_string: usize,
    root_fret: u8,
    root_pc: u8,
    chord: &IntervalSet,
    context: VoicingContext,
) -> [Vec<FretChoice>; STRING_COUNT] {
    let span = context.max_span();
    std::array::from_fn(|string| {
        if string == root_string {
            return vec![FretChoice::Fretted(root_fret)];
        }
        let mut choices = vec![FretChoice::Muted];
        if context == VoicingContext::Resource && string < root_string {
            return choices;
        }
        let open = STANDARD_TUNING[string];
        for fret in root_fret..=root_fret + span {
            let interval = IntervalSet::offset(open + fret as Pitch, root_pc);
            if chord.contains(interval) {
                choices.push(FretChoice::Fretted(fret));
            }
        }
        choices
    })
}

/// Depth-first walk over every combination of per-string choices.
fn enumerate_shapes(
    candidates: &[Vec<FretChoice>; STRING_COUNT],
    level: usize,
    current: &mut VoicingShape,
    visit: &mut impl FnMut(&VoicingShape),
) {
    if level == STRING_COUNT {
        visit(current);
        return;
    }
    for &choice in &candidates[level] {
        current.frets[level] = choice;
        enumerate_shapes(candidates, level + 1, current, visit);
    }
}

fn qualifies(shape: &VoicingShape) -> bool {
    shape.sounding_count() >= MIN_SOUNDING_STRINGS
        && shape.sounding_pitches(&STANDARD_TUNING).len() >= MIN_SOUNDING_STRINGS
}

/// Heuristic quality of a complete shape. Pure; higher is better.
pub fn score_shape(
    shape: &VoicingShape,
    root_pc: u8,
    chord: &IntervalSet,
    context: VoicingContext,
    weights: &GuitarWeights,
) -> f64 {
    let sounding = shape.sounding(&STANDARD_TUNING);
    if sounding.is_empty() {
        return f64::NEG_INFINITY;
    }
    let covered = IntervalSet::from_chord(
        &sounding.iter().map(|&(_, p)| p).collect::<Vec<_>>(),
        root_pc,
    );

    let mut score = 0.0;

    let tones_covered = covered.iter().filter(|&iv| chord.contains(iv)).count();
    score += weights.chord_tone * tones_covered as f64;
    score += weights.sounding_string * sounding.len() as f64;

    let lowest = sounding.iter().map(|&(_, p)| p).min().unwrap_or(0);
    if pitch_class(lowest) == root_pc {
        score += weights.root_in_bass;
    }

    if let Some(third) = chord.third() {
        if covered.contains(third) {
            score += weights.third_present;
        } else {
            score += weights.third_missing;
        }
    }

    if let Some(fifth) = chord.fifth().filter(|&iv| covered.contains(iv)) {
        score += if fifth == 7 {
            weights.perfect_fifth
        } else {
            weights.altered_fifth
        };
    }

    if chord.seventh().is_some_and(|iv| covered.contains(iv)) {
        score += weights.seventh;
    }

    if shape.fret_span() > weights.wide_span_limit {
        score += weights.wide_span;
    }
    score += weights.fret_height * shape.max_fret() as f64;
    score += weights.open_string * shape.open_count() as f64;

    if context == VoicingContext::Resource {
        let missing = chord
            .extensions()
            .into_iter()
            .filter(|&iv| !covered.contains(iv))
            .count();
        score += weights.missing_extension * missing as f64;
    }

    score
}

/// Chord tones stacked upward from `root`, used when no fretted shape
/// qualifies.
///
/// Adjacent notes stay at least `MIN_OPEN_GAP` apart; with a low root, tones
/// up to a fifth are lifted an octave. An upper-octave root, and fifth when
/// the chord has one, cap the stack.
pub fn open_voicing(root: Pitch, chord: &IntervalSet) -> Vec<Pitch> {
    let low_root = root < LOW_ROOT_THRESHOLD;
    let mut notes = vec![root];
    let mut previous = root;

    for interval in chord.iter().filter(|&iv| iv != 0) {
        let mut pitch = root + interval as Pitch;
        if low_root && interval <= 7 {
            pitch += 12;
        }
        while pitch - previous < MIN_OPEN_GAP {
            pitch += 12;
        }
        notes.push(pitch);
        previous = pitch;
    }

    notes.push(root + 12);
    if chord.contains(7) {
        notes.push(root + 19);
    }

    notes.sort_unstable();
    notes.dedup();
    notes
}

/// Transpose `pitches` by whole octaves, as a block, toward
/// `[floor, ceiling]`. A set wider than the window ends with its lowest note
/// at or just above the floor.
pub fn fit_register(pitches: &mut [Pitch], floor: Pitch, ceiling: Pitch) {
    let (Some(&low), Some(&high)) = (pitches.iter().min(), pitches.iter().max()) else {
        return;
    };
    let mut shift = 0;
    while low + shift < floor {
        shift += 12;
    }
    while high + shift > ceiling && low + shift - 12 >= floor {
        shift -= 12;
    }
    for p in pitches.iter_mut() {
        *p += shift;
    }
}

fn resolve_root(pitches: &[Pitch], root_pitch: Option<Pitch>) -> Pitch {
    root_pitch
        .or_else(|| pitches.iter().copied().min())
        .unwrap_or(REFERENCE_PITCH)
}

fn lift_to_floor(mut pitch: Pitch, floor: Pitch) -> Pitch {
    while pitch < floor {
        pitch += 12;
    }
    pitch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::degree_to_pitch_chord;
    use FretChoice::{Fretted, Muted};

    fn pitch_classes(pitches: &[Pitch]) -> Vec<u8> {
        let mut pcs: Vec<u8> = pitches.iter().map(|&p| pitch_class(p)).collect();
        pcs.sort_unstable();
        pcs.dedup();
        pcs
    }

    #[test]
    fn diatonic_triads_voice_cleanly() {
        for context in [VoicingContext::Trainer, VoicingContext::Resource] {
            for degree in 1..=7 {
                let chord = degree_to_pitch_chord(degree);
                let voiced = voice_guitar_chord(&chord, Some(chord[0]), context);
                assert!(voiced.len() >= 3, "{context} degree {degree}: {voiced:?}");
                assert!(voiced.windows(2).all(|w| w[0] < w[1]), "not ascending: {voiced:?}");
                let allowed = pitch_classes(&chord);
                for pc in pitch_classes(&voiced) {
                    assert!(allowed.contains(&pc), "{context} degree {degree}: stray pc {pc}");
                }
                assert!(pitch_classes(&voiced).contains(&pitch_class(chord[0])));
            }
        }
    }

    #[test]
    fn shapes_respect_context_span() {
        for context in [VoicingContext::Trainer, VoicingContext::Resource] {
            for degree in 1..=7 {
                let chord = degree_to_pitch_chord(degree);
                let best = find_guitar_shape(&chord, Some(chord[0]), context, &GuitarWeights::default())
                    .expect("diatonic triads always have a shape");
                assert!(
                    best.shape.fret_span() <= context.max_span(),
                    "{context} degree {degree}: {}",
                    best.shape
                );
                assert!(context.root_strings().contains(&best.root_string));
            }
        }
    }

    #[test]
    fn trainer_e_major_is_the_open_chord() {
        // E G# B rooted on E2: the open E shape covers everything with the
        // most strings and open-string bonuses.
        let best = find_guitar_shape(&[40, 44, 47], Some(40), VoicingContext::Trainer, &GuitarWeights::default())
            .unwrap();
        assert_eq!(best.root_string, 0);
        assert_eq!(best.root_fret, 0);
        assert_eq!(
            best.shape.frets,
            [Fretted(0), Fretted(2), Fretted(2), Fretted(1), Fretted(0), Fretted(0)]
        );
        assert_eq!(best.pitches(), vec![40, 47, 52, 56, 59, 64]);
    }

    #[test]
    fn resource_mutes_strings_below_root() {
        let chord = degree_to_pitch_chord(1);
        let best = find_guitar_shape(&chord, Some(60), VoicingContext::Resource, &GuitarWeights::default())
            .unwrap();
        for string in 0..best.root_string {
            assert_eq!(best.shape.frets[string], Muted, "{}", best.shape);
        }
    }

    #[test]
    fn score_rewards_the_third() {
        let chord = IntervalSet::from_chord(&[40, 44, 47], 4);
        let weights = GuitarWeights::default();
        let with_third = VoicingShape {
            frets: [Fretted(0), Fretted(2), Fretted(2), Fretted(1), Muted, Muted],
        };
        let without_third = VoicingShape {
            frets: [Fretted(0), Fretted(2), Fretted(2), Muted, Muted, Muted],
        };
        let a = score_shape(&with_third, 4, &chord, VoicingContext::Trainer, &weights);
        let b = score_shape(&without_third, 4, &chord, VoicingContext::Trainer, &weights);
        // Third tone (+10), third bonus vs penalty (+16), one more string (+1).
        assert!((a - b - 27.0).abs() < 1e-9, "a={a} b={b}");
    }

    #[test]
    fn resource_penalizes_missing_ninth() {
        let chord = IntervalSet::from_chord(&[48, 52, 55, 62], 0);
        let shape = VoicingShape {
            frets: [Muted, Fretted(3), Fretted(2), Fretted(0), Fretted(1), Fretted(0)],
        };
        let weights = GuitarWeights::default();
        let trainer = score_shape(&shape, 0, &chord, VoicingContext::Trainer, &weights);
        let resource = score_shape(&shape, 0, &chord, VoicingContext::Resource, &weights);
        assert!((trainer - resource + weights.missing_extension).abs() < 1e-9);
    }

    #[test]
    fn open_voicing_spreads_low_roots() {
        let chord = IntervalSet::from_chord(&[40, 44, 47], 4);
        assert_eq!(open_voicing(40, &chord), vec![40, 52, 56, 59]);

        let high = IntervalSet::from_chord(&[60, 64, 67], 0);
        assert_eq!(open_voicing(60, &high), vec![60, 64, 67, 72, 79]);
    }

    #[test]
    fn open_voicing_keeps_minimum_gap() {
        // C add9 crowd: C D E G.
        let chord = IntervalSet::from_chord(&[60, 62, 64, 67], 0);
        // D and E each climb an octave to clear the note below them.
        assert_eq!(open_voicing(60, &chord), vec![60, 72, 74, 79, 88, 91]);
    }

    #[test]
    fn register_fitting_moves_as_a_block() {
        let mut low = vec![30, 34, 37];
        fit_register(&mut low, 45, 84);
        assert_eq!(low, vec![54, 58, 61]);

        let mut high = vec![80, 90, 95];
        fit_register(&mut high, 45, 84);
        assert_eq!(high, vec![68, 78, 83]);

        let mut empty: Vec<Pitch> = Vec::new();
        fit_register(&mut empty, 45, 84);
        assert!(empty.is_empty());
    }

    #[test]
    fn empty_input_still_sounds() {
        let voiced = voice_guitar_chord(&[], None, VoicingContext::Trainer);
        assert!(!voiced.is_empty());
        assert!(voiced.iter().all(|&p| pitch_class(p) == 0));
    }

    #[test]
    fn resource_output_stays_in_chart_register() {
        for degree in 1..=7 {
            let chord = degree_to_pitch_chord(degree);
            let voiced = voice_guitar_chord(&chord, Some(chord[0]), VoicingContext::Resource);
            let low = *voiced.first().unwrap();
            let high = *voiced.last().unwrap();
            assert!(low >= RESOURCE_FLOOR && high <= RESOURCE_CEILING, "{voiced:?}");
        }
    }
}
