// Constrained-random chord progression generation.
//
// Produces a sequence of scale degrees for one ear-training round. A
// candidate is built in three passes:
//
// 1. Function draft: walk the difficulty's function template (tonic /
//    predominant / dominant), optionally repeating a function in place, and
//    continue with forced logic once the template runs out. Non-easy rounds
//    may not reach a dominant before some predominant has sounded.
// 2. Degree choice: each function step draws one degree uniformly from its
//    pool. Session usage counts are not consulted.
// 3. Cadence + repair: splice the chosen cadence over the tail, drop any
//    out-of-range degree, swap the first predominant ahead of the first
//    dominant if they ended up reversed, and fall back to I–V–I if nothing
//    survives.
//
// `generate_progression` retries candidate building until it finds one whose
// signature the session has not heard recently, then records it in the
// caller's `SessionMemory`. The function is total: it never panics on the
// built-in tables and always returns a non-empty, in-range sequence.

use crate::harmony::{
    CadenceKind, ChordFunction, Difficulty, DifficultyTemplate, HarmonyRules, ScaleDegree,
    is_valid_degree,
};
use crate::memory::SessionMemory;
use log::{debug, trace};
use rand::Rng;

/// Returned when nothing better can be produced.
pub const FALLBACK_PROGRESSION: [ScaleDegree; 3] = [1, 5, 1];

/// Used if a custom rule table lacks an authentic cadence.
const FALLBACK_CADENCE: [ScaleDegree; 2] = [5, 1];

/// Chance that the forced continuation repeats a tonic rather than drawing
/// tonic/predominant afresh.
const CONTINUE_REPEAT_PROBABILITY: f64 = 0.5;

/// Joined-degree key used for the session history, e.g. `"1-4-5-1"`.
pub fn signature(degrees: &[ScaleDegree]) -> String {
    degrees
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// Generate a progression the session has not heard recently.
///
/// Builds up to `max_attempts` candidates. The first whose signature is not
/// in `memory` is recorded and returned. If every candidate repeats recent
/// history, the last one is returned without being recorded.
pub fn generate_progression(
    difficulty: Difficulty,
    rules: &HarmonyRules,
    memory: &mut SessionMemory,
    rng: &mut impl Rng,
) -> Vec<ScaleDegree> {
    let mut last_candidate = None;

    for attempt in 0..rules.params.max_attempts {
        let candidate = build_candidate(difficulty, rules, rng);
        let sig = signature(&candidate);
        if !memory.contains(&sig) {
            trace!("{difficulty} progression {sig} accepted on attempt {}", attempt + 1);
            memory.record(sig, &candidate);
            return candidate;
        }
        last_candidate = Some(candidate);
    }

    match last_candidate {
        Some(candidate) => {
            debug!(
                "no unheard {difficulty} progression in {} attempts; repeating {}",
                rules.params.max_attempts,
                signature(&candidate)
            );
            candidate
        }
        None => {
            debug!("generation ran zero attempts; using fallback progression");
            FALLBACK_PROGRESSION.to_vec()
        }
    }
}

/// Build one candidate progression without consulting session memory.
pub fn build_candidate(
    difficulty: Difficulty,
    rules: &HarmonyRules,
    rng: &mut impl Rng,
) -> Vec<ScaleDegree> {
    let template = rules.template(difficulty);
    let (low, high) = if template.min_length <= template.max_length {
        (template.min_length, template.max_length)
    } else {
        (template.max_length, template.min_length)
    };
    let length = rng.random_range(low..=high);

    let functions = draft_functions(difficulty, template, rules.params.repeat_probability, length, rng);
    let mut degrees: Vec<ScaleDegree> = functions
        .iter()
        .map(|&function| pick_degree(rules.pool(function), rng))
        .collect();

    let cadence = choose_cadence(difficulty, template, rules, rng);
    splice_cadence(&mut degrees, cadence);

    repair(degrees, difficulty, rules)
}

/// Lay out the function of every step.
fn draft_functions(
    difficulty: Difficulty,
    template: &DifficultyTemplate,
    repeat_probability: f64,
    length: usize,
    rng: &mut impl Rng,
) -> Vec<ChordFunction> {
    let mut functions: Vec<ChordFunction> = Vec::with_capacity(length);
    let mut pointer = 0;
    let mut seen_predominant = false;

    for step in 0..length {
        let is_final = step + 1 == length;
        let previous = functions.last().copied();

        let mut function = match previous {
            Some(prev) if template.allow_repeats && chance(rng, repeat_probability) => prev,
            _ => {
                let next = match template.functions.get(pointer) {
                    Some(&f) => f,
                    None => continue_function(previous, rng),
                };
                pointer += 1;
                next
            }
        };

        if function == ChordFunction::Dominant && !seen_predominant && difficulty != Difficulty::Easy {
            function = if is_final {
                ChordFunction::Tonic
            } else {
                ChordFunction::Predominant
            };
        }

        if function == ChordFunction::Predominant {
            seen_predominant = true;
        }
        functions.push(function);
    }

    functions
}

/// Forced continuation once the template is exhausted.
fn continue_function(previous: Option<ChordFunction>, rng: &mut impl Rng) -> ChordFunction {
    match previous {
        Some(ChordFunction::Dominant) => ChordFunction::Tonic,
        Some(ChordFunction::Predominant) => ChordFunction::Dominant,
        Some(prev) if chance(rng, CONTINUE_REPEAT_PROBABILITY) => prev,
        _ => {
            if rng.random_bool(0.5) {
                ChordFunction::Tonic
            } else {
                ChordFunction::Predominant
            }
        }
    }
}

/// Uniform draw from a function pool. An empty pool yields the tonic.
fn pick_degree(pool: &[ScaleDegree], rng: &mut impl Rng) -> ScaleDegree {
    if pool.is_empty() {
        return 1;
    }
    pool[rng.random_range(0..pool.len())]
}

fn choose_cadence<'a>(
    difficulty: Difficulty,
    template: &DifficultyTemplate,
    rules: &'a HarmonyRules,
    rng: &mut impl Rng,
) -> &'a [ScaleDegree] {
    if template.allow_deceptive && chance(rng, rules.params.deceptive_probability) {
        if let Some(deceptive) = rules
            .cadence(CadenceKind::Deceptive)
            .filter(|c| c.allows(difficulty) && !c.degrees.is_empty())
        {
            return &deceptive.degrees;
        }
    }
    match rules.cadence(CadenceKind::Authentic) {
        Some(authentic) if !authentic.degrees.is_empty() => &authentic.degrees,
        _ => &FALLBACK_CADENCE,
    }
}

/// Overwrite the tail with `cadence`, or replace the whole draft if it is
/// shorter than the cadence.
fn splice_cadence(degrees: &mut Vec<ScaleDegree>, cadence: &[ScaleDegree]) {
    if degrees.len() < cadence.len() {
        *degrees = cadence.to_vec();
        return;
    }
    let start = degrees.len() - cadence.len();
    degrees[start..].copy_from_slice(cadence);
}

/// Final cleanup pass. Swaps at most one reversed predominant/dominant pair.
fn repair(
    mut degrees: Vec<ScaleDegree>,
    difficulty: Difficulty,
    rules: &HarmonyRules,
) -> Vec<ScaleDegree> {
    degrees.retain(|&d| is_valid_degree(d));

    if difficulty != Difficulty::Easy {
        let first_dominant = degrees.iter().position(|&d| rules.pools.is_dominant(d));
        let first_predominant = degrees.iter().position(|&d| rules.pools.is_predominant(d));
        match (first_dominant, first_predominant) {
            (Some(dominant), Some(predominant)) if predominant > dominant => {
                degrees.swap(dominant, predominant);
            }
            _ => {}
        }
    }

    if degrees.is_empty() {
        return FALLBACK_PROGRESSION.to_vec();
    }
    degrees
}

/// Bernoulli draw that tolerates out-of-range or NaN probabilities.
fn chance(rng: &mut impl Rng, p: f64) -> bool {
    rng.random::<f64>() < p
}

#[cfg(test)]
mod tests {
    use super::*;
    use fretwise_prng::SessionRng;

    fn first_index(degrees: &[ScaleDegree], pool: &[ScaleDegree]) -> Option<usize> {
        degrees.iter().position(|d| pool.contains(d))
    }

    #[test]
    fn signature_joins_with_dashes() {
        assert_eq!(signature(&[1, 4, 5, 1]), "1-4-5-1");
        assert_eq!(signature(&[]), "");
    }

    #[test]
    fn easy_always_ends_authentic() {
        let rules = HarmonyRules::default();
        for seed in 0..200 {
            let mut rng = SessionRng::new(seed);
            let degrees = build_candidate(Difficulty::Easy, &rules, &mut rng);
            assert_eq!(&degrees[degrees.len() - 2..], &[5, 1], "seed {seed}: {degrees:?}");
            assert!((3..=4).contains(&degrees.len()));
        }
    }

    #[test]
    fn candidates_stay_in_bounds() {
        let rules = HarmonyRules::default();
        for difficulty in Difficulty::ALL {
            let template = rules.template(difficulty);
            for seed in 0..300 {
                let mut rng = SessionRng::new(seed);
                let degrees = build_candidate(difficulty, &rules, &mut rng);
                assert!(
                    degrees.len() >= template.min_length && degrees.len() <= template.max_length,
                    "{difficulty} seed {seed}: {degrees:?}"
                );
                assert!(degrees.iter().all(|&d| is_valid_degree(d)));
            }
        }
    }

    #[test]
    fn predominant_leads_dominant_above_easy() {
        let rules = HarmonyRules::default();
        for difficulty in [Difficulty::Medium, Difficulty::Hard] {
            for seed in 0..500 {
                let mut rng = SessionRng::new(seed);
                let degrees = build_candidate(difficulty, &rules, &mut rng);
                let dominant = first_index(&degrees, &rules.pools.dominant);
                let predominant = first_index(&degrees, &rules.pools.predominant);
                if let (Some(d), Some(pd)) = (dominant, predominant) {
                    assert!(pd < d, "{difficulty} seed {seed}: {degrees:?}");
                }
            }
        }
    }

    #[test]
    fn deceptive_cadence_appears_when_allowed() {
        let rules = HarmonyRules::default();
        let mut deceptive = 0;
        for seed in 0..400 {
            let mut rng = SessionRng::new(seed);
            let degrees = build_candidate(Difficulty::Hard, &rules, &mut rng);
            let tail = &degrees[degrees.len() - 2..];
            assert!(tail == [5, 1] || tail == [5, 6], "seed {seed}: {degrees:?}");
            if tail == [5, 6] {
                deceptive += 1;
            }
        }
        // Expected ~30% of 400.
        assert!((60..=180).contains(&deceptive), "deceptive count {deceptive}");
    }

    #[test]
    fn splice_replaces_short_drafts() {
        let mut short = vec![3];
        splice_cadence(&mut short, &[5, 1]);
        assert_eq!(short, vec![5, 1]);

        let mut long = vec![1, 4, 2, 6];
        splice_cadence(&mut long, &[5, 1]);
        assert_eq!(long, vec![1, 4, 5, 1]);
    }

    #[test]
    fn repair_swaps_one_reversed_pair() {
        let rules = HarmonyRules::default();
        let fixed = repair(vec![1, 5, 6, 4, 5, 1], Difficulty::Medium, &rules);
        assert_eq!(fixed, vec![1, 4, 6, 5, 5, 1]);

        // Easy rounds are left alone.
        let untouched = repair(vec![1, 5, 4, 1], Difficulty::Easy, &rules);
        assert_eq!(untouched, vec![1, 5, 4, 1]);
    }

    #[test]
    fn repair_filters_and_falls_back() {
        let rules = HarmonyRules::default();
        assert_eq!(repair(vec![0, 1, 9, 5, 1], Difficulty::Easy, &rules), vec![1, 5, 1]);
        assert_eq!(repair(vec![0, 8], Difficulty::Hard, &rules), FALLBACK_PROGRESSION.to_vec());
    }

    #[test]
    fn generation_records_into_memory() {
        let rules = HarmonyRules::default();
        let mut memory = SessionMemory::for_params(&rules.params);
        let mut rng = SessionRng::new(11);
        let degrees = generate_progression(Difficulty::Medium, &rules, &mut memory, &mut rng);
        assert_eq!(memory.len(), 1);
        assert!(memory.contains(&signature(&degrees)));
        let counted: u32 = (1..=7).map(|d| memory.usage(d)).sum();
        assert_eq!(counted as usize, degrees.len());
    }

    #[test]
    fn consecutive_calls_avoid_recent_history() {
        let rules = HarmonyRules::default();
        let mut memory = SessionMemory::for_params(&rules.params);
        let mut rng = SessionRng::new(2024);
        let mut seen = Vec::new();
        for _ in 0..4 {
            let degrees = generate_progression(Difficulty::Hard, &rules, &mut memory, &mut rng);
            let sig = signature(&degrees);
            assert!(!seen.contains(&sig), "hard progressions repeated: {sig}");
            seen.push(sig);
        }
    }

    #[test]
    fn zero_attempts_returns_fallback() {
        let mut rules = HarmonyRules::default();
        rules.params.max_attempts = 0;
        let mut memory = SessionMemory::default();
        let mut rng = SessionRng::new(1);
        let degrees = generate_progression(Difficulty::Easy, &rules, &mut memory, &mut rng);
        assert_eq!(degrees, FALLBACK_PROGRESSION.to_vec());
        assert!(memory.is_empty());
    }

    #[test]
    fn missing_authentic_cadence_uses_builtin() {
        let mut rules = HarmonyRules::default();
        rules.cadences.clear();
        let mut rng = SessionRng::new(5);
        let degrees = build_candidate(Difficulty::Medium, &rules, &mut rng);
        assert_eq!(&degrees[degrees.len() - 2..], &[5, 1]);
    }
}
