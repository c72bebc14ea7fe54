// Bass voicing.
//
// No search here: a bass part only needs one low root plus a few upper
// chord tones for color. The root is moved by octaves into the context's
// register window (the window starts one semitone lower for a D root, as on
// a drop-D instrument), then up to three upper notes follow in priority order:
//
//   1. the third, if the chord has one
//   2. the seventh if present, otherwise the fifth
//   3. a 9th/11th-family extension if present (an octave higher still),
//      otherwise the fifth again
//
// Upper notes sit `upper_raise` semitones above their close position so they
// clear the root. Anything that lands under the floor is dropped.

use crate::fretboard::{VoicingContext, adjusted_floor};
use crate::interval::IntervalSet;
use crate::pitch::{Pitch, pitch_class};

/// Lowest bass root in the trainer register (E2).
pub const TRAINER_BASS_FLOOR: Pitch = 40;

/// Lowest bass root in the resource register (E1, the open low string).
pub const RESOURCE_BASS_FLOOR: Pitch = 28;

const TRAINER_UPPER_RAISE: Pitch = 12;
const RESOURCE_UPPER_RAISE: Pitch = 24;

/// Register parameters for one context.
fn register(context: VoicingContext) -> (Pitch, Pitch) {
    match context {
        VoicingContext::Trainer => (TRAINER_BASS_FLOOR, TRAINER_UPPER_RAISE),
        VoicingContext::Resource => (RESOURCE_BASS_FLOOR, RESOURCE_UPPER_RAISE),
    }
}

/// Voice `chord` over `root` for bass. Ascending and duplicate-free; always
/// contains the bass root.
pub fn voice_bass_chord(root: Pitch, chord: &[Pitch], context: VoicingContext) -> Vec<Pitch> {
    let (floor, upper_raise) = register(context);
    let root_pc = pitch_class(root);
    let floor = adjusted_floor(root_pc, floor);
    let intervals = IntervalSet::from_chord(chord, root_pc);

    let bass_root = into_window(root, floor);
    let upper = |interval: u8| bass_root + interval as Pitch + upper_raise;

    let mut notes = vec![bass_root];

    if let Some(third) = intervals.third() {
        notes.push(upper(third));
    }

    if let Some(color) = intervals.seventh().or(intervals.fifth()) {
        notes.push(upper(color));
    }

    match intervals.extension() {
        Some(extension) => notes.push(upper(extension) + 12),
        None => {
            if let Some(fifth) = intervals.fifth() {
                notes.push(upper(fifth));
            }
        }
    }

    notes.retain(|&p| p >= floor);
    notes.sort_unstable();
    notes.dedup();
    notes
}

/// Shift `pitch` by octaves into `[floor, floor + 12)`.
fn into_window(mut pitch: Pitch, floor: Pitch) -> Pitch {
    while pitch < floor {
        pitch += 12;
    }
    while pitch >= floor + 12 {
        pitch -= 12;
    }
    pitch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e_major_in_trainer_register() {
        let voiced = voice_bass_chord(40, &[40, 44, 47], VoicingContext::Trainer);
        assert_eq!(voiced, vec![40, 56, 59]);
        assert_eq!(voiced[0], 40);
        assert!((2..=4).contains(&voiced.len()));
    }

    #[test]
    fn high_roots_come_down() {
        let voiced = voice_bass_chord(67, &[67, 71, 74], VoicingContext::Trainer);
        assert_eq!(voiced[0], 43);
        assert_eq!(voiced, vec![43, 59, 62]);
    }

    #[test]
    fn resource_register_sits_an_octave_lower() {
        let voiced = voice_bass_chord(60, &[60, 64, 67], VoicingContext::Resource);
        // C2 root, E and G two octaves up.
        assert_eq!(voiced, vec![36, 64, 67]);
    }

    #[test]
    fn d_roots_use_drop_tuning() {
        // Trainer window for D is [39, 51): the lowest D is D3.
        let voiced = voice_bass_chord(62, &[62, 65, 69], VoicingContext::Trainer);
        assert_eq!(voiced[0], 50);
        assert_eq!(voiced, vec![50, 65, 69]);

        // Resource window for D is [27, 39).
        let voiced = voice_bass_chord(62, &[62, 65, 69], VoicingContext::Resource);
        assert_eq!(voiced, vec![38, 65, 69]);
    }

    #[test]
    fn seventh_and_ninth_take_priority() {
        // C9: C E G Bb D
        let voiced = voice_bass_chord(48, &[48, 52, 55, 58, 62], VoicingContext::Trainer);
        assert_eq!(voiced, vec![48, 64, 70, 74]);
    }

    #[test]
    fn power_chord_has_no_third() {
        let voiced = voice_bass_chord(45, &[45, 52], VoicingContext::Trainer);
        assert_eq!(voiced, vec![45, 64]);
    }

    #[test]
    fn bare_root_stays_single() {
        let voiced = voice_bass_chord(41, &[], VoicingContext::Trainer);
        assert_eq!(voiced, vec![41]);
    }
}
