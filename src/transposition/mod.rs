//! Transposition searcher
//!
//! Computes a template's interval signature at its authored position, then
//! walks every lattice position as a candidate start, greedily extending
//! through the first subsequent pitch class that matches each signature step.
//! A scanned candidate whose interval already exceeds the current step rejects
//! the start (overshoot pruning), so the scan never runs past a missed match.
//!
//! Maqam templates are searched ascending and descending independently; an
//! ascending run pairs with a descending run only when both start on the same
//! note name, and unpaired runs are dropped.

use std::collections::HashMap;

use log::debug;

use crate::lattice::Lattice;
use crate::models::{
    Jins, JinsTemplate, Maqam, MaqamTemplate, PitchClass, PitchClassInterval, PitchValueKind,
};

/// Default cents tolerance for interval matching. Ignored on ratio-kinded
/// lattices, where matching is exact fraction equality.
pub const DEFAULT_CENTS_TOLERANCE: f64 = 5.0;

/// Slack applied to overshoot checks on ratio-kinded lattices, where the
/// cents values are themselves derived and matching is exact
const RATIO_EPSILON: f64 = 1e-9;

fn effective_tolerance(kind: PitchValueKind, tolerance: f64) -> f64 {
    if kind.is_ratio_based() {
        RATIO_EPSILON
    } else {
        tolerance
    }
}

fn interval_matches(
    found: &PitchClassInterval,
    target: &PitchClassInterval,
    kind: PitchValueKind,
    tolerance: f64,
) -> bool {
    if kind.is_ratio_based() {
        found.fraction == target.fraction
    } else {
        (found.cents - target.cents).abs() <= tolerance
    }
}

fn overshoots(
    found: &PitchClassInterval,
    target: &PitchClassInterval,
    kind: PitchValueKind,
    tolerance: f64,
) -> bool {
    found.cents_abs() > target.cents_abs() + effective_tolerance(kind, tolerance)
}

/// Locate a note-name sequence in `ordered` by sequential first-occurrence
/// scan starting at `from`, each name strictly after the previous one
fn locate_sequence(ordered: &[PitchClass], names: &[String], from: usize) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(names.len());
    let mut next = from;
    for name in names {
        let offset = ordered.get(next..)?.iter().position(|pc| &pc.note_name == name)?;
        positions.push(next + offset);
        next = next + offset + 1;
    }
    Some(positions)
}

/// Interval signature of a located sequence
fn signature_of(ordered: &[PitchClass], positions: &[usize]) -> Vec<PitchClassInterval> {
    positions
        .windows(2)
        .map(|w| PitchClassInterval::between(&ordered[w[0]], &ordered[w[1]]))
        .collect()
}

/// Every run in `ordered` satisfying the full signature, as (start index,
/// accepted pitch classes). Starts in the final octave band of the traversal
/// order are discarded: there is not enough room left to validate the run.
fn find_runs(
    ordered: &[PitchClass],
    signature: &[PitchClassInterval],
    pitches_per_octave: usize,
    tolerance: f64,
) -> Vec<(usize, Vec<PitchClass>)> {
    let Some(kind) = ordered.first().map(|pc| pc.original_value_type) else {
        return Vec::new();
    };
    let last_band_start = ordered.len().saturating_sub(pitches_per_octave);

    let mut runs = Vec::new();
    'starts: for start in 0..last_band_start {
        let mut run = vec![ordered[start].clone()];
        let mut last = start;
        for target in signature {
            let mut advanced = false;
            for (j, candidate) in ordered.iter().enumerate().skip(last + 1) {
                let found = PitchClassInterval::between(&ordered[last], candidate);
                if interval_matches(&found, target, kind, tolerance) {
                    run.push(candidate.clone());
                    last = j;
                    advanced = true;
                    break;
                }
                if overshoots(&found, target, kind, tolerance) {
                    continue 'starts;
                }
            }
            if !advanced {
                continue 'starts;
            }
        }
        runs.push((start, run));
    }
    runs
}

fn intervals_of(run: &[PitchClass]) -> Vec<PitchClassInterval> {
    run.windows(2)
        .map(|w| PitchClassInterval::between(&w[0], &w[1]))
        .collect()
}

/// Reorder runs so the identity realization (authored start) comes first, or
/// drop it when the caller does not want it
fn order_runs(
    runs: Vec<(usize, Vec<PitchClass>)>,
    authored_start: usize,
    include_tahlil: bool,
) -> Vec<(bool, Vec<PitchClass>)> {
    let mut identity = None;
    let mut rest = Vec::with_capacity(runs.len());
    for (start, run) in runs {
        if start == authored_start {
            identity = Some(run);
        } else {
            rest.push((true, run));
        }
    }

    let mut ordered = Vec::with_capacity(rest.len() + 1);
    if include_tahlil {
        if let Some(run) = identity {
            ordered.push((false, run));
        }
    }
    ordered.extend(rest);
    ordered
}

/// Every structurally valid realization of a jins template on the lattice,
/// identity (tahlil) first when requested
pub fn jins_transpositions(
    lattice: &Lattice,
    template: &JinsTemplate,
    include_tahlil: bool,
    tolerance: f64,
) -> Vec<Jins> {
    if lattice.is_empty() || template.note_names.len() < 2 {
        return Vec::new();
    }

    let ordered = lattice.pitch_classes();
    let ppo = lattice.pitches_per_octave();
    // authored position: first occurrence at or above the reference octave
    let Some(authored) = locate_sequence(ordered, &template.note_names, ppo) else {
        return Vec::new();
    };
    let signature = signature_of(ordered, &authored);
    let runs = find_runs(ordered, &signature, ppo, tolerance);
    debug!(
        "jins '{}': {} run(s) on lattice of {}",
        template.id,
        runs.len(),
        ordered.len()
    );

    order_runs(runs, authored[0], include_tahlil)
        .into_iter()
        .map(|(transposition, run)| Jins {
            template_id: template.id.clone(),
            name: template.name.clone(),
            transposition,
            intervals: intervals_of(&run),
            pitch_classes: run,
        })
        .collect()
}

/// Every structurally valid realization of a maqam template on the lattice.
///
/// Ascending and descending signatures are searched independently (the
/// descending one through the reversed lattice), paired on equal starting
/// note names, and each paired realization is annotated with the constituent
/// jins that fits at every scale degree.
pub fn maqam_transpositions(
    lattice: &Lattice,
    ajnas: &[JinsTemplate],
    template: &MaqamTemplate,
    include_tahlil: bool,
    tolerance: f64,
) -> Vec<Maqam> {
    if lattice.is_empty()
        || template.ascending_note_names.len() < 2
        || template.descending_note_names.len() < 2
    {
        return Vec::new();
    }

    let ordered = lattice.pitch_classes();
    let ppo = lattice.pitches_per_octave();

    let Some(authored_asc) = locate_sequence(ordered, &template.ascending_note_names, ppo) else {
        return Vec::new();
    };
    let ascending_signature = signature_of(ordered, &authored_asc);
    let ascending_runs = find_runs(ordered, &ascending_signature, ppo, tolerance);

    // The authored descent, located tonic-first, then traversed top-down to
    // form the descending signature over the reversed lattice.
    let tonic_first_descent: Vec<String> = template
        .descending_note_names
        .iter()
        .rev()
        .cloned()
        .collect();
    let Some(authored_desc) = locate_sequence(ordered, &tonic_first_descent, ppo) else {
        return Vec::new();
    };
    let top_down: Vec<usize> = authored_desc.iter().rev().copied().collect();
    let descending_signature = signature_of(ordered, &top_down);

    let reversed: Vec<PitchClass> = ordered.iter().rev().cloned().collect();
    let descending_runs = find_runs(&reversed, &descending_signature, ppo, tolerance);
    // normalize descents tonic-first so both sequences of a pair start on the
    // same note name
    let mut descents: Vec<Option<Vec<PitchClass>>> = descending_runs
        .into_iter()
        .map(|(_, run)| Some(run.into_iter().rev().collect()))
        .collect();

    let jins_by_slot = index_ajnas_by_start(lattice, ajnas, tolerance);

    let mut maqamat = Vec::new();
    for (transposition, ascent) in order_runs(ascending_runs, authored_asc[0], include_tahlil) {
        let Some(descent) = take_matching_descent(&mut descents, &ascent[0]) else {
            continue;
        };

        let ascending_jins = annotate_degrees(&ascent, &jins_by_slot);
        let descending_jins = annotate_degrees(&descent, &jins_by_slot);

        maqamat.push(Maqam {
            template_id: template.id.clone(),
            name: template.name.clone(),
            transposition,
            ascending_intervals: intervals_of(&ascent),
            descending_intervals: intervals_of(&descent),
            ascending_pitch_classes: ascent,
            descending_pitch_classes: descent,
            ascending_jins,
            descending_jins,
            modulations: None,
        });
    }
    debug!(
        "maqam '{}': {} paired realization(s)",
        template.id,
        maqamat.len()
    );
    maqamat
}

/// Claim the descending run that pairs with an ascending start: equal tonic
/// note name, preferring the identical lattice slot
fn take_matching_descent(
    descents: &mut [Option<Vec<PitchClass>>],
    tonic: &PitchClass,
) -> Option<Vec<PitchClass>> {
    let mut by_name = None;
    for (i, slot) in descents.iter().enumerate() {
        if let Some(run) = slot {
            let start = run.first()?;
            if start.note_name != tonic.note_name {
                continue;
            }
            if start.same_slot(tonic) {
                return descents[i].take();
            }
            if by_name.is_none() {
                by_name = Some(i);
            }
        }
    }
    by_name.and_then(|i| descents[i].take())
}

/// Per jins template, every realization keyed by its starting lattice slot
type JinsBySlot = Vec<HashMap<(u8, usize), Jins>>;

fn index_ajnas_by_start(lattice: &Lattice, ajnas: &[JinsTemplate], tolerance: f64) -> JinsBySlot {
    ajnas
        .iter()
        .map(|template| {
            jins_transpositions(lattice, template, true, tolerance)
                .into_iter()
                .map(|j| {
                    let start = &j.pitch_classes[0];
                    ((start.octave, start.index), j)
                })
                .collect()
        })
        .collect()
}

/// The first catalogued jins that fits at each scale degree, if any
fn annotate_degrees(sequence: &[PitchClass], jins_by_slot: &JinsBySlot) -> Vec<Option<Jins>> {
    sequence
        .iter()
        .map(|degree| {
            jins_by_slot
                .iter()
                .find_map(|by_start| by_start.get(&(degree.octave, degree.index)).cloned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::build_lattice;
    use crate::models::{NoteNameSet, TuningSystem};
    use std::collections::HashMap;

    fn names_abcdefg() -> NoteNameSet {
        let band: Vec<String> = ["A", "B", "C", "D", "E", "F", "G"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        NoteNameSet {
            octaves: vec![band.clone(), band.clone(), band.clone(), band],
        }
    }

    fn cents_system() -> TuningSystem {
        TuningSystem {
            id: "test-cents".into(),
            name: "Test cents system".into(),
            creator: String::new(),
            comments: String::new(),
            references: vec![],
            pitch_class_values: ["0", "204", "386", "498", "702", "884", "1088", "1200"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            note_name_sets: vec![names_abcdefg()],
            abjad_names: vec![],
            string_length: 120.0,
            reference_frequency: 220.0,
            frequency_overrides: HashMap::new(),
        }
    }

    fn jins(id: &str, names: &[&str]) -> JinsTemplate {
        JinsTemplate {
            id: id.into(),
            name: id.into(),
            note_names: names.iter().map(|s| s.to_string()).collect(),
            comments: String::new(),
            references: vec![],
        }
    }

    fn maqam(id: &str, asc: &[&str], desc: &[&str]) -> MaqamTemplate {
        MaqamTemplate {
            id: id.into(),
            name: id.into(),
            ascending_note_names: asc.iter().map(|s| s.to_string()).collect(),
            descending_note_names: desc.iter().map(|s| s.to_string()).collect(),
            comments: String::new(),
            references: vec![],
        }
    }

    #[test]
    fn test_jins_identity_first_with_expected_intervals() {
        let lattice = build_lattice(&cents_system(), "A");
        let template = jins("abc", &["A", "B", "C"]);
        let found = jins_transpositions(&lattice, &template, true, DEFAULT_CENTS_TOLERANCE);

        assert!(!found.is_empty());
        let identity = &found[0];
        assert!(!identity.transposition);
        assert_eq!(identity.pitch_classes[0].note_name, "A");
        assert_eq!(identity.pitch_classes[0].octave, 1);
        assert!((identity.intervals[0].cents - 204.0).abs() < 1e-9);
        assert!((identity.intervals[1].cents - 182.0).abs() < 1e-9);
        for t in &found[1..] {
            assert!(t.transposition);
        }
    }

    #[test]
    fn test_jins_search_is_idempotent() {
        let lattice = build_lattice(&cents_system(), "A");
        let template = jins("abc", &["A", "B", "C"]);
        let a = jins_transpositions(&lattice, &template, true, DEFAULT_CENTS_TOLERANCE);
        let b = jins_transpositions(&lattice, &template, true, DEFAULT_CENTS_TOLERANCE);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tahlil_excluded_on_request() {
        let lattice = build_lattice(&cents_system(), "A");
        let template = jins("abc", &["A", "B", "C"]);
        let found = jins_transpositions(&lattice, &template, false, DEFAULT_CENTS_TOLERANCE);
        assert!(found.iter().all(|j| j.transposition));
    }

    #[test]
    fn test_template_too_small_yields_empty() {
        let lattice = build_lattice(&cents_system(), "A");
        let template = jins("single", &["A"]);
        assert!(jins_transpositions(&lattice, &template, true, DEFAULT_CENTS_TOLERANCE).is_empty());
    }

    #[test]
    fn test_empty_lattice_yields_empty() {
        let template = jins("abc", &["A", "B", "C"]);
        let empty = Lattice::empty();
        assert!(jins_transpositions(&empty, &template, true, DEFAULT_CENTS_TOLERANCE).is_empty());
    }

    #[test]
    fn test_no_start_in_topmost_band() {
        let lattice = build_lattice(&cents_system(), "A");
        let template = jins("abc", &["A", "B", "C"]);
        let found = jins_transpositions(&lattice, &template, true, DEFAULT_CENTS_TOLERANCE);
        assert!(found.iter().all(|j| j.pitch_classes[0].octave < 3));
    }

    #[test]
    fn test_maqam_pairing_shares_tonic() {
        let lattice = build_lattice(&cents_system(), "A");
        let template = maqam(
            "major",
            &["A", "B", "C", "D", "E", "F", "G"],
            &["G", "F", "E", "D", "C", "B", "A"],
        );
        let found = maqam_transpositions(&lattice, &[], &template, true, DEFAULT_CENTS_TOLERANCE);

        assert!(!found.is_empty());
        for m in &found {
            let asc = &m.ascending_pitch_classes;
            let desc = &m.descending_pitch_classes;
            assert_eq!(asc[0].note_name, desc[0].note_name);
            assert_eq!(asc.len(), 7);
            assert_eq!(desc.len(), 7);
            // descent normalized tonic-first means ascending cents order
            assert!(desc.windows(2).all(|w| w[0].cents < w[1].cents));
        }
        let identity = &found[0];
        assert!(!identity.transposition);
        assert_eq!(identity.ascending_pitch_classes[0].octave, 1);
    }

    #[test]
    fn test_maqam_constituent_jins_annotations() {
        let lattice = build_lattice(&cents_system(), "A");
        // distinct interval patterns: (204, 182) cents vs (112, 204) cents
        let ajnas = vec![jins("abc", &["A", "B", "C"]), jins("cde", &["C", "D", "E"])];
        let template = maqam(
            "major",
            &["A", "B", "C", "D", "E", "F", "G"],
            &["G", "F", "E", "D", "C", "B", "A"],
        );
        let found = maqam_transpositions(&lattice, &ajnas, &template, true, DEFAULT_CENTS_TOLERANCE);
        let identity = &found[0];

        assert_eq!(identity.ascending_jins.len(), 7);
        // degree 1 carries the jins rooted on A, degree 3 the one rooted on C
        let first = identity.ascending_jins[0].as_ref().unwrap();
        assert_eq!(first.template_id, "abc");
        assert!(!first.transposition);
        let third = identity.ascending_jins[2].as_ref().unwrap();
        assert_eq!(third.template_id, "cde");
    }

    #[test]
    fn test_exact_matching_on_fraction_lattice() {
        let mut ts = cents_system();
        ts.pitch_class_values = ["1/1", "9/8", "81/64", "4/3", "3/2", "27/16", "243/128", "2/1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let lattice = build_lattice(&ts, "A");
        assert_eq!(lattice.value_kind(), Some(crate::models::PitchValueKind::Fraction));

        let template = jins("abc", &["A", "B", "C"]);
        // a huge tolerance must not loosen ratio matching
        let found = jins_transpositions(&lattice, &template, true, 500.0);
        for j in &found {
            assert_eq!(j.intervals[0].fraction, num_rational::Rational64::new(9, 8));
        }
        assert!(!found.is_empty());
    }
}
