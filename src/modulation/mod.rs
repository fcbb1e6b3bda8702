//! Modulation classifier
//!
//! Buckets every other reachable catalog realization by the source scale
//! degree it is anchored at, following the historical degree-validity rules:
//! the tonic always anchors; the fourth and fifth anchor when their shawwa
//! class is known; the third anchors directly or falls back to the nearest
//! two-part alternate third; the sixth has independent ascending, descending
//! and no-third tests.

pub mod shawwa;

use log::debug;

use crate::catalog::Catalog;
use crate::lattice::Lattice;
use crate::models::{
    DegreeCategory, Jins, Maqam, ModulationBuckets, ModulationMode, ModulationTargets, PitchClass,
};
use crate::transposition::{jins_transpositions, maqam_transpositions};
use shawwa::{class_of, shawwa_index, ShawwaClass};

/// Validated anchor note names of the source, by degree category
#[derive(Debug, Default)]
struct Anchors {
    first: Option<String>,
    third: Option<String>,
    alt_third: Option<String>,
    fourth: Option<String>,
    fifth: Option<String>,
    sixth_ascending: Option<String>,
    sixth_descending: Option<String>,
    sixth_no_third: Option<String>,
}

impl Anchors {
    fn pairs(&self) -> [(DegreeCategory, Option<&String>); 8] {
        [
            (DegreeCategory::First, self.first.as_ref()),
            (DegreeCategory::Third, self.third.as_ref()),
            (DegreeCategory::AltThird, self.alt_third.as_ref()),
            (DegreeCategory::Fourth, self.fourth.as_ref()),
            (DegreeCategory::Fifth, self.fifth.as_ref()),
            (DegreeCategory::SixthAscending, self.sixth_ascending.as_ref()),
            (
                DegreeCategory::SixthDescending,
                self.sixth_descending.as_ref(),
            ),
            (DegreeCategory::SixthNoThird, self.sixth_no_third.as_ref()),
        ]
    }
}

/// Classify every reachable catalog realization into the eight scale-degree
/// buckets of the source maqam.
///
/// Per-entry failures are absorbed: incompatible entries are skipped and an
/// anchor with no matches simply leaves its bucket empty.
pub fn modulations(
    lattice: &Lattice,
    catalog: &Catalog,
    source: &Maqam,
    mode: ModulationMode,
    tolerance: f64,
) -> ModulationTargets {
    let anchors = if lattice.is_empty() {
        Anchors::default()
    } else {
        validate_anchors(lattice, source)
    };
    debug!(
        "modulations from '{}' on {:?}: anchors {:?}",
        source.template_id,
        source.tonic(),
        anchors
    );

    match mode {
        ModulationMode::Ajnas => {
            let mut buckets: ModulationBuckets<Jins> = ModulationBuckets::new();
            buckets.alt_third_note = anchors.alt_third.clone().unwrap_or_default();
            if !lattice.is_empty() {
                for template in catalog.ajnas_for(lattice) {
                    for realization in jins_transpositions(lattice, template, true, tolerance) {
                        if realization.note_names() == source.ascending_note_names() {
                            continue;
                        }
                        file_into_buckets(&mut buckets, &anchors, realization.tonic(), &realization);
                    }
                }
            }
            ModulationTargets::Ajnas(buckets)
        }
        ModulationMode::Maqamat => {
            let mut buckets: ModulationBuckets<Maqam> = ModulationBuckets::new();
            buckets.alt_third_note = anchors.alt_third.clone().unwrap_or_default();
            if !lattice.is_empty() {
                for template in catalog.maqamat_for(lattice) {
                    for realization in
                        maqam_transpositions(lattice, catalog.ajnas, template, true, tolerance)
                    {
                        if is_same_note_sequence(&realization, source) {
                            continue;
                        }
                        file_into_buckets(&mut buckets, &anchors, realization.tonic(), &realization);
                    }
                }
            }
            ModulationTargets::Maqamat(buckets)
        }
    }
}

/// A realization identical in note-sequence to the source is not a modulation
fn is_same_note_sequence(candidate: &Maqam, source: &Maqam) -> bool {
    candidate.ascending_note_names() == source.ascending_note_names()
        && note_names(&candidate.descending_pitch_classes)
            == note_names(&source.descending_pitch_classes)
}

fn note_names(sequence: &[PitchClass]) -> Vec<&str> {
    sequence.iter().map(|pc| pc.note_name.as_str()).collect()
}

/// File a realization into every bucket whose anchor its tonic matches
fn file_into_buckets<T: Clone>(
    buckets: &mut ModulationBuckets<T>,
    anchors: &Anchors,
    tonic: Option<&str>,
    realization: &T,
) {
    let Some(tonic) = tonic else { return };
    for (category, anchor) in anchors.pairs() {
        if anchor.map(String::as_str) == Some(tonic) {
            buckets.bucket_mut(category).push(realization.clone());
        }
    }
}

/// Apply the degree-validity rules to the source's scale degrees
fn validate_anchors(lattice: &Lattice, source: &Maqam) -> Anchors {
    let asc = &source.ascending_pitch_classes;
    let desc = &source.descending_pitch_classes;
    let mut anchors = Anchors::default();

    // degree 1 is always a valid anchor
    anchors.first = asc.first().map(|pc| pc.note_name.clone());

    let third_valid = matches!(
        asc.get(2).map(class_of),
        Some(ShawwaClass::Natural) | Some(ShawwaClass::OnePart) | Some(ShawwaClass::TwoPart)
    );
    if third_valid {
        anchors.third = asc.get(2).map(|pc| pc.note_name.clone());
    } else {
        anchors.alt_third = find_alternate_third(lattice, asc);
    }

    anchors.fourth = classifiable_name(asc.get(3));
    anchors.fifth = classifiable_name(asc.get(4));

    anchors.sixth_ascending = sixth_in_context(asc);
    anchors.sixth_descending = sixth_in_context(desc);

    // the no-third fallback is live only when both third anchors are absent
    if anchors.third.is_none() && anchors.alt_third.is_none() {
        anchors.sixth_no_third = no_third_sixth(asc);
    }

    anchors
}

fn classifiable_name(degree: Option<&PitchClass>) -> Option<String> {
    let pc = degree?;
    if class_of(pc) == ShawwaClass::Unclassifiable {
        None
    } else {
        Some(pc.note_name.clone())
    }
}

/// Degree 6 anchors in a melodic context when the degrees flanking it
/// (5 and 7) are both natural
fn sixth_in_context(sequence: &[PitchClass]) -> Option<String> {
    let sixth = sequence.get(5)?;
    let fifth = sequence.get(4)?;
    let seventh = sequence.get(6)?;
    if class_of(fifth) == ShawwaClass::Natural && class_of(seventh) == ShawwaClass::Natural {
        Some(sixth.note_name.clone())
    } else {
        None
    }
}

/// Without any third anchor, a natural sixth sitting 16 or 17 classifiable
/// steps above the tonic still anchors
fn no_third_sixth(asc: &[PitchClass]) -> Option<String> {
    let tonic = asc.first()?;
    let sixth = asc.get(5)?;
    if class_of(sixth) != ShawwaClass::Natural {
        return None;
    }
    let offset = shawwa_index(sixth)? - shawwa_index(tonic)?;
    if offset == 16 || offset == 17 {
        Some(sixth.note_name.clone())
    } else {
        None
    }
}

/// Search backward from the first octave-band boundary above the tonic toward
/// degree 3's lattice position for the nearest two-part note sitting exactly
/// 6 classifiable steps above degree 1 and 2 above degree 2
fn find_alternate_third(lattice: &Lattice, asc: &[PitchClass]) -> Option<String> {
    let tonic = asc.first()?;
    let second = asc.get(1)?;
    let third = asc.get(2)?;

    let tonic_index = shawwa_index(tonic)?;
    let second_index = shawwa_index(second)?;

    let ppo = lattice.pitches_per_octave();
    let boundary = ((tonic.octave as usize + 1) * ppo).min(lattice.len().saturating_sub(1));
    let third_position = third.lattice_index(ppo);

    let mut i = boundary;
    while i >= third_position {
        let pc = &lattice.pitch_classes()[i];
        if class_of(pc) == ShawwaClass::TwoPart {
            if let Some(index) = shawwa_index(pc) {
                if index - tonic_index == 6 && index - second_index == 2 {
                    return Some(pc.note_name.clone());
                }
            }
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::build_lattice;
    use crate::models::{JinsTemplate, MaqamTemplate, NoteNameSet, TuningSystem};
    use crate::transposition::DEFAULT_CENTS_TOLERANCE;
    use std::collections::HashMap;

    fn names(band: &[&str]) -> NoteNameSet {
        let octave: Vec<String> = band.iter().map(|s| s.to_string()).collect();
        NoteNameSet {
            octaves: vec![octave.clone(), octave.clone(), octave.clone(), octave],
        }
    }

    fn system(values: &[&str], band: &[&str]) -> TuningSystem {
        TuningSystem {
            id: "test".into(),
            name: "Test system".into(),
            creator: String::new(),
            comments: String::new(),
            references: vec![],
            pitch_class_values: values.iter().map(|s| s.to_string()).collect(),
            note_name_sets: vec![names(band)],
            abjad_names: vec![],
            string_length: 120.0,
            reference_frequency: 220.0,
            frequency_overrides: HashMap::new(),
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

    fn jins(id: &str, names: &[&str]) -> JinsTemplate {
        JinsTemplate {
            id: id.into(),
            name: id.into(),
            note_names: names.iter().map(|s| s.to_string()).collect(),
            comments: String::new(),
            references: vec![],
        }
    }

    fn diatonic() -> (TuningSystem, Vec<MaqamTemplate>) {
        let ts = system(
            &["0", "204", "386", "498", "702", "884", "1088", "1200"],
            &["A", "B", "C", "D", "E", "F", "G"],
        );
        let maqamat = vec![
            maqam(
                "major",
                &["A", "B", "C", "D", "E", "F", "G"],
                &["G", "F", "E", "D", "C", "B", "A"],
            ),
            maqam(
                "upper",
                &["D", "E", "F", "G", "A"],
                &["A", "G", "F", "E", "D"],
            ),
            maqam(
                "pent",
                &["A", "C", "D", "E", "G"],
                &["G", "E", "D", "C", "A"],
            ),
        ];
        (ts, maqamat)
    }

    #[test]
    fn test_anchor_validation_on_diatonic_source() {
        let (ts, maqamat) = diatonic();
        let lattice = build_lattice(&ts, "A");
        let source = maqam_transpositions(
            &lattice,
            &[],
            &maqamat[0],
            true,
            DEFAULT_CENTS_TOLERANCE,
        )
        .remove(0);

        let anchors = validate_anchors(&lattice, &source);
        assert_eq!(anchors.first.as_deref(), Some("A"));
        assert_eq!(anchors.third.as_deref(), Some("C"));
        assert_eq!(anchors.alt_third, None);
        assert_eq!(anchors.fourth.as_deref(), Some("D"));
        assert_eq!(anchors.fifth.as_deref(), Some("E"));
        assert_eq!(anchors.sixth_ascending.as_deref(), Some("F"));
        assert_eq!(anchors.sixth_descending.as_deref(), Some("F"));
        assert_eq!(anchors.sixth_no_third, None);
    }

    #[test]
    fn test_no_self_modulation_and_degree_one_bucket() {
        let (ts, maqamat) = diatonic();
        let lattice = build_lattice(&ts, "A");
        let ajnas: Vec<JinsTemplate> = vec![];
        let catalog = Catalog::new(std::slice::from_ref(&ts), &ajnas, &maqamat);
        let source = maqam_transpositions(
            &lattice,
            &[],
            &maqamat[0],
            true,
            DEFAULT_CENTS_TOLERANCE,
        )
        .remove(0);

        let ModulationTargets::Maqamat(buckets) = modulations(
            &lattice,
            &catalog,
            &source,
            ModulationMode::Maqamat,
            DEFAULT_CENTS_TOLERANCE,
        ) else {
            panic!("expected maqam buckets");
        };

        // the source realization itself never appears
        for m in buckets.on_first.iter() {
            assert!(
                m.template_id != "major"
                    || m.ascending_note_names() != source.ascending_note_names()
            );
        }
        // "pent" shares the source tonic and anchors on degree 1
        assert!(buckets
            .on_first
            .iter()
            .any(|m| m.template_id == "pent" && m.tonic() == Some("A")));
        // "upper" at its own authored tonic D anchors on degree 4
        assert!(buckets
            .on_fourth
            .iter()
            .any(|m| m.template_id == "upper" && m.tonic() == Some("D")));
        assert_eq!(buckets.alt_third_note, "");
    }

    #[test]
    fn test_jins_mode_buckets() {
        let (ts, maqamat) = diatonic();
        let lattice = build_lattice(&ts, "A");
        let ajnas = vec![jins("cde", &["C", "D", "E"])];
        let catalog = Catalog::new(std::slice::from_ref(&ts), &ajnas, &maqamat);
        let source = maqam_transpositions(
            &lattice,
            &[],
            &maqamat[0],
            true,
            DEFAULT_CENTS_TOLERANCE,
        )
        .remove(0);

        let ModulationTargets::Ajnas(buckets) = modulations(
            &lattice,
            &catalog,
            &source,
            ModulationMode::Ajnas,
            DEFAULT_CENTS_TOLERANCE,
        ) else {
            panic!("expected jins buckets");
        };

        // the jins rooted on C anchors at the source's third degree
        assert!(buckets
            .on_third
            .iter()
            .any(|j| j.template_id == "cde" && j.tonic() == Some("C")));
    }

    #[test]
    fn test_alt_third_excludes_true_third_and_no_third() {
        // a source whose third is off-grid: 250 cents sits at comma 11,
        // which is not a catalogued position; the half-flat third at 362
        // cents is two-part and sits at the +6/+2 offsets
        let ts = system(
            &["0", "204", "250", "362", "498", "702", "884", "1088", "1200"],
            &["A", "B", "X", "C3", "D", "E", "F", "G"],
        );
        let source_template = maqam(
            "src",
            &["A", "B", "X", "D", "E", "F", "G"],
            &["G", "F", "E", "D", "X", "B", "A"],
        );
        let lattice = build_lattice(&ts, "A");
        let source = maqam_transpositions(
            &lattice,
            &[],
            &source_template,
            true,
            DEFAULT_CENTS_TOLERANCE,
        )
        .remove(0);

        let anchors = validate_anchors(&lattice, &source);
        assert_eq!(anchors.third, None);
        assert_eq!(anchors.alt_third.as_deref(), Some("C3"));
        // alt-third found, so the no-third fallback stays inactive
        assert_eq!(anchors.sixth_no_third, None);
    }
}
