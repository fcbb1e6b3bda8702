//! Lattice builder
//!
//! Turns a tuning system definition into an ordered multi-octave sequence of
//! concrete pitch classes: classify the raw authored values' representation,
//! convert each to all four representations, replicate across octave bands
//! 0..=3 and assign note/abjad names from the selected vocabulary.
//!
//! Unclassifiable input yields an *empty* lattice, not an error; downstream
//! components treat an empty lattice as "no valid pitch data".

use log::{debug, warn};

use crate::models::{PitchClass, PitchValue, PitchValueKind, TuningSystem, NO_NOTE_NAME};

/// Number of octave bands a lattice spans
pub const OCTAVE_BANDS: usize = 4;

/// Index of the authored reference octave band
pub const REFERENCE_OCTAVE: usize = 1;

/// An ordered multi-octave sequence of pitch classes
///
/// Length is `pitches_per_octave * 4`, octave bands laid out consecutively
/// with band 1 the tuning system's authored reference octave.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lattice {
    pitch_classes: Vec<PitchClass>,
    pitches_per_octave: usize,
}

impl Lattice {
    /// The empty lattice: the "no valid pitch data" signal
    pub fn empty() -> Self {
        Lattice::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pitch_classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pitch_classes.len()
    }

    pub fn pitches_per_octave(&self) -> usize {
        self.pitches_per_octave
    }

    pub fn pitch_classes(&self) -> &[PitchClass] {
        &self.pitch_classes
    }

    /// Representation type the lattice was authored in, if non-empty
    pub fn value_kind(&self) -> Option<PitchValueKind> {
        self.pitch_classes.first().map(|pc| pc.original_value_type)
    }

    /// Whether any position carries this note name
    pub fn contains_note(&self, note_name: &str) -> bool {
        note_name != NO_NOTE_NAME && self.pitch_classes.iter().any(|pc| pc.note_name == note_name)
    }

    /// First position at or after `from` carrying this note name
    pub fn position_of_note(&self, note_name: &str, from: usize) -> Option<usize> {
        self.pitch_classes[from.min(self.len())..]
            .iter()
            .position(|pc| pc.note_name == note_name)
            .map(|p| p + from)
    }

    /// Pitch class at a (octave band, position) slot
    pub fn get(&self, octave: usize, position: usize) -> Option<&PitchClass> {
        if position >= self.pitches_per_octave {
            return None;
        }
        self.pitch_classes.get(octave * self.pitches_per_octave + position)
    }

    /// One octave band as a slice
    pub fn octave_band(&self, octave: usize) -> &[PitchClass] {
        let start = octave * self.pitches_per_octave;
        let end = (start + self.pitches_per_octave).min(self.len());
        if start >= self.len() {
            return &[];
        }
        &self.pitch_classes[start..end]
    }
}

/// Materialize the lattice for a tuning system, with the note-name vocabulary
/// selected by matching its first entry against `starting_note`.
pub fn build_lattice(tuning_system: &TuningSystem, starting_note: &str) -> Lattice {
    let raws = &tuning_system.pitch_class_values;
    let Some(kind) = classify_values(raws) else {
        warn!(
            "tuning system '{}': pitch class values are unclassifiable, yielding empty lattice",
            tuning_system.id
        );
        return Lattice::empty();
    };
    debug!(
        "tuning system '{}': classified {} values as {}",
        tuning_system.id,
        raws.len(),
        kind
    );

    let open_length = tuning_system.string_length;
    let mut values: Vec<(String, PitchValue)> = Vec::with_capacity(raws.len());
    for raw in raws {
        match PitchValue::parse(raw, kind) {
            Some(v) => values.push((raw.clone(), v)),
            None => return Lattice::empty(),
        }
    }

    // Authored lists conventionally close with the octave itself; that entry
    // duplicates position 0 of the next band and is not a lattice position.
    if values.len() >= 2 {
        let first = values[0].1.cents(open_length);
        let last = values[values.len() - 1].1.cents(open_length);
        if (last - first - 1200.0).abs() < 1e-6 {
            values.pop();
        }
    }

    let pitches_per_octave = values.len();
    if pitches_per_octave == 0 {
        return Lattice::empty();
    }

    let note_names = tuning_system.note_name_set_for(starting_note).or_else(|| {
        warn!(
            "tuning system '{}': no note-name set starts on '{}', falling back to the first set",
            tuning_system.id, starting_note
        );
        tuning_system.note_name_sets.first()
    });

    // Reference-octave pitch classes; names and frets are filled per band.
    let reference_frequency = tuning_system.reference_frequency;
    let authored: Vec<PitchClass> = values
        .iter()
        .enumerate()
        .map(|(index, (raw, value))| {
            let decimal_ratio = value.decimal_ratio(open_length);
            let frequency = reference_frequency * decimal_ratio;
            PitchClass {
                note_name: NO_NOTE_NAME.to_string(),
                fraction: value.fraction(open_length),
                cents: value.cents(open_length),
                decimal_ratio,
                string_length: value.string_length(open_length),
                frequency,
                fret_division: 0.0,
                midi_note: midi_from_frequency(frequency),
                abjad_name: String::new(),
                octave: REFERENCE_OCTAVE as u8,
                index,
                original_value: raw.clone(),
                original_value_type: kind,
            }
        })
        .collect();

    let open_string_length = authored[0].string_length;

    let mut pitch_classes = Vec::with_capacity(pitches_per_octave * OCTAVE_BANDS);
    for octave in 0..OCTAVE_BANDS {
        let shift = octave as i32 - REFERENCE_OCTAVE as i32;
        for (index, base) in authored.iter().enumerate() {
            let mut pc = base.octave_shifted(shift);
            pc.octave = octave as u8;
            pc.index = index;
            pc.note_name = note_names
                .and_then(|set| set.name_for(octave, index))
                .unwrap_or(NO_NOTE_NAME)
                .to_string();
            pc.abjad_name = tuning_system
                .abjad_name_for(octave, index, pitches_per_octave)
                .to_string();
            if let Some(freq) = tuning_system.frequency_overrides.get(&pc.note_name) {
                pc.frequency = *freq;
                pc.midi_note = midi_from_frequency(*freq);
            }
            pc.fret_division = open_string_length - pc.string_length;
            pitch_classes.push(pc);
        }
    }

    Lattice {
        pitch_classes,
        pitches_per_octave,
    }
}

/// Classify raw authored values by monotonicity and numeric range:
/// ascending `int/int` fractions, ascending values inside `[1.0, 2.0]` as
/// decimal ratios, other ascending values up to 1200 as cents, descending
/// values as string lengths, anything else unclassifiable.
pub fn classify_values(raws: &[String]) -> Option<PitchValueKind> {
    if raws.len() < 2 {
        return None;
    }

    if raws.iter().all(|r| looks_like_fraction(r)) {
        let vals: Vec<f64> = raws
            .iter()
            .filter_map(|r| PitchValue::parse(r, PitchValueKind::Fraction))
            .map(|v| v.decimal_ratio(1.0))
            .collect();
        if vals.len() == raws.len() && is_ascending(&vals) {
            return Some(PitchValueKind::Fraction);
        }
        return None;
    }

    let nums: Vec<f64> = raws.iter().filter_map(|r| r.trim().parse().ok()).collect();
    if nums.len() != raws.len() {
        return None;
    }

    if is_ascending(&nums) {
        let first = nums[0];
        let last = nums[nums.len() - 1];
        if first >= 1.0 && last <= 2.0 {
            return Some(PitchValueKind::DecimalRatio);
        }
        if last <= 1200.0 {
            return Some(PitchValueKind::Cents);
        }
        return None;
    }

    if is_descending(&nums) {
        return Some(PitchValueKind::StringLength);
    }

    None
}

fn looks_like_fraction(raw: &str) -> bool {
    match raw.trim().split_once('/') {
        Some((num, den)) => {
            num.trim().parse::<i64>().is_ok() && den.trim().parse::<i64>().is_ok()
        }
        None => false,
    }
}

fn is_ascending(vals: &[f64]) -> bool {
    vals.windows(2).all(|w| w[0] < w[1])
}

fn is_descending(vals: &[f64]) -> bool {
    vals.windows(2).all(|w| w[0] > w[1])
}

fn midi_from_frequency(frequency: f64) -> i32 {
    (69.0 + 12.0 * (frequency / 440.0).log2()).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteNameSet;
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

    #[test]
    fn test_classification_rules() {
        let to_vec = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(
            classify_values(&to_vec(&["0", "204", "386", "1200"])),
            Some(PitchValueKind::Cents)
        );
        assert_eq!(
            classify_values(&to_vec(&["1.0", "1.125", "1.5", "2.0"])),
            Some(PitchValueKind::DecimalRatio)
        );
        assert_eq!(
            classify_values(&to_vec(&["1/1", "9/8", "4/3", "2/1"])),
            Some(PitchValueKind::Fraction)
        );
        assert_eq!(
            classify_values(&to_vec(&["120", "106.66", "90", "60"])),
            Some(PitchValueKind::StringLength)
        );
        // non-monotonic input is unclassifiable
        assert_eq!(classify_values(&to_vec(&["0", "500", "300"])), None);
        assert_eq!(classify_values(&to_vec(&["x", "y"])), None);
    }

    #[test]
    fn test_build_lattice_28_entries() {
        let lattice = build_lattice(&cents_system(), "A");
        assert_eq!(lattice.pitches_per_octave(), 7);
        assert_eq!(lattice.len(), 28);
        assert_eq!(lattice.value_kind(), Some(PitchValueKind::Cents));

        // reference octave starts on A at 0 cents
        let a1 = lattice.get(1, 0).unwrap();
        assert_eq!(a1.note_name, "A");
        assert!((a1.cents - 0.0).abs() < 1e-9);
        assert!((a1.frequency - 220.0).abs() < 1e-9);

        // octave replication: band 2 position 0 is an octave up
        let a2 = lattice.get(2, 0).unwrap();
        assert!((a2.cents - 1200.0).abs() < 1e-9);
        assert!((a2.frequency - 440.0).abs() < 1e-9);
        assert_eq!(a2.midi_note, a1.midi_note + 12);
        assert!((a2.string_length - a1.string_length / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fret_division_is_relative_to_open_string() {
        let lattice = build_lattice(&cents_system(), "A");
        let open = lattice.get(1, 0).unwrap();
        assert!((open.fret_division - 0.0).abs() < 1e-9);

        let b1 = lattice.get(1, 1).unwrap();
        assert!((b1.fret_division - (open.string_length - b1.string_length)).abs() < 1e-9);
        assert!(b1.fret_division > 0.0);

        // below the open string the offset goes negative
        let a0 = lattice.get(0, 0).unwrap();
        assert!(a0.fret_division < 0.0);
    }

    #[test]
    fn test_unclassifiable_input_yields_empty_lattice() {
        let mut ts = cents_system();
        ts.pitch_class_values = vec!["0".into(), "800".into(), "400".into()];
        let lattice = build_lattice(&ts, "A");
        assert!(lattice.is_empty());
        assert_eq!(lattice.value_kind(), None);
    }

    #[test]
    fn test_unmapped_positions_get_sentinel_name() {
        let mut ts = cents_system();
        // vocabulary only covers the reference octave
        ts.note_name_sets = vec![NoteNameSet {
            octaves: vec![
                vec![],
                ["A", "B", "C", "D", "E", "F", "G"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ],
        }];
        let lattice = build_lattice(&ts, "A");
        assert_eq!(lattice.get(1, 0).unwrap().note_name, "A");
        assert_eq!(lattice.get(0, 0).unwrap().note_name, NO_NOTE_NAME);
        assert_eq!(lattice.get(3, 2).unwrap().note_name, NO_NOTE_NAME);
    }

    #[test]
    fn test_abjad_names_cover_bands_one_and_two_only() {
        let mut ts = cents_system();
        ts.abjad_names = (0..14).map(|i| format!("abjad-{i}")).collect();
        let lattice = build_lattice(&ts, "A");
        assert_eq!(lattice.get(1, 0).unwrap().abjad_name, "abjad-0");
        assert_eq!(lattice.get(2, 0).unwrap().abjad_name, "abjad-7");
        assert_eq!(lattice.get(0, 0).unwrap().abjad_name, "");
        assert_eq!(lattice.get(3, 0).unwrap().abjad_name, "");
    }

    #[test]
    fn test_frequency_override_by_note_name() {
        let mut ts = cents_system();
        ts.frequency_overrides.insert("D".to_string(), 297.0);
        let lattice = build_lattice(&ts, "A");
        // every D slot takes the override
        let d1 = lattice.get(1, 3).unwrap();
        assert!((d1.frequency - 297.0).abs() < 1e-9);
    }
}
