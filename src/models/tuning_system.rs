//! Tuning system reference data
//!
//! A tuning system is immutable catalog data: the raw authored interval
//! values, the alternative note-name vocabularies, abjad names, and the
//! physical baseline (open-string length, reference frequency) the lattice
//! builder needs to materialize concrete pitch classes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One note-name vocabulary, as parallel per-octave arrays
///
/// `octaves[n]` names the pitch positions of octave band `n`. Positions
/// beyond an array (or bands without an array) have no name and receive the
/// `"none"` sentinel in the lattice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteNameSet {
    pub octaves: Vec<Vec<String>>,
}

impl NoteNameSet {
    /// The set's first entry, used to select a vocabulary by starting note
    pub fn first_note(&self) -> Option<&str> {
        self.octaves
            .iter()
            .find(|o| !o.is_empty())
            .and_then(|o| o.first())
            .map(String::as_str)
    }

    /// Name for a given octave band and position, if mapped
    pub fn name_for(&self, octave: usize, position: usize) -> Option<&str> {
        self.octaves
            .get(octave)
            .and_then(|names| names.get(position))
            .map(String::as_str)
    }
}

/// A historically documented tuning system definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TuningSystem {
    /// Stable catalog id
    pub id: String,

    /// Display name
    pub name: String,

    /// Documented creator / theorist, informational only
    #[serde(default)]
    pub creator: String,

    /// Free-form commentary, informational only
    #[serde(default)]
    pub comments: String,

    /// Bibliographic reference strings, informational only
    #[serde(default)]
    pub references: Vec<String>,

    /// Raw authored interval values for the reference octave, in authored
    /// order and representation (classified by the lattice builder)
    pub pitch_class_values: Vec<String>,

    /// Alternative note-name vocabularies; one is selected per query by
    /// matching its first entry against the requested starting note
    pub note_name_sets: Vec<NoteNameSet>,

    /// Abjad names covering octave bands 1 and 2, flattened band-major
    #[serde(default)]
    pub abjad_names: Vec<String>,

    /// Open-string length baseline
    pub string_length: f64,

    /// Default frequency of the open string (position 0, octave 1)
    pub reference_frequency: f64,

    /// Optional per-note-name frequency overrides
    #[serde(default)]
    pub frequency_overrides: HashMap<String, f64>,
}

impl TuningSystem {
    /// Select the note-name vocabulary whose first entry matches the
    /// requested starting note
    pub fn note_name_set_for(&self, starting_note: &str) -> Option<&NoteNameSet> {
        self.note_name_sets
            .iter()
            .find(|set| set.first_note() == Some(starting_note))
    }

    /// Abjad name for an octave band and position, empty outside bands 1-2
    pub fn abjad_name_for(&self, octave: usize, position: usize, pitches_per_octave: usize) -> &str {
        if !(1..=2).contains(&octave) {
            return "";
        }
        self.abjad_names
            .get((octave - 1) * pitches_per_octave + position)
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&[&str]]) -> NoteNameSet {
        NoteNameSet {
            octaves: names
                .iter()
                .map(|o| o.iter().map(|n| n.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_first_note_skips_empty_bands() {
        let s = set(&[&[], &["rast", "dugah"]]);
        assert_eq!(s.first_note(), Some("rast"));
    }

    #[test]
    fn test_name_for_out_of_range() {
        let s = set(&[&["qarar rast"], &["rast", "dugah"]]);
        assert_eq!(s.name_for(1, 1), Some("dugah"));
        assert_eq!(s.name_for(1, 5), None);
        assert_eq!(s.name_for(3, 0), None);
    }

    #[test]
    fn test_vocabulary_selection_by_starting_note() {
        let ts = TuningSystem {
            id: "t".into(),
            name: "test".into(),
            creator: String::new(),
            comments: String::new(),
            references: vec![],
            pitch_class_values: vec![],
            note_name_sets: vec![set(&[&["yegah"]]), set(&[&["rast"]])],
            abjad_names: vec![],
            string_length: 120.0,
            reference_frequency: 220.0,
            frequency_overrides: HashMap::new(),
        };
        assert!(ts.note_name_set_for("rast").is_some());
        assert!(ts.note_name_set_for("husayni").is_none());
    }
}
