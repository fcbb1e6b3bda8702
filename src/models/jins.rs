//! Jins template and realized jins instance

use serde::{Deserialize, Serialize};

use super::pitch_class::{PitchClass, PitchClassInterval};

/// Catalog entry for a jins: an ordered list of required note names
///
/// Immutable reference data; the engine never mutates or persists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JinsTemplate {
    /// Stable catalog id
    pub id: String,

    /// Display name
    pub name: String,

    /// Required note names in melodic order
    pub note_names: Vec<String>,

    /// Free-form commentary, informational only
    #[serde(default)]
    pub comments: String,

    /// Bibliographic reference strings, informational only
    #[serde(default)]
    pub references: Vec<String>,
}

/// A jins template realized at a concrete lattice position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Jins {
    /// Id of the template this realizes
    pub template_id: String,

    /// Template display name
    pub name: String,

    /// False for the tahlil (the template's own authored position),
    /// true for a genuine transposition
    pub transposition: bool,

    /// Concrete pitch classes, in template order
    pub pitch_classes: Vec<PitchClass>,

    /// Pairwise intervals between successive pitch classes
    pub intervals: Vec<PitchClassInterval>,
}

impl Jins {
    /// Note name this realization starts on
    pub fn tonic(&self) -> Option<&str> {
        self.pitch_classes.first().map(|pc| pc.note_name.as_str())
    }

    /// Note names of the realized pitch classes
    pub fn note_names(&self) -> Vec<&str> {
        self.pitch_classes
            .iter()
            .map(|pc| pc.note_name.as_str())
            .collect()
    }
}
