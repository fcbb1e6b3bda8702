//! Maqam template and realized maqam instance

use serde::{Deserialize, Serialize};

use super::jins::Jins;
use super::modulation::ModulationTargets;
use super::pitch_class::{PitchClass, PitchClassInterval};

/// Catalog entry for a maqam: independent ascending and descending note-name
/// lists, which may differ in length or content (the asymmetry is intentional
/// and preserved verbatim)
///
/// The descending list is authored top-down, from the highest note to the
/// tonic, exactly as the historical sources give it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MaqamTemplate {
    /// Stable catalog id
    pub id: String,

    /// Display name
    pub name: String,

    /// Required note names, tonic upward
    pub ascending_note_names: Vec<String>,

    /// Required note names of the descent, highest note down to the tonic
    pub descending_note_names: Vec<String>,

    /// Free-form commentary, informational only
    #[serde(default)]
    pub comments: String,

    /// Bibliographic reference strings, informational only
    #[serde(default)]
    pub references: Vec<String>,
}

impl MaqamTemplate {
    /// All note names this maqam requires from a lattice
    pub fn required_note_names(&self) -> impl Iterator<Item = &str> {
        self.ascending_note_names
            .iter()
            .chain(self.descending_note_names.iter())
            .map(String::as_str)
    }
}

/// A maqam template realized at a concrete lattice position
///
/// Both sequences are stored tonic-first (ascending pitch order), so a
/// realization's ascending and descending sequences always start on the same
/// note name. The authored top-down descent is recoverable through
/// [`Maqam::descending_top_down`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Maqam {
    /// Id of the template this realizes
    pub template_id: String,

    /// Template display name
    pub name: String,

    /// False for the tahlil (the template's own authored position),
    /// true for a genuine transposition
    pub transposition: bool,

    /// Ascending pitch classes, tonic first
    pub ascending_pitch_classes: Vec<PitchClass>,

    /// Pitch classes of the descent, normalized tonic-first
    pub descending_pitch_classes: Vec<PitchClass>,

    /// Pairwise intervals of the ascending sequence
    pub ascending_intervals: Vec<PitchClassInterval>,

    /// Pairwise intervals of the (tonic-first) descending sequence
    pub descending_intervals: Vec<PitchClassInterval>,

    /// Constituent jins per ascending scale degree, if one fits there
    #[serde(default)]
    pub ascending_jins: Vec<Option<Jins>>,

    /// Constituent jins per descending scale degree
    #[serde(default)]
    pub descending_jins: Vec<Option<Jins>>,

    /// Modulation results attached after classification; the only mutation a
    /// realized maqam ever receives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulations: Option<Box<ModulationTargets>>,
}

impl Maqam {
    /// Note name both sequences start on
    pub fn tonic(&self) -> Option<&str> {
        self.ascending_pitch_classes
            .first()
            .map(|pc| pc.note_name.as_str())
    }

    /// Ascending note names, tonic first
    pub fn ascending_note_names(&self) -> Vec<&str> {
        self.ascending_pitch_classes
            .iter()
            .map(|pc| pc.note_name.as_str())
            .collect()
    }

    /// The descent in its authored top-down order
    pub fn descending_top_down(&self) -> Vec<&PitchClass> {
        self.descending_pitch_classes.iter().rev().collect()
    }

    /// Attach modulation results to this realization
    pub fn attach_modulations(&mut self, targets: ModulationTargets) {
        self.modulations = Some(Box::new(targets));
    }
}
