//! Data models for the maqam analysis engine
//!
//! This module contains the pitch-class data model, the immutable catalog
//! template types, the realized jins/maqam instance types and the modulation
//! bucket set produced by the classifier.

pub mod jins;
pub mod maqam;
pub mod modulation;
pub mod pitch_class;
pub mod tuning_system;

// Re-export commonly used types
pub use jins::{Jins, JinsTemplate};
pub use maqam::{Maqam, MaqamTemplate};
pub use modulation::{DegreeCategory, ModulationBuckets, ModulationMode, ModulationTargets};
pub use pitch_class::{PitchClass, PitchClassInterval, PitchValue, PitchValueKind};
pub use tuning_system::{NoteNameSet, TuningSystem};

/// Sentinel note name for lattice positions with no vocabulary entry
pub const NO_NOTE_NAME: &str = "none";
