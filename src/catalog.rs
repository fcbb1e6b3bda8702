//! Read-only catalog view injected into every engine call
//!
//! The catalog provider is process-wide immutable reference data. It is
//! modeled as borrowed slices passed by reference into each component call,
//! never as a global: the engine reads ids and note-name lists, nothing more.

use crate::lattice::Lattice;
use crate::models::{JinsTemplate, MaqamTemplate, TuningSystem};

/// Borrowed, read-only view over the catalog collections
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub tuning_systems: &'a [TuningSystem],
    pub ajnas: &'a [JinsTemplate],
    pub maqamat: &'a [MaqamTemplate],
}

impl<'a> Catalog<'a> {
    pub fn new(
        tuning_systems: &'a [TuningSystem],
        ajnas: &'a [JinsTemplate],
        maqamat: &'a [MaqamTemplate],
    ) -> Self {
        Catalog {
            tuning_systems,
            ajnas,
            maqamat,
        }
    }

    /// Tuning system by stable id
    pub fn tuning_system(&self, id: &str) -> Option<&'a TuningSystem> {
        self.tuning_systems.iter().find(|ts| ts.id == id)
    }

    /// Jins template by stable id
    pub fn jins(&self, id: &str) -> Option<&'a JinsTemplate> {
        self.ajnas.iter().find(|j| j.id == id)
    }

    /// Maqam template by stable id
    pub fn maqam(&self, id: &str) -> Option<&'a MaqamTemplate> {
        self.maqamat.iter().find(|m| m.id == id)
    }

    /// Jins templates whose every required note name exists in the lattice
    pub fn ajnas_for(&self, lattice: &Lattice) -> Vec<&'a JinsTemplate> {
        self.ajnas
            .iter()
            .filter(|j| j.note_names.iter().all(|n| lattice.contains_note(n)))
            .collect()
    }

    /// Maqam templates whose every required note name exists in the lattice
    pub fn maqamat_for(&self, lattice: &Lattice) -> Vec<&'a MaqamTemplate> {
        self.maqamat
            .iter()
            .filter(|m| m.required_note_names().all(|n| lattice.contains_note(n)))
            .collect()
    }
}
