//! Shawwa classification of lattice pitches
//!
//! The historical modulation rules classify every note position as natural,
//! one-part (a single-limma alteration, the flat variants) or two-part (the
//! quarter-tone, half-flat variants) on a grid of 53 commas per octave. Only
//! classifiable positions take part in the degree-offset rules; everything
//! else is an unclassifiable microtonal deviation.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::PitchClass;

/// Commas per octave on the grid
pub const COMMAS_PER_OCTAVE: i64 = 53;

const COMMA_CENTS: f64 = 1200.0 / COMMAS_PER_OCTAVE as f64;

/// Historical classification of a pitch position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShawwaClass {
    Natural,
    OnePart,
    TwoPart,
    Unclassifiable,
}

lazy_static! {
    /// Comma position within the octave -> class. Natural positions cover
    /// the diatonic degrees in both their just and Pythagorean placements;
    /// one-part the flats; two-part the half-flats.
    static ref GRID: HashMap<i64, ShawwaClass> = {
        let mut grid = HashMap::new();
        for p in [0, 9, 17, 18, 22, 31, 39, 40, 48, 49] {
            grid.insert(p, ShawwaClass::Natural);
        }
        for p in [4, 5, 14, 26, 35, 36, 44, 45] {
            grid.insert(p, ShawwaClass::OnePart);
        }
        for p in [7, 16, 28, 38, 47] {
            grid.insert(p, ShawwaClass::TwoPart);
        }
        grid
    };

    /// Classifiable comma positions in ascending order; the shawwa index
    /// counts over these only
    static ref CLASSIFIABLE: Vec<i64> = {
        let mut positions: Vec<i64> = GRID.keys().copied().collect();
        positions.sort_unstable();
        positions
    };
}

/// Nearest grid position for a cents value (may span octaves)
pub fn comma_position(cents: f64) -> i64 {
    (cents / COMMA_CENTS).round() as i64
}

/// Class of a grid position, octave-periodic
pub fn class_of_comma(comma: i64) -> ShawwaClass {
    *GRID
        .get(&comma.rem_euclid(COMMAS_PER_OCTAVE))
        .unwrap_or(&ShawwaClass::Unclassifiable)
}

/// Class of a lattice pitch
pub fn class_of(pc: &PitchClass) -> ShawwaClass {
    class_of_comma(comma_position(pc.cents))
}

/// Ordinal of a pitch among classifiable grid positions, counted from the
/// grid origin; `None` for unclassifiable pitches
pub fn shawwa_index(pc: &PitchClass) -> Option<i64> {
    let comma = comma_position(pc.cents);
    let octaves = comma.div_euclid(COMMAS_PER_OCTAVE);
    let within = comma.rem_euclid(COMMAS_PER_OCTAVE);
    let ordinal = CLASSIFIABLE.binary_search(&within).ok()? as i64;
    Some(octaves * CLASSIFIABLE.len() as i64 + ordinal)
}
