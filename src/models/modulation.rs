//! Modulation bucket set and degree-category labels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::jins::Jins;
use super::maqam::Maqam;

/// Whether the classifier targets jins entries or maqam entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModulationMode {
    Ajnas,
    Maqamat,
}

/// The scale-degree category a modulation is anchored at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DegreeCategory {
    First,
    Third,
    AltThird,
    Fourth,
    Fifth,
    SixthAscending,
    SixthDescending,
    SixthNoThird,
}

impl DegreeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeCategory::First => "first",
            DegreeCategory::Third => "third",
            DegreeCategory::AltThird => "altThird",
            DegreeCategory::Fourth => "fourth",
            DegreeCategory::Fifth => "fifth",
            DegreeCategory::SixthAscending => "sixthAscending",
            DegreeCategory::SixthDescending => "sixthDescending",
            DegreeCategory::SixthNoThird => "sixthNoThird",
        }
    }

    /// All categories in bucket order
    pub fn all() -> [DegreeCategory; 8] {
        [
            DegreeCategory::First,
            DegreeCategory::Third,
            DegreeCategory::AltThird,
            DegreeCategory::Fourth,
            DegreeCategory::Fifth,
            DegreeCategory::SixthAscending,
            DegreeCategory::SixthDescending,
            DegreeCategory::SixthNoThird,
        ]
    }
}

impl fmt::Display for DegreeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DegreeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(DegreeCategory::First),
            "third" => Ok(DegreeCategory::Third),
            "altThird" => Ok(DegreeCategory::AltThird),
            "fourth" => Ok(DegreeCategory::Fourth),
            "fifth" => Ok(DegreeCategory::Fifth),
            "sixthAscending" => Ok(DegreeCategory::SixthAscending),
            "sixthDescending" => Ok(DegreeCategory::SixthDescending),
            "sixthNoThird" => Ok(DegreeCategory::SixthNoThird),
            _ => Err(format!("Invalid degree category: '{s}'")),
        }
    }
}

/// Eight named lists of modulation targets plus the resolved alternate-third
/// note name (empty when the alternate third was not used)
///
/// Produced fresh per (source, mode) classification call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModulationBuckets<T> {
    pub on_first: Vec<T>,
    pub on_third: Vec<T>,
    pub on_alt_third: Vec<T>,
    pub on_fourth: Vec<T>,
    pub on_fifth: Vec<T>,
    pub on_sixth_ascending: Vec<T>,
    pub on_sixth_descending: Vec<T>,
    pub on_sixth_no_third: Vec<T>,
    pub alt_third_note: String,
}

impl<T> Default for ModulationBuckets<T> {
    fn default() -> Self {
        ModulationBuckets {
            on_first: Vec::new(),
            on_third: Vec::new(),
            on_alt_third: Vec::new(),
            on_fourth: Vec::new(),
            on_fifth: Vec::new(),
            on_sixth_ascending: Vec::new(),
            on_sixth_descending: Vec::new(),
            on_sixth_no_third: Vec::new(),
            alt_third_note: String::new(),
        }
    }
}

impl<T> ModulationBuckets<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, category: DegreeCategory) -> &Vec<T> {
        match category {
            DegreeCategory::First => &self.on_first,
            DegreeCategory::Third => &self.on_third,
            DegreeCategory::AltThird => &self.on_alt_third,
            DegreeCategory::Fourth => &self.on_fourth,
            DegreeCategory::Fifth => &self.on_fifth,
            DegreeCategory::SixthAscending => &self.on_sixth_ascending,
            DegreeCategory::SixthDescending => &self.on_sixth_descending,
            DegreeCategory::SixthNoThird => &self.on_sixth_no_third,
        }
    }

    pub fn bucket_mut(&mut self, category: DegreeCategory) -> &mut Vec<T> {
        match category {
            DegreeCategory::First => &mut self.on_first,
            DegreeCategory::Third => &mut self.on_third,
            DegreeCategory::AltThird => &mut self.on_alt_third,
            DegreeCategory::Fourth => &mut self.on_fourth,
            DegreeCategory::Fifth => &mut self.on_fifth,
            DegreeCategory::SixthAscending => &mut self.on_sixth_ascending,
            DegreeCategory::SixthDescending => &mut self.on_sixth_descending,
            DegreeCategory::SixthNoThird => &mut self.on_sixth_no_third,
        }
    }

    /// True when every bucket is empty
    pub fn is_empty(&self) -> bool {
        DegreeCategory::all()
            .iter()
            .all(|c| self.bucket(*c).is_empty())
    }
}

/// Mode-tagged classification result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ModulationTargets {
    Ajnas(ModulationBuckets<Jins>),
    Maqamat(ModulationBuckets<Maqam>),
}
