//! Engine error taxonomy
//!
//! Only caller contract violations are errors: unknown catalog ids and
//! out-of-range search bounds. Analytical dead ends (an unbuildable lattice,
//! a template with no realization, an empty modulation bucket) are ordinary
//! empty results, never errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown tuning system id '{0}'")]
    UnknownTuningSystem(String),

    #[error("unknown catalog entry id '{0}'")]
    UnknownEntry(String),

    #[error("the hop ceiling must be at least 1")]
    InvalidHopCeiling,

    #[error("the result limit must be at least 1")]
    InvalidResultLimit,
}
