//! Analytical engine for Arabic maqam music theory
//!
//! Given a historically documented tuning system, this library materializes a
//! multi-octave lattice of concrete pitch classes, searches that lattice for
//! every structurally valid transposition of a catalogued jins or maqam,
//! classifies which other catalogued entries are reachable as modulations from
//! a given maqam, and finds bounded paths through the resulting modulation
//! graph.
//!
//! The engine is a pure library: all four stages are synchronous functions
//! over immutable inputs. Catalog data (tuning systems, jins and maqam
//! templates) is supplied by the caller through [`Catalog`] and never mutated
//! or persisted here.

pub mod catalog;
pub mod error;
pub mod lattice;
pub mod models;
pub mod modulation;
pub mod routes;
pub mod transposition;

// Re-export commonly used types
pub use catalog::Catalog;
pub use error::EngineError;
pub use lattice::{build_lattice, Lattice};
pub use models::*;
pub use modulation::modulations;
pub use routes::{find_routes, ModulationGraph, RouteRequest, RouteResponse};
pub use transposition::{jins_transpositions, maqam_transpositions, DEFAULT_CENTS_TOLERANCE};
