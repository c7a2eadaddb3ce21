//! Data Loom Validation
//!
//! The cross-entity validation engine: a fixed, ordered catalog of
//! independent rules run over a snapshot of the three record collections
//! (clients, workers, tasks). Synchronous, deterministic, and free of I/O -
//! callers re-run it on every edit for immediate feedback.
//!
//! ## Module Organization
//!
//! - `models` - `ValidationError`, `CorrectionSuggestion`, severity/kind taxonomies
//! - `rules` - the rule catalog (independent pure functions)
//! - `engine` - `validate()` running the catalog in declaration order

pub mod engine;
pub mod models;
pub mod rules;

// Re-export main types
pub use engine::{validate, ValidationInput};
pub use models::{
    CorrectionSuggestion, ErrorKind, Severity, ValidationError, ValidationReport,
};
pub use rules::{catalog, Rule};
