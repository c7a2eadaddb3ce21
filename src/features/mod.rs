//! AI-Assisted Features
//!
//! The five features that ride on the structured-output mediator. Each is
//! a distinct prompt template and target schema over the same contract:
//! - `column_mapping` - loose upload headers -> canonical columns
//! - `search_filter` - natural-language query -> typed filters
//! - `rule_synthesis` - natural-language instruction -> allocation rule
//! - `rule_suggestions` - data profile -> candidate rules
//! - `corrections` - validation findings -> field-level repairs

pub mod column_mapping;
pub mod corrections;
pub mod rule_synthesis;
pub mod search_filter;

use thiserror::Error;

use data_loom_llm::MediatorError;

/// Failure of one feature call: either the mediation itself failed, or the
/// schema-validated value would not deserialize into the feature's typed
/// result (a schema/struct drift bug, not a model problem).
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("mediation failed: {0}")]
    Mediator(#[from] MediatorError),
    #[error("feature result did not deserialize: {0}")]
    Decode(#[from] serde_json::Error),
}
