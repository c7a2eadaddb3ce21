//! Schema Registry
//!
//! Resolves the schema names exposed at the boundary to their
//! `OutputSchema` instances. Dispatch-by-name lives here at the edge so
//! the mediator itself never switches on feature strings.

use data_loom_llm::OutputSchema;

use crate::features::{column_mapping, corrections, rule_synthesis, search_filter};

/// Names accepted by `generate_structured`.
pub const SCHEMA_NAMES: [&str; 5] = [
    "column_mapping",
    "search_filter",
    "rule_synthesis",
    "rule_suggestions",
    "error_corrections",
];

/// Look up a target schema by boundary name.
pub fn schema_for(name: &str) -> Option<OutputSchema> {
    match name {
        "column_mapping" => Some(column_mapping::schema()),
        "search_filter" => Some(search_filter::schema()),
        "rule_synthesis" => Some(rule_synthesis::synthesis_schema()),
        "rule_suggestions" => Some(rule_synthesis::suggestions_schema()),
        "error_corrections" => Some(corrections::schema()),
        _ => None,
    }
}
