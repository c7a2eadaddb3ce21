//! Error Correction Feature
//!
//! Turns validation findings into concrete field-level repairs. Each
//! correction references a finding by its deterministic id and proposes an
//! old -> new value pair; the grid collaborator decides whether to apply
//! them (auto-apply is advisory and never set above the model's say-so).

use serde::{Deserialize, Serialize};

use data_loom_llm::{generate_structured, LlmProvider, MediatorOptions, OutputSchema, SchemaKind};
use data_loom_validation::{CorrectionSuggestion, ValidationError};

use super::FeatureError;

/// Result of one correction-generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionsResult {
    pub corrections: Vec<CorrectionSuggestion>,
}

/// Target schema for this feature.
pub fn schema() -> OutputSchema {
    let correction = OutputSchema::new("correction")
        .field("error_id", SchemaKind::String)
        .describe("the id of the finding being fixed, verbatim")
        .field("column", SchemaKind::String)
        .field("old_value", SchemaKind::String)
        .describe("the current cell value as text")
        .field("new_value", SchemaKind::String)
        .describe("the proposed replacement as text")
        .field("confidence", SchemaKind::Number)
        .describe("confidence between 0 and 1")
        .field("auto_apply", SchemaKind::Boolean)
        .describe("true only when the fix is mechanical and unambiguous");
    OutputSchema::new("error_corrections").field(
        "corrections",
        SchemaKind::Array {
            element: Box::new(SchemaKind::Object { schema: correction }),
        },
    )
}

/// Prompt template for this feature. `row_context` is a caller-built
/// excerpt of the offending rows.
pub fn prompt(errors: &[ValidationError], row_context: &str) -> String {
    let findings = errors
        .iter()
        .map(|e| {
            format!(
                "- id={} row={} column={} : {}",
                e.id, e.row, e.column, e.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "These validation findings were reported against uploaded scheduling \
         data. Propose a concrete fix for each finding you can repair; skip \
         findings that need human judgement.\n\
         Findings:\n{}\n\
         Offending rows:\n{}",
        findings, row_context
    )
}

/// Generate correction suggestions for a set of findings.
///
/// Confidence scores are clamped into [0, 1] before the result is handed
/// back; everything else is passed through untouched.
pub async fn suggest_corrections(
    provider: &dyn LlmProvider,
    errors: &[ValidationError],
    row_context: &str,
    options: &MediatorOptions,
) -> Result<Vec<CorrectionSuggestion>, FeatureError> {
    let value =
        generate_structured(provider, &prompt(errors, row_context), &schema(), options).await?;
    let result: CorrectionsResult = serde_json::from_value(value)?;
    Ok(result
        .corrections
        .into_iter()
        .map(CorrectionSuggestion::clamped)
        .collect())
}
