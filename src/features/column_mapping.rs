//! Column Mapping Feature
//!
//! Infers which canonical column each loosely-named upload header
//! corresponds to ("client id", "Priority", "tasks requested" -> ClientID,
//! PriorityLevel, RequestedTaskIDs), so uploads survive header drift.

use serde::{Deserialize, Serialize};

use data_loom_core::EntityKind;
use data_loom_llm::{generate_structured, LlmProvider, MediatorOptions, OutputSchema, SchemaKind};

use super::FeatureError;

/// One inferred header mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Header as it appeared in the upload.
    pub source: String,
    /// Canonical column it maps to, or "" when no match exists.
    pub target: String,
    /// Model confidence in [0, 1].
    pub confidence: f64,
}

/// Result of one column-mapping call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMappingResult {
    pub mappings: Vec<ColumnMapping>,
}

/// Target schema for this feature.
pub fn schema() -> OutputSchema {
    let mapping = OutputSchema::new("mapping")
        .field("source", SchemaKind::String)
        .describe("the uploaded header, verbatim")
        .field("target", SchemaKind::String)
        .describe("the canonical column name, or an empty string for no match")
        .field("confidence", SchemaKind::Number)
        .describe("confidence between 0 and 1");
    OutputSchema::new("column_mapping").field(
        "mappings",
        SchemaKind::Array {
            element: Box::new(SchemaKind::Object { schema: mapping }),
        },
    )
}

/// Prompt template for this feature.
pub fn prompt(entity: EntityKind, headers: &[String]) -> String {
    format!(
        "You are mapping spreadsheet headers for a {} upload to this fixed schema.\n\
         Canonical columns: {}.\n\
         Uploaded headers: {}.\n\
         Map every uploaded header to the canonical column it most likely means.",
        entity,
        entity.required_columns().join(", "),
        headers.join(", ")
    )
}

/// Infer mappings from upload headers to canonical columns.
pub async fn map_columns(
    provider: &dyn LlmProvider,
    entity: EntityKind,
    headers: &[String],
    options: &MediatorOptions,
) -> Result<ColumnMappingResult, FeatureError> {
    let value = generate_structured(provider, &prompt(entity, headers), &schema(), options).await?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_canonical_columns() {
        let text = prompt(
            EntityKind::Client,
            &["client id".to_string(), "Priority".to_string()],
        );
        assert!(text.contains("ClientID"));
        assert!(text.contains("PriorityLevel"));
        assert!(text.contains("client id"));
    }

    #[test]
    fn test_schema_round_trips_typed_result() {
        let value = serde_json::json!({
            "mappings": [
                { "source": "client id", "target": "ClientID", "confidence": 0.97 }
            ]
        });
        schema().validate_value(&value).unwrap();
        let result: ColumnMappingResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.mappings[0].target, "ClientID");
    }
}
