//! Search Filter Feature
//!
//! Translates a natural-language query ("workers with welding and more
//! than two slots") into a typed filter list the grid collaborator can
//! apply locally. The model only translates; filtering itself never goes
//! through the model.

use serde::{Deserialize, Serialize};

use data_loom_core::EntityKind;
use data_loom_llm::{generate_structured, LlmProvider, MediatorOptions, OutputSchema, SchemaKind};

use super::FeatureError;

/// Comparison operator of one filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
}

/// One column comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilter {
    pub column: String,
    pub op: FilterOp,
    /// Comparison value as text; numeric columns are coerced by the caller.
    pub value: String,
}

/// A translated query: which entity to search and the filters to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub entity: EntityKind,
    pub filters: Vec<SearchFilter>,
}

/// Target schema for this feature.
pub fn schema() -> OutputSchema {
    let filter = OutputSchema::new("filter")
        .field("column", SchemaKind::String)
        .describe("a canonical column name")
        .field("op", SchemaKind::String)
        .describe("one of: eq, ne, gt, gte, lt, lte, contains")
        .field("value", SchemaKind::String)
        .describe("the comparison value as text");
    OutputSchema::new("search_filter")
        .field("entity", SchemaKind::String)
        .describe("one of: client, worker, task")
        .field(
            "filters",
            SchemaKind::Array {
                element: Box::new(SchemaKind::Object { schema: filter }),
            },
        )
}

/// Prompt template for this feature.
pub fn prompt(query: &str) -> String {
    format!(
        "Translate this data query into filters over one of three sheets.\n\
         client columns: {client}.\n\
         worker columns: {worker}.\n\
         task columns: {task}.\n\
         Query: {query}",
        client = EntityKind::Client.required_columns().join(", "),
        worker = EntityKind::Worker.required_columns().join(", "),
        task = EntityKind::Task.required_columns().join(", "),
        query = query,
    )
}

/// Translate a natural-language query into a typed filter list.
pub async fn translate_search(
    provider: &dyn LlmProvider,
    query: &str,
    options: &MediatorOptions,
) -> Result<SearchQuery, FeatureError> {
    let value = generate_structured(provider, &prompt(query), &schema(), options).await?;
    Ok(serde_json::from_value(value)?)
}
