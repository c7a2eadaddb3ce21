//! Rule Synthesis Feature
//!
//! Two closely related calls share this module: turning one
//! natural-language instruction into an allocation rule, and proposing
//! candidate rules from a profile of the uploaded data. Both produce the
//! same rule shape; suggestions additionally carry a confidence score.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use data_loom_llm::{generate_structured, LlmProvider, MediatorOptions, OutputSchema, SchemaKind};

use super::FeatureError;

/// Rule types understood by the downstream allocator.
pub const RULE_TYPES: [&str; 6] = [
    "co_run",
    "slot_restriction",
    "load_limit",
    "phase_window",
    "pattern_match",
    "precedence",
];

/// One allocation rule in its generic form: a type plus type-specific
/// parameters (e.g. `{"tasks": ["T1", "T3"]}` for a co-run rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRule {
    pub rule_type: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// A candidate rule proposed from the data profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSuggestion {
    pub rule_type: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Model confidence in [0, 1].
    pub confidence: f64,
}

/// Result of one rule-suggestions call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSuggestionsResult {
    pub suggestions: Vec<RuleSuggestion>,
}

/// Target schema for single-rule synthesis.
pub fn synthesis_schema() -> OutputSchema {
    OutputSchema::new("rule_synthesis")
        .field("rule_type", SchemaKind::String)
        .describe(format!("one of: {}", RULE_TYPES.join(", ")))
        .field("description", SchemaKind::String)
        .describe("one sentence restating the rule in plain language")
        .field("parameters", SchemaKind::Map)
        .describe("type-specific parameters, e.g. task ids, group names, phase lists")
}

/// Target schema for rule suggestions.
pub fn suggestions_schema() -> OutputSchema {
    let suggestion = OutputSchema::new("suggestion")
        .field("rule_type", SchemaKind::String)
        .describe(format!("one of: {}", RULE_TYPES.join(", ")))
        .field("description", SchemaKind::String)
        .field("parameters", SchemaKind::Map)
        .field("confidence", SchemaKind::Number)
        .describe("confidence between 0 and 1");
    OutputSchema::new("rule_suggestions").field(
        "suggestions",
        SchemaKind::Array {
            element: Box::new(SchemaKind::Object { schema: suggestion }),
        },
    )
}

/// Prompt template for single-rule synthesis.
pub fn synthesis_prompt(instruction: &str) -> String {
    format!(
        "Convert this scheduling instruction into one allocation rule.\n\
         Supported rule types: {}.\n\
         Instruction: {}",
        RULE_TYPES.join(", "),
        instruction
    )
}

/// Prompt template for rule suggestions. The profile is a caller-built
/// plain-text summary of the uploaded data (group sizes, recurring task
/// pairs, load hotspots).
pub fn suggestions_prompt(data_profile: &str) -> String {
    format!(
        "Given this profile of uploaded scheduling data, propose allocation \
         rules that would likely help.\n\
         Supported rule types: {}.\n\
         Data profile:\n{}",
        RULE_TYPES.join(", "),
        data_profile
    )
}

/// Turn a natural-language instruction into one allocation rule.
pub async fn synthesize_rule(
    provider: &dyn LlmProvider,
    instruction: &str,
    options: &MediatorOptions,
) -> Result<AllocationRule, FeatureError> {
    let value = generate_structured(
        provider,
        &synthesis_prompt(instruction),
        &synthesis_schema(),
        options,
    )
    .await?;
    Ok(serde_json::from_value(value)?)
}

/// Propose candidate rules from a data profile.
pub async fn suggest_rules(
    provider: &dyn LlmProvider,
    data_profile: &str,
    options: &MediatorOptions,
) -> Result<RuleSuggestionsResult, FeatureError> {
    let value = generate_structured(
        provider,
        &suggestions_prompt(data_profile),
        &suggestions_schema(),
        options,
    )
    .await?;
    Ok(serde_json::from_value(value)?)
}
