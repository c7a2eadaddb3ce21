//! Boundary Operations
//!
//! The two operations collaborators call: synchronous validation of a
//! snapshot, and mediated structured generation against a named schema.
//! Both are thin - the machinery lives in the workspace crates.

use serde_json::Value;
use thiserror::Error;

use data_loom_core::Row;
use data_loom_llm::{create_provider, generate_structured as mediate, LlmProvider, MediatorError, MediatorOptions};
use data_loom_validation::{self as validation, ValidationReport};

use crate::config::AppConfig;
use crate::registry;

/// Failure of a `generate_structured` boundary call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown schema: {0}")]
    UnknownSchema(String),
    #[error(transparent)]
    Mediator(#[from] MediatorError),
}

/// Validate a snapshot of the three collections.
///
/// Synchronous and allocation-light; collaborators run it on every edit.
pub fn validate(clients: &[Row], workers: &[Row], tasks: &[Row]) -> ValidationReport {
    let report = ValidationReport::from_errors(validation::validate(clients, workers, tasks));
    tracing::debug!(
        clients = clients.len(),
        workers = workers.len(),
        tasks = tasks.len(),
        errors = report.error_count,
        warnings = report.warning_count,
        "validation pass"
    );
    report
}

/// Generate a structured value against a named schema, using the provider
/// selected by `config`. The provider is resolved fresh for this call and
/// dropped afterwards; failures never corrupt shared state.
pub async fn generate_structured(
    prompt: &str,
    schema_name: &str,
    config: &AppConfig,
) -> Result<Value, ApiError> {
    tracing::debug!(schema = schema_name, provider = %config.provider, "structured generation requested");
    let provider = create_provider(config.to_provider_config());
    generate_structured_with(provider.as_ref(), prompt, schema_name, &config.mediator_options())
        .await
}

/// Same contract with an explicit provider, for callers that manage their
/// own provider instances (and for tests with scripted stubs).
pub async fn generate_structured_with(
    provider: &dyn LlmProvider,
    prompt: &str,
    schema_name: &str,
    options: &MediatorOptions,
) -> Result<Value, ApiError> {
    let schema = registry::schema_for(schema_name)
        .ok_or_else(|| ApiError::UnknownSchema(schema_name.to_string()))?;
    Ok(mediate(provider, prompt, &schema, options).await?)
}
