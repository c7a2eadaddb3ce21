//! Structured-Output Mediator Integration Tests
//!
//! Drives the mediator and the feature wrappers end to end against
//! scripted provider stubs: hostile response shapes, rate-limit storms,
//! and budget exhaustion.

use serde_json::json;

use data_loom::api::generate_structured_with;
use data_loom::features::{column_mapping, corrections};
use data_loom::{
    create_provider, ApiError, AttemptError, EntityKind, ErrorKind, LlmError, LlmProvider,
    MediatorError, MediatorOptions, ProviderConfig, ProviderType, ValidationError,
};

use super::stub::{Script, ScriptedProvider};

fn mapping_reply() -> String {
    json!({
        "mappings": [
            { "source": "client id", "target": "ClientID", "confidence": 0.95 }
        ]
    })
    .to_string()
}

// ============================================================================
// Retry Behavior
// ============================================================================

#[tokio::test(start_paused = true)]
async fn rate_limited_twice_then_success_returns_the_value() {
    let provider = ScriptedProvider::new(vec![
        Script::Fail(ScriptedProvider::rate_limited()),
        Script::Fail(ScriptedProvider::rate_limited()),
        Script::Reply(mapping_reply()),
    ]);

    let value = generate_structured_with(
        &provider,
        "map these headers",
        "column_mapping",
        &MediatorOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(value["mappings"][0]["target"], "ClientID");
    // Two waits plus the success - well inside the rate-limit budget of 5
    assert_eq!(provider.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn permanently_malformed_json_exhausts_the_attempt_budget() {
    let provider = ScriptedProvider::new(vec![
        Script::Reply("I'd rather chat about the weather".to_string()),
        Script::Reply("{\"mappings\": [".to_string()),
        Script::Reply("{{not json}}".to_string()),
    ]);

    let err = generate_structured_with(
        &provider,
        "map these headers",
        "column_mapping",
        &MediatorOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(provider.calls(), 3);
    match err {
        ApiError::Mediator(MediatorError::Exhausted { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(last, AttemptError::Parse { .. }));
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn fenced_responses_are_recovered() {
    let fenced = format!("```json\n{}\n```", mapping_reply());
    let provider = ScriptedProvider::new(vec![Script::Reply(fenced)]);

    let value = generate_structured_with(
        &provider,
        "map these headers",
        "column_mapping",
        &MediatorOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(value["mappings"][0]["source"], "client id");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn conversational_wrapper_is_recovered() {
    let wrapped = format!("Sure, here you go:\n{}\nHope that helps!", mapping_reply());
    let provider = ScriptedProvider::new(vec![Script::Reply(wrapped)]);

    let value = generate_structured_with(
        &provider,
        "map these headers",
        "column_mapping",
        &MediatorOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(value["mappings"][0]["confidence"], 0.95);
}

#[tokio::test]
async fn transport_errors_are_not_retried() {
    let provider = ScriptedProvider::new(vec![Script::Fail(LlmError::ServerError {
        message: "upstream exploded".to_string(),
        status: Some(502),
    })]);

    let err = generate_structured_with(
        &provider,
        "map these headers",
        "column_mapping",
        &MediatorOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(provider.calls(), 1);
    assert!(matches!(
        err,
        ApiError::Mediator(MediatorError::Provider(LlmError::ServerError { .. }))
    ));
}

// ============================================================================
// Feature Wrappers
// ============================================================================

#[tokio::test(start_paused = true)]
async fn column_mapping_feature_returns_typed_result() {
    let provider = ScriptedProvider::new(vec![Script::Reply(mapping_reply())]);
    let result = column_mapping::map_columns(
        &provider,
        EntityKind::Client,
        &["client id".to_string()],
        &MediatorOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(result.mappings.len(), 1);
    assert_eq!(result.mappings[0].target, "ClientID");
}

#[tokio::test(start_paused = true)]
async fn corrections_feature_clamps_confidence() {
    let finding = ValidationError::new(
        ErrorKind::OutOfRange,
        EntityKind::Client,
        0,
        "PriorityLevel",
        "PriorityLevel must be between 1 and 5, got 9",
    );
    let reply = json!({
        "corrections": [{
            "error_id": finding.id,
            "column": "PriorityLevel",
            "old_value": "9",
            "new_value": "5",
            "confidence": 1.4,
            "auto_apply": true
        }]
    })
    .to_string();

    let provider = ScriptedProvider::new(vec![Script::Reply(reply)]);
    let corrections = corrections::suggest_corrections(
        &provider,
        std::slice::from_ref(&finding),
        "row 0: {\"PriorityLevel\": 9}",
        &MediatorOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0].error_id, finding.id);
    assert_eq!(corrections[0].confidence, 1.0);
}

#[tokio::test(start_paused = true)]
async fn schema_mismatch_costs_an_attempt_then_recovers() {
    // First reply parses but violates the schema (confidence is a string)
    let bad = json!({
        "mappings": [{ "source": "x", "target": "ClientID", "confidence": "high" }]
    })
    .to_string();
    let provider =
        ScriptedProvider::new(vec![Script::Reply(bad), Script::Reply(mapping_reply())]);

    let value = generate_structured_with(
        &provider,
        "map these headers",
        "column_mapping",
        &MediatorOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(provider.calls(), 2);
    assert_eq!(value["mappings"][0]["confidence"], 0.95);
}

// ============================================================================
// Provider Health
// ============================================================================

#[tokio::test]
async fn unreachable_backend_reads_unhealthy_not_error() {
    // A real Ollama provider pointed at a port nothing listens on: the
    // probe must come back false rather than erroring.
    let mut config = ProviderConfig::for_provider(ProviderType::Ollama);
    config.base_url = Some("http://127.0.0.1:9".to_string());
    let provider = create_provider(config);
    assert!(!provider.is_healthy().await);
}

#[tokio::test]
async fn scripted_health_flag_is_reported() {
    let healthy = ScriptedProvider::new(vec![]);
    assert!(healthy.is_healthy().await);
    let unhealthy = ScriptedProvider::new(vec![]).unhealthy();
    assert!(!unhealthy.is_healthy().await);
}
