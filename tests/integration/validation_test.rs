//! Validation Engine Integration Tests
//!
//! The engine's observable properties, exercised through the public
//! `validate` boundary with realistic row snapshots.

use serde_json::json;

use data_loom::{columns, validate, ErrorKind, Row, Severity};

// ============================================================================
// Helper Functions
// ============================================================================

fn client_row(id: &str, priority: i64, requested: &str) -> Row {
    let mut row = Row::new();
    row.insert(columns::CLIENT_ID.into(), json!(id));
    row.insert(columns::CLIENT_NAME.into(), json!(format!("Client {}", id)));
    row.insert(columns::PRIORITY_LEVEL.into(), json!(priority));
    row.insert(columns::REQUESTED_TASK_IDS.into(), json!(requested));
    row.insert(columns::GROUP_TAG.into(), json!("alpha"));
    row
}

fn worker_row(id: &str, skills: &str, slots: serde_json::Value, max_load: i64) -> Row {
    let mut row = Row::new();
    row.insert(columns::WORKER_ID.into(), json!(id));
    row.insert(columns::WORKER_NAME.into(), json!(format!("Worker {}", id)));
    row.insert(columns::SKILLS.into(), json!(skills));
    row.insert(columns::AVAILABLE_SLOTS.into(), slots);
    row.insert(columns::MAX_LOAD_PER_PHASE.into(), json!(max_load));
    row.insert(columns::WORKER_GROUP.into(), json!("crew-a"));
    row.insert(columns::QUALIFICATION_LEVEL.into(), json!("senior"));
    row
}

fn task_row(id: &str, duration: i64, skills: &str) -> Row {
    let mut row = Row::new();
    row.insert(columns::TASK_ID.into(), json!(id));
    row.insert(columns::TASK_NAME.into(), json!(format!("Task {}", id)));
    row.insert(columns::CATEGORY.into(), json!("general"));
    row.insert(columns::DURATION.into(), json!(duration));
    row.insert(columns::REQUIRED_SKILLS.into(), json!(skills));
    row.insert(columns::PREFERRED_PHASES.into(), json!([1, 2]));
    row.insert(columns::MAX_CONCURRENT.into(), json!(1));
    row
}

// ============================================================================
// Spec Properties
// ============================================================================

#[test]
fn empty_collections_produce_no_errors() {
    let report = validate(&[], &[], &[]);
    assert!(report.errors.is_empty());
    assert!(!report.has_blocking_errors());
}

#[test]
fn duplicate_ids_report_one_error_per_extra_occurrence() {
    let clients = vec![
        client_row("C1", 3, ""),
        client_row("C2", 3, ""),
        client_row("C1", 3, ""),
        client_row("C1", 3, ""),
    ];
    let report = validate(&clients, &[], &[]);
    let duplicates: Vec<_> = report
        .errors
        .iter()
        .filter(|e| e.kind == ErrorKind::DuplicateId)
        .collect();
    // Three occurrences of C1 -> two findings, at the second and third rows
    assert_eq!(duplicates.len(), 2);
    assert_eq!(duplicates[0].row, 2);
    assert_eq!(duplicates[1].row, 3);
}

#[test]
fn repeated_validation_is_byte_identical() {
    let clients = vec![client_row("C1", 9, "T1,T99")];
    let workers = vec![worker_row("W1", "welding", json!([1, 2]), 4)];
    let tasks = vec![task_row("T1", 0, "plumbing")];

    let first = validate(&clients, &workers, &tasks);
    let second = validate(&clients, &workers, &tasks);
    assert_eq!(
        serde_json::to_vec(&first.errors).unwrap(),
        serde_json::to_vec(&second.errors).unwrap()
    );
}

#[test]
fn unknown_task_reference_is_reported_with_column() {
    let clients = vec![client_row("C1", 3, "T99")];
    let tasks = vec![task_row("T1", 2, "")];
    let report = validate(&clients, &[], &tasks);

    let unknown: Vec<_> = report
        .errors
        .iter()
        .filter(|e| e.kind == ErrorKind::UnknownReference)
        .collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].column, columns::REQUESTED_TASK_IDS);
    assert_eq!(unknown[0].severity, Severity::Error);
    assert!(unknown[0].message.contains("T99"));
}

#[test]
fn overloaded_worker_is_a_warning_not_an_error() {
    let workers = vec![worker_row("W1", "welding", json!([1, 2]), 4)];
    let report = validate(&[], &workers, &[]);

    let overloaded: Vec<_> = report
        .errors
        .iter()
        .filter(|e| e.kind == ErrorKind::OverloadedWorker)
        .collect();
    assert_eq!(overloaded.len(), 1);
    assert_eq!(overloaded[0].severity, Severity::Warning);
    assert!(!report.has_blocking_errors());
    assert_eq!(report.warning_count, 1);
}

// ============================================================================
// Mixed Snapshots
// ============================================================================

#[test]
fn mixed_snapshot_reports_in_catalog_order() {
    let clients = vec![client_row("C1", 9, "T1")];
    let workers = vec![worker_row("W1", "welding", json!([1]), 3)];
    let tasks = vec![task_row("T1", 2, "plumbing")];

    let report = validate(&clients, &workers, &tasks);
    let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::OutOfRange,       // priority 9
            ErrorKind::OverloadedWorker, // load 3 vs 1 slot
            ErrorKind::UncoveredSkill,   // nobody offers plumbing
        ]
    );
    assert_eq!(report.error_count, 1);
    assert_eq!(report.warning_count, 2);
    assert!(report.has_blocking_errors());
}

#[test]
fn malformed_cells_degrade_to_field_errors() {
    // A worker row whose slots cell is garbage must not prevent the other
    // rules (or the other rows) from reporting.
    let workers = vec![
        worker_row("W1", "welding", json!("not-a-list"), 1),
        worker_row("W1", "qa", json!([1]), 1),
    ];
    let report = validate(&[], &workers, &[]);
    let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&ErrorKind::DuplicateId));
    assert!(kinds.contains(&ErrorKind::MalformedArray));
}

#[test]
fn missing_columns_reported_once_per_entity() {
    let mut bare = Row::new();
    bare.insert(columns::TASK_ID.into(), json!("T1"));
    let tasks = vec![bare.clone(), bare];

    let report = validate(&[], &[], &tasks);
    let missing: Vec<_> = report
        .errors
        .iter()
        .filter(|e| e.kind == ErrorKind::MissingColumns)
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains(columns::DURATION));
    assert!(missing[0].message.contains(columns::MAX_CONCURRENT));
}

#[test]
fn invalid_attributes_blob_is_flagged() {
    let mut client = client_row("C1", 3, "");
    client.insert(columns::ATTRIBUTES_JSON.into(), json!("{oops"));
    let report = validate(&[client], &[], &[]);
    assert!(report
        .errors
        .iter()
        .any(|e| e.kind == ErrorKind::InvalidJson));
}
