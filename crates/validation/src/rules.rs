//! Rule Catalog
//!
//! An ordered list of independent validation rules, each a pure function of
//! the snapshot. Rules never abort the pass: a rule missing its
//! prerequisite columns degrades to whatever it can still see, and
//! malformed per-row data becomes a field-level finding.
//!
//! New rules are added by appending to `CATALOG`; existing rules are never
//! touched, which keeps their finding order stable for callers.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use data_loom_core::row::{self, FieldRead};
use data_loom_core::{columns, EntityKind};

use crate::engine::ValidationInput;
use crate::models::{ErrorKind, ValidationError};

/// One catalog entry: a name for diagnostics and the check itself.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&ValidationInput) -> Vec<ValidationError>,
}

/// Entity iteration order used by every per-entity rule.
const ENTITIES: [EntityKind; 3] = [EntityKind::Client, EntityKind::Worker, EntityKind::Task];

/// Element type an array column declares.
#[derive(Debug, Clone, Copy)]
enum ElementType {
    Text,
    Integer,
}

/// Array-typed columns per entity.
const ARRAY_FIELDS: &[(EntityKind, &str, ElementType)] = &[
    (
        EntityKind::Client,
        columns::REQUESTED_TASK_IDS,
        ElementType::Text,
    ),
    (EntityKind::Worker, columns::SKILLS, ElementType::Text),
    (
        EntityKind::Worker,
        columns::AVAILABLE_SLOTS,
        ElementType::Integer,
    ),
    (EntityKind::Task, columns::REQUIRED_SKILLS, ElementType::Text),
    (
        EntityKind::Task,
        columns::PREFERRED_PHASES,
        ElementType::Integer,
    ),
];

/// Bounded numeric columns: (entity, column, low, high).
const BOUNDED_FIELDS: &[(EntityKind, &str, i64, i64)] =
    &[(EntityKind::Client, columns::PRIORITY_LEVEL, 1, 5)];

/// Minimum-value numeric columns: (entity, column, floor).
const MINIMUM_FIELDS: &[(EntityKind, &str, i64)] = &[
    (EntityKind::Worker, columns::MAX_LOAD_PER_PHASE, 1),
    (EntityKind::Task, columns::DURATION, 1),
    (EntityKind::Task, columns::MAX_CONCURRENT, 1),
];

const CATALOG: [Rule; 8] = [
    Rule {
        name: "required_columns",
        check: required_columns,
    },
    Rule {
        name: "unique_ids",
        check: unique_ids,
    },
    Rule {
        name: "well_formed_arrays",
        check: well_formed_arrays,
    },
    Rule {
        name: "numeric_bounds",
        check: numeric_bounds,
    },
    Rule {
        name: "attributes_json",
        check: attributes_json,
    },
    Rule {
        name: "references_resolve",
        check: references_resolve,
    },
    Rule {
        name: "worker_capacity",
        check: worker_capacity,
    },
    Rule {
        name: "skill_coverage",
        check: skill_coverage,
    },
];

/// The ordered rule catalog.
pub fn catalog() -> &'static [Rule] {
    &CATALOG
}

/// Cap raw cell text quoted into messages.
fn snippet(raw: &str) -> String {
    const MAX: usize = 80;
    if raw.chars().count() <= MAX {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(MAX).collect();
        format!("{}...", head)
    }
}

// ---------------------------------------------------------------------------
// Rule 1: required columns
// ---------------------------------------------------------------------------

/// At most one aggregate finding per entity, naming every absent column.
/// Empty collections are skipped - there is nothing to inspect yet.
fn required_columns(input: &ValidationInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for entity in ENTITIES {
        let rows = input.rows(entity);
        if rows.is_empty() {
            continue;
        }
        let seen: HashSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        let missing: Vec<&str> = entity
            .required_columns()
            .iter()
            .copied()
            .filter(|col| !seen.contains(col))
            .collect();
        if !missing.is_empty() {
            errors.push(
                ValidationError::new(
                    ErrorKind::MissingColumns,
                    entity,
                    0,
                    "",
                    format!(
                        "{} upload is missing required column(s): {}",
                        entity,
                        missing.join(", ")
                    ),
                )
                .with_suggestions(vec![format!(
                    "add the column(s) {} to the {} sheet and re-upload",
                    missing.join(", "),
                    entity
                )]),
            );
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Rule 2: identifier uniqueness
// ---------------------------------------------------------------------------

/// One finding per duplicate occurrence beyond the first.
fn unique_ids(input: &ValidationInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for entity in ENTITIES {
        let id_column = entity.id_column();
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for (i, row) in input.rows(entity).iter().enumerate() {
            let Some(id) = row::text_field(row, id_column) else {
                continue;
            };
            match first_seen.get(&id) {
                Some(first) => errors.push(ValidationError::new(
                    ErrorKind::DuplicateId,
                    entity,
                    i,
                    id_column,
                    format!(
                        "duplicate {} \"{}\" (first used at row {})",
                        id_column, id, first
                    ),
                )),
                None => {
                    first_seen.insert(id, i);
                }
            }
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Rule 3: array well-formedness
// ---------------------------------------------------------------------------

fn well_formed_arrays(input: &ValidationInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for &(entity, column, element_type) in ARRAY_FIELDS {
        for (i, row) in input.rows(entity).iter().enumerate() {
            let read = match element_type {
                ElementType::Text => row::string_array(row, column),
                ElementType::Integer => widen_numbers(row::number_array(row, column)),
            };
            match read {
                FieldRead::Missing => {}
                FieldRead::Invalid(raw) => errors.push(ValidationError::new(
                    ErrorKind::MalformedArray,
                    entity,
                    i,
                    column,
                    format!("{} is not a sequence: {}", column, snippet(&raw)),
                )),
                FieldRead::Value(parsed) => {
                    for (index, raw) in parsed.invalid {
                        let expected = match element_type {
                            ElementType::Text => "text",
                            ElementType::Integer => "an integer",
                        };
                        errors.push(
                            ValidationError::new(
                                ErrorKind::InvalidArrayElement,
                                entity,
                                i,
                                column,
                                format!(
                                    "{} element {} is not {}: {}",
                                    column,
                                    index,
                                    expected,
                                    snippet(&raw)
                                ),
                            )
                            .with_discriminator(index),
                        );
                    }
                }
            }
        }
    }
    errors
}

/// Widen a numeric array read so both readers flow through one match arm.
/// Only the invalid list matters here; the values are not inspected again.
fn widen_numbers(read: FieldRead<row::ParsedArray<i64>>) -> FieldRead<row::ParsedArray<String>> {
    match read {
        FieldRead::Missing => FieldRead::Missing,
        FieldRead::Invalid(raw) => FieldRead::Invalid(raw),
        FieldRead::Value(parsed) => FieldRead::Value(row::ParsedArray {
            values: parsed.values.iter().map(|n| n.to_string()).collect(),
            invalid: parsed.invalid,
        }),
    }
}

// ---------------------------------------------------------------------------
// Rule 4: numeric bounds and minimums
// ---------------------------------------------------------------------------

fn numeric_bounds(input: &ValidationInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for &(entity, column, low, high) in BOUNDED_FIELDS {
        for (i, row) in input.rows(entity).iter().enumerate() {
            match row::integer_field(row, column) {
                FieldRead::Missing => {}
                FieldRead::Invalid(raw) => errors.push(ValidationError::new(
                    ErrorKind::OutOfRange,
                    entity,
                    i,
                    column,
                    format!("{} is not a number: {}", column, snippet(&raw)),
                )),
                FieldRead::Value(n) if n < low || n > high => errors.push(
                    ValidationError::new(
                        ErrorKind::OutOfRange,
                        entity,
                        i,
                        column,
                        format!("{} must be between {} and {}, got {}", column, low, high, n),
                    )
                    .with_suggestions(vec![format!(
                        "set {} to a value between {} and {}",
                        column, low, high
                    )]),
                ),
                FieldRead::Value(_) => {}
            }
        }
    }
    for &(entity, column, floor) in MINIMUM_FIELDS {
        for (i, row) in input.rows(entity).iter().enumerate() {
            match row::integer_field(row, column) {
                FieldRead::Missing => {}
                FieldRead::Invalid(raw) => errors.push(ValidationError::new(
                    ErrorKind::BelowMinimum,
                    entity,
                    i,
                    column,
                    format!("{} is not a number: {}", column, snippet(&raw)),
                )),
                FieldRead::Value(n) if n < floor => errors.push(ValidationError::new(
                    ErrorKind::BelowMinimum,
                    entity,
                    i,
                    column,
                    format!("{} must be at least {}, got {}", column, floor, n),
                )),
                FieldRead::Value(_) => {}
            }
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Rule 5: embedded attribute blobs
// ---------------------------------------------------------------------------

/// `AttributesJSON` cells must hold valid JSON when present and non-empty.
/// Cells already decoded to structured values pass by construction.
fn attributes_json(input: &ValidationInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, row) in input.clients.iter().enumerate() {
        let Some(value) = row.get(columns::ATTRIBUTES_JSON) else {
            continue;
        };
        if let Value::String(s) = value {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                continue;
            }
            if serde_json::from_str::<Value>(trimmed).is_err() {
                errors.push(ValidationError::new(
                    ErrorKind::InvalidJson,
                    EntityKind::Client,
                    i,
                    columns::ATTRIBUTES_JSON,
                    format!(
                        "{} is not valid JSON: {}",
                        columns::ATTRIBUTES_JSON,
                        snippet(trimmed)
                    ),
                ));
            }
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Rule 6: cross-entity references
// ---------------------------------------------------------------------------

/// Every client-requested task id must exist in the task collection.
/// With no tasks uploaded yet the rule stays silent rather than flagging
/// every reference; the task-side rules take over once tasks arrive.
fn references_resolve(input: &ValidationInput) -> Vec<ValidationError> {
    if input.tasks.is_empty() {
        return Vec::new();
    }
    let task_ids: HashSet<String> = input
        .tasks
        .iter()
        .filter_map(|row| row::text_field(row, columns::TASK_ID))
        .collect();

    let mut errors = Vec::new();
    for (i, row) in input.clients.iter().enumerate() {
        let FieldRead::Value(parsed) = row::string_array(row, columns::REQUESTED_TASK_IDS) else {
            continue;
        };
        for task_id in parsed.values {
            if !task_ids.contains(&task_id) {
                errors.push(
                    ValidationError::new(
                        ErrorKind::UnknownReference,
                        EntityKind::Client,
                        i,
                        columns::REQUESTED_TASK_IDS,
                        format!("requested task \"{}\" does not exist", task_id),
                    )
                    .with_discriminator(&task_id)
                    .with_suggestions(vec![format!(
                        "remove \"{}\" from {} or add the task to the tasks sheet",
                        task_id,
                        columns::REQUESTED_TASK_IDS
                    )]),
                );
            }
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Rule 7: worker capacity (warning)
// ---------------------------------------------------------------------------

/// A worker whose max load exceeds its slot count may be legitimately
/// under-slotted, so this reports a warning rather than an error.
fn worker_capacity(input: &ValidationInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, row) in input.workers.iter().enumerate() {
        let Some(slots) = row::number_array(row, columns::AVAILABLE_SLOTS).ok() else {
            continue;
        };
        let Some(max_load) = row::integer_field(row, columns::MAX_LOAD_PER_PHASE).ok() else {
            continue;
        };
        let slot_count = slots.values.len() as i64;
        if max_load > slot_count {
            errors.push(
                ValidationError::new(
                    ErrorKind::OverloadedWorker,
                    EntityKind::Worker,
                    i,
                    columns::MAX_LOAD_PER_PHASE,
                    format!(
                        "{} of {} exceeds the {} available slot(s)",
                        columns::MAX_LOAD_PER_PHASE,
                        max_load,
                        slot_count
                    ),
                )
                .with_suggestions(vec![format!(
                    "lower {} to {} or add more slots to {}",
                    columns::MAX_LOAD_PER_PHASE,
                    slot_count,
                    columns::AVAILABLE_SLOTS
                )]),
            );
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Rule 8: skill coverage (warning)
// ---------------------------------------------------------------------------

/// Every task-required skill should be offered by at least one worker.
/// Matching is case-insensitive; a coverage gap is a warning since skills
/// may be acquired later. With no workers uploaded the rule stays silent.
fn skill_coverage(input: &ValidationInput) -> Vec<ValidationError> {
    if input.workers.is_empty() {
        return Vec::new();
    }
    let offered: HashSet<String> = input
        .workers
        .iter()
        .filter_map(|row| row::string_array(row, columns::SKILLS).ok())
        .flat_map(|parsed| parsed.values)
        .map(|skill| skill.to_lowercase())
        .collect();

    let mut errors = Vec::new();
    for (i, row) in input.tasks.iter().enumerate() {
        let FieldRead::Value(parsed) = row::string_array(row, columns::REQUIRED_SKILLS) else {
            continue;
        };
        for skill in parsed.values {
            if !offered.contains(&skill.to_lowercase()) {
                errors.push(
                    ValidationError::new(
                        ErrorKind::UncoveredSkill,
                        EntityKind::Task,
                        i,
                        columns::REQUIRED_SKILLS,
                        format!("no worker offers required skill \"{}\"", skill),
                    )
                    .with_discriminator(&skill),
                );
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use data_loom_core::Row;
    use serde_json::json;

    fn client_row(id: &str, tasks: Value) -> Row {
        let mut row = Row::new();
        row.insert(columns::CLIENT_ID.into(), json!(id));
        row.insert(columns::CLIENT_NAME.into(), json!("Client"));
        row.insert(columns::PRIORITY_LEVEL.into(), json!(3));
        row.insert(columns::REQUESTED_TASK_IDS.into(), tasks);
        row.insert(columns::GROUP_TAG.into(), json!("alpha"));
        row
    }

    fn worker_row(id: &str, skills: Value, slots: Value, max_load: i64) -> Row {
        let mut row = Row::new();
        row.insert(columns::WORKER_ID.into(), json!(id));
        row.insert(columns::WORKER_NAME.into(), json!("Worker"));
        row.insert(columns::SKILLS.into(), skills);
        row.insert(columns::AVAILABLE_SLOTS.into(), slots);
        row.insert(columns::MAX_LOAD_PER_PHASE.into(), json!(max_load));
        row.insert(columns::WORKER_GROUP.into(), json!("crew"));
        row.insert(columns::QUALIFICATION_LEVEL.into(), json!("senior"));
        row
    }

    fn task_row(id: &str, skills: Value) -> Row {
        let mut row = Row::new();
        row.insert(columns::TASK_ID.into(), json!(id));
        row.insert(columns::TASK_NAME.into(), json!("Task"));
        row.insert(columns::CATEGORY.into(), json!("general"));
        row.insert(columns::DURATION.into(), json!(1));
        row.insert(columns::REQUIRED_SKILLS.into(), skills);
        row.insert(columns::PREFERRED_PHASES.into(), json!([1, 2]));
        row.insert(columns::MAX_CONCURRENT.into(), json!(1));
        row
    }

    fn input<'a>(
        clients: &'a [Row],
        workers: &'a [Row],
        tasks: &'a [Row],
    ) -> ValidationInput<'a> {
        ValidationInput {
            clients,
            workers,
            tasks,
        }
    }

    #[test]
    fn test_missing_columns_aggregates_per_entity() {
        let mut row = Row::new();
        row.insert(columns::CLIENT_ID.into(), json!("C1"));
        let clients = vec![row];
        let errors = required_columns(&input(&clients, &[], &[]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MissingColumns);
        assert!(errors[0].message.contains(columns::PRIORITY_LEVEL));
        assert!(errors[0].message.contains(columns::GROUP_TAG));
    }

    #[test]
    fn test_missing_columns_skips_empty_collections() {
        assert!(required_columns(&input(&[], &[], &[])).is_empty());
    }

    #[test]
    fn test_duplicate_ids_one_error_per_extra_occurrence() {
        let clients = vec![
            client_row("C1", json!([])),
            client_row("C1", json!([])),
            client_row("C1", json!([])),
            client_row("C2", json!([])),
        ];
        let errors = unique_ids(&input(&clients, &[], &[]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row, 1);
        assert_eq!(errors[1].row, 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::DuplicateId));
    }

    #[test]
    fn test_malformed_array_cell() {
        let workers = vec![worker_row("W1", json!("welding"), json!(true), 1)];
        let errors = well_formed_arrays(&input(&[], &workers, &[]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MalformedArray);
        assert_eq!(errors[0].column, columns::AVAILABLE_SLOTS);
    }

    #[test]
    fn test_invalid_array_elements_are_indexed() {
        let workers = vec![worker_row(
            "W1",
            json!("welding"),
            json!([1, "two", 3, "x"]),
            1,
        )];
        let errors = well_formed_arrays(&input(&[], &workers, &[]));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::InvalidArrayElement));
        assert!(errors[0].message.contains("element 1"));
        assert!(errors[1].message.contains("element 3"));
        assert_ne!(errors[0].id, errors[1].id);
    }

    #[test]
    fn test_priority_out_of_range() {
        let mut row = client_row("C1", json!([]));
        row.insert(columns::PRIORITY_LEVEL.into(), json!(9));
        let clients = vec![row];
        let errors = numeric_bounds(&input(&clients, &[], &[]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::OutOfRange);
    }

    #[test]
    fn test_duration_below_minimum() {
        let mut row = task_row("T1", json!([]));
        row.insert(columns::DURATION.into(), json!(0));
        let tasks = vec![row];
        let errors = numeric_bounds(&input(&[], &[], &tasks));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::BelowMinimum);
        assert_eq!(errors[0].column, columns::DURATION);
    }

    #[test]
    fn test_absent_numeric_fields_are_skipped() {
        let mut row = client_row("C1", json!([]));
        row.remove(columns::PRIORITY_LEVEL);
        let clients = vec![row];
        assert!(numeric_bounds(&input(&clients, &[], &[])).is_empty());
    }

    #[test]
    fn test_attributes_json_rejects_bad_blob() {
        let mut row = client_row("C1", json!([]));
        row.insert(columns::ATTRIBUTES_JSON.into(), json!("{not json"));
        let clients = vec![row];
        let errors = attributes_json(&input(&clients, &[], &[]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::InvalidJson);
    }

    #[test]
    fn test_attributes_json_accepts_valid_and_structured() {
        let mut a = client_row("C1", json!([]));
        a.insert(columns::ATTRIBUTES_JSON.into(), json!("{\"vip\":true}"));
        let mut b = client_row("C2", json!([]));
        b.insert(columns::ATTRIBUTES_JSON.into(), json!({"vip": true}));
        let clients = vec![a, b];
        assert!(attributes_json(&input(&clients, &[], &[])).is_empty());
    }

    #[test]
    fn test_unknown_reference() {
        let clients = vec![client_row("C1", json!(["T99"]))];
        let tasks = vec![task_row("T1", json!([]))];
        let errors = references_resolve(&input(&clients, &[], &tasks));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnknownReference);
        assert_eq!(errors[0].column, columns::REQUESTED_TASK_IDS);
        assert!(errors[0].message.contains("T99"));
    }

    #[test]
    fn test_references_silent_without_tasks() {
        let clients = vec![client_row("C1", json!(["T99"]))];
        assert!(references_resolve(&input(&clients, &[], &[])).is_empty());
    }

    #[test]
    fn test_overloaded_worker_is_warning() {
        let workers = vec![worker_row("W1", json!("welding"), json!([1, 2]), 4)];
        let errors = worker_capacity(&input(&[], &workers, &[]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::OverloadedWorker);
        assert_eq!(errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_skill_coverage_gap() {
        let workers = vec![worker_row("W1", json!("welding, qa"), json!([1]), 1)];
        let tasks = vec![task_row("T1", json!(["Welding", "plumbing"]))];
        let errors = skill_coverage(&input(&[], &workers, &tasks));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UncoveredSkill);
        assert!(errors[0].message.contains("plumbing"));
        assert_eq!(errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_skill_coverage_silent_without_workers() {
        let tasks = vec![task_row("T1", json!(["plumbing"]))];
        assert!(skill_coverage(&input(&[], &[], &tasks)).is_empty());
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let names: Vec<_> = catalog().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "required_columns",
                "unique_ids",
                "well_formed_arrays",
                "numeric_bounds",
                "attributes_json",
                "references_resolve",
                "worker_capacity",
                "skill_coverage",
            ]
        );
    }
}
