//! Domain Records
//!
//! Entity metadata (canonical column names, required-column sets) and the
//! typed record projections built from validated rows. The validation
//! engine itself works over loose rows; these types are what downstream
//! collaborators consume once a snapshot is clean.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::row::{self, FieldRead, Row};

/// Canonical column names per entity. These are also the `column` values
/// carried by validation errors.
pub mod columns {
    // Clients
    pub const CLIENT_ID: &str = "ClientID";
    pub const CLIENT_NAME: &str = "ClientName";
    pub const PRIORITY_LEVEL: &str = "PriorityLevel";
    pub const REQUESTED_TASK_IDS: &str = "RequestedTaskIDs";
    pub const GROUP_TAG: &str = "GroupTag";
    pub const ATTRIBUTES_JSON: &str = "AttributesJSON";

    // Workers
    pub const WORKER_ID: &str = "WorkerID";
    pub const WORKER_NAME: &str = "WorkerName";
    pub const SKILLS: &str = "Skills";
    pub const AVAILABLE_SLOTS: &str = "AvailableSlots";
    pub const MAX_LOAD_PER_PHASE: &str = "MaxLoadPerPhase";
    pub const WORKER_GROUP: &str = "WorkerGroup";
    pub const QUALIFICATION_LEVEL: &str = "QualificationLevel";

    // Tasks
    pub const TASK_ID: &str = "TaskID";
    pub const TASK_NAME: &str = "TaskName";
    pub const CATEGORY: &str = "Category";
    pub const DURATION: &str = "Duration";
    pub const REQUIRED_SKILLS: &str = "RequiredSkills";
    pub const PREFERRED_PHASES: &str = "PreferredPhases";
    pub const MAX_CONCURRENT: &str = "MaxConcurrent";
}

/// The three record kinds handled by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Client,
    Worker,
    Task,
}

impl EntityKind {
    /// The primary identifier column for this entity.
    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Client => columns::CLIENT_ID,
            EntityKind::Worker => columns::WORKER_ID,
            EntityKind::Task => columns::TASK_ID,
        }
    }

    /// Columns that must be present in an upload of this entity.
    ///
    /// `AttributesJSON` is deliberately not required - the blob is optional
    /// per record and per dataset.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Client => &[
                columns::CLIENT_ID,
                columns::CLIENT_NAME,
                columns::PRIORITY_LEVEL,
                columns::REQUESTED_TASK_IDS,
                columns::GROUP_TAG,
            ],
            EntityKind::Worker => &[
                columns::WORKER_ID,
                columns::WORKER_NAME,
                columns::SKILLS,
                columns::AVAILABLE_SLOTS,
                columns::MAX_LOAD_PER_PHASE,
                columns::WORKER_GROUP,
                columns::QUALIFICATION_LEVEL,
            ],
            EntityKind::Task => &[
                columns::TASK_ID,
                columns::TASK_NAME,
                columns::CATEGORY,
                columns::DURATION,
                columns::REQUIRED_SKILLS,
                columns::PREFERRED_PHASES,
                columns::MAX_CONCURRENT,
            ],
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Worker => "worker",
            EntityKind::Task => "task",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A client requesting tasks, with an allocation priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "ClientName")]
    pub client_name: String,
    #[serde(rename = "PriorityLevel")]
    pub priority_level: i64,
    #[serde(rename = "RequestedTaskIDs", default)]
    pub requested_task_ids: Vec<String>,
    #[serde(rename = "GroupTag", default)]
    pub group_tag: String,
    #[serde(rename = "AttributesJSON", skip_serializing_if = "Option::is_none")]
    pub attributes_json: Option<String>,
}

/// A worker offering skills across phase slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRecord {
    #[serde(rename = "WorkerID")]
    pub worker_id: String,
    #[serde(rename = "WorkerName")]
    pub worker_name: String,
    #[serde(rename = "Skills", default)]
    pub skills: Vec<String>,
    #[serde(rename = "AvailableSlots", default)]
    pub available_slots: Vec<i64>,
    #[serde(rename = "MaxLoadPerPhase")]
    pub max_load_per_phase: i64,
    #[serde(rename = "WorkerGroup", default)]
    pub worker_group: String,
    #[serde(rename = "QualificationLevel", default)]
    pub qualification_level: String,
}

/// A unit of schedulable work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "TaskID")]
    pub task_id: String,
    #[serde(rename = "TaskName")]
    pub task_name: String,
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Duration")]
    pub duration: i64,
    #[serde(rename = "RequiredSkills", default)]
    pub required_skills: Vec<String>,
    #[serde(rename = "PreferredPhases", default)]
    pub preferred_phases: Vec<i64>,
    #[serde(rename = "MaxConcurrent")]
    pub max_concurrent: i64,
}

fn required_text(row: &Row, column: &str) -> CoreResult<String> {
    row::text_field(row, column)
        .ok_or_else(|| CoreError::validation(format!("{} is required", column)))
}

fn required_integer(row: &Row, column: &str) -> CoreResult<i64> {
    match row::integer_field(row, column) {
        FieldRead::Value(n) => Ok(n),
        FieldRead::Missing => Err(CoreError::validation(format!("{} is required", column))),
        FieldRead::Invalid(raw) => Err(CoreError::parse(format!(
            "{} is not an integer: {}",
            column, raw
        ))),
    }
}

fn array_values<T>(read: FieldRead<crate::row::ParsedArray<T>>, column: &str) -> CoreResult<Vec<T>> {
    match read {
        FieldRead::Value(parsed) if parsed.invalid.is_empty() => Ok(parsed.values),
        FieldRead::Value(parsed) => Err(CoreError::parse(format!(
            "{} has {} malformed element(s)",
            column,
            parsed.invalid.len()
        ))),
        FieldRead::Missing => Ok(Vec::new()),
        FieldRead::Invalid(raw) => Err(CoreError::parse(format!(
            "{} is not an array: {}",
            column, raw
        ))),
    }
}

impl ClientRecord {
    /// Project a validated row into a typed record.
    pub fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Self {
            client_id: required_text(row, columns::CLIENT_ID)?,
            client_name: required_text(row, columns::CLIENT_NAME)?,
            priority_level: required_integer(row, columns::PRIORITY_LEVEL)?,
            requested_task_ids: array_values(
                row::string_array(row, columns::REQUESTED_TASK_IDS),
                columns::REQUESTED_TASK_IDS,
            )?,
            group_tag: row::text_field(row, columns::GROUP_TAG).unwrap_or_default(),
            attributes_json: row::text_field(row, columns::ATTRIBUTES_JSON),
        })
    }
}

impl WorkerRecord {
    /// Project a validated row into a typed record.
    pub fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Self {
            worker_id: required_text(row, columns::WORKER_ID)?,
            worker_name: required_text(row, columns::WORKER_NAME)?,
            skills: array_values(row::string_array(row, columns::SKILLS), columns::SKILLS)?,
            available_slots: array_values(
                row::number_array(row, columns::AVAILABLE_SLOTS),
                columns::AVAILABLE_SLOTS,
            )?,
            max_load_per_phase: required_integer(row, columns::MAX_LOAD_PER_PHASE)?,
            worker_group: row::text_field(row, columns::WORKER_GROUP).unwrap_or_default(),
            qualification_level: row::text_field(row, columns::QUALIFICATION_LEVEL)
                .unwrap_or_default(),
        })
    }
}

impl TaskRecord {
    /// Project a validated row into a typed record.
    pub fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Self {
            task_id: required_text(row, columns::TASK_ID)?,
            task_name: required_text(row, columns::TASK_NAME)?,
            category: row::text_field(row, columns::CATEGORY).unwrap_or_default(),
            duration: required_integer(row, columns::DURATION)?,
            required_skills: array_values(
                row::string_array(row, columns::REQUIRED_SKILLS),
                columns::REQUIRED_SKILLS,
            )?,
            preferred_phases: array_values(
                row::number_array(row, columns::PREFERRED_PHASES),
                columns::PREFERRED_PHASES,
            )?,
            max_concurrent: required_integer(row, columns::MAX_CONCURRENT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_row() -> Row {
        let mut row = Row::new();
        row.insert(columns::CLIENT_ID.into(), json!("C1"));
        row.insert(columns::CLIENT_NAME.into(), json!("Acme"));
        row.insert(columns::PRIORITY_LEVEL.into(), json!(3));
        row.insert(columns::REQUESTED_TASK_IDS.into(), json!("T1,T2"));
        row.insert(columns::GROUP_TAG.into(), json!("alpha"));
        row
    }

    #[test]
    fn test_entity_metadata() {
        assert_eq!(EntityKind::Client.id_column(), "ClientID");
        assert_eq!(EntityKind::Worker.id_column(), "WorkerID");
        assert_eq!(EntityKind::Task.id_column(), "TaskID");
        assert!(EntityKind::Task
            .required_columns()
            .contains(&columns::DURATION));
        assert_eq!(EntityKind::Worker.to_string(), "worker");
    }

    #[test]
    fn test_client_from_row() {
        let record = ClientRecord::from_row(&client_row()).unwrap();
        assert_eq!(record.client_id, "C1");
        assert_eq!(record.priority_level, 3);
        assert_eq!(record.requested_task_ids, vec!["T1", "T2"]);
        assert!(record.attributes_json.is_none());
    }

    #[test]
    fn test_client_from_row_missing_id() {
        let mut row = client_row();
        row.remove(columns::CLIENT_ID);
        let err = ClientRecord::from_row(&row).unwrap_err();
        assert!(err.to_string().contains("ClientID"));
    }

    #[test]
    fn test_worker_from_row_malformed_slots() {
        let mut row = Row::new();
        row.insert(columns::WORKER_ID.into(), json!("W1"));
        row.insert(columns::WORKER_NAME.into(), json!("Kim"));
        row.insert(columns::SKILLS.into(), json!("welding"));
        row.insert(columns::AVAILABLE_SLOTS.into(), json!([1, "two"]));
        row.insert(columns::MAX_LOAD_PER_PHASE.into(), json!(1));
        let err = WorkerRecord::from_row(&row).unwrap_err();
        assert!(err.to_string().contains("AvailableSlots"));
    }

    #[test]
    fn test_record_serialization_uses_canonical_columns() {
        let record = ClientRecord::from_row(&client_row()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["ClientID"], "C1");
        assert_eq!(value["PriorityLevel"], 3);
    }
}
