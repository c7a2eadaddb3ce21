//! Validation Models
//!
//! Value types produced by the validation engine: the error taxonomy,
//! individual findings, AI-proposed corrections, and the per-pass report.
//! Findings are immutable and recomputed on every pass - never patched in
//! place - so their ids must be deterministic functions of the snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use data_loom_core::EntityKind;

/// How severe a finding is.
///
/// `Error` findings conventionally gate export/finalize actions;
/// `Warning` findings are advisory. The gating itself is caller policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Closed taxonomy of validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required column is absent from an entity's upload.
    MissingColumns,
    /// A primary identifier occurs more than once in its collection.
    DuplicateId,
    /// An array-typed cell is not decodable as a sequence at all.
    MalformedArray,
    /// An array element does not match the declared element type.
    InvalidArrayElement,
    /// A bounded numeric field is outside its domain.
    OutOfRange,
    /// A minimum-value numeric field is below its floor.
    BelowMinimum,
    /// An embedded attributes blob is not parseable JSON.
    InvalidJson,
    /// A cross-entity reference points at a nonexistent record.
    UnknownReference,
    /// A worker's max load exceeds its available slot count.
    OverloadedWorker,
    /// A task-required skill is offered by no worker.
    UncoveredSkill,
}

impl ErrorKind {
    /// The severity this kind always carries.
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::OverloadedWorker | ErrorKind::UncoveredSkill => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable identifier fragment used in error ids.
    pub fn key(&self) -> &'static str {
        match self {
            ErrorKind::MissingColumns => "missing_columns",
            ErrorKind::DuplicateId => "duplicate_id",
            ErrorKind::MalformedArray => "malformed_array",
            ErrorKind::InvalidArrayElement => "invalid_array_element",
            ErrorKind::OutOfRange => "out_of_range",
            ErrorKind::BelowMinimum => "below_minimum",
            ErrorKind::InvalidJson => "invalid_json",
            ErrorKind::UnknownReference => "unknown_reference",
            ErrorKind::OverloadedWorker => "overloaded_worker",
            ErrorKind::UncoveredSkill => "uncovered_skill",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One validation finding.
///
/// The id is derived from entity/row/column/kind (plus a discriminator for
/// kinds that can fire more than once per cell), so re-validating an
/// unchanged snapshot yields byte-identical findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Deterministic identifier, referenced by correction suggestions.
    pub id: String,
    /// Which rule family produced the finding.
    pub kind: ErrorKind,
    /// Severity implied by the kind.
    pub severity: Severity,
    /// Entity collection the finding belongs to.
    pub entity: EntityKind,
    /// Row index within that entity's collection (0 for aggregate findings).
    pub row: usize,
    /// Column/field name (empty for aggregate findings).
    pub column: String,
    /// Human-readable description.
    pub message: String,
    /// Ordered remediation hints, may be empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ValidationError {
    /// Create a finding; the id and severity are derived.
    pub fn new(
        kind: ErrorKind,
        entity: EntityKind,
        row: usize,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let column = column.into();
        let id = format!("{}:{}:{}:{}", entity, row, column, kind.key());
        Self {
            id,
            kind,
            severity: kind.severity(),
            entity,
            row,
            column,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Disambiguate the id for kinds that can fire repeatedly on one cell
    /// (e.g. one finding per bad array element or per unknown reference).
    pub fn with_discriminator(mut self, discriminator: impl std::fmt::Display) -> Self {
        self.id = format!("{}:{}", self.id, discriminator);
        self
    }

    /// Attach ordered remediation hints.
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// True for findings that conventionally block export.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A field-level repair proposed by the correction feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSuggestion {
    /// Id of the finding this correction addresses.
    pub error_id: String,
    /// Column the repair applies to.
    pub column: String,
    /// Current value as seen in the snapshot.
    pub old_value: Value,
    /// Proposed replacement value.
    pub new_value: Value,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    /// Whether the correction is safe to apply without review.
    #[serde(default)]
    pub auto_apply: bool,
}

impl CorrectionSuggestion {
    /// Clamp the confidence score into [0, 1].
    pub fn clamped(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

/// Aggregated result of one validation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All findings, in rule-catalog order.
    pub errors: Vec<ValidationError>,
    /// Number of `Error`-severity findings.
    pub error_count: usize,
    /// Number of `Warning`-severity findings.
    pub warning_count: usize,
}

impl ValidationReport {
    /// Build a report from raw findings, computing the counts.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        let error_count = errors
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count();
        let warning_count = errors.len() - error_count;
        Self {
            errors,
            error_count,
            warning_count,
        }
    }

    /// True when any `Error`-severity finding is present. Export gating is
    /// the caller's decision; this only exposes the conventional signal.
    pub fn has_blocking_errors(&self) -> bool {
        self.error_count > 0
    }
}
