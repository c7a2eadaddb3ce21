//! Data Loom Core
//!
//! Foundational types for the Data Loom workspace: error types, the loose
//! spreadsheet row model, and the typed client/worker/task domain records.
//! This crate has zero dependencies on application-level code (validation
//! rules, LLM providers, etc.).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `row` - Loose row representation and tolerant field readers
//! - `records` - Entity metadata and typed record projections
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror** - keeps build times minimal
//! 2. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod records;
pub mod row;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Row Model ──────────────────────────────────────────────────────────
pub use row::{FieldRead, ParsedArray, Row};

// ── Domain Records ─────────────────────────────────────────────────────
pub use records::{columns, ClientRecord, EntityKind, TaskRecord, WorkerRecord};
