//! Data Loom - Core Library
//!
//! The core of an AI-assisted resource-allocation configurator. Upstream
//! collaborators decode spreadsheet uploads into loose rows; this library:
//! - validates the three entity collections (clients, workers, tasks)
//!   against the fixed domain schema in a single deterministic pass, and
//! - mediates structured output from interchangeable LLM backends for the
//!   AI-assisted features (column mapping, search translation, rule
//!   synthesis, rule suggestions, error corrections).
//!
//! The boundary operations live in [`api`]; everything else is the
//! machinery behind them.

pub mod api;
pub mod config;
pub mod features;
pub mod registry;

// Re-export the boundary surface
pub use api::{generate_structured, validate, ApiError};
pub use config::AppConfig;

// Re-export commonly used workspace types
pub use data_loom_core::{columns, ClientRecord, EntityKind, Row, TaskRecord, WorkerRecord};
pub use data_loom_llm::{
    create_provider, AttemptError, LlmError, LlmProvider, MediatorError, MediatorOptions,
    OutputSchema, ProviderConfig, ProviderType,
};
pub use data_loom_validation::{
    CorrectionSuggestion, ErrorKind, Severity, ValidationError, ValidationReport,
};
