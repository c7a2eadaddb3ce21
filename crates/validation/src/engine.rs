//! Validation Engine
//!
//! Runs the rule catalog over one immutable snapshot of the three record
//! collections and concatenates the findings. Rule order is the only
//! observable ordering guarantee: findings from a given rule appear in
//! row-ascending order within that rule's group, and rule groups appear in
//! catalog-declaration order.

use data_loom_core::{EntityKind, Row};

use crate::models::ValidationError;
use crate::rules::catalog;

/// One immutable snapshot of the three collections, as handed over by the
/// upload collaborator. The engine never retains it across calls.
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    pub clients: &'a [Row],
    pub workers: &'a [Row],
    pub tasks: &'a [Row],
}

impl<'a> ValidationInput<'a> {
    /// The rows of one entity collection.
    pub fn rows(&self, entity: EntityKind) -> &'a [Row] {
        match entity {
            EntityKind::Client => self.clients,
            EntityKind::Worker => self.workers,
            EntityKind::Task => self.tasks,
        }
    }
}

/// Validate a snapshot of the three collections.
///
/// Deterministic, total, and side-effect-free: malformed per-row data is
/// reported as findings, never surfaced as a panic or an `Err`. Empty
/// collections produce zero findings - absence of data is not itself
/// invalid.
pub fn validate(clients: &[Row], workers: &[Row], tasks: &[Row]) -> Vec<ValidationError> {
    let input = ValidationInput {
        clients,
        workers,
        tasks,
    };

    let mut errors = Vec::new();
    for rule in catalog() {
        errors.extend((rule.check)(&input));
    }
    errors
}
