// ── Core error types ──
//
// Only `CoreError` crosses the public query API. The other enums describe
// failures of the collaborators the engine consumes; most of them are
// absorbed inside a query (logged, then degraded around) and never reach
// the caller.

use thiserror::Error;

use crate::model::{ContextId, FlowId};

/// Failure of a flow query. Everything else a query runs into is logged
/// and absorbed.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Query target ─────────────────────────────────────────────────
    #[error("Context not found: {context}")]
    ContextNotFound { context: ContextId },

    // ── Store ────────────────────────────────────────────────────────
    #[error("Store read failed: {0}")]
    Store(#[from] StoreError),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by a read transaction or the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("read of {key} failed: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("read transaction already released")]
    Released,
}

/// Failure of the switch-statistics service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("statistics request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("flow entry not present on {node}")]
    EntryNotFound { node: String },

    #[error("could not persist statistics for flow {flow}: {reason}")]
    Persist { flow: FlowId, reason: String },
}

/// A stored flow that cannot be turned into a [`FlowRecord`](crate::model::FlowRecord).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("flow {flow} has no {field}")]
    MissingField { flow: FlowId, field: &'static str },

    #[error("flow {flow} has invalid {field}: {reason}")]
    InvalidField {
        flow: FlowId,
        field: &'static str,
        reason: String,
    },
}
