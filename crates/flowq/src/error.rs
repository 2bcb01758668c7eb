//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use flowq_config::ConfigError;
use flowq_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const STORE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Query target ─────────────────────────────────────────────────
    #[error("Context '{context}' not found")]
    #[diagnostic(
        code(flowq::context_not_found),
        help("Check the context name, or the contexts listed in the snapshot file.")
    )]
    ContextNotFound { context: String },

    #[error("No context selected")]
    #[diagnostic(
        code(flowq::no_context),
        help("Pass --context, set FLOWQ_CONTEXT, or set defaults.context in {path}")
    )]
    NoContext { path: String },

    // ── Store ────────────────────────────────────────────────────────
    #[error("Flow store read failed: {reason}")]
    #[diagnostic(code(flowq::store))]
    Store { reason: String },

    // ── Snapshot ─────────────────────────────────────────────────────
    #[error("No snapshot file given")]
    #[diagnostic(
        code(flowq::no_snapshot),
        help("Pass --snapshot, set FLOWQ_SNAPSHOT, or set defaults.snapshot in {path}")
    )]
    NoSnapshot { path: String },

    #[error("Could not read snapshot {path}")]
    #[diagnostic(code(flowq::snapshot_io))]
    SnapshotRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot {path}")]
    #[diagnostic(
        code(flowq::snapshot_parse),
        help("The snapshot must be a JSON object with contexts, switches and live arrays.")
    )]
    SnapshotParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(flowq::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(flowq::config), help("Inspect the file with: flowq config show"))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(flowq::render))]
    Render(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(flowq::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ContextNotFound { .. } => exit_code::NOT_FOUND,
            Self::Store { .. } => exit_code::STORE,
            Self::NoContext { .. } | Self::NoSnapshot { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ContextNotFound { context } => CliError::ContextNotFound {
                context: context.to_string(),
            },
            CoreError::Store(e) => CliError::Store {
                reason: e.to_string(),
            },
            CoreError::Internal(msg) => CliError::Internal(msg),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use flowq_core::{ContextId, StoreError};

    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let missing: CliError = CoreError::ContextNotFound {
            context: ContextId::new("vtn9"),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(missing.to_string(), "Context 'vtn9' not found");

        let store: CliError = CoreError::Store(StoreError::Unavailable {
            reason: "down".into(),
        })
        .into();
        assert_eq!(store.exit_code(), exit_code::STORE);

        let internal: CliError = CoreError::Internal("lost".into()).into();
        assert_eq!(internal.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn missing_inputs_are_usage_errors() {
        let err = CliError::NoSnapshot {
            path: "/tmp/config.toml".into(),
        };
        assert_eq!(err.exit_code(), exit_code::USAGE);
        let err = CliError::NoContext {
            path: "/tmp/config.toml".into(),
        };
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
