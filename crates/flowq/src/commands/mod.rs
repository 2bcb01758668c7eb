//! Command handlers and the session they run against.

pub mod config_cmd;
pub mod count;
pub mod list;

use std::time::Duration;

use clap::ValueEnum;
use tracing::debug;

use flowq_core::{ContextId, FlowQueryEngine};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::snapshot::Snapshot;

/// Everything a query command needs: an engine over the loaded snapshot,
/// the target context, and resolved output settings.
pub struct Session {
    pub engine: FlowQueryEngine,
    pub context: ContextId,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Session {
    /// Resolve flags over config defaults, then load the snapshot.
    pub async fn open(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = flowq_config::load_config()?;
        let mut query = cfg.to_query_config()?;
        if let Some(ms) = global.live_timeout_ms {
            if ms == 0 {
                return Err(CliError::Validation {
                    field: "--live-timeout-ms".into(),
                    reason: "must be greater than zero".into(),
                });
            }
            query.live_stats_timeout = Duration::from_millis(ms);
        }

        let config_hint = || flowq_config::config_path().display().to_string();
        let snapshot = global
            .snapshot
            .clone()
            .or_else(|| cfg.defaults.snapshot.clone())
            .ok_or_else(|| CliError::NoSnapshot {
                path: config_hint(),
            })?;
        let context = global
            .context
            .clone()
            .or_else(|| cfg.defaults.context.clone())
            .ok_or_else(|| CliError::NoContext {
                path: config_hint(),
            })?;

        let output = match &global.output {
            Some(format) => format.clone(),
            None => parse_choice("defaults.output", &cfg.defaults.output)?,
        };
        let color_mode: ColorMode = match &global.color {
            Some(mode) => mode.clone(),
            None => parse_choice("defaults.color", &cfg.defaults.color)?,
        };

        debug!(snapshot = %snapshot.display(), %context, "opening session");
        let engine = Snapshot::load(&snapshot).await?.into_engine(query);
        Ok(Self {
            engine,
            context: ContextId::new(context),
            output,
            color: output::should_color(&color_mode),
            quiet: global.quiet,
        })
    }
}

/// Parse a config string into one of the CLI's value enums.
fn parse_choice<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
