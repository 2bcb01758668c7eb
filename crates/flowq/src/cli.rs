//! Clap derive structures for the `flowq` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use flowq_core::QueryMode;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// flowq -- query data flows and their traffic statistics
#[derive(Debug, Parser)]
#[command(
    name = "flowq",
    version,
    about = "Query data flows and their traffic statistics",
    long_about = "Lists the data flows of a virtual network context, filtered by flow id,\n\
        source host, switch or switch port, with optional averaged traffic rates.\n\n\
        Flows, switches and live counters are read from a JSON snapshot file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Snapshot file holding contexts, switches and live counters
    #[arg(long, short = 'f', env = "FLOWQ_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Context (virtual network) to query
    #[arg(long, short = 'c', env = "FLOWQ_CONTEXT", global = true)]
    pub context: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "FLOWQ_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Wait for a live statistics sample, in milliseconds (overrides config)
    #[arg(long, global = true)]
    pub live_timeout_ms: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one flow id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the flows of a context
    #[command(alias = "ls")]
    List(ListArgs),

    /// Count the flow table entries of a context
    Count,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── List ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only the flow with this id
    #[arg(long)]
    pub flow_id: Option<u64>,

    /// Only flows sent by this host MAC address
    #[arg(long)]
    pub mac: Option<String>,

    /// VLAN of the source host (0 = untagged)
    #[arg(long, requires = "mac")]
    pub vlan: Option<u16>,

    /// Only flows whose route passes this switch
    #[arg(long, short = 'n')]
    pub node: Option<String>,

    /// Only flows through this port of --node, by port id
    #[arg(long, requires = "node")]
    pub port_id: Option<String>,

    /// Only flows through this port of --node, by port name
    #[arg(long, requires = "node")]
    pub port_name: Option<String>,

    /// How much of each flow to show
    #[arg(long, short = 'm', default_value = "summary", value_parser = parse_mode)]
    pub mode: QueryMode,

    /// Averaging window in seconds (non-positive uses the configured default)
    #[arg(long, short = 'w', allow_negative_numbers = true)]
    pub window: Option<i64>,
}

fn parse_mode(raw: &str) -> Result<QueryMode, String> {
    raw.parse()
        .map_err(|_| format!("unknown mode '{raw}' (expected summary, detail or live)"))
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
