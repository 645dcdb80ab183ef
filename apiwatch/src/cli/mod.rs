//! CLI module for apiwatch
//!
//! Provides the command-line interface for the monitor.

pub mod check;
pub mod serve;

use clap::{Parser, Subcommand};

/// apiwatch - Reachability monitor for Anthropic-compatible API relays
#[derive(Parser, Debug)]
#[command(name = "apiwatch")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    APIWATCH_HOST                Bind address (default: 0.0.0.0)
    APIWATCH_PORT                Listen port (default: 3000, legacy: PORT)
    APIWATCH_CONFIG              Endpoint configuration file (default: config.json)
    APIWATCH_PROBE_COMMAND       Probe program (default: claude)
    APIWATCH_PROBE_PROMPT        Prompt passed with --print
    APIWATCH_SUCCESS_MARKER      Text that marks a successful reply (default: 成功)
    APIWATCH_PROBE_TIMEOUT_SECS  Probe timeout (default: 300)
    APIWATCH_PROBE_GRACE_SECS    Grace period before force kill (default: 5)
    APIWATCH_SYNC_INTERVAL_SECS  Configuration reload cycle (default: 300)
    APIWATCH_LOG_LEVEL           Log level (default: info)
    APIWATCH_LOG_DIR             Also write daily rotated log files here
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitor server
    Serve(serve::ServeArgs),
    /// Test every configured endpoint once and print the results
    Check(check::CheckArgs),
}
