//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Notify Mcast - notification multicast dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "notify-mcast",
    author,
    version,
    about = "Notification multicast dispatcher",
    long_about = "A multicast dispatch layer for outbound notifications.\n\n\
                  Reads notification messages, delivers each through the \n\
                  primary path, and replicates matched messages to the \n\
                  topics configured for their event type."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "NOTIFY_MCAST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "NOTIFY_MCAST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dispatch pipeline over a notification stream
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the resolved routing table
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "NOTIFY_MCAST_CONFIG"
    )]
    pub config: PathBuf,

    /// Notification input: JSON-lines file, or '-' for stdin
    #[arg(short, long, default_value = "-", env = "NOTIFY_MCAST_INPUT")]
    pub input: String,

    /// Maximum number of notifications to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "NOTIFY_MCAST_MAX_MESSAGES")]
    pub max_messages: u64,

    /// Override topic prefix from configuration
    #[arg(long, env = "NOTIFY_MCAST_TOPIC_PREFIX")]
    pub topic_prefix: Option<String>,

    /// Override publisher identity from configuration
    #[arg(long, env = "NOTIFY_MCAST_PUBLISHER_ID")]
    pub publisher_id: Option<String>,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "NOTIFY_MCAST_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    Compact,
}
