//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Parse command arguments.
#[derive(Debug, Args)]
pub struct ParseCommand {
    /// Raw reports to parse; reads standard input when none are given
    #[arg(value_name = "LINE")]
    pub lines: Vec<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Report file to summarize instead of the configured one
    #[arg(short, long, value_name = "FILE")]
    pub reports: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Run command arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Report file to read instead of the configured one
    #[arg(short, long, value_name = "FILE")]
    pub reports: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
