//! Command-line interface for metarmap.
//!
//! This module provides the CLI structure for the `metarmap` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ParseCommand, RunCommand, StatusCommand};

/// metarmap - Show airport flight categories on an indicator strip
///
/// Parses METAR weather reports, classifies each configured airport as
/// VFR, MVFR, IFR or LIFR, and drives one colored indicator per airport
/// with thunderstorm and high-wind animations.
#[derive(Debug, Parser)]
#[command(name = "metarmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse reports and print the decoded fields
    Parse(ParseCommand),

    /// Show the flight category of every configured airport
    Status(StatusCommand),

    /// Drive the display until interrupted
    Run(RunCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand {
                reports: None,
                json: false,
            }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "metarmap");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_parse_lines() {
        let cli = Cli::try_parse_from([
            "metarmap",
            "parse",
            "--json",
            "KSFO 081856Z 28015KT 10SM CLR 18/09 A3001",
            "KLAX 081853Z 25010KT 10SM FEW015 17/12 A2998",
        ])
        .unwrap();
        match cli.command {
            Command::Parse(cmd) => {
                assert!(cmd.json);
                assert_eq!(cmd.lines.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_parse_without_lines() {
        let cli = Cli::try_parse_from(["metarmap", "parse"]).unwrap();
        assert!(matches!(cli.command, Command::Parse(ParseCommand { ref lines, .. }) if lines.is_empty()));
    }

    #[test]
    fn test_parse_status_with_reports() {
        let cli =
            Cli::try_parse_from(["metarmap", "status", "--reports", "/tmp/metars.txt"]).unwrap();
        match cli.command {
            Command::Status(cmd) => {
                assert_eq!(cmd.reports, Some(PathBuf::from("/tmp/metars.txt")));
                assert!(!cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["metarmap", "run"]).unwrap();
        assert!(matches!(cli.command, Command::Run(RunCommand { reports: None })));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["metarmap", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }

    #[test]
    fn test_parse_with_global_flags() {
        let cli =
            Cli::try_parse_from(["metarmap", "run", "-c", "/custom/config.toml", "-vv"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["metarmap", "-q", "status"]).unwrap();
        assert!(cli.quiet);
    }
}
