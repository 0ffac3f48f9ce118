//! Command-line interface for flightcatalog.
//!
//! This module provides the CLI structure for the `flightcat` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ServeCommand};

use crate::logging::Verbosity;

/// flightcat - Flight catalog HTTP service
///
/// Stores flight records and serves them over a small JSON API with
/// filtered search and cheapest-arrival lookup.
#[derive(Debug, Parser)]
#[command(name = "flightcat")]
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
    /// Run the HTTP server
    Serve(ServeCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "flightcat");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["flightcat", "serve"]).unwrap();
        match cli.command {
            Command::Serve(cmd) => {
                assert!(cmd.bind.is_none());
                assert!(cmd.database.is_none());
            }
            Command::Config(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_serve_with_overrides() {
        let args = [
            "flightcat",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--database",
            "/srv/flights.db",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.bind.unwrap().port(), 8080);
                assert_eq!(cmd.database, Some(PathBuf::from("/srv/flights.db")));
            }
            Command::Config(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_serve_rejects_bad_address() {
        let result = Cli::try_parse_from(["flightcat", "serve", "--bind", "localhost"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_config_show_json() {
        let cli = Cli::try_parse_from(["flightcat", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }

    #[test]
    fn test_parse_config_validate_file() {
        let args = ["flightcat", "config", "validate", "--file", "/etc/fc.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Config(ConfigCommand::Validate { file }) => {
                assert_eq!(file, Some(PathBuf::from("/etc/fc.toml")));
            }
            _ => panic!("expected config validate"),
        }
    }

    #[test]
    fn test_parse_with_global_flags() {
        let args = ["flightcat", "-c", "/custom/config.toml", "-vv", "config", "path"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["flightcat", "serve", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
