//! `flightcat` - CLI for flightcatalog
//!
//! This binary runs the flight catalog HTTP server and inspects its
//! configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use flightcatalog::cli::{Cli, Command, ConfigCommand, ServeCommand};
use flightcatalog::http::{self, AppState};
use flightcatalog::{init_logging, Config, FlightService, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(serve_cmd) => {
            let config = Config::load_from(cli.config).context("failed to load configuration")?;
            handle_serve(&serve_cmd, config)
        }
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn handle_serve(cmd: &ServeCommand, config: Config) -> anyhow::Result<()> {
    let config = cmd.apply(config);
    config.validate().context("invalid configuration")?;

    let database_path = config.database_path();
    let storage = Storage::open(&database_path)
        .with_context(|| format!("failed to open database {}", database_path.display()))?;
    info!("Using flight database at {}", database_path.display());

    let service = Arc::new(FlightService::new(storage));
    let router = http::router(AppState::new(service), config.request_timeout());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(http::serve(
        config.server.bind_addr,
        router,
        http::shutdown_signal(),
    ))?;

    info!("Flight catalog stopped");
    Ok(())
}

fn handle_config(
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_addr);
                println!(
                    "  Request timeout:    {}s",
                    config.server.request_timeout_secs
                );
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => anyhow::bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
