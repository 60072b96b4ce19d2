use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use placemap::{HttpPlacesBackend, PlaceMapConfig, PlacesBackend, telemetry, web};

/// Map UI for adding places, measuring distances and searching nearby places
#[derive(Debug, Parser)]
#[command(name = "placemap", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level and print the effective settings
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the page (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ask the backend to load its demo catalogue of places
    Seed,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = PlaceMapConfig::load_from_path(cli.config.clone())?;
    telemetry::init(&config.logging, cli.verbose)?;

    if cli.verbose {
        let source = cli
            .config
            .clone()
            .or_else(PlaceMapConfig::get_config_path)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "defaults".to_string());
        println!("Using config from: {source}");
        println!("Backend: {}", config.backend.base_url);
        println!("Log level: {}", config.logging.level);
    }

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.web.port = port;
            }
            let backend = HttpPlacesBackend::new(&config.backend)
                .context("Failed to create places backend client")?;
            web::run(config, Arc::new(backend)).await
        }
        Command::Seed => {
            let backend = HttpPlacesBackend::new(&config.backend)
                .context("Failed to create places backend client")?;
            let message = backend
                .insert_bulk_places()
                .await
                .context("Seeding failed")?;
            println!("{message}");
            Ok(())
        }
        Command::Config => {
            println!("backend.base_url = {}", config.backend.base_url);
            match config.backend.timeout_seconds {
                Some(seconds) => println!("backend.timeout_seconds = {seconds}"),
                None => println!("backend.timeout_seconds = (transport default)"),
            }
            println!("web.host = {}", config.web.host);
            println!("web.port = {}", config.web.port);
            println!("web.max_sessions = {}", config.web.max_sessions);
            println!("map.tile_url = {}", config.map.tile_url);
            println!("logging.level = {}", config.logging.level);
            println!("logging.format = {}", config.logging.format);
            println!("defaults.search_radius_km = {}", config.defaults.search_radius_km);
            Ok(())
        }
    }
}
