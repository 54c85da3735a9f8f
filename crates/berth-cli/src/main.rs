//! Berth CLI
//!
//! TigerStyle: Interactive shell over the space registry with explicit error
//! handling.

mod menu;

use anyhow::{Context, Result};
use berth_core::{init_telemetry, BerthConfig, StorageBackend, TelemetryConfig};
use berth_registry::SpaceRegistry;
use berth_storage::{DocumentStore, MemoryStore};
use clap::Parser;
use menu::Menu;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Berth CLI
#[derive(Parser, Debug)]
#[command(name = "berth")]
#[command(about = "Track named spaces and whether they are occupied")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Collection holding the spaces (overrides the config file)
    #[arg(long)]
    collection: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if cli.verbose > 0 {
        let level = match cli.verbose {
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        telemetry = telemetry.with_log_level(level);
    }
    init_telemetry(&telemetry).context("Failed to initialize logging")?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BerthConfig::default(),
    };
    if let Some(collection) = cli.collection {
        config.registry.collection = collection;
    }
    config.validate().context("Invalid configuration")?;

    let store: Arc<dyn DocumentStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    let registry =
        SpaceRegistry::with_config(store, config.registry).context("Failed to create registry")?;

    tracing::info!(collection = %registry.config().collection, "Starting shell");

    let mut menu = Menu::new(registry)?;
    menu.run().await
}

/// Read and parse a TOML configuration file
fn load_config(path: &Path) -> Result<BerthConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn parse_config(text: &str) -> Result<BerthConfig> {
    Ok(toml::from_str(text)?)
}
