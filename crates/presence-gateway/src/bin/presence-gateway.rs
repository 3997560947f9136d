//! Presence Gateway Binary
//!
//! Serves the `/users` presence resource over HTTP.
//!
//! # Usage
//! ```bash
//! presence-gateway [--port 3000] [--host 127.0.0.1] [--store sqlite|memory] [--seed] [--verbose]
//! ```

use anyhow::Context;
use clap::Parser;
use presence_core::StoreBackend;
use presence_gateway::{Gateway, GatewayConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Presence Gateway - CORS-open REST resource for presence records
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Store backend: sqlite or memory
    #[arg(long)]
    store: Option<StoreBackend>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Use the in-memory store if the database cannot be opened
    #[arg(long)]
    allow_memory_fallback: bool,

    /// Insert sample records when the store is empty
    #[arg(long)]
    seed: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overlay(&self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(host) = &self.host {
            config = config.with_host(host.clone());
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(backend) = self.store {
            config = config.with_store_backend(backend);
        }
        if let Some(path) = &self.database {
            config = config.with_database_path(path.clone());
        }
        if self.allow_memory_fallback {
            config = config.with_memory_fallback(true);
        }
        if self.seed {
            config = config.with_seed_sample_data(true);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // A missing .env file is normal
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(args.verbose)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let base = match &args.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("reading config file {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    let config = args.overlay(base.apply_env().context("reading environment")?);

    let gateway = Gateway::from_config(config)
        .await
        .context("initializing presence store")?;
    gateway.start().await.context("running gateway")?;

    Ok(())
}
