// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Vitrine Scanner Server
//!
//! Standalone web server for the gallery scanner endpoint and assets.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use vitrine::config::AppConfig;
use vitrine::Result;

#[derive(Parser, Debug)]
#[command(name = "vitrine-web")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Vitrine Gallery Scanner Server")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve assets from this directory (overrides config)
    #[arg(long)]
    assets: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Vitrine Scanner Server v1.0.0");

    // Load config
    let mut config = AppConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(assets) = args.assets {
        config.assets_root = assets;
    }

    info!("Assets root: {}", config.assets_root);
    info!("Categories: {:?}", config.categories.iter().map(|c| c.id.as_str()).collect::<Vec<_>>());

    vitrine::web::start_server(config).await
}
