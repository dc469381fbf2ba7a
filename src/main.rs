// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Vitrine: self-discovering image galleries
//!
//! Scanner server, fallback snapshot/watcher, loader and photo normalizer
//! behind one command line.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use vitrine::config::AppConfig;
use vitrine::loader::{
    build_client, FallbackSource, FileFallback, GalleryLoader, HttpFallback, ManifestSource,
};
use vitrine::manifest::write_fallback_file;
use vitrine::optimize::{normalize_categories, Normalizer};
use vitrine::render::{render_gallery, GalleryPage};
use vitrine::watcher::GalleryWatcher;
use vitrine::{scanner, Result, VitrineError};

/// Vitrine CLI - self-discovering image galleries
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Gallery directory scanner, fallback generator and loader", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the scanner endpoint, gallery page and assets
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scan category folders and print the manifest
    Scan {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Write the static fallback data file once
    Snapshot {
        /// Output file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep the fallback data file current as folders change
    Watch {
        /// Skip photo normalization before each rescan
        #[arg(long)]
        no_normalize: bool,
    },

    /// Load the manifest like a page would and render the gallery HTML
    Load {
        /// Scanner endpoint URL (overrides config)
        #[arg(short, long)]
        url: Option<String>,

        /// Fallback data URL (overrides config)
        #[arg(long, conflicts_with = "fallback_file")]
        fallback_url: Option<String>,

        /// Read fallback data from a local file instead of a URL
        #[arg(long)]
        fallback_file: Option<PathBuf>,

        /// Write HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Downscale and re-encode photos in normalized categories
    Normalize {
        /// Only this category (must exist in config)
        #[arg(long)]
        category: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Initialize a new gallery project
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => run_serve(config, host, port).await,
        Some(Commands::Scan { pretty }) => run_scan(config, pretty),
        Some(Commands::Snapshot { output }) => run_snapshot(config, output),
        Some(Commands::Watch { no_normalize }) => run_watch(config, no_normalize).await,
        Some(Commands::Load { url, fallback_url, fallback_file, output }) => {
            run_load(config, url, fallback_url, fallback_file, output).await
        }
        Some(Commands::Normalize { category }) => run_normalize(config, category),
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        Some(Commands::Init { dir, force }) => run_init(dir, force),
        None => run_serve(config, None, None).await,
    }
}

async fn run_serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    // Apply CLI overrides
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!("Assets root: {}", config.assets_root);
    vitrine::web::start_server(config).await
}

fn run_scan(config: AppConfig, pretty: bool) -> Result<()> {
    let manifest = scanner::scan(&config)?;
    let json = if pretty {
        serde_json::to_string_pretty(&manifest)?
    } else {
        serde_json::to_string(&manifest)?
    };
    println!("{}", json);
    Ok(())
}

fn run_snapshot(config: AppConfig, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(&config.fallback.path));
    let manifest = scanner::scan(&config)?;
    write_fallback_file(&path, &manifest)?;
    Ok(())
}

/// Run the fallback watcher until Ctrl+C or SIGTERM
async fn run_watch(config: AppConfig, no_normalize: bool) -> Result<()> {
    let mut watcher = GalleryWatcher::new(config.clone())?;
    if no_normalize {
        warn!("Photo normalization disabled");
        watcher = watcher.without_normalize();
    }

    // Setup graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = terminate => info!("Received SIGTERM, shutting down..."),
        }

        let _ = shutdown_tx.send(true);
    });

    info!("Gallery watcher active, writing {}. Press Ctrl+C to stop.", config.fallback.path);

    tokio::task::spawn_blocking(move || watcher.run(shutdown_rx))
        .await
        .map_err(|e| VitrineError::Config(format!("Watcher task failed: {}", e)))?
}

async fn run_load(
    config: AppConfig,
    url: Option<String>,
    fallback_url: Option<String>,
    fallback_file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = build_client(config.loader.timeout_secs)?;
    let scanner_url = url.unwrap_or_else(|| config.loader.scanner_url.clone());

    let fallback: Box<dyn FallbackSource> = match fallback_file {
        Some(path) => Box::new(FileFallback::new(path)),
        None => {
            let fallback_url = fallback_url.unwrap_or_else(|| config.loader.fallback_url.clone());
            Box::new(HttpFallback::new(client.clone(), &fallback_url))
        }
    };

    let loader = GalleryLoader::new(client, &scanner_url, fallback);
    let outcome = loader.load().await;

    let mut page = GalleryPage::for_categories(&config.categories)
        .with_close_delay(config.lightbox.close_delay_ms);
    let summary = render_gallery(&mut page, &outcome.manifest, &config.categories);

    match outcome.source {
        ManifestSource::Scanner => info!("Rendered {} cards from scanner", summary.card_count()),
        ManifestSource::Fallback => {
            info!("Rendered {} cards from fallback data", summary.card_count())
        }
        ManifestSource::Unavailable => warn!("No gallery data available; rendering empty gallery"),
    }

    let html = page.to_html("Gallery");
    match output {
        Some(path) => {
            std::fs::write(&path, html)?;
            info!("Wrote {:?}", path);
        }
        None => println!("{}", html),
    }

    Ok(())
}

fn run_normalize(config: AppConfig, category: Option<String>) -> Result<()> {
    let report = match category {
        Some(id) => {
            let cat = config
                .category(&id)
                .ok_or_else(|| VitrineError::Config(format!("Unknown category '{}'", id)))?;
            Normalizer::new(&config.optimize).normalize_dir(&config.category_dir(cat))?
        }
        None => normalize_categories(&config)?,
    };

    println!(
        "Converted {}, unchanged {}, skipped {}",
        report.converted, report.unchanged, report.skipped
    );
    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Assets root: {}", config.assets_root);
            for category in &config.categories {
                println!(
                    "  {} -> {:?} ({}, #{})",
                    category.id,
                    config.category_dir(category),
                    category.url_base,
                    category.container_id
                );
            }
            println!("  Fallback data: {}", config.fallback.path);
        }
    }

    Ok(())
}

/// Initialize a new gallery project
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(VitrineError::Config(
            "config.json already exists. Use --force to overwrite".to_string()
        ));
    }

    let mut config = AppConfig::default();
    let assets = target.join(&config.assets_root);
    for category in &config.categories {
        std::fs::create_dir_all(assets.join(&category.subdir))?;
    }
    config.assets_root = assets.to_string_lossy().to_string();
    config.fallback.path = target.join(&config.fallback.path).to_string_lossy().to_string();
    config.save(&config_path)?;

    println!("Vitrine initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - config.json");
    for category in &config.categories {
        println!("  - {}/{}/", config.assets_root, category.subdir);
    }
    println!("\nNext steps:");
    println!("  1. Drop images into the category folders");
    println!("  2. Write fallback data: vitrine snapshot");
    println!("  3. Start the scanner: vitrine serve");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["vitrine"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_serve_command() {
        let cli =
            Cli::try_parse_from(["vitrine", "serve", "-H", "0.0.0.0", "--port", "9000"]).unwrap();

        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_load_command() {
        let cli = Cli::try_parse_from([
            "vitrine",
            "load",
            "--url",
            "http://x/api/gallery",
            "--fallback-file",
            "/tmp/gallery-data.js",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Load { url, fallback_file, fallback_url, output }) => {
                assert_eq!(url.as_deref(), Some("http://x/api/gallery"));
                assert_eq!(fallback_file, Some(PathBuf::from("/tmp/gallery-data.js")));
                assert!(fallback_url.is_none());
                assert!(output.is_none());
            }
            _ => panic!("Expected Load command"),
        }
    }

    #[test]
    fn test_cli_load_fallback_sources_conflict() {
        let result = Cli::try_parse_from([
            "vitrine", "load", "--fallback-url", "http://x/data.js", "--fallback-file", "data.js",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_init_creates_layout() {
        let dir = tempfile::TempDir::new().unwrap();
        run_init(Some(dir.path().to_path_buf()), false).unwrap();

        assert!(dir.path().join("config.json").exists());
        assert!(dir.path().join("assets/logo").is_dir());
        assert!(dir.path().join("assets/hospital").is_dir());
        assert!(run_init(Some(dir.path().to_path_buf()), false).is_err());
    }
}
