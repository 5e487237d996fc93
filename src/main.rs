//! Arti-Mirror main entry point
//!
//! This is the command-line interface for mirroring repository listings.

use arti_mirror::config::{load_config_with_hash, resolve_repositories, Config, CrawlConfig};
use arti_mirror::crawler::crawl;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Arti-Mirror: mirror binary repositories from their directory listings
///
/// Arti-Mirror walks the HTML index pages of each configured repository,
/// downloads the files that pass the extension filter and reproduces the
/// remote directory tree locally. Failed downloads are written to a log of
/// retry commands.
#[derive(Parser, Debug)]
#[command(name = "arti-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror binary repositories from their directory listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "refap.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be mirrored without downloading
    #[arg(long)]
    dry_run: bool,

    /// Re-download files that already exist locally
    #[arg(long)]
    force: bool,

    /// Keep the downloaded index pages after the run
    #[arg(long)]
    keep_index_files: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = load_config_with_hash(&cli.config);
    let log_level = loaded
        .as_ref()
        .map(|(config, _)| config.general.log_level.as_str())
        .unwrap_or("info");
    setup_logging(cli.verbose, cli.quiet, log_level);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match loaded {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.force {
        config.artifactory.force_replace = true;
    }
    if cli.keep_index_files {
        config.files.clean_html_files = false;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_mirror(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` wins over the verbosity flags and the configured level.
fn setup_logging(verbose: u8, quiet: bool, log_level: &str) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if quiet => EnvFilter::new("error"),
        Err(_) => match verbose {
            0 => EnvFilter::new(format!("arti_mirror={},warn", log_level)),
            1 => EnvFilter::new("arti_mirror=debug,info"),
            2 => EnvFilter::new("arti_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be mirrored
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let crawl_config = CrawlConfig::from_config(config);
    let repositories = resolve_repositories(config)?;

    println!("=== Arti-Mirror Dry Run ===\n");

    println!("Remote:");
    println!("  URL: {}", crawl_config.base_url);
    println!(
        "  Proxy: {}",
        crawl_config
            .proxy
            .as_ref()
            .map(|proxy| proxy.url())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  Auth: {}", config.auth.kind);

    println!("\nDownload:");
    println!("  Retry attempts: {}", crawl_config.retry_attempts);
    println!("  Timeout: {}s", crawl_config.timeout.as_secs());
    println!("  Delay: {}s", crawl_config.delay.as_secs());
    println!("  Force replace: {}", crawl_config.force_replace);

    println!("\nFilter:");
    println!("  Mode: {}", crawl_config.filter.mode);
    println!("  Extensions: {}", crawl_config.filter.extensions.join(", "));
    println!(
        "  Include maven-metadata.xml: {}",
        crawl_config.filter.include_maven_metadata
    );

    println!("\nOutput:");
    println!("  Directory: {}", crawl_config.output_dir.display());
    println!("  Failure log: {}", crawl_config.failure_log_path().display());
    println!("  Remove index files: {}", crawl_config.clean_index_files);

    println!("\nRepositories ({}):", repositories.len());
    for repo in &repositories {
        println!("  - {}", repo);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main mirroring run
async fn handle_mirror(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            interrupt.cancel();
        }
    });

    tracing::info!(
        "Mirroring {} into {}",
        config.artifactory.url,
        config.general.output_dir
    );

    match crawl(config, cancel).await {
        Ok(stats) => {
            tracing::info!("Mirroring completed successfully");
            if stats.files_failed > 0 {
                tracing::warn!(
                    "{} downloads failed, see {}",
                    stats.files_failed,
                    CrawlConfig::from_config(config).failure_log_path().display()
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Mirroring failed: {}", e);
            Err(e.into())
        }
    }
}
