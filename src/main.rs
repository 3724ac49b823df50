//! s3-resolver - read-through image cache backed by S3
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use s3_resolver::cli::{commands, Cli, Commands};
use s3_resolver::config::{apply_overrides, Config, ConfigManager};
use s3_resolver::error::ResolverResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ResolverResult<()> {
    let cli = Cli::parse();
    s3_resolver::ui::init_theme();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let file_config = manager.load().await?;

    init_logging(cli.verbose, &file_config);
    debug!("Loaded configuration from {}", manager.path().display());

    // Config edits operate on the file as written, without env or flag values
    if let Commands::Config(args) = cli.command {
        return commands::config(args, &manager, &file_config).await;
    }

    let mut config = file_config;
    apply_overrides(&mut config, cli.source_root, cli.cache_root);

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Resolve(args) => commands::resolve(args, &config).await,
        Commands::Fetch(args) => commands::fetch(args, &config).await,
        Commands::Locate(args) => commands::locate(args, &config).await,
        Commands::Status => commands::status(&config).await,
        Commands::Cache(args) => commands::cache(args, &config).await,
    }
}

/// 0 = warn (or RUST_LOG when set), 1 = info, 2+ = debug. Always to stderr.
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("s3_resolver=warn")),
        1 => EnvFilter::new("s3_resolver=info"),
        _ => EnvFilter::new("s3_resolver=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.with_target(false).without_time().init();
    }
}
