//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// s3-resolver - read-through image cache backed by S3
///
/// Resolves image identifiers to local files, downloading each object
/// from the configured bucket on first access.
#[derive(Parser, Debug)]
#[command(name = "s3-resolver")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "S3_RESOLVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remote root, e.g. s3://bucket/prefix/
    #[arg(long, global = true, env = "SOURCE_ROOT")]
    pub source_root: Option<String>,

    /// Absolute directory for cached images
    #[arg(long, global = true, env = "CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an identifier to a cached file, downloading it if needed
    Resolve(ResolveArgs),

    /// Warm the cache for one or more identifiers
    Fetch(FetchArgs),

    /// Show the remote key and cache path for an identifier (no network)
    Locate(LocateArgs),

    /// Check configuration, cache directory and remote store health
    Status,

    /// Inspect or empty the local cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// URL-escaped image identifier
    pub ident: String,

    /// Base URI the image is served under
    #[arg(long, default_value = "")]
    pub base_uri: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// URL-escaped image identifiers
    #[arg(required = true)]
    pub idents: Vec<String>,
}

/// Arguments for the locate command
#[derive(Parser, Debug)]
pub struct LocateArgs {
    /// URL-escaped image identifier
    pub ident: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., resolver.source_root)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for command results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Path only
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache location and usage
    Info {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove one identifier from the cache
    Purge {
        /// URL-escaped image identifier
        ident: String,
    },

    /// Remove every cached file
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_resolve() {
        let cli = Cli::parse_from([
            "s3-resolver",
            "resolve",
            "dog.jpg",
            "--base-uri",
            "https://iiif.example.org/dog.jpg",
        ]);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.ident, "dog.jpg");
                assert_eq!(args.base_uri, "https://iiif.example.org/dog.jpg");
                assert!(matches!(args.format, OutputFormat::Table));
            }
            _ => panic!("expected Resolve command"),
        }
    }

    #[test]
    fn cli_parses_fetch_many() {
        let cli = Cli::parse_from(["s3-resolver", "fetch", "a.jpg", "b%2Fc.png"]);
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.idents, vec!["a.jpg", "b%2Fc.png"]),
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_fetch_requires_ident() {
        assert!(Cli::try_parse_from(["s3-resolver", "fetch"]).is_err());
    }

    #[test]
    fn cli_parses_global_roots() {
        let cli = Cli::parse_from([
            "s3-resolver",
            "locate",
            "dog.jpg",
            "--source-root",
            "s3://bucket1/images/",
            "--cache-root",
            "/tmp/cache",
        ]);
        assert_eq!(cli.source_root.as_deref(), Some("s3://bucket1/images/"));
        assert_eq!(cli.cache_root, Some(PathBuf::from("/tmp/cache")));
    }

    #[test]
    fn cli_parses_cache_clear() {
        let cli = Cli::parse_from(["s3-resolver", "cache", "clear", "--yes"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { yes },
            }) => assert!(yes),
            _ => panic!("expected Cache Clear command"),
        }
    }

    #[test]
    fn cli_parses_status() {
        let cli = Cli::parse_from(["s3-resolver", "status"]);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["s3-resolver", "status"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["s3-resolver", "-vv", "status"]);
        assert_eq!(cli.verbose, 2);
    }
}
