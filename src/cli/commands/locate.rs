//! Locate command - show where an identifier maps without touching the network

use crate::cli::args::{LocateArgs, OutputFormat};
use crate::config::Config;
use crate::error::ResolverResult;
use crate::resolver::create_resolver;
use crate::ui::{self, UiContext};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct Location {
    ident: String,
    bucket: String,
    key: String,
    cache_path: PathBuf,
    cached: bool,
}

/// Execute the locate command
pub async fn execute(args: LocateArgs, config: &Config) -> ResolverResult<()> {
    let resolver = create_resolver(config)?;

    let cache_path = resolver.cache_path(&args.ident)?;
    let location = Location {
        bucket: resolver.bucket().to_string(),
        key: resolver.remote_key(&args.ident),
        cached: resolver.cache().contains(&cache_path).await,
        cache_path,
        ident: args.ident,
    };

    match args.format {
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::key_value(&ctx, "Identifier", &location.ident);
            ui::key_value(&ctx, "Bucket", &location.bucket);
            ui::key_value(&ctx, "Key", &location.key);
            ui::key_value(&ctx, "Cache path", &location.cache_path.display().to_string());
            let state = if location.cached { "yes" } else { "no" };
            ui::key_value_status(&ctx, "Cached", state, location.cached);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&location)?),
        OutputFormat::Plain => println!("{}", location.cache_path.display()),
    }

    Ok(())
}
