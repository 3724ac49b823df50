//! Cache command - inspect or empty the local cache

use crate::cache::{format_bytes, CacheUsage, LocalCache};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ResolverError, ResolverResult};
use crate::resolver::cache_path;
use crate::ui::{self, UiContext};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct CacheInfo {
    root: PathBuf,
    exists: bool,
    #[serde(flatten)]
    usage: CacheUsage,
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ResolverResult<()> {
    // Only the cache root is needed here; source_root may be unset
    let cache = LocalCache::new(cache_root(config)?);

    match args.action {
        CacheAction::Info { format } => show_info(&cache, format).await,
        CacheAction::Purge { ident } => purge(&cache, &ident).await,
        CacheAction::Clear { yes } => clear(&cache, yes).await,
    }
}

fn cache_root(config: &Config) -> ResolverResult<PathBuf> {
    let root = config
        .resolver
        .cache_root
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ResolverError::ConfigMissing { key: "cache_root" })?;
    if !root.is_absolute() {
        return Err(ResolverError::CacheRootRelative(root));
    }
    Ok(root)
}

async fn show_info(cache: &LocalCache, format: OutputFormat) -> ResolverResult<()> {
    let info = CacheInfo {
        root: cache.root().to_path_buf(),
        exists: cache.root().is_dir(),
        usage: cache.usage().await?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Plain => println!("{}", info.root.display()),
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::key_value(&ctx, "Root", &info.root.display().to_string());
            if !info.exists {
                ui::key_value_status(&ctx, "Exists", "no", false);
            }
            ui::key_value(&ctx, "Files", &info.usage.files.to_string());
            ui::key_value(&ctx, "Size", &format_bytes(info.usage.bytes));
            if info.usage.staging > 0 {
                ui::key_value_status(
                    &ctx,
                    "Staging files",
                    &info.usage.staging.to_string(),
                    false,
                );
            }
        }
    }

    Ok(())
}

async fn purge(cache: &LocalCache, ident: &str) -> ResolverResult<()> {
    let ctx = UiContext::detect();
    let path = cache_path(cache.root(), ident)?;

    if cache.remove(&path).await? {
        ui::step_ok_detail(&ctx, "Purged", &path.display().to_string());
    } else {
        ui::step_warn_hint(
            &ctx,
            &format!("{} is not cached", ident),
            &path.display().to_string(),
        );
    }
    Ok(())
}

async fn clear(cache: &LocalCache, yes: bool) -> ResolverResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let usage = cache.usage().await?;

    if usage.files == 0 && usage.staging == 0 {
        ui::step_ok(&ctx, "Cache is already empty");
        return Ok(());
    }

    let prompt = format!(
        "Remove {} cached files ({}) from {}?",
        usage.files,
        format_bytes(usage.bytes),
        cache.root().display()
    );
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_warn_hint(&ctx, "Nothing removed", "Pass --yes to skip the prompt");
        return Ok(());
    }

    let removed = cache.clear().await?;
    ui::step_ok_detail(
        &ctx,
        "Cache cleared",
        &format!("{} entries, {} freed", removed, format_bytes(usage.bytes)),
    );
    Ok(())
}
