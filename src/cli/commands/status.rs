//! Status command - check configuration, cache directory and remote store health

use crate::cache::{format_bytes, LocalCache};
use crate::config::Config;
use crate::error::{ResolverError, ResolverResult};
use crate::remote::StoreError;
use crate::resolver::{create_resolver, Resolver, ResolverSettings};
use console::{style, Emoji};
use tokio::fs;

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Key that is never expected to exist; a 404 for it proves the store answers
const PROBE_IDENT: &str = ".s3-resolver-status-probe";

/// Execute the status command
pub async fn execute(config: &Config) -> ResolverResult<()> {
    println!("{}", style("s3-resolver Status").bold().cyan());
    println!();

    println!("{}", style("Configuration:").bold());
    let settings = match ResolverSettings::from_config(&config.resolver) {
        Ok(settings) => settings,
        Err(e) => {
            println!("  {} {} - {}", CROSS, style("Invalid").red(), e);
            if let Some(hint) = e.hint() {
                println!("    {}", style(hint).dim());
            }
            return Err(checks_failed());
        }
    };
    println!("  {} source_root: {}", CHECK, settings.source_root());
    println!("  {} cache_root: {}", CHECK, settings.cache_root().display());
    match settings.timeout() {
        Some(limit) => println!("  {} timeout: {}s", CHECK, limit.as_secs()),
        None => println!("  {} timeout: {}", WARN, style("disabled").yellow()),
    }

    let mut all_ok = check_cache(&LocalCache::new(settings.cache_root())).await;

    all_ok &= match create_resolver(config) {
        Ok(resolver) => check_remote(&resolver).await,
        Err(e) => {
            println!();
            println!("{}", style("Remote store:").bold());
            println!("  {} {} - {}", CROSS, style("Error").red(), e);
            false
        }
    };

    println!();
    if all_ok {
        println!("{}", style("All checks passed").green().bold());
        Ok(())
    } else {
        println!(
            "{}",
            style("Some checks failed - see above for details").yellow().bold()
        );
        Err(checks_failed())
    }
}

fn checks_failed() -> ResolverError {
    ResolverError::User("status checks failed".to_string())
}

async fn check_cache(cache: &LocalCache) -> bool {
    println!();
    println!("{}", style("Cache:").bold());

    if !cache.root().is_dir() {
        println!(
            "  {} {} - creating it",
            WARN,
            style("Directory does not exist").yellow()
        );
    }

    // a staged file is removed on drop, so the probe never lingers
    let probe = match cache.stage(&cache.root().join(PROBE_IDENT)).await {
        Ok(probe) => probe,
        Err(e) => {
            println!("  {} {} - {}", CROSS, style("Not writable").red(), e);
            return false;
        }
    };
    if let Err(e) = fs::write(probe.path(), b"probe").await {
        println!("  {} {} - {}", CROSS, style("Not writable").red(), e);
        return false;
    }
    drop(probe);
    println!("  {} {}", CHECK, style("Writable").green());

    match cache.usage().await {
        Ok(usage) => {
            println!(
                "  {} {} files, {}",
                CHECK,
                usage.files,
                format_bytes(usage.bytes)
            );
            if usage.staging > 0 {
                println!(
                    "  {} {} leftover staging files - run: s3-resolver cache clear",
                    WARN, usage.staging
                );
            }
        }
        Err(e) => {
            println!("  {} {} - {}", CROSS, style("Could not read usage").red(), e);
            return false;
        }
    }

    true
}

async fn check_remote(resolver: &Resolver) -> bool {
    println!();
    println!("{}", style("Remote store:").bold());

    let store = resolver.store();
    let key = resolver.remote_key(PROBE_IDENT);
    println!("  {} {} (bucket {})", CHECK, store.store_name(), resolver.bucket());

    let head = store.head_object(resolver.bucket(), &key);
    let outcome = match resolver.settings().timeout() {
        Some(limit) => match tokio::time::timeout(limit, head).await {
            Ok(outcome) => outcome,
            Err(_) => {
                println!(
                    "  {} {} after {}s",
                    CROSS,
                    style("Timed out").red(),
                    limit.as_secs()
                );
                return false;
            }
        },
        None => head.await,
    };

    match outcome {
        Ok(_) | Err(StoreError::NotFound) => {
            println!("  {} {}", CHECK, style("Reachable").green());
            true
        }
        Err(e) => {
            println!("  {} {} - {}", CROSS, style("Unreachable").red(), e);
            false
        }
    }
}
