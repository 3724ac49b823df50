//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ResolverError, ResolverResult};
use crate::resolver::ImageFormat;
use crate::ui::{self, UiContext};
use std::path::PathBuf;

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "resolver.source_root",
    "resolver.cache_root",
    "resolver.default_format",
    "resolver.timeout_secs",
    "resolver.single_flight",
    "store.region",
    "store.endpoint",
    "store.allow_http",
];

/// Execute the config command.
///
/// `config` is the file configuration before any environment or flag
/// overrides, so `set` never persists a transient value.
pub async fn execute(
    args: ConfigArgs,
    manager: &ConfigManager,
    config: &Config,
) -> ResolverResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut config = config.clone();
            set_value(&mut config, &key, &value)?;
            manager.save(&config).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ResolverResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ResolverResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );
    Ok(())
}

/// Apply a dot-separated `key = value` to `config`
fn set_value(config: &mut Config, key: &str, value: &str) -> ResolverResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(ResolverError::User(format!(
                    "Invalid log format: {}. Use text/json",
                    value
                )))
            }
        },

        ["resolver", "source_root"] => config.resolver.source_root = optional(value),
        ["resolver", "cache_root"] => {
            config.resolver.cache_root = optional(value).map(PathBuf::from)
        }
        ["resolver", "default_format"] => {
            if let Some(format) = optional(value) {
                format.parse::<ImageFormat>().map_err(ResolverError::User)?;
            }
            config.resolver.default_format = optional(value);
        }
        ["resolver", "timeout_secs"] => config.resolver.timeout_secs = parse_u64(value)?,
        ["resolver", "single_flight"] => config.resolver.single_flight = parse_bool(value)?,

        ["store", "region"] => config.store.region = optional(value),
        ["store", "endpoint"] => config.store.endpoint = optional(value),
        ["store", "allow_http"] => config.store.allow_http = parse_bool(value)?,

        _ => {
            return Err(ResolverError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

/// Empty string unsets an optional value
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(value: &str) -> ResolverResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ResolverError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u64(value: &str) -> ResolverResult<u64> {
    value
        .parse()
        .map_err(|_| ResolverError::User(format!("Invalid number: {}", value)))
}
