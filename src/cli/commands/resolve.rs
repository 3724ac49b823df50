//! Resolve command - turn one identifier into a cached file

use crate::cache::format_bytes;
use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::error::ResolverResult;
use crate::resolver::{create_resolver, ResolvedImage};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> ResolverResult<()> {
    let resolver = create_resolver(config)?;

    // Spinner only for the human-readable output; json/plain stay pipeable
    let image = match args.format {
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            let mut spinner = TaskSpinner::new(&ctx);
            spinner.start(&format!("Resolving {}...", args.ident));
            match resolver.resolve(&args.ident, &args.base_uri).await {
                Ok(image) => {
                    spinner.stop("Resolved");
                    image
                }
                Err(e) => {
                    spinner.stop_error("Resolve failed");
                    return Err(e);
                }
            }
        }
        OutputFormat::Json | OutputFormat::Plain => {
            resolver.resolve(&args.ident, &args.base_uri).await?
        }
    };

    match args.format {
        OutputFormat::Table => print_table(&image),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&image)?),
        OutputFormat::Plain => println!("{}", image.src_path.display()),
    }

    Ok(())
}

fn print_table(image: &ResolvedImage) {
    let ctx = UiContext::detect();
    ui::key_value(&ctx, "Identifier", &image.ident);
    ui::key_value(&ctx, "Path", &image.src_path.display().to_string());
    ui::key_value(&ctx, "Format", &image.format.to_string());
    ui::key_value(&ctx, "Size", &format_bytes(image.extra.size));
    if let Some(modified) = image.extra.modified {
        ui::key_value(&ctx, "Modified", &modified.to_rfc3339());
    }
    if !image.base_uri.is_empty() {
        ui::key_value(&ctx, "Base URI", &image.base_uri);
    }
}
