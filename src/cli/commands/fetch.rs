//! Fetch command - warm the cache for a batch of identifiers

use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::{ErrorKind, ResolverError, ResolverResult};
use crate::resolver::{create_resolver, Resolver};
use crate::ui::{self, FetchProgress, UiContext};
use tracing::debug;

/// What happened to one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Fetched,
    Cached,
    Missing,
    Failed,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Cached => "cached",
            Self::Missing => "missing",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    fetched: usize,
    cached: usize,
    missing: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Fetched => self.fetched += 1,
            Outcome::Cached => self.cached += 1,
            Outcome::Missing => self.missing += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    fn unresolved(&self) -> usize {
        self.missing + self.failed
    }

    fn summary(&self) -> String {
        format!(
            "{} fetched, {} cached, {} missing, {} failed",
            self.fetched, self.cached, self.missing, self.failed
        )
    }
}

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ResolverResult<()> {
    let ctx = UiContext::detect();
    let resolver = create_resolver(config)?;

    ui::intro(&ctx, &format!("Fetching into {}", resolver.cache().root().display()));

    let total = args.idents.len();
    let mut progress = FetchProgress::new(&ctx, total);
    let mut tally = Tally::default();
    let mut errors = Vec::new();

    for ident in &args.idents {
        progress.begin(ident);
        let outcome = match fetch_one(&resolver, ident).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let outcome = if e.kind() == ErrorKind::NotFound {
                    Outcome::Missing
                } else {
                    Outcome::Failed
                };
                errors.push((ident.clone(), e));
                outcome
            }
        };
        tally.record(outcome);
        progress.finish_item(ident, outcome.label());
    }
    progress.finish();

    for (ident, e) in &errors {
        ui::step_error_detail(&ctx, ident, &e.to_string());
    }

    if tally.unresolved() == 0 {
        ui::outro_success(&ctx, &tally.summary());
        Ok(())
    } else {
        ui::outro_warn(&ctx, &tally.summary());
        Err(ResolverError::User(format!(
            "{} of {} identifiers could not be fetched",
            tally.unresolved(),
            total
        )))
    }
}

async fn fetch_one(resolver: &Resolver, ident: &str) -> ResolverResult<Outcome> {
    if resolver.in_cache(ident).await? {
        debug!("{} already cached", ident);
        return Ok(Outcome::Cached);
    }
    resolver.resolve(ident, "").await?;
    Ok(Outcome::Fetched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_summary_and_unresolved() {
        let mut tally = Tally::default();
        tally.record(Outcome::Fetched);
        tally.record(Outcome::Cached);
        tally.record(Outcome::Cached);
        tally.record(Outcome::Missing);

        assert_eq!(tally.unresolved(), 1);
        assert_eq!(tally.summary(), "1 fetched, 2 cached, 1 missing, 0 failed");
    }
}
