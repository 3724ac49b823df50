//! Progress indicators with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Progress bar over a batch of identifiers.
///
/// Shows an indicatif bar in interactive mode and one plain line per
/// finished item otherwise.
pub struct FetchProgress {
    bar: Option<ProgressBar>,
    total: u64,
    done: u64,
}

impl FetchProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let total = total as u64;
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total);
            // Template is a literal; a parse failure only loses styling.
            if let Ok(bar_style) = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} Fetching  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
            {
                bar.set_style(
                    bar_style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .progress_chars("━╸─"),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Fetching {} identifier(s)...", total);
            None
        };
        Self {
            bar,
            total,
            done: 0,
        }
    }

    /// Show which identifier is in flight
    pub fn begin(&self, ident: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(ident.to_string());
        }
    }

    /// Record one finished identifier with a short outcome label
    pub fn finish_item(&mut self, ident: &str, outcome: &str) {
        self.done += 1;
        match self.bar {
            Some(ref bar) => {
                bar.inc(1);
                bar.println(format!("  {} {}", style(outcome).dim(), ident));
            }
            None => println!("  [{}/{}] {} {}", self.done, self.total, outcome, ident),
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
