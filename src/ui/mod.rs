//! Terminal output for the CLI
//!
//! Uses `cliclack` for styled steps and spinners and `indicatif` for batch
//! progress, falling back to plain lines when stdout is not a terminal or a
//! CI environment is detected.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, step_error_detail,
    step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::{FetchProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, ResolverTheme};
