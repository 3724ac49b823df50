//! Custom theme for cliclack output

use cliclack::ThemeState;
use console::Style;

/// Blue-branded theme for resolver output
#[derive(Debug, Clone, Default)]
pub struct ResolverTheme;

impl cliclack::Theme for ResolverTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().blue().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Initialize the global theme
pub fn init_theme() {
    cliclack::set_theme(ResolverTheme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliclack::Theme;

    #[test]
    fn error_state_is_red_for_bar_and_symbol() {
        let theme = ResolverTheme;
        let state = ThemeState::Error("boom".to_string());
        assert_eq!(
            theme.bar_color(&state).apply_to("x").to_string(),
            theme.state_symbol_color(&state).apply_to("x").to_string()
        );
    }
}
