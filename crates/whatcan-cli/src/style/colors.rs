//! Semantic color palette for terminal output.

use owo_colors::{OwoColorize, Style};

/// Returns the style for error messages (red bold).
pub fn error_style() -> Style {
    Style::new().red().bold()
}

/// Returns the style for warning messages (yellow).
pub fn warning_style() -> Style {
    Style::new().yellow()
}

/// Returns the style for headers (bold).
pub fn header_style() -> Style {
    Style::new().bold()
}

/// Returns the style for namespace names (cyan).
pub fn namespace_style() -> Style {
    Style::new().cyan()
}

/// Trait extension to apply semantic styles.
pub trait SemanticStyle: Sized {
    /// Apply error styling (red bold).
    fn error(&self) -> String;
    /// Apply warning styling (yellow).
    fn warning(&self) -> String;
    /// Apply header styling (bold).
    fn header(&self) -> String;
    /// Apply namespace styling (cyan).
    fn namespace(&self) -> String;
}

impl<T: std::fmt::Display> SemanticStyle for T {
    fn error(&self) -> String {
        styled(self, error_style())
    }

    fn warning(&self) -> String {
        styled(self, warning_style())
    }

    fn header(&self) -> String {
        styled(self, header_style())
    }

    fn namespace(&self) -> String {
        styled(self, namespace_style())
    }
}

fn styled(value: &impl std::fmt::Display, style: Style) -> String {
    if super::no_color() {
        value.to_string()
    } else {
        value.style(style).to_string()
    }
}
