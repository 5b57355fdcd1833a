//! Terminal colours for human output.
//!
//! Colour is a property of the [`Palette`] value handed to whoever prints,
//! never process-wide state, so tests and `--no-color` runs simply pass a
//! plain palette.

use colored::{Color, Colorize};

/// Colour scheme for launcher messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// Palette that colours when `color` is true.
    #[must_use]
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// Palette that never emits escape codes.
    #[must_use]
    pub const fn plain() -> Self {
        Self { color: false }
    }

    /// Success lines.
    #[must_use]
    pub fn ok(self, text: &str) -> String {
        self.paint(text, Color::Green)
    }

    /// Failures.
    #[must_use]
    pub fn fail(self, text: &str) -> String {
        self.paint(text, Color::Red)
    }

    /// Prompts and the hardening step.
    #[must_use]
    pub fn warn(self, text: &str) -> String {
        self.paint(text, Color::Yellow)
    }

    /// Audit steps, lists and "press ENTER" hints.
    #[must_use]
    pub fn info(self, text: &str) -> String {
        self.paint(text, Color::Cyan)
    }

    #[must_use]
    pub fn heading(self, text: &str) -> String {
        if self.color {
            text.color(Color::Green).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint(self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}
