//! Colors for CLI output.
//!
//! ANSI sequences are only emitted when stdout is a terminal and `NO_COLOR`
//! is unset.

/// ANSI colors used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Cyan,
    Gray,
    DarkGray,
}

impl Color {
    fn ansi(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::Gray => "\x1b[37m",
            Color::DarkGray => "\x1b[90m",
        }
    }
}

/// ANSI reset sequence
const ANSI_RESET: &str = "\x1b[0m";

/// Color roles for CLI output.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary text color (used for most content)
    pub text_primary: Color,
    /// Secondary/dimmed text color
    pub text_secondary: Color,
    /// Accent color for headings
    pub accent: Color,
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    /// Emit escape sequences at all
    pub enabled: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text_primary: Color::Gray,
            text_secondary: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            enabled: true,
        }
    }
}

impl Theme {
    /// Theme that never emits escape sequences.
    pub fn plain() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", color.ansi(), text, ANSI_RESET)
        } else {
            text.to_string()
        }
    }

    pub fn primary_text(&self, text: &str) -> String {
        self.paint(self.text_primary, text)
    }

    pub fn secondary_text(&self, text: &str) -> String {
        self.paint(self.text_secondary, text)
    }

    pub fn accent_text(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn error_text(&self, text: &str) -> String {
        self.paint(self.error, text)
    }

    pub fn success_text(&self, text: &str) -> String {
        self.paint(self.success, text)
    }

    pub fn warning_text(&self, text: &str) -> String {
        self.paint(self.warning, text)
    }
}

/// Theme for the current process: colored on a TTY, plain otherwise.
pub fn current_theme() -> Theme {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    if no_color || !atty::is(atty::Stream::Stdout) {
        Theme::plain()
    } else {
        Theme::default()
    }
}
