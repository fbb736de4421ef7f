//! Output context: colour and verbosity

use crate::config::LogLevel;
use std::io::IsTerminal;

/// Decides how build output is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiContext {
    /// Whether ANSI styling is emitted
    colored: bool,
    /// `BP_LOG_LEVEL`
    level: LogLevel,
}

impl UiContext {
    /// Detect colour support for stdout
    pub fn detect(level: LogLevel) -> Self {
        Self {
            colored: Self::detect_color(),
            level,
        }
    }

    /// Unstyled output (tests, log capture)
    pub fn plain(level: LogLevel) -> Self {
        Self {
            colored: false,
            level,
        }
    }

    pub fn use_color(&self) -> bool {
        self.colored
    }

    /// Whether detail lines are shown
    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    fn detect_color() -> bool {
        if !std::io::stdout().is_terminal() {
            return false;
        }

        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }

        // Build platforms capture output; keep it free of escape codes
        let ci_vars = ["CI", "CNB_PLATFORM_API", "GITHUB_ACTIONS", "GITLAB_CI"];
        !ci_vars.iter().any(|var| std::env::var_os(var).is_some())
    }
}

impl Default for UiContext {
    fn default() -> Self {
        Self::plain(LogLevel::Info)
    }
}
