//! Buildpack build log
//!
//! Lines follow the usual buildpack layout:
//!
//! ```text
//! Apache HTTP Server Buildpack 1.2.3
//!   Resolving Apache HTTP Server version
//!     Candidate version sources (in priority order):
//!       BP_HTTPD_VERSION -> "2.4.*"
//!       <unknown>        -> ""
//! ```

use super::context::UiContext;
use crate::dependency::{BuildpackInfo, ResolvedDependency};
use crate::layer::LaunchEnv;
use crate::plan::VersionRequest;
use console::Style;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

const UNKNOWN_SOURCE: &str = "<unknown>";

const SERVER_NAME: &str = "Apache HTTP Server";

/// Writes build progress to a sink (stdout in production)
pub struct LogEmitter {
    out: Mutex<Box<dyn Write + Send>>,
    ctx: UiContext,
}

impl LogEmitter {
    pub fn new(out: Box<dyn Write + Send>, ctx: UiContext) -> Self {
        Self {
            out: Mutex::new(out),
            ctx,
        }
    }

    /// Emitter writing to stdout
    pub fn stdout(ctx: UiContext) -> Self {
        Self::new(Box::new(std::io::stdout()), ctx)
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.ctx.use_color())
    }

    fn line(&self, indent: usize, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            for line in text.lines() {
                writeln!(out, "{:indent$}{}", "", line, indent = indent).ok();
            }
            if text.is_empty() {
                writeln!(out).ok();
            }
        }
    }

    /// `Name Version`
    pub fn title(&self, info: &BuildpackInfo) {
        let title = self
            .style(Style::new().bold())
            .apply_to(format!("{} {}", info.name, info.version));
        self.line(0, &title.to_string());
    }

    /// Top-level step
    pub fn process(&self, message: &str) {
        self.line(2, message);
    }

    /// Indented detail of the current step
    pub fn subprocess(&self, message: &str) {
        self.line(4, message);
    }

    /// Doubly indented detail
    pub fn action(&self, message: &str) {
        self.line(6, message);
    }

    /// Only shown when `BP_LOG_LEVEL=DEBUG`
    pub fn detail(&self, message: &str) {
        if self.ctx.is_debug() {
            self.line(6, &self.style(Style::new().dim()).apply_to(message).to_string());
        }
    }

    pub fn break_line(&self) {
        self.line(0, "");
    }

    /// Warning, styled yellow
    pub fn warning(&self, message: &str) {
        let styled = self.style(Style::new().yellow()).apply_to(message);
        self.line(4, &styled.to_string());
    }

    /// List version requests as `source -> "version"`, duplicates removed
    pub fn candidates(&self, requests: &[VersionRequest]) {
        if requests.is_empty() {
            return;
        }
        self.subprocess("Candidate version sources (in priority order):");

        let mut sources: Vec<(&str, &str)> = Vec::new();
        for request in requests {
            let source = request.source.as_deref().unwrap_or(UNKNOWN_SOURCE);
            let version = request.version.as_deref().unwrap_or("");
            if !sources.contains(&(source, version)) {
                sources.push((source, version));
            }
        }

        let width = sources.iter().map(|(s, _)| s.len()).max().unwrap_or(0);
        for (source, version) in sources {
            self.action(&format!(
                "{:<width$} -> \"{}\"",
                source,
                version,
                width = width
            ));
        }
        self.break_line();
    }

    pub fn selected_dependency(&self, winner: &VersionRequest, dependency: &ResolvedDependency) {
        let source = winner.source.as_deref().unwrap_or(UNKNOWN_SOURCE);
        self.subprocess(&format!(
            "Selected {} version (using {}): {}",
            SERVER_NAME, source, dependency.version
        ));
        self.break_line();
    }

    /// Launch environment as aligned `NAME -> "value"` lines
    pub fn environment(&self, env: &LaunchEnv) {
        self.subprocess(&env.to_string());
        self.break_line();
    }

    /// `buildpack.yml` is slated for removal in the next major release
    pub fn buildpack_yml_deprecation(&self, buildpack_version: &str) {
        let next = match semver::Version::parse(buildpack_version) {
            Ok(v) => format!("{}.0.0", v.major + 1),
            Err(_) => "the next major version".to_string(),
        };
        self.warning(&format!(
            "WARNING: Setting the server version through buildpack.yml will be deprecated soon in Apache HTTP Server Buildpack v{}.",
            next
        ));
        self.warning(
            "Please specify the version through the $BP_HTTPD_VERSION environment variable instead. See docs for more information.",
        );
        self.break_line();
    }
}

/// Render a duration rounded to the millisecond (`1.234s`, `45ms`, `1m2.5s`)
pub fn format_duration(duration: Duration) -> String {
    let ms = (duration.as_micros() + 500) / 1000;
    if ms == 0 {
        return "0s".to_string();
    }
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    let minutes = ms / 60_000;
    let rest = ms % 60_000;
    let seconds = format!("{}.{:03}", rest / 1000, rest % 1000);
    let seconds = seconds.trim_end_matches('0').trim_end_matches('.');

    if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
