//! Build environment schema
//!
//! Every `BP_*` variable the buildpack honours is collected into one
//! immutable [`BuildEnvironment`] at process start.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable names
pub mod vars {
    /// Requested httpd version constraint
    pub const HTTPD_VERSION: &str = "BP_HTTPD_VERSION";
    /// Wrap the web process in a file-watching supervisor
    pub const LIVE_RELOAD_ENABLED: &str = "BP_LIVE_RELOAD_ENABLED";
    /// Web server selector; `httpd` enables config generation
    pub const WEB_SERVER: &str = "BP_WEB_SERVER";
    /// Redirect plain HTTP requests to HTTPS
    pub const WEB_SERVER_FORCE_HTTPS: &str = "BP_WEB_SERVER_FORCE_HTTPS";
    /// Route unknown paths to index.html
    pub const WEB_SERVER_ENABLE_PUSH_STATE: &str = "BP_WEB_SERVER_ENABLE_PUSH_STATE";
    /// Document root override
    pub const WEB_SERVER_ROOT: &str = "BP_WEB_SERVER_ROOT";
    /// Buildpack log level (INFO or DEBUG)
    pub const LOG_LEVEL: &str = "BP_LOG_LEVEL";
}

/// Selector value that turns on `httpd.conf` generation
pub const WEB_SERVER_HTTPD: &str = "httpd";

/// Buildpack output verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a `BP_LOG_LEVEL` value; anything other than DEBUG means INFO
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("debug") {
            Self::Debug
        } else {
            Self::Info
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Debug => write!(f, "DEBUG"),
        }
    }
}

/// Immutable build configuration resolved once from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironment {
    /// Version constraint from `BP_HTTPD_VERSION`
    pub httpd_version: Option<String>,

    /// `BP_LIVE_RELOAD_ENABLED`
    pub live_reload_enabled: bool,

    /// `BP_WEB_SERVER`
    pub web_server: Option<String>,

    /// `BP_WEB_SERVER_FORCE_HTTPS`
    pub force_https: bool,

    /// `BP_WEB_SERVER_ENABLE_PUSH_STATE`
    pub push_state_enabled: bool,

    /// `BP_WEB_SERVER_ROOT`
    pub web_server_root: Option<String>,

    /// `BP_LOG_LEVEL`
    pub log_level: LogLevel,
}

impl BuildEnvironment {
    /// Whether the buildpack should generate `httpd.conf` itself
    pub fn generates_config(&self) -> bool {
        self.web_server.as_deref() == Some(WEB_SERVER_HTTPD)
    }
}
