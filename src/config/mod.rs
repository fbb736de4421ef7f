//! Build configuration read from `BP_*` environment variables

pub mod schema;

pub use schema::{vars, BuildEnvironment, LogLevel, WEB_SERVER_HTTPD};

use crate::error::{BuildpackError, BuildpackResult};

/// Parse a boolean literal the way buildpack tooling conventionally does.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl BuildEnvironment {
    /// Read the build environment from the current process
    pub fn from_env() -> BuildpackResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the build environment through an arbitrary lookup function.
    ///
    /// A variable counts as set even when empty, so an empty flag is invalid.
    pub fn from_lookup<F>(lookup: F) -> BuildpackResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| -> BuildpackResult<bool> {
            match lookup(name) {
                Some(value) => {
                    parse_bool(&value).ok_or_else(|| BuildpackError::invalid_flag(name, value))
                }
                None => Ok(false),
            }
        };

        let env = Self {
            httpd_version: lookup(vars::HTTPD_VERSION),
            live_reload_enabled: flag(vars::LIVE_RELOAD_ENABLED)?,
            web_server: lookup(vars::WEB_SERVER),
            force_https: flag(vars::WEB_SERVER_FORCE_HTTPS)?,
            push_state_enabled: flag(vars::WEB_SERVER_ENABLE_PUSH_STATE)?,
            web_server_root: lookup(vars::WEB_SERVER_ROOT),
            log_level: lookup(vars::LOG_LEVEL)
                .map(|v| LogLevel::parse(&v))
                .unwrap_or_default(),
        };

        Ok(env)
    }
}
