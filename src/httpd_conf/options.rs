//! Template-ready projection of the build environment

use crate::config::BuildEnvironment;
use std::path::{Path, PathBuf};

/// Document root used when `BP_WEB_SERVER_ROOT` is unset
pub const DEFAULT_WEB_SERVER_ROOT: &str = "public";

/// Everything the template needs, nothing more
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOptions {
    /// Fully resolved document root
    pub web_server_root: PathBuf,
    pub push_state: bool,
    pub force_https: bool,

    /// Path of the bound `.htpasswd` file, when a binding exists
    pub basic_auth_file: Option<PathBuf>,
}

impl ConfigOptions {
    /// Project the environment for an app rooted at `app_dir`
    pub fn new(env: &BuildEnvironment, app_dir: &Path) -> Self {
        Self {
            web_server_root: resolve_web_server_root(app_dir, env.web_server_root.as_deref()),
            push_state: env.push_state_enabled,
            force_https: env.force_https,
            basic_auth_file: None,
        }
    }

    /// Attach the credential file found in a binding
    pub fn with_basic_auth_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.basic_auth_file = Some(path.into());
        self
    }

    /// Whether the rewrite module must be loaded
    pub fn needs_rewrite(&self) -> bool {
        self.push_state || self.force_https
    }
}

/// `public` under the app dir by default; relative overrides are joined to
/// the app dir, absolute ones are kept
pub fn resolve_web_server_root(app_dir: &Path, root: Option<&str>) -> PathBuf {
    match root {
        Some(root) if Path::new(root).is_absolute() => PathBuf::from(root),
        Some(root) => app_dir.join(root),
        None => app_dir.join(DEFAULT_WEB_SERVER_ROOT),
    }
}
