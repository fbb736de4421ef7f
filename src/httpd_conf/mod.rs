//! httpd.conf generation
//!
//! Used when `BP_WEB_SERVER=httpd`: the buildpack writes a complete
//! configuration into the app dir instead of relying on one shipped with the
//! app. Basic auth is enabled by a single `htpasswd` service binding.

pub mod options;
pub mod template;

pub use options::{resolve_web_server_root, ConfigOptions, DEFAULT_WEB_SERVER_ROOT};
pub use template::render;

use crate::bindings::BindingResolver;
use crate::config::BuildEnvironment;
use crate::error::{BuildpackError, BuildpackResult};
use crate::plan::HTTPD_CONF;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Binding kind carrying basic auth credentials
pub const HTPASSWD_BINDING: &str = "htpasswd";

/// Entry that must be present in an `htpasswd` binding
pub const HTPASSWD_ENTRY: &str = ".htpasswd";

/// Writes `httpd.conf` into the app dir
pub struct ConfigGenerator {
    bindings: Box<dyn BindingResolver>,
}

impl ConfigGenerator {
    pub fn new(bindings: Box<dyn BindingResolver>) -> Self {
        Self { bindings }
    }

    /// Build the template options, consulting the binding resolver.
    ///
    /// Zero bindings means no auth; more than one, or one without the
    /// `.htpasswd` entry, is an error.
    pub async fn options(
        &self,
        env: &BuildEnvironment,
        app_dir: &Path,
        platform_path: &Path,
    ) -> BuildpackResult<ConfigOptions> {
        let options = ConfigOptions::new(env, app_dir);

        let mut bindings = self
            .bindings
            .resolve(HTPASSWD_BINDING, "", platform_path)
            .await?;

        if bindings.len() > 1 {
            return Err(BuildpackError::BindingConflict {
                kind: HTPASSWD_BINDING.to_string(),
            });
        }

        match bindings.pop() {
            None => Ok(options),
            Some(binding) => {
                if !binding.has_entry(HTPASSWD_ENTRY) {
                    return Err(BuildpackError::BindingIncomplete {
                        kind: HTPASSWD_BINDING.to_string(),
                        entry: HTPASSWD_ENTRY.to_string(),
                    });
                }
                debug!("Using htpasswd binding {}", binding.name);
                Ok(options.with_basic_auth_file(binding.path.join(HTPASSWD_ENTRY)))
            }
        }
    }

    /// Render and write `<app_dir>/httpd.conf`, returning its path
    pub async fn generate(
        &self,
        env: &BuildEnvironment,
        app_dir: &Path,
        platform_path: &Path,
    ) -> BuildpackResult<PathBuf> {
        let options = self.options(env, app_dir, platform_path).await?;
        let path = app_dir.join(HTTPD_CONF);

        tokio::fs::write(&path, render(&options))
            .await
            .map_err(|e| BuildpackError::io(format!("writing {}", path.display()), e))?;

        debug!("Wrote {}", path.display());
        Ok(path)
    }
}
