//! Launch environment for a layer
//!
//! Each variable becomes a file under `<layer>/env.launch/`, named
//! `NAME.override`, whose content is the value.

use crate::error::{BuildpackError, BuildpackResult};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

const ENV_LAUNCH_DIR: &str = "env.launch";

/// Variables a layer sets at launch, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchEnv {
    overrides: BTreeMap<String, String>,
}

impl LaunchEnv {
    /// Set `name` to `value`, replacing anything set by earlier layers
    pub fn override_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(name.into(), value.into());
    }

    /// Look up an override
    pub fn get(&self, name: &str) -> Option<&str> {
        self.overrides.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// `(NAME.override, value)` pairs as written to disk
    pub fn files(&self) -> impl Iterator<Item = (String, &str)> {
        self.overrides
            .iter()
            .map(|(k, v)| (format!("{}.override", k), v.as_str()))
    }

    /// Write every variable into `<layer_path>/env.launch/`
    pub async fn write(&self, layer_path: &Path) -> BuildpackResult<()> {
        if self.is_empty() {
            return Ok(());
        }

        let dir = layer_path.join(ENV_LAUNCH_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BuildpackError::io(format!("creating {}", dir.display()), e))?;

        for (file, value) in self.files() {
            let path = dir.join(file);
            tokio::fs::write(&path, value)
                .await
                .map_err(|e| BuildpackError::io(format!("writing {}", path.display()), e))?;
        }
        Ok(())
    }
}

impl fmt::Display for LaunchEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.overrides.keys().map(String::len).max().unwrap_or(0);
        for (i, (name, value)) in self.overrides.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<width$} -> \"{}\"", name, value, width = width)?;
        }
        Ok(())
    }
}
