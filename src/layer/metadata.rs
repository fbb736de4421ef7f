//! Layer metadata record
//!
//! Persisted next to the layer directory as `<layers>/<name>.toml`:
//!
//! ```toml
//! [types]
//! launch = true
//! build = false
//! cache = false
//!
//! [metadata]
//! cache_sha = "abc123..."
//! built_at = "2024-01-01T00:00:00.000000000Z"
//! ```

use crate::error::{BuildpackError, BuildpackResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata recorded after a fresh install
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLayerMetadata {
    /// Content hash of the installed artifact
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cache_sha: String,

    /// RFC3339 install timestamp (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_at: Option<String>,
}

impl CachedLayerMetadata {
    /// The recorded hash, if any
    pub fn content_hash(&self) -> Option<&str> {
        if self.cache_sha.is_empty() {
            None
        } else {
            Some(&self.cache_sha)
        }
    }
}

/// Layer availability flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTypes {
    #[serde(default)]
    pub launch: bool,

    #[serde(default)]
    pub build: bool,

    #[serde(default)]
    pub cache: bool,
}

/// On-disk shape of `<layers>/<name>.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    #[serde(default)]
    pub types: LayerTypes,

    #[serde(default)]
    pub metadata: CachedLayerMetadata,
}

impl LayerRecord {
    /// Read a record, `None` when the file does not exist
    pub async fn load(path: &Path) -> BuildpackResult<Option<Self>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("reading layer metadata {}", path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| BuildpackError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Write the record
    pub async fn save(&self, path: &Path) -> BuildpackResult<()> {
        let content = toml::to_string(self)?;
        tokio::fs::write(path, content).await.map_err(|e| {
            BuildpackError::io(format!("writing layer metadata {}", path.display()), e)
        })
    }
}
