//! Build layers
//!
//! A layer is a directory under the platform's layers dir plus a metadata
//! record (`<name>.toml`) that survives between builds. The build process owns
//! the layer exclusively for its duration.

pub mod env;
pub mod metadata;

pub use env::LaunchEnv;
pub use metadata::{CachedLayerMetadata, LayerRecord, LayerTypes};

use crate::error::{BuildpackError, BuildpackResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A layer as seen by one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub path: PathBuf,
    pub types: LayerTypes,
    pub metadata: CachedLayerMetadata,
    pub launch_env: LaunchEnv,
}

impl Layer {
    /// Path of the metadata record for this layer
    fn record_path(&self) -> PathBuf {
        record_path(self.path.parent().unwrap_or(Path::new(".")), &self.name)
    }
}

fn record_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}.toml", name))
}

/// Reads, resets and persists layers under one layers directory
#[derive(Debug, Clone)]
pub struct LayerStore {
    root: PathBuf,
}

impl LayerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load a layer, including whatever metadata a previous build left
    pub async fn get(&self, name: &str) -> BuildpackResult<Layer> {
        let record = LayerRecord::load(&record_path(&self.root, name))
            .await?
            .unwrap_or_default();

        Ok(Layer {
            name: name.to_string(),
            path: self.root.join(name),
            types: record.types,
            metadata: record.metadata,
            launch_env: LaunchEnv::default(),
        })
    }

    /// Discard the layer's metadata and contents, leaving an empty directory
    pub async fn reset(&self, layer: Layer) -> BuildpackResult<Layer> {
        debug!("Resetting layer {}", layer.path.display());

        match tokio::fs::remove_dir_all(&layer.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("removing layer {}", layer.path.display()),
                    e,
                ))
            }
        }

        let record = layer.record_path();
        match tokio::fs::remove_file(&record).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("removing layer metadata {}", record.display()),
                    e,
                ))
            }
        }

        tokio::fs::create_dir_all(&layer.path)
            .await
            .map_err(|e| BuildpackError::io(format!("creating layer {}", layer.path.display()), e))?;

        Ok(Layer {
            name: layer.name,
            path: layer.path,
            types: LayerTypes::default(),
            metadata: CachedLayerMetadata::default(),
            launch_env: LaunchEnv::default(),
        })
    }

    /// Write the metadata record and launch environment
    pub async fn persist(&self, layer: &Layer) -> BuildpackResult<()> {
        tokio::fs::create_dir_all(&layer.path)
            .await
            .map_err(|e| BuildpackError::io(format!("creating layer {}", layer.path.display()), e))?;

        let record = LayerRecord {
            types: layer.types,
            metadata: layer.metadata.clone(),
        };
        record.save(&record_path(&self.root, &layer.name)).await?;
        layer.launch_env.write(&layer.path).await
    }
}
