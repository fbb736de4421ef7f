//! Catalog-backed dependency service
//!
//! Resolves versions from `buildpack.toml` and delivers artifacts, honouring
//! `dependency-mapping` bindings that redirect an artifact (keyed by its
//! SHA-256) to another URI.

use crate::bindings::BindingResolver;
use crate::error::{BuildpackError, BuildpackResult};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use super::catalog::{self, BuildpackDescriptor};
use super::transport;
use super::{DependencyService, ResolvedDependency};

/// Binding kind used to remap dependency URIs
pub const DEPENDENCY_MAPPING: &str = "dependency-mapping";

/// Dependency service backed by the buildpack's own catalog
pub struct CatalogDependencyService {
    bindings: Box<dyn BindingResolver>,
}

impl CatalogDependencyService {
    pub fn new(bindings: Box<dyn BindingResolver>) -> Self {
        Self { bindings }
    }

    /// URI to fetch, after applying any dependency mapping
    async fn mapped_uri(
        &self,
        dependency: &ResolvedDependency,
        platform_path: &Path,
    ) -> BuildpackResult<String> {
        let mappings = self
            .bindings
            .resolve(DEPENDENCY_MAPPING, "", platform_path)
            .await?;

        for binding in &mappings {
            if let Some(path) = binding.entries.get(&dependency.content_hash) {
                let uri = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| BuildpackError::io(format!("reading {}", path.display()), e))?;
                let uri = uri.trim().to_string();
                info!("Dependency {} mapped to {}", dependency.id, uri);
                return Ok(uri);
            }
        }

        Ok(dependency.uri.clone())
    }
}

#[async_trait]
impl DependencyService for CatalogDependencyService {
    async fn resolve(
        &self,
        metadata_path: &Path,
        name: &str,
        version: &str,
        stack: &str,
    ) -> BuildpackResult<ResolvedDependency> {
        let descriptor = BuildpackDescriptor::from_file(metadata_path).await?;
        let dependency = catalog::select(&descriptor.metadata.dependencies, name, version, stack)?;
        debug!(
            "Resolved {} \"{}\" to {}",
            name, version, dependency.version
        );
        Ok(dependency)
    }

    async fn deliver(
        &self,
        dependency: &ResolvedDependency,
        cnb_path: &Path,
        layer_path: &Path,
        platform_path: &Path,
    ) -> BuildpackResult<()> {
        let uri = self.mapped_uri(dependency, platform_path).await?;
        let expected = dependency.content_hash.clone();
        let strip = dependency.strip_components;
        let cnb_path = cnb_path.to_path_buf();
        let layer_path = layer_path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let bytes = transport::fetch(&uri, &cnb_path)?;
            transport::verify(&bytes, &expected)?;
            transport::unpack(&bytes, &uri, &layer_path, strip)
        })
        .await
        .map_err(|e| BuildpackError::Internal(format!("delivery task failed: {}", e)))?
    }
}
