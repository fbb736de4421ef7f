//! Dependency resolution and delivery
//!
//! The build only consumes the [`ResolvedDependency`] shape; how an artifact
//! is located and unpacked lives behind [`DependencyService`].

pub mod catalog;
pub mod service;
pub mod transport;

pub use catalog::{BuildpackDescriptor, BuildpackInfo, DependencyEntry, BUILDPACK_TOML};
pub use service::CatalogDependencyService;

use crate::error::BuildpackResult;
use async_trait::async_trait;
use std::path::Path;

/// A concrete artifact chosen for a version constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub id: String,
    pub version: String,

    /// SHA-256 of the artifact; the sole cache-validity signal
    pub content_hash: String,

    pub uri: String,
    pub source_uri: Option<String>,
    pub source_hash: Option<String>,
    pub supported_stacks: Vec<String>,

    /// Leading path components to drop when extracting
    pub strip_components: usize,
}

/// Locates and installs dependency artifacts
#[async_trait]
pub trait DependencyService: Send + Sync {
    /// Pick the artifact for `name` satisfying `version` on `stack`
    async fn resolve(
        &self,
        metadata_path: &Path,
        name: &str,
        version: &str,
        stack: &str,
    ) -> BuildpackResult<ResolvedDependency>;

    /// Download, verify and unpack `dependency` into `layer_path`
    async fn deliver(
        &self,
        dependency: &ResolvedDependency,
        cnb_path: &Path,
        layer_path: &Path,
        platform_path: &Path,
    ) -> BuildpackResult<()>;
}
