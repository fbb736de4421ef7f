//! Typed build plan entries
//!
//! The platform hands the build phase a plan whose entries carry free-form
//! metadata tables. They are decoded once into [`VersionRequest`] so the rest
//! of the build never inspects untyped values.

use crate::error::{BuildpackError, BuildpackResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Wildcard constraint used when no version was requested
pub const ANY_VERSION: &str = "*";

/// One requester's version and layer-type request for a dependency
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRequest {
    /// Dependency name (e.g. `httpd`)
    pub name: String,

    /// Where the version came from (`BP_HTTPD_VERSION`, `buildpack.yml`, ...)
    pub source: Option<String>,

    /// Semver range or `*`
    pub version: Option<String>,

    /// Dependency is needed at launch
    pub launch: bool,

    /// Dependency is needed at build time
    pub build: bool,
}

impl VersionRequest {
    /// Create a request for `name` with no version or source
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the version constraint and its provenance
    pub fn with_version(mut self, version: impl Into<String>, source: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self.source = Some(source.into());
        self
    }

    /// Mark the request as needed at launch
    pub fn launch(mut self) -> Self {
        self.launch = true;
        self
    }

    /// Mark the request as needed at build time
    pub fn build(mut self) -> Self {
        self.build = true;
        self
    }

    /// The requested constraint, `*` when absent or empty
    pub fn constraint(&self) -> &str {
        match self.version.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => ANY_VERSION,
        }
    }
}

/// Metadata table attached to a plan entry on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(
        default,
        rename = "version-source",
        skip_serializing_if = "Option::is_none"
    )]
    pub version_source: Option<String>,

    #[serde(default)]
    pub launch: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub build: bool,
}

/// A plan entry as written by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub name: String,

    #[serde(default)]
    pub metadata: EntryMetadata,
}

impl From<PlanEntry> for VersionRequest {
    fn from(entry: PlanEntry) -> Self {
        Self {
            name: entry.name,
            source: entry.metadata.version_source,
            version: entry.metadata.version,
            launch: entry.metadata.launch,
            build: entry.metadata.build,
        }
    }
}

impl From<&VersionRequest> for PlanEntry {
    fn from(request: &VersionRequest) -> Self {
        Self {
            name: request.name.clone(),
            metadata: EntryMetadata {
                version: request.version.clone(),
                version_source: request.source.clone(),
                launch: request.launch,
                build: request.build,
            },
        }
    }
}

/// The buildpack plan handed to the build phase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildpackPlan {
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
}

impl BuildpackPlan {
    /// Parse a buildpack plan from TOML
    pub fn parse(content: &str) -> BuildpackResult<Self> {
        toml::from_str(content).map_err(|e| BuildpackError::ConfigInvalid {
            path: "plan.toml".into(),
            reason: e.to_string(),
        })
    }

    /// Read the buildpack plan from disk
    pub async fn from_file(path: &Path) -> BuildpackResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BuildpackError::io(format!("reading plan {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| BuildpackError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Typed requests for one dependency, in plan order
    pub fn requests_for(&self, name: &str) -> Vec<VersionRequest> {
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .map(VersionRequest::from)
            .collect()
    }
}
