//! `buildpack.toml` dependency catalog
//!
//! ```toml
//! [buildpack]
//! id = "paketo-buildpacks/httpd"
//! name = "Paketo Buildpack for Apache HTTP Server"
//! version = "1.2.3"
//!
//! [[metadata.dependencies]]
//! id = "httpd"
//! version = "2.4.54"
//! sha256 = "..."
//! uri = "https://..."
//! stacks = ["io.buildpacks.stacks.jammy"]
//! ```

use crate::error::{BuildpackError, BuildpackResult};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::ResolvedDependency;

/// Name of the descriptor file inside the buildpack directory
pub const BUILDPACK_TOML: &str = "buildpack.toml";

/// Stack wildcard accepted in dependency metadata
const ANY_STACK: &str = "*";

/// `[buildpack]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackInfo {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,
}

/// One `[[metadata.dependencies]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub id: String,

    pub version: String,

    #[serde(default)]
    pub sha256: Option<String>,

    /// Newer `algorithm:hex` form of the artifact digest
    #[serde(default)]
    pub checksum: Option<String>,

    pub uri: String,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub source_sha256: Option<String>,

    #[serde(default)]
    pub stacks: Vec<String>,

    #[serde(default, rename = "strip-components")]
    pub strip_components: usize,
}

impl DependencyEntry {
    fn supports_stack(&self, stack: &str) -> bool {
        self.stacks.iter().any(|s| s == stack || s == ANY_STACK)
    }

    fn content_hash(&self) -> String {
        if let Some(ref sha) = self.sha256 {
            return sha.clone();
        }
        match self.checksum.as_deref() {
            Some(checksum) => checksum
                .strip_prefix("sha256:")
                .unwrap_or(checksum)
                .to_string(),
            None => String::new(),
        }
    }

    fn into_resolved(self) -> ResolvedDependency {
        let content_hash = self.content_hash();
        ResolvedDependency {
            id: self.id,
            version: self.version,
            content_hash,
            uri: self.uri,
            source_uri: self.source,
            source_hash: self.source_sha256,
            supported_stacks: self.stacks,
            strip_components: self.strip_components,
        }
    }
}

/// `[metadata]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

/// Parsed `buildpack.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildpackDescriptor {
    #[serde(default)]
    pub buildpack: BuildpackInfo,

    #[serde(default)]
    pub metadata: CatalogMetadata,
}

impl BuildpackDescriptor {
    /// Parse a descriptor from TOML
    pub fn parse(content: &str, path: &Path) -> BuildpackResult<Self> {
        toml::from_str(content).map_err(|e| BuildpackError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read a descriptor from disk
    pub async fn from_file(path: &Path) -> BuildpackResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BuildpackError::io(format!("reading {}", path.display()), e))?;
        Self::parse(&content, path)
    }
}

/// Constraint on candidate versions
#[derive(Debug, Clone)]
enum Constraint {
    Any,
    Exact(Version),
    Range(VersionReq),
}

impl Constraint {
    /// A full bare version is exact, a partial one (`2.4`, `2`) matches that
    /// line; anything else is a range
    fn parse(raw: &str) -> BuildpackResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::Any);
        }
        if let Ok(version) = Version::parse(raw) {
            return Ok(Self::Exact(version));
        }
        let req = if is_partial_version(raw) {
            format!("~{}", raw)
        } else {
            raw.to_string()
        };
        VersionReq::parse(&req).map(Self::Range).map_err(|e| {
            BuildpackError::DependencyResolution(format!(
                "invalid version constraint \"{}\": {}",
                raw, e
            ))
        })
    }

    fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(v) => v == version,
            Self::Range(req) => req.matches(version),
        }
    }
}

/// `MAJOR` or `MAJOR.MINOR` with no operator
fn is_partial_version(raw: &str) -> bool {
    let parts: Vec<&str> = raw.split('.').collect();
    parts.len() <= 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Pick the highest catalog entry for `name` matching `constraint` on `stack`
pub fn select(
    entries: &[DependencyEntry],
    name: &str,
    constraint: &str,
    stack: &str,
) -> BuildpackResult<ResolvedDependency> {
    let parsed = Constraint::parse(constraint)?;

    let mut best: Option<(Version, &DependencyEntry)> = None;
    for entry in entries {
        if entry.id != name || !entry.supports_stack(stack) {
            continue;
        }
        let version = match Version::parse(entry.version.trim_start_matches('v')) {
            Ok(v) => v,
            Err(e) => {
                debug!("Skipping {} {}: {}", entry.id, entry.version, e);
                continue;
            }
        };
        if !parsed.matches(&version) {
            continue;
        }
        if best.as_ref().map_or(true, |(v, _)| version > *v) {
            best = Some((version, entry));
        }
    }

    match best {
        Some((_, entry)) => Ok(entry.clone().into_resolved()),
        None => Err(BuildpackError::DependencyNotFound {
            name: name.to_string(),
            constraint: constraint.to_string(),
            stack: stack.to_string(),
        }),
    }
}
