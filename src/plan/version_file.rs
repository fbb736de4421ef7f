//! Legacy `buildpack.yml` version source
//!
//! ```yaml
//! httpd:
//!   version: 2.4.*
//! ```

use crate::error::{BuildpackError, BuildpackResult};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

use super::entry::ANY_VERSION;

/// File name of the legacy version file
pub const BUILDPACK_YML: &str = "buildpack.yml";

/// Version read from a version source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    /// Requested constraint, `*` when absent
    pub version: String,

    /// Provenance, `None` when the file did not request a version
    pub source: Option<String>,
}

impl ParsedVersion {
    fn wildcard() -> Self {
        Self {
            version: ANY_VERSION.to_string(),
            source: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct BuildpackYml {
    #[serde(default)]
    httpd: HttpdSection,
}

#[derive(Debug, Default, Deserialize)]
struct HttpdSection {
    #[serde(default)]
    version: String,
}

/// Parse the requested httpd version out of `buildpack.yml`.
///
/// A missing file or missing version is not an error and yields `*`.
/// Malformed YAML is fatal.
pub fn parse_version(path: &Path) -> BuildpackResult<ParsedVersion> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ParsedVersion::wildcard()),
        Err(e) => {
            return Err(BuildpackError::VersionFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(ParsedVersion::wildcard());
    }

    let parsed: BuildpackYml =
        serde_yaml::from_str(&content).map_err(|e| BuildpackError::VersionFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if parsed.httpd.version.is_empty() {
        return Ok(ParsedVersion::wildcard());
    }

    Ok(ParsedVersion {
        version: parsed.httpd.version,
        source: Some(BUILDPACK_YML.to_string()),
    })
}
