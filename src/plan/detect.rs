//! Detect phase
//!
//! The buildpack always provides `httpd`. It requires it when the app ships
//! its own `httpd.conf` or asks for a generated one via `BP_WEB_SERVER=httpd`.

use crate::config::{vars, BuildEnvironment};
use crate::error::{BuildpackError, BuildpackResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::entry::{EntryMetadata, PlanEntry, VersionRequest};
use super::version_file::{self, BUILDPACK_YML};

/// Dependency name this buildpack provides
pub const HTTPD: &str = "httpd";

/// Supervisor dependency required for live reload
pub const WATCHEXEC: &str = "watchexec";

/// Config file an app can ship to opt in
pub const HTTPD_CONF: &str = "httpd.conf";

/// Something this buildpack can contribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provision {
    pub name: String,
}

/// Build plan produced by detect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub provides: Vec<Provision>,

    #[serde(default)]
    pub requires: Vec<PlanEntry>,
}

impl BuildPlan {
    /// Write the plan as TOML
    pub async fn write(&self, path: &Path) -> BuildpackResult<()> {
        let content = toml::to_string(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| BuildpackError::io(format!("writing build plan {}", path.display()), e))
    }
}

/// Run detection against an application directory
pub fn detect(app_dir: &Path, env: &BuildEnvironment) -> BuildpackResult<BuildPlan> {
    let mut plan = BuildPlan {
        provides: vec![Provision {
            name: HTTPD.to_string(),
        }],
        requires: Vec::new(),
    };

    let ships_config = app_dir.join(HTTPD_CONF).is_file();
    if !ships_config && !env.generates_config() {
        debug!("No {} and {} is not httpd", HTTPD_CONF, vars::WEB_SERVER);
        return Ok(plan);
    }

    let mut requests = Vec::new();

    if let Some(ref version) = env.httpd_version {
        requests.push(
            VersionRequest::new(HTTPD)
                .with_version(version.clone(), vars::HTTPD_VERSION)
                .launch(),
        );
    }

    let parsed = version_file::parse_version(&app_dir.join(BUILDPACK_YML))?;
    if let Some(source) = parsed.source {
        requests.push(
            VersionRequest::new(HTTPD)
                .with_version(parsed.version, source)
                .launch(),
        );
    }

    if requests.is_empty() {
        requests.push(VersionRequest::new(HTTPD).launch());
    }

    plan.requires.extend(requests.iter().map(PlanEntry::from));

    if env.live_reload_enabled {
        plan.requires.push(PlanEntry {
            name: WATCHEXEC.to_string(),
            metadata: EntryMetadata {
                launch: true,
                ..Default::default()
            },
        });
    }

    debug!("Detected {} requirement(s)", plan.requires.len());
    Ok(plan)
}
