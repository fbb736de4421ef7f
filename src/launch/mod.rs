//! Launch processes
//!
//! With live reload the `web` process runs httpd under `watchexec`, which
//! restarts it whenever a file under the app dir changes. A `no-reload`
//! process runs httpd directly for diagnostics.

use crate::error::{BuildpackError, BuildpackResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Process type for the primary server
pub const WEB: &str = "web";

/// Process type for the unwrapped server when live reload is on
pub const NO_RELOAD: &str = "no-reload";

/// File-watching supervisor
pub const WATCHEXEC: &str = "watchexec";

const LAUNCH_TOML: &str = "launch.toml";

/// One entry of `launch.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchProcess {
    #[serde(rename = "type")]
    pub r#type: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub direct: bool,
    #[serde(default)]
    pub default: bool,
}

impl LaunchProcess {
    fn direct(r#type: &str, command: &str, args: Vec<String>, default: bool) -> Self {
        Self {
            r#type: r#type.to_string(),
            command: command.to_string(),
            args,
            direct: true,
            default,
        }
    }
}

/// The httpd command and arguments serving the app's `httpd.conf`
pub fn httpd_command(app_dir: &Path) -> (String, Vec<String>) {
    let conf = app_dir.join(crate::plan::HTTPD_CONF);
    (
        crate::plan::HTTPD.to_string(),
        vec![
            "-f".to_string(),
            conf.display().to_string(),
            "-k".to_string(),
            "start".to_string(),
            "-DFOREGROUND".to_string(),
        ],
    )
}

/// Build the process list.
///
/// Without reload: `[web]`. With reload: `[web (watchexec), no-reload]`, the
/// supervisor's arguments ending with the base command and arguments as
/// given.
pub fn build_processes(
    command: &str,
    args: &[String],
    app_dir: &Path,
    live_reload: bool,
) -> Vec<LaunchProcess> {
    if !live_reload {
        return vec![LaunchProcess::direct(WEB, command, args.to_vec(), true)];
    }

    let mut wrapped = vec![
        "--restart".to_string(),
        "--watch".to_string(),
        app_dir.display().to_string(),
        "--shell".to_string(),
        "none".to_string(),
        "--".to_string(),
        command.to_string(),
    ];
    wrapped.extend(args.iter().cloned());

    vec![
        LaunchProcess::direct(WEB, WATCHEXEC, wrapped, true),
        LaunchProcess::direct(NO_RELOAD, command, args.to_vec(), false),
    ]
}

/// Contents of `<layers>/launch.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMetadata {
    #[serde(default)]
    pub processes: Vec<LaunchProcess>,
}

impl LaunchMetadata {
    pub fn new(processes: Vec<LaunchProcess>) -> Self {
        Self { processes }
    }

    /// Write `launch.toml` into the layers dir
    pub async fn write(&self, layers_dir: &Path) -> BuildpackResult<()> {
        let path = layers_dir.join(LAUNCH_TOML);
        let content = toml::to_string(self)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| BuildpackError::io(format!("writing {}", path.display()), e))
    }

    pub async fn read(layers_dir: &Path) -> BuildpackResult<Self> {
        let path = layers_dir.join(LAUNCH_TOML);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BuildpackError::io(format!("reading {}", path.display()), e))?;
        Ok(toml::from_str(&content)?)
    }
}
