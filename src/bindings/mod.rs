//! Service binding resolution
//!
//! Bindings are directories under `$SERVICE_BINDING_ROOT` (or
//! `<platform>/bindings` when unset):
//!
//! ```text
//! bindings/
//! └── my-auth/
//!     ├── type        # "htpasswd"
//!     ├── provider    # optional
//!     └── .htpasswd   # entry
//! ```

use crate::error::{BuildpackError, BuildpackResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Variable that overrides the binding root
pub const SERVICE_BINDING_ROOT: &str = "SERVICE_BINDING_ROOT";

const TYPE_FILE: &str = "type";
const PROVIDER_FILE: &str = "provider";

/// A single resolved service binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Directory name of the binding
    pub name: String,

    /// Binding kind from the `type` file
    pub kind: String,

    /// Optional provider from the `provider` file
    pub provider: Option<String>,

    /// Root directory of the binding
    pub path: PathBuf,

    /// Named entries mapped to their files
    pub entries: BTreeMap<String, PathBuf>,
}

impl Binding {
    /// Whether the binding holds an entry with this name
    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// Looks up bindings of a given kind
#[async_trait]
pub trait BindingResolver: Send + Sync {
    /// Resolve all bindings of `kind` (and `provider`, when non-empty)
    async fn resolve(
        &self,
        kind: &str,
        provider: &str,
        platform_dir: &Path,
    ) -> BuildpackResult<Vec<Binding>>;
}

/// Resolver reading bindings from the filesystem
#[derive(Debug, Clone, Default)]
pub struct FsBindingResolver {
    binding_root: Option<PathBuf>,
}

impl FsBindingResolver {
    /// Use `<platform>/bindings` unless `SERVICE_BINDING_ROOT` is set
    pub fn new(binding_root: Option<PathBuf>) -> Self {
        Self { binding_root }
    }

    /// Create a resolver honouring `SERVICE_BINDING_ROOT`
    pub fn from_env() -> Self {
        let root = std::env::var_os(SERVICE_BINDING_ROOT)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::new(root)
    }

    fn root(&self, platform_dir: &Path) -> PathBuf {
        self.binding_root
            .clone()
            .unwrap_or_else(|| platform_dir.join("bindings"))
    }

    async fn load(dir: &Path) -> BuildpackResult<Binding> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let kind = match read_trimmed(&dir.join(TYPE_FILE)).await? {
            Some(kind) => kind,
            None => {
                return Err(BuildpackError::BindingResolution(format!(
                    "binding '{}' is missing a '{}' file",
                    name, TYPE_FILE
                )))
            }
        };
        let provider = read_trimmed(&dir.join(PROVIDER_FILE)).await?;

        let mut entries = BTreeMap::new();
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| BuildpackError::io(format!("reading binding {}", dir.display()), e))?;
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| BuildpackError::io(format!("reading binding {}", dir.display()), e))?
        {
            let entry_name = entry.file_name().to_string_lossy().into_owned();
            if entry_name == TYPE_FILE || entry_name == PROVIDER_FILE || entry_name.starts_with("..")
            {
                continue;
            }
            entries.insert(entry_name, entry.path());
        }

        Ok(Binding {
            name,
            kind,
            provider,
            path: dir.to_path_buf(),
            entries,
        })
    }
}

#[async_trait]
impl BindingResolver for FsBindingResolver {
    async fn resolve(
        &self,
        kind: &str,
        provider: &str,
        platform_dir: &Path,
    ) -> BuildpackResult<Vec<Binding>> {
        let root = self.root(platform_dir);

        let mut reader = match tokio::fs::read_dir(&root).await {
            Ok(r) => r,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No binding root at {}", root.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("reading binding root {}", root.display()),
                    e,
                ))
            }
        };

        let mut dirs = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| BuildpackError::io(format!("reading {}", root.display()), e))?
        {
            let path = entry.path();
            if path.is_dir() && !entry.file_name().to_string_lossy().starts_with("..") {
                dirs.push(path);
            }
        }
        dirs.sort();

        let mut bindings = Vec::new();
        for dir in dirs {
            let binding = Self::load(&dir).await?;
            if !binding.kind.eq_ignore_ascii_case(kind) {
                continue;
            }
            if !provider.is_empty() {
                let matches = binding
                    .provider
                    .as_deref()
                    .is_some_and(|p| p.eq_ignore_ascii_case(provider));
                if !matches {
                    continue;
                }
            }
            debug!("Found binding '{}' of type '{}'", binding.name, binding.kind);
            bindings.push(binding);
        }

        Ok(bindings)
    }
}

async fn read_trimmed(path: &Path) -> BuildpackResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuildpackError::io(format!("reading {}", path.display()), e)),
    }
}
