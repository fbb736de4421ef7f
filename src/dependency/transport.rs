//! Artifact transport: fetch, verify, unpack
//!
//! All functions here block and are meant to run on a blocking task.

use crate::error::{BuildpackError, BuildpackResult};
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Fetch an artifact.
///
/// `http(s)://` URIs are downloaded, `file://` URIs and bare paths are read
/// from disk. Relative paths are taken relative to the buildpack directory.
pub fn fetch(uri: &str, cnb_path: &Path) -> BuildpackResult<Vec<u8>> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        debug!("Downloading {}", uri);
        let response = ureq::get(uri).call().map_err(|e| BuildpackError::Download {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        let mut bytes = Vec::new();
        response
            .into_body()
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| BuildpackError::Download {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
        return Ok(bytes);
    }

    let raw = uri.strip_prefix("file://").unwrap_or(uri);
    let path = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        cnb_path.join(raw)
    };

    debug!("Reading artifact {}", path.display());
    fs::read(&path).map_err(|e| BuildpackError::io(format!("reading artifact {}", path.display()), e))
}

/// Hex-encoded SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Check `bytes` against the expected SHA-256
pub fn verify(bytes: &[u8], expected: &str) -> BuildpackResult<()> {
    let actual = sha256_hex(bytes);
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(BuildpackError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Unpack an artifact into `dest`.
///
/// Gzipped tarballs are extracted (dropping `strip` leading components);
/// anything else is written as a single file named after the URI.
pub fn unpack(bytes: &[u8], uri: &str, dest: &Path, strip: usize) -> BuildpackResult<()> {
    fs::create_dir_all(dest)
        .map_err(|e| BuildpackError::io(format!("creating {}", dest.display()), e))?;

    if bytes.starts_with(&GZIP_MAGIC) {
        return extract_tar_gz(bytes, dest, strip);
    }

    let name = uri
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("artifact");
    let target = dest.join(name);
    fs::write(&target, bytes)
        .map_err(|e| BuildpackError::io(format!("writing {}", target.display()), e))
}

fn extract_tar_gz(bytes: &[u8], dest: &Path, strip: usize) -> BuildpackResult<()> {
    let mut archive = Archive::new(GzDecoder::new(bytes));
    let entries = archive
        .entries()
        .map_err(|e| BuildpackError::io("reading archive", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| BuildpackError::io("reading archive entry", e))?;
        let path = entry
            .path()
            .map_err(|e| BuildpackError::io("reading archive entry path", e))?
            .into_owned();

        let stripped: PathBuf = path.components().skip(strip).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }
        if stripped
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(BuildpackError::DependencyResolution(format!(
                "archive entry escapes destination: {}",
                path.display()
            )));
        }

        let target = dest.join(&stripped);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BuildpackError::io(format!("creating {}", parent.display()), e))?;
        }
        entry
            .unpack(&target)
            .map_err(|e| BuildpackError::io(format!("extracting {}", target.display()), e))?;
    }

    Ok(())
}
