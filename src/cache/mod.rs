//! Layer cache decision
//!
//! A cached layer is reused only when the content hash recorded by the
//! previous build equals the hash of the newly resolved artifact. Timestamps
//! and versions play no part.
//!
//! | Decision | Layer | Install |
//! |----------|-------|---------|
//! | Reuse | kept as is | skipped |
//! | Reinstall | reset (metadata + contents) | performed |

use std::fmt;

/// What to do with a previously built layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Hashes match; keep the layer untouched
    Reuse,
    /// No match; reset the layer and install fresh
    Reinstall,
}

impl CacheDecision {
    /// Decide from the cached and resolved hashes
    pub fn decide(cached_hash: Option<&str>, resolved_hash: &str) -> Self {
        if should_reuse(cached_hash, resolved_hash) {
            Self::Reuse
        } else {
            Self::Reinstall
        }
    }
}

impl fmt::Display for CacheDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => write!(f, "reuse"),
            Self::Reinstall => write!(f, "reinstall"),
        }
    }
}

/// Pure equality check; a layer never built before never matches
pub fn should_reuse(cached_hash: Option<&str>, resolved_hash: &str) -> bool {
    cached_hash == Some(resolved_hash)
}
