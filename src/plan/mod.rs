//! Build plan handling
//!
//! Detect writes requirements for `httpd` (one per version source); build
//! reads them back as typed [`VersionRequest`]s and picks a winner.

pub mod detect;
pub mod entry;
pub mod resolver;
pub mod version_file;

pub use detect::{detect, BuildPlan, Provision, HTTPD, HTTPD_CONF, WATCHEXEC};
pub use entry::{BuildpackPlan, EntryMetadata, PlanEntry, VersionRequest, ANY_VERSION};
pub use resolver::{merge_launch_build_flags, resolve, Resolution};
pub use version_file::{parse_version, ParsedVersion, BUILDPACK_YML};

/// Version sources in priority order
pub const VERSION_PRIORITIES: &[&str] = &[crate::config::vars::HTTPD_VERSION, BUILDPACK_YML];
