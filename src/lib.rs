//! httpd buildpack
//!
//! Build-time decision engine for a buildpack that installs the Apache HTTP
//! Server: picks a version from competing requests, reuses or reinstalls the
//! cached layer, optionally generates `httpd.conf`, and declares the launch
//! processes.

pub mod bindings;
pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dependency;
pub mod error;
pub mod httpd_conf;
pub mod launch;
pub mod layer;
pub mod plan;
pub mod ui;

pub use error::{BuildpackError, BuildpackResult};
