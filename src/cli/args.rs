//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Apache HTTP Server buildpack
///
/// Detects whether an app needs httpd and, at build time, installs it,
/// optionally generates httpd.conf and declares the launch processes.
#[derive(Parser, Debug)]
#[command(name = "httpd-buildpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Buildpack phases
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the build plan
    Detect(DetectArgs),

    /// Install httpd and write layer and launch metadata
    Build(BuildArgs),
}

/// Inputs shared by both phases
#[derive(Args, Debug, Clone)]
pub struct PlatformArgs {
    /// Application directory (defaults to current directory)
    #[arg(long, env = "CNB_APP_DIR")]
    pub app_dir: Option<PathBuf>,

    /// Platform directory holding env and bindings
    #[arg(long, env = "CNB_PLATFORM_DIR", default_value = "/platform")]
    pub platform_dir: PathBuf,

    /// Buildpack directory holding buildpack.toml
    #[arg(long, env = "CNB_BUILDPACK_DIR", default_value = ".")]
    pub buildpack_dir: PathBuf,
}

/// Arguments for the detect phase
#[derive(Parser, Debug)]
pub struct DetectArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Where to write the build plan
    #[arg(long, env = "CNB_BUILD_PLAN_PATH")]
    pub plan_path: PathBuf,
}

/// Arguments for the build phase
#[derive(Parser, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Layers directory
    #[arg(long, env = "CNB_LAYERS_DIR")]
    pub layers_dir: PathBuf,

    /// Buildpack plan resolved by the platform
    #[arg(long, env = "CNB_BP_PLAN_PATH")]
    pub plan_path: PathBuf,

    /// Stack the image is built on
    #[arg(long, env = "CNB_STACK_ID", default_value = "")]
    pub stack: String,
}

impl PlatformArgs {
    /// The app dir, falling back to the working directory
    pub fn app_dir(&self) -> std::io::Result<PathBuf> {
        match &self.app_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}
