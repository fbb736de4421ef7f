//! httpd buildpack
//!
//! CLI entry point that dispatches to the detect and build phases.

use clap::Parser;
use console::style;
use httpd_buildpack::cli::{Cli, Commands};
use httpd_buildpack::config::{BuildEnvironment, LogLevel};
use httpd_buildpack::error::BuildpackResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BuildpackResult<()> {
    let cli = Cli::parse();

    // Read BP_* once; everything below receives it explicitly
    let env = BuildEnvironment::from_env()?;

    // 0 = warn, 1 = info, 2+ or BP_LOG_LEVEL=DEBUG = debug
    let verbosity = match env.log_level {
        LogLevel::Debug => cli.verbose.max(2),
        LogLevel::Info => cli.verbose,
    };
    let filter = match verbosity {
        0 => EnvFilter::new("httpd_buildpack=warn"),
        1 => EnvFilter::new("httpd_buildpack=info"),
        _ => EnvFilter::new("httpd_buildpack=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    debug!("Build environment: {}", serde_json::to_string(&env)?);

    match cli.command {
        Commands::Detect(args) => httpd_buildpack::cli::commands::detect(args, &env).await,
        Commands::Build(args) => httpd_buildpack::cli::commands::build(args, env).await,
    }
}
