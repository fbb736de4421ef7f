//! Detect command - write the build plan

use crate::cli::args::DetectArgs;
use crate::config::BuildEnvironment;
use crate::error::{BuildpackError, BuildpackResult};
use crate::plan;
use tracing::debug;

/// Execute the detect phase
pub async fn execute(args: DetectArgs, env: &BuildEnvironment) -> BuildpackResult<()> {
    let app_dir = args
        .platform
        .app_dir()
        .map_err(|e| BuildpackError::io("getting current directory", e))?;
    debug!("Detecting in {}", app_dir.display());

    let build_plan = plan::detect(&app_dir, env)?;
    build_plan.write(&args.plan_path).await?;

    debug!("Wrote build plan to {}", args.plan_path.display());
    Ok(())
}
