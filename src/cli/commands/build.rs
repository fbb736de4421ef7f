//! Build command - wire real collaborators into the orchestrator

use crate::bindings::FsBindingResolver;
use crate::build::{Build, BuildContext};
use crate::cli::args::BuildArgs;
use crate::config::BuildEnvironment;
use crate::dependency::{BuildpackDescriptor, CatalogDependencyService, BUILDPACK_TOML};
use crate::error::{BuildpackError, BuildpackResult};
use crate::httpd_conf::ConfigGenerator;
use crate::plan::BuildpackPlan;
use crate::ui::{LogEmitter, UiContext};
use tracing::debug;

/// Execute the build phase
pub async fn execute(args: BuildArgs, env: BuildEnvironment) -> BuildpackResult<()> {
    let app_dir = args
        .platform
        .app_dir()
        .map_err(|e| BuildpackError::io("getting current directory", e))?;
    let cnb_path = args.platform.buildpack_dir.clone();

    let descriptor = BuildpackDescriptor::from_file(&cnb_path.join(BUILDPACK_TOML)).await?;
    let plan = BuildpackPlan::from_file(&args.plan_path).await?;
    debug!("Buildpack plan has {} entries", plan.entries.len());

    let ctx = BuildContext {
        app_dir,
        layers_dir: args.layers_dir,
        cnb_path,
        platform_path: args.platform.platform_dir,
        stack: args.stack,
        buildpack_info: descriptor.buildpack,
        plan,
    };

    let log = LogEmitter::stdout(UiContext::detect(env.log_level));
    let build = Build::new(
        env,
        Box::new(CatalogDependencyService::new(Box::new(
            FsBindingResolver::from_env(),
        ))),
        ConfigGenerator::new(Box::new(FsBindingResolver::from_env())),
        log,
    );

    let result = build.run(&ctx).await?;
    debug!(
        "Build finished: {} {} ({}), {} process(es)",
        result.dependency.id,
        result.dependency.version,
        result.decision,
        result.launch.processes.len()
    );
    Ok(())
}
