//! Build orchestration
//!
//! One build is a strict linear sequence:
//! 1. Resolve the winning version request from the plan
//! 2. Resolve the dependency from `buildpack.toml`
//! 3. Reuse the cached layer or reset it and install fresh
//! 4. Assert the launch environment
//! 5. Generate `httpd.conf` when `BP_WEB_SERVER=httpd`
//! 6. Build the process list and persist layer + launch metadata
//!
//! Any failure aborts the build; nothing is retried.

use crate::cache::CacheDecision;
use crate::config::BuildEnvironment;
use crate::dependency::{BuildpackInfo, DependencyService, ResolvedDependency, BUILDPACK_TOML};
use crate::error::BuildpackResult;
use crate::httpd_conf::ConfigGenerator;
use crate::launch::{self, LaunchMetadata};
use crate::layer::{Layer, LayerStore};
use crate::plan::{self, BuildpackPlan, BUILDPACK_YML, HTTPD, VERSION_PRIORITIES};
use crate::ui::{format_duration, LogEmitter};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Launch variable holding the app dir
pub const APP_ROOT: &str = "APP_ROOT";

/// Launch variable holding the httpd install dir
pub const SERVER_ROOT: &str = "SERVER_ROOT";

/// Inputs handed over by the platform
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub app_dir: PathBuf,
    pub layers_dir: PathBuf,
    pub cnb_path: PathBuf,
    pub platform_path: PathBuf,
    pub stack: String,
    pub buildpack_info: BuildpackInfo,
    pub plan: BuildpackPlan,
}

/// What a finished build produced
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub layers: Vec<Layer>,
    pub launch: LaunchMetadata,
    pub dependency: ResolvedDependency,
    pub decision: CacheDecision,
}

/// Runs the build phase with injected collaborators
pub struct Build {
    env: BuildEnvironment,
    dependencies: Box<dyn DependencyService>,
    config: ConfigGenerator,
    log: LogEmitter,
}

impl Build {
    pub fn new(
        env: BuildEnvironment,
        dependencies: Box<dyn DependencyService>,
        config: ConfigGenerator,
        log: LogEmitter,
    ) -> Self {
        Self {
            env,
            dependencies,
            config,
            log,
        }
    }

    pub async fn run(&self, ctx: &BuildContext) -> BuildpackResult<BuildResult> {
        self.log.title(&ctx.buildpack_info);
        self.log.process("Resolving Apache HTTP Server version");

        let requests = ctx.plan.requests_for(HTTPD);
        let resolution = plan::resolve(&requests, VERSION_PRIORITIES);
        self.log.candidates(&resolution.display_order);

        let winner = resolution.winner;
        let dependency = self
            .dependencies
            .resolve(
                &ctx.cnb_path.join(BUILDPACK_TOML),
                HTTPD,
                winner.constraint(),
                &ctx.stack,
            )
            .await?;
        self.log.selected_dependency(&winner, &dependency);

        if winner.source.as_deref() == Some(BUILDPACK_YML) {
            self.log
                .buildpack_yml_deprecation(&ctx.buildpack_info.version);
        }

        let (wants_launch, wants_build) = plan::merge_launch_build_flags(&requests);
        let store = LayerStore::new(&ctx.layers_dir);
        let mut layer = store.get(HTTPD).await?;

        let decision =
            CacheDecision::decide(layer.metadata.content_hash(), &dependency.content_hash);
        debug!("Cache decision for {}: {}", layer.name, decision);

        match decision {
            CacheDecision::Reuse => {
                self.log.process(&format!(
                    "Reusing cached layer {}",
                    layer.path.display()
                ));
                self.log.break_line();
            }
            CacheDecision::Reinstall => {
                self.log.process("Executing build process");
                layer = store.reset(layer).await?;

                self.log.subprocess(&format!(
                    "Installing Apache HTTP Server {}",
                    dependency.version
                ));
                let started = Instant::now();
                self.dependencies
                    .deliver(&dependency, &ctx.cnb_path, &layer.path, &ctx.platform_path)
                    .await?;
                self.log
                    .action(&format!("Completed in {}", format_duration(started.elapsed())));
                self.log.break_line();

                layer.metadata.cache_sha = dependency.content_hash.clone();
                layer.metadata.built_at = Some(chrono::Utc::now().to_rfc3339());
                info!("Installed httpd {} into {}", dependency.version, layer.path.display());
            }
        }

        layer.types.launch = wants_launch;
        layer.types.build = wants_build;

        self.log.process("Configuring environment");
        layer
            .launch_env
            .override_var(APP_ROOT, ctx.app_dir.display().to_string());
        layer
            .launch_env
            .override_var(SERVER_ROOT, layer.path.display().to_string());
        self.log.environment(&layer.launch_env);

        if self.env.generates_config() {
            self.log.process("Generating httpd.conf");
            let path = self
                .config
                .generate(&self.env, &ctx.app_dir, &ctx.platform_path)
                .await?;
            self.log.detail(&format!("Wrote {}", path.display()));
            self.log.break_line();
        }

        let (command, args) = launch::httpd_command(&ctx.app_dir);
        let processes =
            launch::build_processes(&command, &args, &ctx.app_dir, self.env.live_reload_enabled);
        let launch = LaunchMetadata::new(processes);

        store.persist(&layer).await?;
        launch.write(&ctx.layers_dir).await?;

        Ok(BuildResult {
            layers: vec![layer],
            launch,
            dependency,
            decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::error::BuildpackError;
    use crate::httpd_conf::tests::{htpasswd_binding, FakeBindings};
    use crate::plan::{PlanEntry, VersionRequest};
    use crate::ui::{test_emitter, SharedBuffer};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Calls {
        resolve: Vec<(PathBuf, String, String, String)>,
        deliver: Vec<(String, PathBuf, PathBuf, PathBuf)>,
    }

    /// Dependency service that records calls and drops a marker into the layer
    struct FakeDependencies {
        dependency: ResolvedDependency,
        calls: Arc<Mutex<Calls>>,
        fail_resolve: bool,
    }

    #[async_trait]
    impl DependencyService for FakeDependencies {
        async fn resolve(
            &self,
            metadata_path: &Path,
            name: &str,
            version: &str,
            stack: &str,
        ) -> BuildpackResult<ResolvedDependency> {
            self.calls.lock().unwrap().resolve.push((
                metadata_path.to_path_buf(),
                name.to_string(),
                version.to_string(),
                stack.to_string(),
            ));
            if self.fail_resolve {
                return Err(BuildpackError::DependencyResolution(
                    "failed to resolve".to_string(),
                ));
            }
            Ok(self.dependency.clone())
        }

        async fn deliver(
            &self,
            dependency: &ResolvedDependency,
            cnb_path: &Path,
            layer_path: &Path,
            platform_path: &Path,
        ) -> BuildpackResult<()> {
            self.calls.lock().unwrap().deliver.push((
                dependency.id.clone(),
                cnb_path.to_path_buf(),
                layer_path.to_path_buf(),
                platform_path.to_path_buf(),
            ));
            std::fs::create_dir_all(layer_path.join("bin")).unwrap();
            std::fs::write(layer_path.join("bin").join("httpd"), "httpd").unwrap();
            Ok(())
        }
    }

    struct Harness {
        app: TempDir,
        layers: TempDir,
        cnb: TempDir,
        calls: Arc<Mutex<Calls>>,
        output: SharedBuffer,
        build: Build,
    }

    fn dependency() -> ResolvedDependency {
        ResolvedDependency {
            id: "httpd".to_string(),
            version: "2.4.54".to_string(),
            content_hash: "some-sha".to_string(),
            uri: "some-uri".to_string(),
            ..Default::default()
        }
    }

    fn harness(env: BuildEnvironment) -> Harness {
        harness_with(env, vec![], false)
    }

    fn harness_with(
        env: BuildEnvironment,
        bindings: Vec<crate::bindings::Binding>,
        fail_resolve: bool,
    ) -> Harness {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let (log, output) = test_emitter(LogLevel::Info);
        let build = Build::new(
            env,
            Box::new(FakeDependencies {
                dependency: dependency(),
                calls: Arc::clone(&calls),
                fail_resolve,
            }),
            ConfigGenerator::new(Box::new(FakeBindings {
                bindings,
                ..Default::default()
            })),
            log,
        );

        Harness {
            app: TempDir::new().unwrap(),
            layers: TempDir::new().unwrap(),
            cnb: TempDir::new().unwrap(),
            calls,
            output,
            build,
        }
    }

    impl Harness {
        fn context(&self, entries: Vec<VersionRequest>) -> BuildContext {
            BuildContext {
                app_dir: self.app.path().to_path_buf(),
                layers_dir: self.layers.path().to_path_buf(),
                cnb_path: self.cnb.path().to_path_buf(),
                platform_path: PathBuf::from("/platform"),
                stack: "some-stack".to_string(),
                buildpack_info: BuildpackInfo {
                    id: "paketo-buildpacks/httpd".to_string(),
                    name: "Some Buildpack".to_string(),
                    version: "1.2.3".to_string(),
                },
                plan: BuildpackPlan {
                    entries: entries.iter().map(PlanEntry::from).collect(),
                },
            }
        }

        fn env_entry() -> VersionRequest {
            VersionRequest::new("httpd")
                .with_version("some-env-var-version", "BP_HTTPD_VERSION")
                .launch()
        }
    }

    #[tokio::test]
    async fn fresh_build_installs_and_records_hash() {
        let h = harness(BuildEnvironment::default());
        let ctx = h.context(vec![Harness::env_entry()]);

        let result = h.build.run(&ctx).await.unwrap();

        assert_eq!(result.decision, CacheDecision::Reinstall);
        let layer = &result.layers[0];
        assert_eq!(layer.path, h.layers.path().join("httpd"));
        assert!(layer.types.launch);
        assert!(!layer.types.build);
        assert_eq!(layer.metadata.content_hash(), Some("some-sha"));
        assert!(layer.metadata.built_at.is_some());
        assert_eq!(
            layer.launch_env.get("APP_ROOT"),
            Some(h.app.path().display().to_string().as_str())
        );
        assert_eq!(
            layer.launch_env.get("SERVER_ROOT"),
            Some(layer.path.display().to_string().as_str())
        );

        let calls = h.calls.lock().unwrap();
        assert_eq!(
            calls.resolve,
            vec![(
                h.cnb.path().join("buildpack.toml"),
                "httpd".to_string(),
                "some-env-var-version".to_string(),
                "some-stack".to_string()
            )]
        );
        assert_eq!(calls.deliver.len(), 1);
        assert_eq!(calls.deliver[0].2, layer.path);
        assert_eq!(calls.deliver[0].3, PathBuf::from("/platform"));

        assert!(h.layers.path().join("httpd.toml").is_file());
        assert!(h.layers.path().join("launch.toml").is_file());
        assert!(h
            .layers
            .path()
            .join("httpd")
            .join("env.launch")
            .join("SERVER_ROOT.override")
            .is_file());

        let output = h.output.contents();
        assert!(output.starts_with("Some Buildpack 1.2.3\n  Resolving Apache HTTP Server version\n"));
        assert!(output.contains("\n      BP_HTTPD_VERSION -> \"some-env-var-version\""));
        assert!(output.contains(
            "\n    Selected Apache HTTP Server version (using BP_HTTPD_VERSION): 2.4.54\n"
        ));
        assert!(output.contains("\n  Executing build process\n    Installing Apache HTTP Server 2.4.54\n"));
        assert!(output.contains("\n      Completed in "));
        assert!(output.contains("\n  Configuring environment\n    APP_ROOT    -> "));
    }

    #[tokio::test]
    async fn cache_hit_skips_install_and_matches_fresh_build() {
        let env = BuildEnvironment {
            web_server: Some("httpd".to_string()),
            push_state_enabled: true,
            ..Default::default()
        };
        let h = harness(env);
        let ctx = h.context(vec![Harness::env_entry()]);

        let fresh = h.build.run(&ctx).await.unwrap();
        let fresh_conf = std::fs::read(h.app.path().join("httpd.conf")).unwrap();

        let cached = h.build.run(&ctx).await.unwrap();
        let cached_conf = std::fs::read(h.app.path().join("httpd.conf")).unwrap();

        assert_eq!(cached.decision, CacheDecision::Reuse);
        assert_eq!(h.calls.lock().unwrap().deliver.len(), 1);
        assert_eq!(fresh_conf, cached_conf);
        assert_eq!(fresh.launch, cached.launch);
        assert_eq!(fresh.layers[0].launch_env, cached.layers[0].launch_env);
        assert_eq!(fresh.layers[0].metadata, cached.layers[0].metadata);
        assert!(h.layers.path().join("httpd").join("bin").join("httpd").is_file());
        assert!(h.output.contents().contains("Reusing cached layer"));
    }

    #[tokio::test]
    async fn changed_hash_resets_layer() {
        let h = harness(BuildEnvironment::default());
        let ctx = h.context(vec![Harness::env_entry()]);

        std::fs::create_dir_all(h.layers.path().join("httpd").join("stale")).unwrap();
        std::fs::write(
            h.layers.path().join("httpd.toml"),
            "[metadata]\ncache_sha = \"other-sha\"\n",
        )
        .unwrap();

        let result = h.build.run(&ctx).await.unwrap();

        assert_eq!(result.decision, CacheDecision::Reinstall);
        assert!(!h.layers.path().join("httpd").join("stale").exists());
        assert_eq!(result.layers[0].metadata.content_hash(), Some("some-sha"));
    }

    #[tokio::test]
    async fn env_version_beats_buildpack_yml() {
        let h = harness(BuildEnvironment::default());
        let ctx = h.context(vec![
            VersionRequest::new("httpd").with_version("2.4.48", "buildpack.yml"),
            Harness::env_entry(),
        ]);

        h.build.run(&ctx).await.unwrap();

        let calls = h.calls.lock().unwrap();
        assert_eq!(calls.resolve[0].2, "some-env-var-version");
        assert!(!h.output.contents().contains("buildpack.yml will be deprecated"));
    }

    #[tokio::test]
    async fn buildpack_yml_source_warns() {
        let h = harness(BuildEnvironment::default());
        let ctx = h.context(vec![VersionRequest::new("httpd")
            .with_version("2.4.48", "buildpack.yml")
            .launch()]);

        h.build.run(&ctx).await.unwrap();

        assert!(h
            .output
            .contents()
            .contains("deprecated soon in Apache HTTP Server Buildpack v2.0.0."));
    }

    #[tokio::test]
    async fn empty_plan_resolves_any_version() {
        let h = harness(BuildEnvironment::default());
        let ctx = h.context(vec![]);

        let result = h.build.run(&ctx).await.unwrap();

        assert_eq!(h.calls.lock().unwrap().resolve[0].2, "*");
        assert!(!result.layers[0].types.launch);
    }

    #[tokio::test]
    async fn single_web_process_by_default() {
        let h = harness(BuildEnvironment::default());
        let result = h.build.run(&h.context(vec![Harness::env_entry()])).await.unwrap();

        assert_eq!(result.launch.processes.len(), 1);
        let web = &result.launch.processes[0];
        assert_eq!(web.r#type, "web");
        assert_eq!(web.command, "httpd");
        assert_eq!(
            web.args[1],
            h.app.path().join("httpd.conf").display().to_string()
        );
        assert!(!h.app.path().join("httpd.conf").exists());
    }

    #[tokio::test]
    async fn live_reload_wraps_with_watchexec() {
        let h = harness(BuildEnvironment {
            live_reload_enabled: true,
            ..Default::default()
        });
        let result = h.build.run(&h.context(vec![Harness::env_entry()])).await.unwrap();

        let types: Vec<_> = result
            .launch
            .processes
            .iter()
            .map(|p| p.r#type.as_str())
            .collect();
        assert_eq!(types, vec!["web", "no-reload"]);
        assert_eq!(result.launch.processes[0].command, "watchexec");
    }

    #[tokio::test]
    async fn generates_config_with_binding() {
        let h = harness_with(
            BuildEnvironment {
                web_server: Some("httpd".to_string()),
                ..Default::default()
            },
            vec![htpasswd_binding("/bindings/auth", true)],
            false,
        );
        h.build.run(&h.context(vec![Harness::env_entry()])).await.unwrap();

        let conf = std::fs::read_to_string(h.app.path().join("httpd.conf")).unwrap();
        assert!(conf.contains("AuthUserFile \"/bindings/auth/.htpasswd\""));
    }

    #[tokio::test]
    async fn binding_conflict_fails_build() {
        let h = harness_with(
            BuildEnvironment {
                web_server: Some("httpd".to_string()),
                ..Default::default()
            },
            vec![
                htpasswd_binding("/bindings/a", true),
                htpasswd_binding("/bindings/b", true),
            ],
            false,
        );
        let err = h
            .build
            .run(&h.context(vec![Harness::env_entry()]))
            .await
            .unwrap_err();

        assert!(matches!(err, BuildpackError::BindingConflict { .. }));
        assert!(!h.layers.path().join("launch.toml").exists());
    }

    #[tokio::test]
    async fn resolution_failure_is_fatal() {
        let h = harness_with(BuildEnvironment::default(), vec![], true);
        let err = h
            .build
            .run(&h.context(vec![Harness::env_entry()]))
            .await
            .unwrap_err();

        assert!(matches!(err, BuildpackError::DependencyResolution(_)));
        assert!(h.calls.lock().unwrap().deliver.is_empty());
    }
}
