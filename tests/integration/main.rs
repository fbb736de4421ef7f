//! Integration tests for the httpd buildpack

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    pub(crate) fn buildpack() -> Command {
        let mut cmd = cargo_bin_cmd!("httpd-buildpack");
        cmd.env_clear();
        cmd
    }

    #[test]
    fn help_displays() {
        buildpack()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Apache HTTP Server buildpack"));
    }

    #[test]
    fn version_displays() {
        buildpack()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("httpd-buildpack"));
    }

    #[test]
    fn detect_requires_plan_path() {
        buildpack()
            .arg("detect")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--plan-path"));
    }

    #[test]
    fn invalid_boolean_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        buildpack()
            .args(["detect", "--plan-path"])
            .arg(dir.path().join("plan.toml"))
            .arg("--app-dir")
            .arg(dir.path())
            .env("BP_LIVE_RELOAD_ENABLED", "banana")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "failed to parse BP_LIVE_RELOAD_ENABLED value banana",
            ));
    }

    #[test]
    fn empty_boolean_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        buildpack()
            .args(["detect", "--plan-path"])
            .arg(dir.path().join("plan.toml"))
            .arg("--app-dir")
            .arg(dir.path())
            .env("BP_LIVE_RELOAD_ENABLED", "")
            .assert()
            .failure()
            .stderr(predicate::str::contains("BP_LIVE_RELOAD_ENABLED"));
        assert!(!dir.path().join("plan.toml").exists());
    }
}

mod detect_tests {
    use super::cli_tests::buildpack;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn provides_only_without_opt_in() {
        let app = TempDir::new().unwrap();
        let plan = app.path().join("plan.toml");

        buildpack()
            .args(["detect", "--app-dir"])
            .arg(app.path())
            .arg("--plan-path")
            .arg(&plan)
            .assert()
            .success();

        let content = fs::read_to_string(&plan).unwrap();
        assert!(content.contains("[[provides]]"));
        assert!(!content.contains("[[requires]]"));
    }

    #[test]
    fn requires_httpd_and_watchexec() {
        let app = TempDir::new().unwrap();
        let plan = app.path().join("plan.toml");
        fs::write(app.path().join("httpd.conf"), "").unwrap();

        buildpack()
            .args(["detect", "--app-dir"])
            .arg(app.path())
            .arg("--plan-path")
            .arg(&plan)
            .env("BP_HTTPD_VERSION", "2.4.*")
            .env("BP_LIVE_RELOAD_ENABLED", "true")
            .assert()
            .success();

        let content = fs::read_to_string(&plan).unwrap();
        assert!(content.contains("name = \"httpd\""));
        assert!(content.contains("version = \"2.4.*\""));
        assert!(content.contains("version-source = \"BP_HTTPD_VERSION\""));
        assert!(content.contains("name = \"watchexec\""));
    }
}

mod build_tests {
    use super::cli_tests::buildpack;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use predicates::prelude::*;
    use sha2::{Digest, Sha256};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        app: TempDir,
        layers: TempDir,
        cnb: TempDir,
        platform: TempDir,
    }

    fn tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let content = b"#!/bin/sh\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "httpd-2.4.54/bin/httpd", &content[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn fixture() -> Fixture {
        let fixture = Fixture {
            app: TempDir::new().unwrap(),
            layers: TempDir::new().unwrap(),
            cnb: TempDir::new().unwrap(),
            platform: TempDir::new().unwrap(),
        };

        let archive = tarball();
        let sha = hex::encode(Sha256::digest(&archive));
        let archive_path = fixture.cnb.path().join("httpd.tgz");
        fs::write(&archive_path, &archive).unwrap();

        fs::write(
            fixture.cnb.path().join("buildpack.toml"),
            format!(
                r#"api = "0.7"

[buildpack]
id = "paketo-buildpacks/httpd"
name = "Paketo Buildpack for Apache HTTP Server"
version = "1.2.3"

[[metadata.dependencies]]
id = "httpd"
version = "2.4.54"
sha256 = "{sha}"
uri = "file://{uri}"
stacks = ["*"]
strip-components = 1
"#,
                sha = sha,
                uri = archive_path.display()
            ),
        )
        .unwrap();

        fs::write(
            fixture.cnb.path().join("plan.toml"),
            r#"[[entries]]
name = "httpd"

[entries.metadata]
version = "2.4.*"
version-source = "BP_HTTPD_VERSION"
launch = true
"#,
        )
        .unwrap();

        fixture
    }

    fn build(fixture: &Fixture) -> assert_cmd::Command {
        let mut cmd = buildpack();
        cmd.arg("build")
            .arg("--app-dir")
            .arg(fixture.app.path())
            .arg("--layers-dir")
            .arg(fixture.layers.path())
            .arg("--plan-path")
            .arg(fixture.cnb.path().join("plan.toml"))
            .arg("--platform-dir")
            .arg(fixture.platform.path())
            .arg("--buildpack-dir")
            .arg(fixture.cnb.path())
            .arg("--stack")
            .arg("io.buildpacks.stacks.jammy");
        cmd
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn installs_then_reuses() {
        let fixture = fixture();

        build(&fixture)
            .env("BP_WEB_SERVER", "httpd")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Paketo Buildpack for Apache HTTP Server 1.2.3",
            ))
            .stdout(predicate::str::contains(
                "Selected Apache HTTP Server version (using BP_HTTPD_VERSION): 2.4.54",
            ))
            .stdout(predicate::str::contains("Installing Apache HTTP Server 2.4.54"));

        let layer = fixture.layers.path().join("httpd");
        assert!(layer.join("bin").join("httpd").is_file());
        assert!(read(&fixture.layers.path().join("httpd.toml")).contains("cache_sha"));
        assert_eq!(
            read(&layer.join("env.launch").join("SERVER_ROOT.override")),
            layer.display().to_string()
        );

        let conf = read(&fixture.app.path().join("httpd.conf"));
        assert!(conf.contains(&format!(
            "DocumentRoot \"{}\"",
            fixture.app.path().join("public").display()
        )));

        let launch = read(&fixture.layers.path().join("launch.toml"));
        assert!(launch.contains("type = \"web\""));
        assert!(launch.contains("command = \"httpd\""));

        build(&fixture)
            .env("BP_WEB_SERVER", "httpd")
            .assert()
            .success()
            .stdout(predicate::str::contains("Reusing cached layer"))
            .stdout(predicate::str::contains("Installing").not());

        assert_eq!(read(&fixture.app.path().join("httpd.conf")), conf);
    }

    #[test]
    fn live_reload_declares_two_processes() {
        let fixture = fixture();

        build(&fixture)
            .env("BP_LIVE_RELOAD_ENABLED", "true")
            .assert()
            .success();

        let launch = read(&fixture.layers.path().join("launch.toml"));
        assert!(launch.contains("command = \"watchexec\""));
        assert!(launch.contains("type = \"no-reload\""));
        assert!(!fixture.app.path().join("httpd.conf").exists());
    }

    #[test]
    fn conflicting_bindings_fail() {
        let fixture = fixture();
        for name in ["one", "two"] {
            let binding = fixture.platform.path().join("bindings").join(name);
            fs::create_dir_all(&binding).unwrap();
            fs::write(binding.join("type"), "htpasswd").unwrap();
            fs::write(binding.join(".htpasswd"), "user:hash").unwrap();
        }

        build(&fixture)
            .env("BP_WEB_SERVER", "httpd")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "more than one binding of type 'htpasswd'",
            ));
    }
}
