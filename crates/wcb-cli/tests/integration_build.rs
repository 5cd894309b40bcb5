//! End-to-end tests for the `wcb` binary.

// Command::cargo_bin is deprecated but still works
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WIDGET: &str = r#"const TAG = 'x-widget';

export class Widget extends HTMLElement {
    connectedCallback() {
        this.textContent = `hello from ${TAG}`;
    }
}

customElements.define(TAG, Widget);
"#;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("components")).unwrap();
    dir
}

fn component(dir: &Path, file: &str, source: &str) {
    fs::write(dir.join("components").join(file), source).unwrap();
}

fn wcb(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wcb").unwrap();
    cmd.current_dir(dir).arg("--no-color").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_tasks_and_options() {
    Command::cargo_bin("wcb")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[TASK]"))
        .stdout(predicate::str::contains("--config-file"))
        .stdout(predicate::str::contains("--watch"))
        .stdout(predicate::str::contains("assemble"));
}

#[test]
fn test_version() {
    Command::cargo_bin("wcb")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_task_is_a_usage_error() {
    let dir = project();
    wcb(dir.path())
        .arg("deploy")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown task 'deploy'"));
}

#[test]
fn test_default_build_writes_every_artifact() {
    let dir = project();
    component(dir.path(), "widget.js", WIDGET);

    wcb(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Build Summary"));

    let dist = dir.path().join("dist");
    for name in [
        "widget-bundle.js",
        "widget-bundle.js.map",
        "widget-bundle.min.js",
        "widget-bundle-compat.js",
        "widget-bundle-compat.min.js",
        "widget.js",
    ] {
        assert!(dist.join(name).is_file(), "missing {name}");
    }

    let loader = fs::read_to_string(dist.join("widget.js")).unwrap();
    assert!(loader.contains("widget-bundle.min.js"));
    assert!(loader.contains("widget-bundle-compat.min.js"));
}

#[test]
fn test_cwd_flag_selects_project() {
    let dir = project();
    component(dir.path(), "widget.js", WIDGET);
    let elsewhere = TempDir::new().unwrap();

    wcb(elsewhere.path())
        .arg("--cwd")
        .arg(dir.path())
        .arg("assemble")
        .assert()
        .success();

    assert!(dir.path().join("dist/widget-bundle.js").is_file());
    assert!(!dir.path().join("dist/widget-bundle.min.js").exists());
    assert!(!elsewhere.path().join("dist").exists());
}

#[test]
fn test_broken_component_does_not_fail_the_run() {
    let dir = project();
    component(dir.path(), "good.js", WIDGET);
    component(dir.path(), "broken.js", "export const = ;\n");

    wcb(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("broken.js"))
        .stderr(predicate::str::contains("1 failed"));

    assert!(dir.path().join("dist/good-bundle.js").is_file());
    assert!(!dir.path().join("dist/broken-bundle.js").exists());
}

#[test]
fn test_missing_source_dir_fails() {
    let dir = TempDir::new().unwrap();

    wcb(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read source directory"));

    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_malformed_config_fails() {
    let dir = project();
    fs::write(dir.path().join("wcb.toml"), "source_dir = [\n").unwrap();

    wcb(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("wcb.toml"));
}

#[test]
fn test_unknown_config_field_fails() {
    let dir = project();
    fs::write(dir.path().join("wcb.toml"), "sourceDirectory = \"src\"\n").unwrap();

    wcb(dir.path()).assert().failure();
}

#[test]
fn test_missing_explicit_config_falls_back_to_defaults() {
    let dir = project();
    component(dir.path(), "widget.js", WIDGET);

    wcb(dir.path())
        .args(["-c", "nope.toml", "assemble"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nope.toml"));

    assert!(dir.path().join("dist/widget-bundle.js").is_file());
}

#[test]
fn test_config_file_sets_directories_and_names() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/widget.js"), WIDGET).unwrap();
    fs::write(
        dir.path().join("wcb.toml"),
        r#"
source_dir = "src"
dest_dir = "build"
minify = false

[compat]
enabled = false

[output]
bundle = "[name].bundle.js"
loader = "[name].loader.js"
"#,
    )
    .unwrap();

    wcb(dir.path()).assert().success();

    let build = dir.path().join("build");
    assert!(build.join("widget.bundle.js").is_file());
    assert!(build.join("widget.loader.js").is_file());
    assert!(!build.join("widget.bundle.min.js").exists());
    assert!(!build.join("widget.bundle-compat.js").exists());
}

#[test]
fn test_env_overrides_config() {
    let dir = project();
    component(dir.path(), "widget.js", WIDGET);

    wcb(dir.path())
        .arg("assemble")
        .env("WCB_DEST_DIR", "public")
        .env("WCB_COMPAT__ENABLED", "false")
        .assert()
        .success();

    assert!(dir.path().join("public/widget-bundle.js").is_file());
    assert!(!dir.path().join("public/widget-bundle-compat.js").exists());
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_css_task_only_touches_stylesheet() {
    let dir = project();
    component(dir.path(), "widget.js", WIDGET);
    fs::create_dir(dir.path().join("styles")).unwrap();
    fs::write(
        dir.path().join("styles/main.css"),
        ".card {\n  color: #ff0000;\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("wcb.toml"),
        "[css]\ninput = \"styles/main.css\"\n",
    )
    .unwrap();

    wcb(dir.path()).arg("css").assert().success();

    let dist = dir.path().join("dist");
    assert!(dist.join("components.css").is_file());
    assert!(dist.join("components.min.css").is_file());
    assert!(!dist.join("widget-bundle.js").exists());
}

#[test]
fn test_quiet_build_prints_nothing() {
    let dir = project();
    component(dir.path(), "widget.js", WIDGET);

    wcb(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_empty_source_dir_succeeds() {
    let dir = project();

    wcb(dir.path()).assert().success();

    let written = fs::read_dir(dir.path().join("dist"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(written, 0);
}
