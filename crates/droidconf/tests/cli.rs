//! CLI tests for the droidconf binary: exit codes and output formats.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const BISTRO: &str = include_str!("../../droidconf-core/tests/fixtures/bistro_shop.gradle.kts");
const CONFIG: &str = include_str!("../../droidconf-core/tests/fixtures/droidconf.toml");

/// Runs in `dir` with no ambient configuration or log filter.
fn droidconf(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("droidconf");
    cmd.current_dir(dir.path())
        .env_remove("DROIDCONF_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn workspace(descriptor: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("build.gradle.kts"), descriptor).unwrap();
    dir
}

#[test]
fn help_flag_works() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn check_valid_descriptor_exits_zero() {
    let dir = workspace(BISTRO);
    droidconf(&dir)
        .args(["check", "build.gradle.kts"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("ok (2 warnings)"))
        .stderr(predicate::str::contains("already declared"));
}

#[test]
fn check_malformed_descriptor_exits_one() {
    let dir = workspace("android {\n    compileSdk = 35\n");
    droidconf(&dir)
        .args(["check", "build.gradle.kts"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("never closed"));
}

#[test]
fn check_invalid_descriptor_exits_two() {
    let content = BISTRO.replace("minSdk = 23", "minSdk = 36");
    let dir = workspace(&content);
    droidconf(&dir)
        .args(["check", "build.gradle.kts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("minSdk <= targetSdk <= compileSdk"));
}

#[test]
fn missing_file_exits_one() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .args(["check", "nope.gradle.kts"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read nope.gradle.kts"));
}

#[test]
fn invalid_config_exits_one() {
    let dir = workspace(BISTRO);
    std::fs::write(dir.path().join("droidconf.toml"), "[plugins]\nallowed = 3\n").unwrap();
    droidconf(&dir)
        .args(["check", "build.gradle.kts"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn resolve_reads_stdin() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .args(["resolve", "-"])
        .write_stdin(BISTRO)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.bistro_shop"))
        .stdout(predicate::str::contains("min 23, target 35, compile 35"));
}

#[test]
fn resolve_json_includes_warnings() {
    let dir = workspace(BISTRO);
    let output = droidconf(&dir)
        .args(["resolve", "build.gradle.kts", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["descriptor"]["applicationId"], "com.example.bistro_shop");
    assert_eq!(json["descriptor"]["versionCode"], 1);
    assert_eq!(json["warnings"][0]["kind"], "duplicate_plugin");
    assert_eq!(json["warnings"][1]["kind"], "native_multidex");
}

#[test]
fn resolve_kts_output_checks_clean() {
    let dir = workspace(BISTRO);
    let output = droidconf(&dir)
        .args(["-q", "resolve", "build.gradle.kts", "--format", "kts"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rendered = String::from_utf8(output.stdout).unwrap();
    assert!(rendered.starts_with("plugins {\n"));

    droidconf(&dir)
        .args(["check", "-"])
        .write_stdin(rendered)
        .assert()
        .success()
        .stdout(predicate::str::contains("<stdin>: ok (1 warning)"));
}

#[test]
fn deps_uses_discovered_config() {
    let dir = workspace(BISTRO);
    std::fs::write(dir.path().join("droidconf.toml"), CONFIG).unwrap();
    droidconf(&dir)
        .args(["deps", "build.gradle.kts"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "com.google.firebase:firebase-analytics:22.4.0 [bom com.google.firebase:firebase-bom:33.15.0]",
        ))
        .stdout(predicate::str::contains(
            "androidx.multidex:multidex:2.0.1 [explicit]",
        ));
}

#[test]
fn deps_json_with_explicit_config() {
    let dir = workspace(BISTRO);
    std::fs::write(dir.path().join("custom.toml"), CONFIG).unwrap();
    let output = droidconf(&dir)
        .args(["--config", "custom.toml", "deps", "build.gradle.kts", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    insta::assert_json_snapshot!(json["dependencies"], @r#"
    [
      {
        "artifactId": "firebase-analytics",
        "configuration": null,
        "groupId": "com.google.firebase",
        "source": {
          "bom": "com.google.firebase:firebase-bom:33.15.0",
          "kind": "bom"
        },
        "version": "22.4.0"
      },
      {
        "artifactId": "firebase-auth",
        "configuration": null,
        "groupId": "com.google.firebase",
        "source": {
          "bom": "com.google.firebase:firebase-bom:33.15.0",
          "kind": "bom"
        },
        "version": "23.2.1"
      },
      {
        "artifactId": "multidex",
        "configuration": "implementation",
        "groupId": "androidx.multidex",
        "source": {
          "kind": "explicit"
        },
        "version": "2.0.1"
      }
    ]
    "#);
    assert_eq!(json["warnings"][0]["kind"], "duplicate_plugin");
}
