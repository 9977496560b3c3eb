//! Integration tests for the stellation-ci CLI

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn create_test_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();

    let a = temp.path().join("crates/a");
    let b = temp.path().join("crates/b");
    let example = temp.path().join("examples/fullstack");

    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::create_dir_all(&example).unwrap();

    fs::write(
        a.join("Cargo.toml"),
        r#"[package]
name = "a"
version = "0.1.0"
edition = "2021"

[dependencies]
b = { path = "../b" }
c = "1.0"
stellation-core = { version = "0.1.0" }
"#,
    )
    .unwrap();

    fs::write(
        b.join("Cargo.toml"),
        r#"[package]
name = "b"
version = "0.1.0"
edition = "2021"

[dependencies]
serde = "1"
"#,
    )
    .unwrap();

    fs::write(
        example.join("Cargo.toml"),
        r#"[package]
name = "fullstack"
version = "0.1.0"
publish = false

[dependencies]
a = { path = "../../crates/a" }
"#,
    )
    .unwrap();

    temp
}

fn stellation_ci() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stellation-ci"))
}

#[test]
fn test_update_version() {
    let workspace = create_test_workspace();

    let output = stellation_ci()
        .args(["update-version", "2.0.0"])
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Running in"));
    assert!(stdout.contains("Updating crates/a/Cargo.toml to version 2.0.0"));
    assert!(stdout.contains("Updating example examples/fullstack/Cargo.toml to version 2.0.0"));
    assert!(stdout.contains("Skipping c..."));

    let a = fs::read_to_string(workspace.path().join("crates/a/Cargo.toml")).unwrap();
    assert!(a.contains("version = \"2.0.0\"\nedition"));
    assert!(a.contains(r#"b = { path = "../b", version = "2.0.0" }"#));
    assert!(a.contains("c = \"1.0\"\n"));

    let example =
        fs::read_to_string(workspace.path().join("examples/fullstack/Cargo.toml")).unwrap();
    assert!(example.contains(r#"a = { path = "../../crates/a", version = "2.0.0" }"#));
}

#[test]
fn test_update_version_strips_marker() {
    let workspace = create_test_workspace();

    let output = stellation_ci()
        .args(["update-version", "v1.4.0"])
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));

    let b = fs::read_to_string(workspace.path().join("crates/b/Cargo.toml")).unwrap();
    assert!(b.contains("version = \"1.4.0\""));
    assert!(!b.contains("v1.4.0"));
}

#[test]
fn test_update_version_requires_argument() {
    let workspace = create_test_workspace();

    let output = stellation_ci()
        .arg("update-version")
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_update_version_rejects_invalid_version() {
    let workspace = create_test_workspace();
    let before = fs::read_to_string(workspace.path().join("crates/a/Cargo.toml")).unwrap();

    let output = stellation_ci()
        .args(["update-version", "next"])
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid version 'next'"));

    let after = fs::read_to_string(workspace.path().join("crates/a/Cargo.toml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_update_version_rejects_shorthand() {
    let workspace = create_test_workspace();

    let output = stellation_ci()
        .args(["update-version", "1.2"])
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid version '1.2'"));
}

#[test]
fn test_update_version_help_mentions_full_version() {
    let output = stellation_ci()
        .args(["update-version", "--help"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MAJOR.MINOR.PATCH"));
    assert!(stdout.contains("Shorthand such as `1.2` is rejected"));
}

#[test]
fn test_update_version_dry_run() {
    let workspace = create_test_workspace();
    let before = fs::read_to_string(workspace.path().join("crates/a/Cargo.toml")).unwrap();

    let output = stellation_ci()
        .args(["update-version", "3.0.0", "--dry-run"])
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dry run mode"));

    let after = fs::read_to_string(workspace.path().join("crates/a/Cargo.toml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_switch_registry() {
    let workspace = create_test_workspace();

    let output = stellation_ci()
        .arg("switch-registry")
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Updating stellation-core to registry dry-run"));

    let a = fs::read_to_string(workspace.path().join("crates/a/Cargo.toml")).unwrap();
    assert!(a.contains(r#"stellation-core = { version = "0.1.0", registry = "dry-run" }"#));
    assert!(a.contains(r#"b = { path = "../b" }"#));
}

#[test]
fn test_switch_registry_with_root_and_json() {
    let workspace = create_test_workspace();

    let output = stellation_ci()
        .args(["switch-registry", "--registry", "staging", "--json", "--root"])
        .arg(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let manifests = report.as_array().unwrap();
    assert_eq!(manifests.len(), 2);
    assert_eq!(manifests[0]["target"], "staging");
    assert_eq!(manifests[0]["dependencies"][2]["name"], "stellation-core");
    assert_eq!(manifests[0]["dependencies"][2]["action"], "updated");

    let a = fs::read_to_string(workspace.path().join("crates/a/Cargo.toml")).unwrap();
    assert!(a.contains(r#"registry = "staging""#));
}

#[test]
fn test_malformed_manifest_fails() {
    let workspace = create_test_workspace();
    fs::write(workspace.path().join("crates/b/Cargo.toml"), "[package\n").unwrap();

    let output = stellation_ci()
        .args(["update-version", "2.0.0"])
        .current_dir(workspace.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse"));
}
