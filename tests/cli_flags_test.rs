//! CLI flag contract tests
//!
//! Runs the built binary and checks the exit code contract (0 only for a
//! perfect audit or a clean verification), --format json, --verbose and the
//! init subcommand.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn tiercheck_bin() -> String {
    env!("CARGO_BIN_EXE_tiercheck").to_string()
}

fn setup_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/complete");
    for entry in std::fs::read_dir(fixtures).unwrap() {
        let path = entry.unwrap().path();
        std::fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    dir
}

fn run(dir: &Path, extra_args: &[&str]) -> (i32, String, String) {
    let output = Command::new(tiercheck_bin())
        .arg(dir)
        .args(extra_args)
        .env_remove("RUST_LOG")
        .env_remove("TIERCHECK_ENDPOINT")
        .output()
        .expect("Failed to run tiercheck");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn test_complete_project_exits_zero() {
    let dir = setup_project();
    let (code, stdout, _) = run(dir.path(), &["--skip-validate"]);
    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Total Score: 100/100"));
    assert!(stdout.contains("CHALLENGE COMPLETE!"));
}

#[test]
fn test_incomplete_project_exits_one() {
    let dir = setup_project();
    std::fs::remove_file(dir.path().join("main.tf")).unwrap();
    let (code, stdout, _) = run(dir.path(), &["--skip-validate"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Total Score: 95/100"));
    assert!(stdout.contains("[FAIL] Provider Config (0/5 points)"));
}

#[test]
fn test_verbose_lists_checks() {
    let dir = setup_project();
    std::fs::remove_file(dir.path().join("main.tf")).unwrap();
    let (_, quiet, _) = run(dir.path(), &["--skip-validate"]);
    let (_, verbose, _) = run(dir.path(), &["--skip-validate", "--verbose"]);
    assert!(!quiet.contains("main config not found"));
    assert!(verbose.contains("[X] main config not found"));
    assert!(verbose.contains("[OK] aws_vpc resource"));
}

#[test]
fn test_json_format() {
    let dir = setup_project();
    let (code, stdout, _) = run(dir.path(), &["--skip-validate", "--format", "json"]);
    assert_eq!(code, 0);
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(v["score_card"]["total_earned"], 100);
    assert_eq!(v["score_card"]["sections"].as_array().unwrap().len(), 7);
    assert_eq!(v["syntax"]["state"], "skipped");
}

#[test]
fn test_config_file_can_disable_validation() {
    let dir = setup_project();
    std::fs::write(dir.path().join("tiercheck.toml"), "[audit]\nvalidate = false\n").unwrap();
    let (_, stdout, _) = run(dir.path(), &["-f", "json"]);
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(v["syntax"]["state"], "skipped");
}

#[test]
fn test_invalid_flag_exits_one() {
    let dir = setup_project();
    let (code, stdout, stderr) = run(dir.path(), &["--no-such-flag"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(!stderr.is_empty());

    let (code, _, _) = run(dir.path(), &["--format", "sarif"]);
    assert_eq!(code, 1);
}

#[test]
fn test_help_exits_zero() {
    let output = Command::new(tiercheck_bin())
        .arg("--help")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--verify"));
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(&dir.path().join("nope"), &["--skip-validate"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Path does not exist"));
}

#[test]
fn test_verify_against_unreachable_endpoint_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("tiercheck.toml"),
        "[verify]\nquery_timeout_secs = 5\nprobe_timeout_secs = 1\n",
    )
    .unwrap();
    let (code, stdout, _) = run(
        dir.path(),
        &["--verify", "--endpoint", "http://127.0.0.1:9", "-f", "json"],
    );
    assert_eq!(code, 1);
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(v["probe"]["state"], "unreachable");
    let kinds = v["kinds"].as_array().unwrap();
    assert_eq!(kinds.len(), 7);
    for kind in kinds {
        let expected = match kind["expectation"]["kind"].as_str().unwrap() {
            "load_balancers" | "target_groups" | "db_instances" => "UNAVAILABLE",
            _ => "MISSING",
        };
        assert_eq!(kind["verdict"], expected, "{kind}");
    }
}

#[test]
fn test_init_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(tiercheck_bin())
        .args(["init"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let written = std::fs::read_to_string(dir.path().join("tiercheck.toml")).unwrap();
    assert!(written.contains("toggle_variable = \"use_ecs\""));
}
