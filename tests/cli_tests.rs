//! End-to-end tests for the outdater CLI
//!
//! These tests verify:
//! - Help and version output
//! - Configuration errors fail with a message and exit code 1
//! - Dry runs leave the project untouched and need no credentials

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Environment variables the binary reads from CI
const CI_VARS: [&str; 8] = [
    "GITHUB_TOKEN",
    "GITHUB_REPOSITORY",
    "GITHUB_API_URL",
    "GITHUB_SHA",
    "GITHUB_REF",
    "GITHUB_BASE_REF",
    "GITHUB_EVENT_NAME",
    "GITHUB_EVENT_PATH",
];

/// The binary running in `dir` with a clean CI environment
fn outdater(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("outdater").unwrap();
    cmd.current_dir(dir.path()).env("CI", "true").env_remove("RUST_LOG");
    for var in CI_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Project whose manifest declares no dependencies, so no registry is queried
fn create_test_project() -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        "{\n  \"name\": \"empty\",\n  \"version\": \"1.0.0\"\n}\n",
    )
    .unwrap();
    temp_dir
}

mod cli_options_tests {
    use super::*;

    #[test]
    fn test_help() {
        let dir = create_test_project();
        outdater(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--dry-run"))
            .stdout(predicate::str::contains("--package-manager"))
            .stdout(predicate::str::contains("--manifest"));
    }

    #[test]
    fn test_version() {
        let dir = create_test_project();
        outdater(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let dir = create_test_project();
        outdater(&dir)
            .args(["--verbose", "--quiet"])
            .assert()
            .failure();
    }
}

mod exit_code_tests {
    use super::*;

    #[test]
    fn test_missing_manifest_fails() {
        let dir = create_test_project();
        outdater(&dir)
            .args(["--dry-run", "--manifest", "web/package.json"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error: manifest file not found"));
    }

    #[test]
    fn test_unsupported_language_fails() {
        let dir = create_test_project();
        outdater(&dir)
            .args(["--dry-run", "--language", "python"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not supported"));
    }

    #[test]
    fn test_invalid_config_file_fails() {
        let dir = create_test_project();
        fs::write(dir.path().join("outdater.toml"), "packag-manager = \"npm\"\n").unwrap();
        outdater(&dir)
            .arg("--dry-run")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error: invalid config file"));
    }

    #[test]
    fn test_missing_commit_fails_outside_dry_run() {
        let dir = create_test_project();
        outdater(&dir)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("GITHUB_SHA"));
    }

    #[test]
    fn test_missing_token_fails() {
        let dir = create_test_project();
        outdater(&dir)
            .args(["--commit", "abc123"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("access token is required"));
    }
}

mod dry_run_tests {
    use super::*;

    #[test]
    fn test_dry_run_up_to_date_project() {
        let dir = create_test_project();
        let original = fs::read_to_string(dir.path().join("package.json")).unwrap();

        outdater(&dir)
            .args(["--dry-run", "--package-manager", "none"])
            .assert()
            .success()
            .stdout(predicate::str::contains("All dependencies are up to date"))
            .stdout(predicate::str::contains("Upstream skipped: dry run"));

        let after = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert_eq!(original, after, "package.json should not be modified");
    }

    #[test]
    fn test_dry_run_from_config_file() {
        let dir = create_test_project();
        fs::write(dir.path().join("outdater.toml"), "dry-run = true\n").unwrap();

        outdater(&dir)
            .arg("--quiet")
            .assert()
            .success()
            .stdout(predicate::str::contains("dry run"));
    }

    #[test]
    fn test_dry_run_json_output() {
        let dir = create_test_project();
        let output = outdater(&dir)
            .args(["--dry-run", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["dryRun"], true);
        assert_eq!(value["title"], "Update dependencies for HEAD");
        assert_eq!(value["updates"].as_array().unwrap().len(), 0);
        assert_eq!(value["convergence"]["kind"], "skipped");
    }
}
