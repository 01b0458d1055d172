//! CLI integration tests using the real packmind-cli binary
//!
//! Everything here runs offline: commands either fail before any network
//! call or finish on local state alone.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn packmind_cmd() -> Command {
    let mut cmd = Command::cargo_bin("packmind-cli").unwrap();
    // Keep developer credentials out of test runs
    cmd.env_remove("PACKMIND_API_KEY");
    cmd.env_remove("XDG_CONFIG_HOME");
    cmd
}

fn write_config(dir: &TempDir, content: &str) {
    fs::write(dir.path().join("packmind.json"), content).unwrap();
}

#[test]
fn test_help_lists_all_commands() {
    packmind_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_version_flag() {
    packmind_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("packmind-cli"));
}

#[test]
fn test_install_without_packages_prints_usage() {
    let temp = TempDir::new().unwrap();
    packmind_cmd()
        .current_dir(temp.path())
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Usage: packmind-cli install <package-slug>",
        ));
}

#[test]
fn test_install_with_empty_config_prints_usage() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, r#"{"packages": {}}"#);

    packmind_cmd()
        .current_dir(temp.path())
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("packmind.json is empty"));
}

#[test]
fn test_install_with_malformed_config_fails() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "{not json");

    packmind_cmd()
        .current_dir(temp.path())
        .args(["install", "backend"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse packmind.json"));
}

#[test]
fn test_install_without_credentials_fails() {
    let temp = TempDir::new().unwrap();
    packmind_cmd()
        .current_dir(temp.path())
        .env("HOME", temp.path())
        .args(["install", "backend"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_uninstall_without_arguments_fails() {
    let temp = TempDir::new().unwrap();
    packmind_cmd()
        .current_dir(temp.path())
        .arg("uninstall")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No packages specified."));
}

#[test]
fn test_uninstall_without_config_fails() {
    let temp = TempDir::new().unwrap();
    packmind_cmd()
        .current_dir(temp.path())
        .args(["uninstall", "backend"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "No packmind.json found in current directory.",
        ));
}

#[test]
fn test_uninstall_not_installed_package_fails() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, r#"{"packages": {"backend": "*"}}"#);

    packmind_cmd()
        .current_dir(temp.path())
        .args(["uninstall", "frontend"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("- frontend"))
        .stderr(predicate::str::contains("No packages to uninstall."));
}

#[test]
fn test_remove_alias_matches_uninstall() {
    let temp = TempDir::new().unwrap();
    packmind_cmd()
        .current_dir(temp.path())
        .arg("remove")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No packages specified."));
}

#[test]
fn test_diff_without_packages_prints_usage() {
    let temp = TempDir::new().unwrap();
    packmind_cmd()
        .current_dir(temp.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: packmind-cli diff"));
}

#[test]
fn test_diff_outside_git_repository_fails() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, r#"{"packages": {"backend": "*"}}"#);

    packmind_cmd()
        .current_dir(temp.path())
        .arg("diff")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "requires a git repository with a remote configured",
        ));
}

#[test]
fn test_diff_message_requires_submit_flag() {
    packmind_cmd()
        .args(["diff", "-m", "my message"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--submit"));
}

#[test]
fn test_status_without_configs() {
    let temp = TempDir::new().unwrap();
    packmind_cmd()
        .current_dir(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No packmind.json available in this workspace.",
        ));
}

#[test]
fn test_status_lists_nested_configs() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, r#"{"packages": {"backend": "*", "frontend": "*"}}"#);
    fs::create_dir_all(temp.path().join("apps/api")).unwrap();
    fs::write(
        temp.path().join("apps/api/packmind.json"),
        r#"{"packages": {"backend": "*"}}"#,
    )
    .unwrap();

    packmind_cmd()
        .current_dir(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace packages status"))
        .stdout(predicate::str::contains("./packmind.json"))
        .stdout(predicate::str::contains("./apps/api/packmind.json"))
        .stdout(predicate::str::contains("backend, frontend"))
        .stdout(predicate::str::contains(
            "2 unique packages currently installed.",
        ));
}

#[test]
fn test_status_skips_malformed_configs_with_warning() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, r#"{"packages": {"backend": "*"}}"#);
    fs::create_dir_all(temp.path().join("broken")).unwrap();
    fs::write(temp.path().join("broken/packmind.json"), "{not json").unwrap();

    packmind_cmd()
        .current_dir(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping malformed config file"))
        .stdout(predicate::str::contains("1 unique package currently installed."));
}

#[test]
fn test_completions_generate_for_bash() {
    packmind_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("packmind-cli"));
}

#[test]
fn test_completions_unknown_shell_fails() {
    packmind_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown shell: tcsh"));
}

#[test]
fn test_unknown_subcommand_fails() {
    packmind_cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
