use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// A `wp` command with plain output, a fixed user and the given database.
fn wp_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wp").expect("Failed to find wp binary");
    cmd.env_remove("WAYPOINT_DATABASE_FILE")
        .env_remove("WAYPOINT_USER")
        .args(["--no-color", "--user", "tester", "--database-file"])
        .arg(db_path);
    cmd
}

/// Runs `plan create` and returns the printed plan ID.
fn create_plan(db_path: &Path, args: &[&str]) -> String {
    let output = wp_cmd(db_path)
        .args(["plan", "create"])
        .args(args)
        .output()
        .expect("Failed to run wp");
    assert!(output.status.success(), "create failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Created plan with ID: "))
        .expect("plan ID in output")
        .trim()
        .to_string()
}

#[test]
fn test_cli_create_plan_success() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    wp_cmd(&db_path)
        .args([
            "plan",
            "create",
            "Website",
            "--description",
            "Ship the new website",
            "--step",
            "Design",
            "--step",
            "Build",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan with ID: "))
        .stdout(predicate::str::contains("# Website"))
        .stdout(predicate::str::contains("- Status: not_started"))
        .stdout(predicate::str::contains("### 2. Build (○ Pending)"));
}

#[test]
fn test_cli_create_plan_requires_steps() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    wp_cmd(&db_path)
        .args(["plan", "create", "Empty", "--description", "No steps"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("steps"));
}

#[test]
fn test_cli_list_empty_plans() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    wp_cmd(&db_path)
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans found."));
}

#[test]
fn test_cli_list_after_create() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    let plan_id = create_plan(
        &db_path,
        &["Listed", "--description", "Shows up", "--step", "Only"],
    );

    wp_cmd(&db_path)
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "## Listed (ID: {plan_id}) (0/1)"
        )));

    wp_cmd(&db_path)
        .args(["plan", "list", "--name", "nothing-like-this"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans found."));
}

#[test]
fn test_cli_step_flow_with_steps_file() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let steps_path = temp_dir.path().join("steps.json");
    std::fs::write(
        &steps_path,
        r#"[
            {"step_id": "a", "description": "Write code"},
            {"step_id": "b", "description": "Review code", "depends_on": ["a"]}
        ]"#,
    )
    .unwrap();

    let plan_id = create_plan(
        &db_path,
        &[
            "Release",
            "--description",
            "Cut a release",
            "--steps-file",
            steps_path.to_str().unwrap(),
        ],
    );

    wp_cmd(&db_path)
        .args(["plan", "next", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("### 1. Write code"));

    wp_cmd(&db_path)
        .args(["step", "show", &plan_id, "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- a (not completed yet)"));

    wp_cmd(&db_path)
        .args(["step", "update", &plan_id, "a", "--status", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: completed"));

    wp_cmd(&db_path)
        .args(["plan", "progress", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("50.00% (1/2)"));

    wp_cmd(&db_path)
        .args(["plan", "next", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("### 2. Review code"));

    wp_cmd(&db_path)
        .args(["step", "skip", &plan_id, "b"])
        .assert()
        .success();

    wp_cmd(&db_path)
        .args(["plan", "next", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending steps remain."));
}

#[test]
fn test_cli_blocked_plan_reports_blocked() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let plan_id = create_plan(
        &db_path,
        &["Blocked", "--description", "Waits forever", "--step", "First"],
    );

    wp_cmd(&db_path)
        .args([
            "step",
            "add",
            &plan_id,
            "Needs a ghost",
            "--id",
            "d",
            "--depends-on",
            "ghost-id",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created step with ID: d"));

    wp_cmd(&db_path)
        .args(["step", "show", &plan_id, "d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- ghost-id (no such step)"));
}

#[test]
fn test_cli_step_add_rejects_zero_order() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let plan_id = create_plan(
        &db_path,
        &["Ordered", "--description", "Orders start at one", "--step", "First"],
    );

    wp_cmd(&db_path)
        .args(["step", "add", &plan_id, "Nowhere", "--order", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--order"));
}

#[test]
fn test_cli_pause_and_reset() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let plan_id = create_plan(
        &db_path,
        &["Paused", "--description", "On hold", "--step", "Only"],
    );

    wp_cmd(&db_path)
        .args(["plan", "pause", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("is paused"));

    wp_cmd(&db_path)
        .args(["plan", "summary", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("- **Status**: paused"));

    wp_cmd(&db_path)
        .args(["plan", "reset", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Status: not_started"));
}

#[test]
fn test_cli_delete_requires_yes() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let plan_id = create_plan(
        &db_path,
        &["Doomed", "--description", "To be deleted", "--step", "Only"],
    );

    wp_cmd(&db_path)
        .args(["plan", "delete", &plan_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    wp_cmd(&db_path)
        .args(["plan", "delete", &plan_id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Deleted plan {plan_id}")));

    wp_cmd(&db_path)
        .args(["plan", "show", &plan_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_unknown_plan_fails() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    wp_cmd(&db_path)
        .args(["step", "update", "nope", "a", "--status", "completed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plan with ID nope not found"));
}

#[test]
fn test_cli_health() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    wp_cmd(&db_path)
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Database: connected"));
}
