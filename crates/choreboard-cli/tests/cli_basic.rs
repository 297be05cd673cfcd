//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temp
//! directory, so config and database files never touch the real profile.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_choreboard"))
        .args(args)
        .env("HOME", home)
        .env("CHOREBOARD_ENV", "dev")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (code, stdout, stderr) = run_cli(home, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    stdout
}

fn write_tasks(dir: &Path) -> String {
    let path = dir.join("tasks.json");
    std::fs::write(
        &path,
        r#"[
            {"id": "A", "title": "Unload dishwasher", "assigned_to": "kid", "assigned_by": "mom"},
            {"id": "B", "title": "Make bed", "assigned_to": "kid", "assigned_by": "kid"},
            {"id": "D", "title": "Walk the dog", "assigned_to": "kid", "assigned_by": "dad"}
        ]"#,
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_config_list_shows_default_timings() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_ok(home.path(), &["config", "list"]);
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["celebrations"]["badge_display_ms"], 2000);
    assert_eq!(json["celebrations"]["milestone_display_ms"], 5000);
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["config", "set", "celebrations.exit_grace_ms", "150"]);
    let stdout = run_ok(home.path(), &["config", "get", "celebrations.exit_grace_ms"]);
    assert_eq!(stdout.trim(), "150");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "celebrations.nope", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_prompts_list_and_respond() {
    let home = tempfile::tempdir().unwrap();
    let tasks = write_tasks(home.path());
    let db = home.path().join("state.db");
    let db = db.to_str().unwrap();
    let ctx = ["--user", "kid", "--tasks", tasks.as_str(), "--db", db];

    let mut args = vec!["prompts", "list"];
    args.extend(ctx);
    let list: Value = serde_json::from_str(&run_ok(home.path(), &args)).unwrap();
    assert_eq!(list["current"]["task"]["id"], "A");
    assert_eq!(list["pending"].as_array().unwrap().len(), 2);

    let mut args = vec!["prompts", "respond", "A"];
    args.extend(ctx);
    let respond: Value = serde_json::from_str(&run_ok(home.path(), &args)).unwrap();
    assert_eq!(respond["events"][0]["type"], "AssignmentAnswered");
    assert_eq!(respond["events"][0]["decision"], "accepted");
    assert_eq!(respond["current"]["task"]["id"], "D");

    let mut args = vec!["prompts", "list"];
    args.extend(ctx);
    let list: Value = serde_json::from_str(&run_ok(home.path(), &args)).unwrap();
    assert_eq!(list["current"]["task"]["id"], "D");

    let seen: Value =
        serde_json::from_str(&run_ok(home.path(), &["prompts", "seen", "--db", db])).unwrap();
    assert_eq!(seen, serde_json::json!(["A"]));
}

#[test]
fn test_prompts_respond_to_unknown_task_fails() {
    let home = tempfile::tempdir().unwrap();
    let tasks = write_tasks(home.path());
    let db = home.path().join("state.db");
    let (code, _, stderr) = run_cli(
        home.path(),
        &[
            "prompts",
            "dismiss",
            "B",
            "--user",
            "kid",
            "--tasks",
            &tasks,
            "--db",
            db.to_str().unwrap(),
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("no pending assignment"));
}

#[test]
fn test_celebrate_play_shows_items_in_order() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["config", "set", "celebrations.badge_display_ms", "20"]);
    run_ok(home.path(), &["config", "set", "celebrations.goal_display_ms", "20"]);
    run_ok(home.path(), &["config", "set", "celebrations.exit_grace_ms", "5"]);

    let file = home.path().join("items.json");
    std::fs::write(
        &file,
        r#"[
            {"kind": "badge", "payload": {"id": "b1", "name": "Early Bird"}},
            {"kind": "goal", "payload": {"id": "g1", "title": "Clean Garage"}}
        ]"#,
    )
    .unwrap();

    let stdout = run_ok(home.path(), &["celebrate", "play", file.to_str().unwrap()]);
    let events: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let shown: Vec<&str> = events
        .iter()
        .filter(|e| e["type"] == "CelebrationShown")
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(shown, ["Early Bird", "Clean Garage"]);
    let cleared = events
        .iter()
        .filter(|e| e["type"] == "CelebrationCleared")
        .count();
    assert_eq!(cleared, 2);
}

#[test]
fn test_celebrate_check_reports_invalid_items() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("items.json");
    std::fs::write(
        &file,
        r#"[
            {"kind": "badge", "payload": {"id": "b1", "name": "Early Bird"}},
            {"kind": "milestone", "payload": {"id": "m1", "label": "", "value": 7}}
        ]"#,
    )
    .unwrap();

    let (code, stdout, _) = run_cli(home.path(), &["celebrate", "check", file.to_str().unwrap()]);
    assert_ne!(code, 0);
    let reports: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports[0]["ok"], true);
    assert_eq!(reports[1]["ok"], false);
}

#[test]
fn test_celebrate_play_rejects_zero_tap_period() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("items.json");
    std::fs::write(&file, r#"[{"kind": "badge", "payload": {"id": "b1", "name": "Early Bird"}}]"#)
        .unwrap();

    let (code, _, stderr) = run_cli(
        home.path(),
        &["celebrate", "play", file.to_str().unwrap(), "--tap-after-ms", "0"],
    );
    assert_eq!(code, 2, "clap usage errors exit with 2: {stderr}");
    assert!(stderr.contains("--tap-after-ms"));
    assert!(!stderr.contains("panicked"));
}
