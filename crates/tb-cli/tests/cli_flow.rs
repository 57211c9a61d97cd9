//! End-to-end tests driving the `tb` binary.
//!
//! Each test runs with `HOME` pointed at a temp directory so the user's
//! config and data directories are never touched.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn tb_binary() -> String {
    env!("CARGO_BIN_EXE_tb").to_string()
}

fn tb(home: &Path) -> Command {
    let mut cmd = Command::new(tb_binary());
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("RUST_LOG")
        .env_remove("TB_ENTRIES_PATH")
        .env_remove("TB_TOP_ACTIVITIES")
        .env_remove("TB_DASHBOARD_RANGE");
    cmd
}

fn run_ok(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("failed to run tb");
    assert!(
        output.status.success(),
        "tb should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Write a small week of entries and return the file path.
fn write_entries(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("entries.jsonl");
    let lines = [
        r#"{"date":"2024-01-01","startTime":"08:00","endTime":"09:30","activity":"Write report","category":"growth"}"#,
        r#"{"date":"2024-01-02","startTime":"12:00","endTime":"12:30","activity":"Lunch"}"#,
        r#"{"date":"2024-01-03","startTime":"20:00","endTime":"21:00","activity":"Scrolling","category":"shrink"}"#,
        r#"{"date":"2024-01-08","startTime":"08:00","endTime":"09:00","activity":"Next week","category":"growth"}"#,
    ];
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

// ========== Session ==========

#[test]
fn test_session_round_trip() {
    let temp = TempDir::new().unwrap();

    let mut child = tb(temp.path())
        .arg("session")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn tb session");

    let requests = [
        r#"{"op":"add","date":"2024-01-02","startTime":"09:00","endTime":"10:30","activity":"Deep work","category":"growth"}"#,
        r#"{"op":"add","date":"2024-01-02","startTime":"23:00","endTime":"01:00","activity":"Late night"}"#,
        r#"{"op":"by_range","start":"2024-01-01","end":"2024-01-07"}"#,
        r#"{"op":"stats","view":"week","anchor":"2024-01-03"}"#,
        r#"{"op":"delete","id":"does-not-exist"}"#,
        "this is not json",
        r#"{"op":"reset"}"#,
        r#"{"op":"list"}"#,
    ];
    {
        let mut stdin = child.stdin.take().unwrap();
        for request in requests {
            writeln!(stdin, "{request}").unwrap();
        }
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let replies: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(replies.len(), requests.len());

    assert_eq!(replies[0]["kind"], "entry");
    assert_eq!(replies[0]["entry"]["duration"], 90);
    // Crossing midnight clamps to zero
    assert_eq!(replies[1]["entry"]["duration"], 0);
    assert_eq!(replies[2]["count"], 2);
    assert_eq!(replies[3]["analytics"]["totalMinutes"], 90);
    assert_eq!(replies[3]["window"]["start"], "2023-12-31");
    assert_eq!(replies[4]["error"], "not_found");
    assert_eq!(replies[5]["error"], "invalid_request");
    assert_eq!(replies[6]["cleared"], 2);
    assert_eq!(replies[7]["count"], 0);
}

#[test]
fn test_session_seed_file() {
    let temp = TempDir::new().unwrap();
    let entries = write_entries(temp.path());

    let mut child = tb(temp.path())
        .arg("session")
        .arg("--seed")
        .arg(&entries)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut stdin = child.stdin.take().unwrap();
        writeln!(stdin, r#"{{"op":"by_date","date":"2024-01-02"}}"#).unwrap();
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let reply: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reply["count"], 1);
    assert_eq!(reply["entries"][0]["activity"], "Lunch");
    assert_eq!(reply["entries"][0]["category"], "maintenance");
}

// ========== Report ==========

#[test]
fn test_report_week_json() {
    let temp = TempDir::new().unwrap();
    let entries = write_entries(temp.path());

    let output = run_ok(
        tb(temp.path())
            .arg("report")
            .arg("--entries")
            .arg(&entries)
            .args(["--view", "week", "--date", "2024-01-03", "--json"]),
    );
    let report = stdout_json(&output);
    assert_eq!(report["window"]["start"], "2023-12-31");
    assert_eq!(report["window"]["end"], "2024-01-06");
    assert_eq!(report["analytics"]["totalMinutes"], 180);
    assert_eq!(report["analytics"]["totalPossibleHours"], 168);
    assert_eq!(report["analytics"]["productivityScore"], 58);
}

#[test]
fn test_report_back_one_week() {
    let temp = TempDir::new().unwrap();
    let entries = write_entries(temp.path());

    let output = run_ok(
        tb(temp.path())
            .arg("report")
            .arg("--entries")
            .arg(&entries)
            .args(["--date", "2024-01-10", "--back", "1"]),
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("TIME REPORT: Week of Dec 31, 2023"));
    assert!(stdout.contains("Productivity:  58%"));
}

#[test]
fn test_report_uses_config_entries_path() {
    let temp = TempDir::new().unwrap();
    let entries = write_entries(temp.path());
    let config = temp.path().join("tb.toml");
    std::fs::write(
        &config,
        format!("entries_path = {:?}\n", entries.display().to_string()),
    )
    .unwrap();

    let output = run_ok(
        tb(temp.path())
            .arg("--config")
            .arg(&config)
            .args(["report", "--view", "day", "--date", "2024-01-08", "--json"]),
    );
    let report = stdout_json(&output);
    assert_eq!(report["analytics"]["totalMinutes"], 60);
    assert_eq!(report["analytics"]["totalPossibleHours"], 24);
}

#[test]
fn test_report_missing_entries_file_fails() {
    let temp = TempDir::new().unwrap();

    let output = tb(temp.path())
        .arg("report")
        .arg("--entries")
        .arg(temp.path().join("nope.jsonl"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to open entries file"), "{stderr}");
}

// ========== Dashboard ==========

#[test]
fn test_dashboard_trailing_range() {
    let temp = TempDir::new().unwrap();
    let entries = write_entries(temp.path());

    let output = run_ok(
        tb(temp.path())
            .arg("dashboard")
            .arg("--entries")
            .arg(&entries)
            .args(["--range", "14d", "--today", "2024-01-08", "--json"]),
    );
    let dashboard = stdout_json(&output);
    assert_eq!(dashboard["window"]["start"], "2023-12-26");
    assert_eq!(dashboard["trend"].as_array().unwrap().len(), 14);
    assert_eq!(dashboard["analytics"]["totalMinutes"], 240);
    assert_eq!(dashboard["topActivities"][0]["activity"], "Write report");
}

#[test]
fn test_dashboard_rejects_inverted_range() {
    let temp = TempDir::new().unwrap();
    let entries = write_entries(temp.path());

    let output = tb(temp.path())
        .arg("dashboard")
        .arg("--entries")
        .arg(&entries)
        .args(["--start", "2024-01-08", "--end", "2024-01-01"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("is after end"));
}

// ========== Export ==========

#[test]
fn test_export_custom_range() {
    let temp = TempDir::new().unwrap();
    let entries = write_entries(temp.path());

    let output = run_ok(
        tb(temp.path())
            .arg("export")
            .arg("--entries")
            .arg(&entries)
            .args(["--start", "2024-01-01", "--end", "2024-01-03"]),
    );
    let export = stdout_json(&output);
    assert!(export["generatedAt"].is_string());
    assert_eq!(export["dateRange"]["kind"], "custom");

    let dates: Vec<&str> = export["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2024-01-03", "2024-01-02", "2024-01-01"]);
    assert_eq!(export["analytics"]["totalMinutes"], 180);
}
