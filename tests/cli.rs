use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn bin(data_dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_platecore"));
    command
        .arg("--data-dir")
        .arg(data_dir.path())
        .env_remove("PLATECORE_NO_SEED")
        .env("NO_COLOR", "1");
    command
}

fn run_script(command: &mut Command, script: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn platecore");
    // The process may exit before reading everything.
    let _ = child
        .stdin
        .take()
        .expect("stdin")
        .write_all(script.as_bytes());
    child.wait_with_output().expect("wait platecore")
}

#[test]
fn scripted_session_persists_and_logs_out_on_exit() {
    let temp = TempDir::new().expect("tempdir");
    let script = "login\ndemoplate\n245225\n\
                  projectadd\nPR-1\nLaunch\nFirst launch\n\n2025-12-31\n\
                  taskadd PR-1\nWire the harness\nZ-1\n\
                  exit\n";

    let output = run_script(bin(&temp).arg("--time-zone").arg("UTC"), script);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Access Granted"));
    assert!(stdout.contains("Task 'T-1' added to Project 'PR-1'"));

    let projects = fs::read_to_string(temp.path().join("projects.json")).expect("projects");
    let projects: serde_json::Value = serde_json::from_str(&projects).expect("projects json");
    assert_eq!(projects["PR-1"]["Tasks"][0]["AssignedTo"], "Z-1");
    assert_eq!(projects["PR-1"]["DueDate"], "2025-12-31");
    // Seeded sample project is kept alongside
    assert!(projects.get("PROJ-001").is_some());

    let history = fs::read_to_string(temp.path().join("session_history.json")).expect("history");
    assert!(history.contains("Login Success"));
    assert!(history.contains("\"Exit\""));
    assert!(!temp.path().join("session.txt").exists());
}

#[test]
fn guarded_command_is_refused_for_guests() {
    let temp = TempDir::new().expect("tempdir");

    let output = run_script(bin(&temp).arg("--no-seed"), "loglist\n");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Command 'loglist' needs privileges. Please 'login' first."));
    assert!(!temp.path().join("logs.json").exists());
}

#[test]
fn unknown_time_zone_fails_startup() {
    let temp = TempDir::new().expect("tempdir");

    let output = run_script(bin(&temp).arg("--time-zone").arg("Nowhere/Atlantis"), "exit\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Nowhere/Atlantis"));
}
