//! Integration tests for the inboxctl binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Run the binary from an empty directory with no config in scope.
fn inboxctl(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("inboxctl").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("INBOXCTL_SOCKET")
        .env_remove("INBOXCTL_ASSISTANT_ID")
        .env_remove("INBOXCTL_THREAD_ID")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn test_check_valid_interrupt() {
    let home = TempDir::new().unwrap();
    inboxctl(&home)
        .args(["check", &fixture("send_email.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Interrupt is reviewable!"))
        .stdout(predicate::str::contains("Send Email"))
        .stdout(predicate::str::contains("approve, edit, reject"));
}

#[test]
fn test_check_batch_interrupt_lists_every_action() {
    let home = TempDir::new().unwrap();
    inboxctl(&home)
        .args(["check", &fixture("batch.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Actions: 3"))
        .stdout(predicate::str::contains("Delete File"))
        .stdout(predicate::str::contains("Create Event"));
}

#[test]
fn test_check_rejects_non_review_interrupt() {
    let home = TempDir::new().unwrap();
    inboxctl(&home)
        .args(["check", &fixture("not_hitl.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a reviewable interrupt"))
        .stderr(predicate::str::contains("not in the expected HITL format"));
}

#[test]
fn test_approve_all_dry_run_prints_resume() {
    let home = TempDir::new().unwrap();
    inboxctl(&home)
        .args(["approve-all", "--dry-run", &fixture("batch.json")])
        .assert()
        .success()
        .stdout(predicate::eq(
            "{\"input\":{},\"command\":{\"resume\":{\"decisions\":[{\"type\":\"approve\"},{\"type\":\"approve\"},{\"type\":\"approve\"}]}}}\n",
        ))
        .stderr(predicate::str::contains("All actions approved successfully."));
}

#[test]
fn test_reject_all_dry_run_uses_message() {
    let home = TempDir::new().unwrap();
    inboxctl(&home)
        .args([
            "reject-all",
            "--dry-run",
            "--message",
            "Not now.",
            &fixture("batch.json"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "{\"type\":\"reject\",\"message\":\"Not now.\"}",
        ));
}

#[test]
fn test_resolve_dry_run_sends_goto_end() {
    let home = TempDir::new().unwrap();
    inboxctl(&home)
        .args(["resolve", "--dry-run", &fixture("send_email.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "{\"input\":{},\"command\":{\"goto\":\"__end__\"}}",
        ));
}

#[test]
fn test_missing_socket_is_explained() {
    let home = TempDir::new().unwrap();
    inboxctl(&home)
        .args(["approve-all", &fixture("batch.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No stream bridge socket configured"));
}
