//! # Supervisor Tests
//!
//! Runs the real `idlebot` binary against a stand-in controller: a shell
//! script that counts its launches in a file and exits with scripted codes.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tempfile::TempDir;

// ─── Helpers ────────────────────────────────────────────────────────

/// Script exiting with `codes[n]` on its n-th launch (last code repeats).
fn stand_in_controller(dir: &Path, codes: &[i32]) -> String {
    let script = dir.join("controller.sh");
    let mut body = String::from(
        "count_file=\"$1\"\n\
         n=$(cat \"$count_file\" 2>/dev/null || echo 0)\n\
         n=$((n + 1))\n\
         echo \"$n\" > \"$count_file\"\n\
         case \"$n\" in\n",
    );
    for (i, code) in codes.iter().enumerate() {
        body.push_str(&format!("  {}) exit {code} ;;\n", i + 1));
    }
    body.push_str(&format!("  *) exit {} ;;\nesac\n", codes.last().copied().unwrap_or(0)));
    fs::write(&script, body).unwrap();
    script.display().to_string()
}

/// Run the supervisor; returns (exit code, number of controller launches).
fn supervise(codes: &[i32], extra: &[&str]) -> (Option<i32>, u32) {
    let dir = TempDir::new().unwrap();
    let script = stand_in_controller(dir.path(), codes);
    let count_file = dir.path().join("launches");

    let status = Command::new(env!("CARGO_BIN_EXE_idlebot"))
        .args(["--controller", "/bin/sh"])
        .args(extra)
        .arg("--")
        .arg(&script)
        .arg(&count_file)
        .status()
        .unwrap();

    let launches = fs::read_to_string(&count_file)
        .map(|s| s.trim().parse().unwrap())
        .unwrap_or(0);
    (status.code(), launches)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn quit_ends_supervision() {
    assert_eq!(supervise(&[0], &[]), (Some(0), 1));
}

#[test]
fn reload_relaunches_until_quit() {
    assert_eq!(supervise(&[2, 2, 0], &[]), (Some(0), 3));
}

#[test]
fn fault_code_is_propagated() {
    assert_eq!(supervise(&[2, 1], &[]), (Some(1), 2));
    assert_eq!(supervise(&[7], &[]), (Some(7), 1));
}

#[test]
fn reload_limit_ends_with_fault() {
    assert_eq!(supervise(&[2, 2, 2, 0], &["--max-reloads", "1"]), (Some(1), 2));
}

#[test]
fn missing_controller_is_fatal() {
    let status = Command::new(env!("CARGO_BIN_EXE_idlebot"))
        .args(["--controller", "/nonexistent/idlebot_controller"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn interrupt_kills_controller_and_exits_with_fault() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("controller.sh");
    let started = dir.path().join("started");
    fs::write(&script, "touch \"$1\"\nexec sleep 30\n").unwrap();

    let mut supervisor = Command::new(env!("CARGO_BIN_EXE_idlebot"))
        .args(["--controller", "/bin/sh", "--"])
        .arg(&script)
        .arg(&started)
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !started.exists() {
        assert!(Instant::now() < deadline, "controller never started");
        thread::sleep(Duration::from_millis(20));
    }
    // Let the supervisor reach its signal wait.
    thread::sleep(Duration::from_millis(300));

    let sent_at = Instant::now();
    kill(Pid::from_raw(supervisor.id() as i32), Signal::SIGINT).unwrap();
    let status = supervisor.wait().unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(sent_at.elapsed() < Duration::from_secs(10));
}
