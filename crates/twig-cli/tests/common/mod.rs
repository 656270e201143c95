//! Shared harness for `tw` subprocess tests.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Build a Command targeting the `tw` binary, rooted in `dir` with a store
/// and config directory that live inside it.
pub fn tw_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tw"));
    cmd.current_dir(dir);
    // Keep the user's real config and environment out of the tests.
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("TWIG_STORE");
    cmd.env_remove("FORMAT");
    // Suppress tracing output that goes to stderr
    cmd.env("TWIG_LOG", "error");
    cmd
}

/// Default store location when nothing is configured.
pub fn store_path(dir: &Path) -> PathBuf {
    dir.join("projects.json")
}

/// Run `tw <args> --json`, assert success, and parse stdout.
pub fn tw_json(dir: &Path, args: &[&str]) -> Value {
    let output = tw_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("tw should not crash");
    assert!(
        output.status.success(),
        "tw {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

/// Run `tw <args> --json`, assert failure, and parse the error object from stderr.
pub fn tw_json_err(dir: &Path, args: &[&str]) -> Value {
    let output = tw_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("tw should not crash");
    assert!(!output.status.success(), "tw {args:?} unexpectedly succeeded");
    let stderr = String::from_utf8_lossy(&output.stderr);
    // The JSON error object comes first; anything after it is the plain
    // error line printed on exit.
    let end = stderr.find("\n}").map_or(stderr.len(), |i| i + 2);
    let parsed: Value =
        serde_json::from_str(&stderr[..end]).expect("error output should be JSON");
    parsed["error"].clone()
}

/// Read the raw store document.
pub fn read_store(dir: &Path) -> Value {
    let raw = std::fs::read_to_string(store_path(dir)).expect("store file should exist");
    serde_json::from_str(&raw).expect("store should be valid JSON")
}
