#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;

/// A `pagekeep` command storing its state as files under `dir`.
pub fn pagekeep_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pagekeep").unwrap();
    cmd.env("PAGEKEEP_BACKEND", "file");
    cmd.env("PAGEKEEP_PATH", dir);
    cmd.env_remove("PAGEKEEP_LOG");
    cmd.env_remove("EDITOR");
    cmd.env_remove("VISUAL");
    cmd
}

/// Run `args` against the state in `dir`, assert success and parse stdout.
pub fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = pagekeep_cmd(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "pagekeep {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// The `id` field of every element of a JSON array.
pub fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}
