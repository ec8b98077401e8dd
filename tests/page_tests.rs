//! Integration tests for page commands

#![allow(deprecated)]

use predicates::prelude::*;
use tempfile::TempDir;

mod common;
use common::{ids, pagekeep_cmd, run_json};

#[test]
fn test_first_run_seeds_getting_started() {
    let temp = TempDir::new().unwrap();

    let pages = run_json(temp.path(), &["page", "list"]);
    assert_eq!(ids(&pages), vec!["1"]);
    assert_eq!(pages[0]["title"], "Getting Started");
    assert_eq!(pages[0]["iconColor"], "#3b82f6");
    assert!(temp.path().join("docs-app-state.json").exists());
}

#[test]
fn test_save_new_page_defaults() {
    let temp = TempDir::new().unwrap();

    let page = run_json(
        temp.path(),
        &["page", "save", "--title", "Install Guide", "--tags", "setup, linux", "--content", "<p>Run it.</p>"],
    );
    assert_eq!(page["slug"], "install-guide");
    assert_eq!(page["category"], "guides");
    assert_eq!(page["order"], 1);
    assert_eq!(page["tags"], serde_json::json!(["setup", "linux"]));
    assert_eq!(page["createdAt"], page["updatedAt"]);
    assert_eq!(page["id"].as_str().unwrap().len(), 36);

    let guides = run_json(temp.path(), &["page", "list", "--category", "guides"]);
    assert_eq!(guides.as_array().unwrap().len(), 2);
}

#[test]
fn test_save_existing_page_overwrites_and_keeps_created_at() {
    let temp = TempDir::new().unwrap();
    let before = run_json(temp.path(), &["page", "get", "1"]);

    let after = run_json(
        temp.path(),
        &["page", "save", "--id", "1", "--title", "Start Here", "--category", "api-reference"],
    );
    assert_eq!(after["title"], "Start Here");
    assert_eq!(after["slug"], "start-here");
    assert_eq!(after["category"], "api-reference");
    assert_eq!(after["content"], "");
    assert_eq!(after["createdAt"], before["createdAt"]);

    let pages = run_json(temp.path(), &["page", "list"]);
    assert_eq!(ids(&pages), vec!["1"]);
}

#[test]
fn test_get_by_slug_and_missing() {
    let temp = TempDir::new().unwrap();

    let page = run_json(temp.path(), &["page", "get", "getting-started"]);
    assert_eq!(page["id"], "1");

    pagekeep_cmd(temp.path())
        .args(["page", "get", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_delete_is_idempotent() {
    let temp = TempDir::new().unwrap();

    let first = run_json(temp.path(), &["page", "delete", "1"]);
    assert_eq!(first["count"], 1);
    let second = run_json(temp.path(), &["page", "delete", "1"]);
    assert_eq!(second["count"], 0);

    let pages = run_json(temp.path(), &["page", "list"]);
    assert!(pages.as_array().unwrap().is_empty());
}

#[test]
fn test_move_and_reorder() {
    let temp = TempDir::new().unwrap();
    run_json(temp.path(), &["page", "save", "--id", "b", "--title", "Second"]);
    run_json(temp.path(), &["page", "save", "--id", "c", "--title", "Third"]);

    let moved = run_json(temp.path(), &["page", "move", "c", "up"]);
    assert_eq!(moved["moved"], true);
    let pages = run_json(temp.path(), &["page", "list", "--category", "guides"]);
    assert_eq!(ids(&pages), vec!["1", "c", "b"]);

    let at_top = run_json(temp.path(), &["page", "move", "1", "up"]);
    assert_eq!(at_top["moved"], false);

    run_json(temp.path(), &["page", "reorder", "b", "1", "c"]);
    let pages = run_json(temp.path(), &["page", "list"]);
    assert_eq!(ids(&pages), vec!["b", "1", "c"]);
}

#[test]
fn test_reorder_unknown_id_fails() {
    let temp = TempDir::new().unwrap();

    pagekeep_cmd(temp.path())
        .args(["page", "reorder", "1", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_validation_errors() {
    let temp = TempDir::new().unwrap();

    pagekeep_cmd(temp.path())
        .args(["page", "save", "--title", "Bad", "--icon-color", "blue"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid input"));

    pagekeep_cmd(temp.path())
        .args(["page", "save", "--title", "Bad", "--slug", "Not A Slug"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Slug"));

    pagekeep_cmd(temp.path())
        .args(["page", "move", "1", "sideways"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("direction"));
}

#[test]
fn test_save_content_from_stdin() {
    let temp = TempDir::new().unwrap();

    let output = pagekeep_cmd(temp.path())
        .args(["page", "save", "--id", "s", "--title", "Piped", "--stdin"])
        .write_stdin("<p>from a pipe</p>")
        .output()
        .unwrap();
    assert!(output.status.success());

    let page = run_json(temp.path(), &["page", "get", "s"]);
    assert_eq!(page["content"], "<p>from a pipe</p>");
}

#[test]
fn test_pretty_page_renders_plain_text() {
    let temp = TempDir::new().unwrap();

    pagekeep_cmd(temp.path())
        .args(["--pretty", "page", "get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:    Getting Started"))
        .stdout(predicate::str::contains("- Rich text editing"))
        .stdout(predicate::str::contains("<h1>").not());
}

#[cfg(unix)]
#[test]
fn test_edit_saves_editor_output() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("editor.sh");
    std::fs::write(&script, "#!/bin/sh\nprintf '<p>edited</p>' > \"$1\"\n").unwrap();
    let state_dir = temp.path().join("state");

    let output = pagekeep_cmd(&state_dir)
        .env("VISUAL", format!("sh {}", script.display()))
        .args(["page", "edit", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["changed"], true);

    let page = run_json(&state_dir, &["page", "get", "1"]);
    assert_eq!(page["content"], "<p>edited</p>");
}

#[cfg(unix)]
#[test]
fn test_edit_failing_editor_leaves_page_alone() {
    let temp = TempDir::new().unwrap();
    let before = run_json(temp.path(), &["page", "get", "1"]);

    pagekeep_cmd(temp.path())
        .env("VISUAL", "false")
        .args(["page", "edit", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Editor error"));

    let after = run_json(temp.path(), &["page", "get", "1"]);
    assert_eq!(after, before);
}

#[test]
fn test_resave_without_category_keeps_category() {
    let temp = TempDir::new().unwrap();
    run_json(temp.path(), &["category", "save", "--id", "c3", "--name", "Operations", "--slug", "ops"]);
    run_json(temp.path(), &["page", "save", "--id", "p", "--title", "Runbook", "--category", "ops"]);

    let after = run_json(temp.path(), &["page", "save", "--id", "p", "--title", "Runbook v2"]);
    assert_eq!(after["category"], "ops");
    assert_eq!(after["order"], 0);

    let ops = run_json(temp.path(), &["page", "list", "--category", "ops"]);
    assert_eq!(ids(&ops), vec!["p"]);
}

#[test]
fn test_moving_page_to_other_category_appends_it() {
    let temp = TempDir::new().unwrap();

    let moved = run_json(
        temp.path(),
        &["page", "save", "--id", "1", "--title", "Getting Started", "--category", "api-reference"],
    );
    assert_eq!(moved["order"], 0);
}

#[test]
fn test_new_page_goes_after_gapped_orders() {
    let temp = TempDir::new().unwrap();
    run_json(temp.path(), &["page", "save", "--id", "a", "--title", "Far", "--order", "10"]);

    let b = run_json(temp.path(), &["page", "save", "--id", "b", "--title", "Next"]);
    assert_eq!(b["order"], 11);

    let guides = run_json(temp.path(), &["page", "list", "--category", "guides"]);
    assert_eq!(ids(&guides), vec!["1", "a", "b"]);
}
