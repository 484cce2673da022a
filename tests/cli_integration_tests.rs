//! CLI integration tests
//!
//! These tests run the `cx-rules` binary against temporary projects and
//! verify output and exit codes:
//! - list: hot and cold sections, human and JSONL
//! - explain: per-line attribution
//! - resolve: alias rewriting from a workspace manifest
//! - directives: cache directive summary
//! - exit code 2 for runtime errors, 3 for parse and config errors

mod common;

use assert_cmd::Command;
use common::{create_file, create_files};
use cx_rules::cli::{GlobalOptions, OutputFormat};
use predicates::prelude::*;
use serial_test::serial;
use std::path::Path;
use tempfile::TempDir;

fn cx_rules(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cx-rules").unwrap();
    cmd.arg("--root").arg(root);
    cmd
}

fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    create_files(
        temp.path(),
        &["src/main.go", "src/main_test.go", "docs/guide.md", "notes.txt"],
    );
    create_file(
        temp.path(),
        ".grove/rules",
        "@freeze-cache\nsrc/**/*.go\n!*_test.go\n---\ndocs/**\n",
    );
    temp
}

#[test]
fn test_list_human() {
    let temp = setup_project();
    cx_rules(temp.path())
        .arg("list")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Hot context (1 files):"))
        .stdout(predicate::str::contains("  src/main.go"))
        .stdout(predicate::str::contains("Cold context (1 files):"))
        .stdout(predicate::str::contains("  docs/guide.md"))
        .stdout(predicate::str::contains("main_test.go").not());
}

#[test]
fn test_list_jsonl() {
    let temp = setup_project();
    let output = cx_rules(temp.path())
        .args(["list", "--format", "jsonl"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["type"], "file");
    assert_eq!(records[0]["section"], "hot");
    assert_eq!(records[0]["path"], "src/main.go");
    assert_eq!(records[1]["section"], "cold");
    assert_eq!(records[2]["type"], "summary");
    assert_eq!(records[2]["hot"], 1);
    assert_eq!(records[2]["cold"], 1);
}

#[test]
fn test_explain_shows_winning_and_excluding_lines() {
    let temp = setup_project();
    cx_rules(temp.path())
        .arg("explain")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("line 2: src/**/*.go"))
        .stdout(predicate::str::contains("  + src/main.go"))
        .stdout(predicate::str::contains("line 3: !*_test.go"))
        .stdout(predicate::str::contains("  - src/main_test.go"))
        .stdout(predicate::str::contains("  + docs/guide.md"));
}

#[test]
fn test_explicit_rules_file() {
    let temp = setup_project();
    create_file(temp.path(), "alt.rules", "*.txt\n");
    cx_rules(temp.path())
        .args(["list", "--rules", "alt.rules"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("  notes.txt"))
        .stdout(predicate::str::contains("src/main.go").not());
}

#[test]
fn test_directives() {
    let temp = setup_project();
    cx_rules(temp.path())
        .arg("directives")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("freeze-cache:  true"))
        .stdout(predicate::str::contains("expire-time:   none"));
}

#[test]
fn test_resolve_with_workspace_manifest() {
    let temp = TempDir::new().unwrap();
    create_file(
        temp.path(),
        "cx.toml",
        r#"
[[workspace.nodes]]
name = "eco"
path = "eco"
kind = "ecosystem-root"

[[workspace.nodes]]
name = "lib"
path = "eco/lib"
kind = "ecosystem-sub-project"
parent_ecosystem = "eco"
"#,
    );

    let expected = format!("{}/eco/lib/src/**", temp.path().display());
    cx_rules(temp.path())
        .args(["resolve", "@a:eco:lib/src/**"])
        .assert()
        .code(0)
        .stdout(predicate::str::diff(format!("{expected}\n")));

    cx_rules(temp.path())
        .args(["resolve", "@a:missing"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_missing_rules_file_exits_with_error() {
    let temp = TempDir::new().unwrap();
    cx_rules(temp.path())
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_parse_error_exits_with_code_3() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), ".grove/rules", "*.go\n@a:x:y:z:w\n");
    cx_rules(temp.path()).arg("list").assert().code(3);
}

#[test]
fn test_invalid_config_exits_with_code_3() {
    let temp = setup_project();
    create_file(temp.path(), "cx.toml", "[gitignore]\nmode = \"sometimes\"\n");
    cx_rules(temp.path()).arg("list").assert().code(3);
}

#[test]
fn test_run_functions_return_exit_codes() {
    let temp = setup_project();
    let options = GlobalOptions {
        root: Some(temp.path().to_path_buf()),
        config: None,
    };
    assert_eq!(
        cx_rules::cli::list::run_list(&options, None, OutputFormat::Jsonl),
        0
    );
    assert_eq!(
        cx_rules::cli::list::run_list(&options, Some(Path::new("nope.rules")), OutputFormat::Human),
        2
    );
}

#[test]
#[serial]
fn test_root_defaults_to_current_directory() {
    let temp = setup_project();
    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp.path()).unwrap();

    let code = cx_rules::cli::directives::run_directives(&GlobalOptions::default(), None);

    std::env::set_current_dir(&original_dir).unwrap();
    assert_eq!(code, 0);
}
