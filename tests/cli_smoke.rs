use assert_cmd::prelude::*;
use indoc::indoc;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn smellscope(cwd: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("smellscope").expect("binary built");
    cmd.current_dir(cwd).env_remove("RUST_LOG");
    cmd
}

fn project(root: &std::path::Path) {
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(
        root.join("src/shapes.py"),
        indoc! {r#"
            class Square:
                """A square."""

                def __init__(self, side):
                    self.side = side

                def area(self):
                    return self.side * self.side
        "#},
    )
    .unwrap();
    let body = "    x = x + 1\n".repeat(70);
    fs::write(
        root.join("src/legacy.py"),
        format!("def churn(x):\n{body}    return x\n"),
    )
    .unwrap();
}

#[test]
fn cli_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let output = smellscope(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    for name in ["extract", "prune", "analyze", "train", "predict", "report", "run", "init"] {
        assert!(text.contains(name), "help does not mention {name}");
    }
}

#[test]
fn cli_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();

    smellscope(dir.path()).arg("init").assert().success();
    let written = fs::read_to_string(dir.path().join(".smellscope.toml")).unwrap();
    assert!(written.contains("[training]"));

    smellscope(dir.path()).arg("init").assert().failure();
    smellscope(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn cli_analyze_writes_records() {
    let dir = TempDir::new().unwrap();
    project(dir.path());

    smellscope(dir.path())
        .args(["analyze", "src", "--no-vcs", "-o", "out/data.json"])
        .assert()
        .success();

    let text = fs::read_to_string(dir.path().join("out/data.json")).unwrap();
    let records: serde_json::Value = serde_json::from_str(&text).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["path"], "legacy.py");
    assert_eq!(records[0]["language"], "Python");
}

#[test]
fn cli_report_markdown_to_stdout() {
    let dir = TempDir::new().unwrap();
    project(dir.path());

    let output = smellscope(dir.path())
        .args(["report", "src", "--no-vcs", "--plain", "-f", "markdown"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("# Code Quality Report"));
    assert!(text.contains("### legacy.py"));
    assert!(text.contains("Long Method"));
}

#[test]
fn cli_prune_dry_run_keeps_files() {
    let dir = TempDir::new().unwrap();
    project(dir.path());
    fs::write(dir.path().join("src/notes.txt"), "scratch").unwrap();

    let output = smellscope(dir.path())
        .args(["prune", "src", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_kept"], 2);
    assert_eq!(report["files_marked_for_deletion"], 1);
    assert!(dir.path().join("src/notes.txt").exists());
}

#[test]
fn cli_bad_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    project(dir.path());
    fs::write(dir.path().join("bad.toml"), "[training]\ntrees = 0\n").unwrap();

    smellscope(dir.path())
        .args(["analyze", "src", "--config", "bad.toml"])
        .assert()
        .failure();
}
