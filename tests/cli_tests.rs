use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn linemerge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("linemerge").expect("binary should build");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("LINEMERGE_STRATEGY")
        .env_remove("LINEMERGE_ASSEMBLY_MODE")
        .env_remove("LINEMERGE_BASE")
        .env_remove("LINEMERGE_SKIP_BLANK_LINES")
        .env_remove("LINEMERGE_CONVERTER");
    cmd
}

fn setup(left: &str, right: &str) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("left.txt"), left).expect("Failed to write left");
    fs::write(dir.path().join("right.txt"), right).expect("Failed to write right");
    dir
}

fn output_lines(dir: &TempDir) -> Vec<String> {
    fs::read_to_string(dir.path().join("out.txt"))
        .expect("output should exist")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_scripted_merge_of_reference_pair() {
    let dir = setup("a\nb\nc\n", "a\nx\nc\nd\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--decisions", "2,1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output saved to out.txt"));

    assert_eq!(output_lines(&dir), ["a", "x", "c", ""]);
}

#[test]
fn test_skip_blank_lines_drops_empty_resolution() {
    let dir = setup("a\nb\nc\n", "a\nx\nc\nd\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--decisions", "2,1", "--skip-blank-lines"])
        .assert()
        .success();

    assert_eq!(output_lines(&dir), ["a", "x", "c"]);
}

#[test]
fn test_interactive_prompt_reasks_on_invalid_choice() {
    let dir = setup("a\nb\nc\n", "a\nx\nc\nd\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt"])
        .write_stdin("3\n2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Line 2 differs:"))
        .stdout(predicate::str::contains("1: b"))
        .stdout(predicate::str::contains("2: x"))
        .stdout(predicate::str::contains("Choose which line to save (1/2): "))
        .stdout(predicate::str::contains("Invalid choice. Please enter 1 or 2: "))
        .stdout(predicate::str::contains("Line 4 differs:"));

    assert_eq!(output_lines(&dir), ["a", "x", "c", ""]);
}

#[test]
fn test_closed_input_saves_nothing() {
    let dir = setup("a\nb\n", "a\nc\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Resolving differences"));

    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn test_missing_input_fails() {
    let dir = setup("a\n", "a\n");

    linemerge(dir.path())
        .args(["missing.txt", "right.txt", "out.txt", "--prefer", "left"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Comparing files"))
        .stderr(predicate::str::contains("missing.txt"));

    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn test_too_few_decisions_saves_nothing() {
    let dir = setup("a\nb\nc\n", "a\nx\nc\nd\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--decisions", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no decision supplied for line 4"));

    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn test_invalid_decision_token_fails_before_comparing() {
    let dir = setup("a\n", "b\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--decisions", "1,maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid choice 'maybe'"));
}

#[test]
fn test_empty_inputs_produce_empty_output() {
    let dir = setup("", "");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences found"));

    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "");
}

#[test]
fn test_default_paths() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Modified.txt"), "one\ntwo\n").unwrap();
    fs::write(dir.path().join("Original.txt"), "one\n2\n").unwrap();

    linemerge(dir.path())
        .args(["--prefer", "right"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output saved to Output.txt"));

    let merged = fs::read_to_string(dir.path().join("Output.txt")).unwrap();
    assert_eq!(merged.lines().collect::<Vec<_>>(), ["one", "2"]);
}

#[test]
fn test_report_mode_writes_nothing() {
    let dir = setup("a\nb\nc\n", "a\nx\nc\nd\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 differing lines"))
        .stdout(predicate::str::contains("Line 2: File1 -> b, File2 -> x"))
        .stdout(predicate::str::contains("Line 4: File1 -> , File2 -> d"));

    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn test_report_json() {
    let dir = setup("a\nb\n", "a\nc\n");

    let assert = linemerge(dir.path())
        .args(["left.txt", "right.txt", "--report", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["differences"][0]["line_number"], 2);
    assert_eq!(report["differences"][0]["left"], "b");
    assert_eq!(report["differences"][0]["right"], "c");
}

#[test]
fn test_amend_after_merge() {
    let dir = setup("a\nb\n", "a\nc\n");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--prefer", "left", "--amend", "1=first"])
        .assert()
        .success();

    assert_eq!(output_lines(&dir), ["first", "b"]);
}

#[test]
fn test_config_file_sets_assembly_mode() {
    let dir = setup("a\nb\nc\n", "a\nx\nc\nd\n");
    fs::write(
        dir.path().join("linemerge.toml"),
        "[assembly]\nmode = \"resolved_only\"\n",
    )
    .unwrap();

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--decisions", "right,right"])
        .assert()
        .success();

    assert_eq!(output_lines(&dir), ["x", "d"]);
}

#[test]
fn test_unconvertible_document_is_rejected_up_front() {
    let dir = setup("a\n", "a\n");
    fs::write(dir.path().join("left.docx"), "not really a document").unwrap();

    linemerge(dir.path())
        .args(["left.docx", "right.txt", "out.txt", "--prefer", "left"])
        .env("LINEMERGE_CONVERTER", "linemerge-no-such-converter")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not installed"));

    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn test_carriage_return_only_files_are_split_into_lines() {
    let dir = setup("a\rb\rc\r", "a\rx\rc\r");

    linemerge(dir.path())
        .args(["left.txt", "right.txt", "out.txt", "--prefer", "right"])
        .assert()
        .success();

    assert_eq!(output_lines(&dir), ["a", "x", "c"]);
}
