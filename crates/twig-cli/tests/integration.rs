//! Integration tests for the twig CLI.
//!
//! These tests drive the binary end-to-end inside temporary directories.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a twig command running in `dir`.
fn twig(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_twig"));
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("TWIG_LOG");
    cmd
}

/// Helper to create an initialized repository.
fn setup_repo() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    twig(temp.path()).arg("init").assert().success();
    temp
}

/// Helper to write, stage and commit one file.
fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    fs::write(dir.join(name), content).expect("Failed to write file");
    twig(dir).args(["add", name]).assert().success();
    twig(dir).args(["commit", message]).assert().success();
}

fn stdout_of(dir: &Path, args: &[&str]) -> String {
    let output = twig(dir).args(args).output().expect("Failed to run twig");
    assert!(output.status.success(), "twig {args:?} failed");
    String::from_utf8(output.stdout).unwrap()
}

fn commit_hashes(log: &str) -> Vec<String> {
    log.lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(ToString::to_string)
        .collect()
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    twig(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("twig"));
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    twig(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("global-log"))
        .stdout(predicate::str::contains("checkout"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("push"));
}

#[test]
fn test_no_subcommand_shows_help() {
    let temp = TempDir::new().unwrap();
    twig(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_command() {
    let temp = TempDir::new().unwrap();
    twig(temp.path())
        .arg("glorp")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No command with that name exists."));
}

#[test]
fn test_requires_repository() {
    let temp = TempDir::new().unwrap();
    twig(temp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in an initialized twig directory."));
}

#[test]
fn test_init_twice_fails() {
    let temp = setup_repo();
    assert!(temp.path().join(".twig").is_dir());
    twig(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// Staging and history
// ============================================================================

#[test]
fn test_log_shows_newest_first() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "c1");
    commit_file(temp.path(), "a.txt", "y", "c2");

    let log = stdout_of(temp.path(), &["log"]);
    let c2 = log.find("\nc2\n").expect("c2 missing from log");
    let c1 = log.find("\nc1\n").expect("c1 missing from log");
    assert!(c2 < c1);
    assert!(log.starts_with("===\ncommit "));
    assert!(log.contains("Date: "));

    let hashes = commit_hashes(&log);
    assert_eq!(hashes.len(), 3);
    assert_ne!(hashes[0], hashes[1]);
    assert!(hashes.iter().all(|h| h.len() == 64));
}

#[test]
fn test_log_json() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "c1");

    let json: serde_json::Value =
        serde_json::from_str(&stdout_of(temp.path(), &["log", "--json"])).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["message"], "c1");
    assert_eq!(entries[1]["message"], "initial commit");
    assert_eq!(entries[0]["parents"][0], entries[1]["hash"]);
}

#[test]
fn test_commit_errors() {
    let temp = setup_repo();
    twig(temp.path())
        .args(["commit", "nothing staged"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No changes added to the commit."));

    fs::write(temp.path().join("a.txt"), "x").unwrap();
    twig(temp.path()).args(["add", "a.txt"]).assert().success();
    twig(temp.path())
        .args(["commit", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a commit message."));

    twig(temp.path())
        .args(["add", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist."));
}

#[test]
fn test_idempotent_add() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "c1");

    fs::write(temp.path().join("a.txt"), "changed").unwrap();
    twig(temp.path()).args(["add", "a.txt"]).assert().success();
    fs::write(temp.path().join("a.txt"), "x").unwrap();
    twig(temp.path()).args(["add", "a.txt"]).assert().success();

    let status = stdout_of(temp.path(), &["status"]);
    assert!(status.contains("=== Staged Files ===\n\n"));
    twig(temp.path())
        .args(["commit", "noop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No changes added to the commit."));
}

#[test]
fn test_rm_and_status() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "c1");
    fs::write(temp.path().join("new.txt"), "n").unwrap();

    twig(temp.path()).args(["rm", "a.txt"]).assert().success();
    assert!(!temp.path().join("a.txt").exists());

    let status = stdout_of(temp.path(), &["status"]);
    assert!(status.starts_with("=== Branches ===\n*master\n\n"));
    assert!(status.contains("=== Removed Files ===\na.txt\n"));
    assert!(status.contains("=== Untracked Files ===\nnew.txt\n"));

    twig(temp.path())
        .args(["rm", "new.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No reason to remove the file."));
}

#[test]
fn test_status_json() {
    let temp = setup_repo();
    fs::write(temp.path().join("a.txt"), "x").unwrap();
    twig(temp.path()).args(["add", "a.txt"]).assert().success();

    let json: serde_json::Value =
        serde_json::from_str(&stdout_of(temp.path(), &["status", "--json"])).unwrap();
    assert_eq!(json["current_branch"], "master");
    assert_eq!(json["staged"][0], "a.txt");
}

#[test]
fn test_find_and_global_log() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "same message");
    commit_file(temp.path(), "a.txt", "y", "same message");

    let found = stdout_of(temp.path(), &["find", "same message"]);
    assert_eq!(found.lines().count(), 2);

    let global = stdout_of(temp.path(), &["global-log"]);
    assert_eq!(commit_hashes(&global).len(), 3);

    twig(temp.path())
        .args(["find", "never written"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Found no commit with that message."));
}

// ============================================================================
// Checkout and branches
// ============================================================================

#[test]
fn test_checkout_file_forms() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "c1");
    let first = commit_hashes(&stdout_of(temp.path(), &["log"]))[0].clone();
    commit_file(temp.path(), "a.txt", "y", "c2");

    fs::write(temp.path().join("a.txt"), "dirty").unwrap();
    twig(temp.path()).args(["checkout", "--", "a.txt"]).assert().success();
    assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "y");

    twig(temp.path())
        .args(["checkout", &first[..8], "--", "a.txt"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "x");

    twig(temp.path())
        .args(["checkout", "--", "a.txt", "b.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect operands."));
    twig(temp.path())
        .args(["checkout", "ffffffff", "--", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No commit with that id exists."));
}

#[test]
fn test_branch_lifecycle() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "c1");
    twig(temp.path()).args(["branch", "b1"]).assert().success();
    commit_file(temp.path(), "b.txt", "b", "c2");

    twig(temp.path()).args(["checkout", "b1"]).assert().success();
    assert!(!temp.path().join("b.txt").exists());

    let status = stdout_of(temp.path(), &["status"]);
    assert!(status.starts_with("=== Branches ===\n*b1\nmaster\n"));

    twig(temp.path())
        .args(["rm-branch", "b1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot remove the current branch."));
    twig(temp.path())
        .args(["checkout", "b1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No need to checkout the current branch."));
    twig(temp.path())
        .args(["branch", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch with that name already exists."));
}

#[test]
fn test_reset() {
    let temp = setup_repo();
    commit_file(temp.path(), "a.txt", "x", "c1");
    let first = commit_hashes(&stdout_of(temp.path(), &["log"]))[0].clone();
    commit_file(temp.path(), "b.txt", "b", "c2");

    twig(temp.path()).args(["reset", &first]).assert().success();
    assert!(!temp.path().join("b.txt").exists());
    assert_eq!(commit_hashes(&stdout_of(temp.path(), &["log"]))[0], first);
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_merge_conflict() {
    let temp = setup_repo();
    let dir = temp.path();
    commit_file(dir, "a.txt", "x\n", "c1");
    commit_file(dir, "a.txt", "y\n", "c2");
    twig(dir).args(["branch", "b1"]).assert().success();
    twig(dir).args(["checkout", "b1"]).assert().success();
    commit_file(dir, "a.txt", "z\n", "c3");
    twig(dir).args(["checkout", "master"]).assert().success();
    commit_file(dir, "a.txt", "w\n", "c4");

    twig(dir)
        .args(["merge", "b1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Encountered a merge conflict."));

    assert_eq!(
        fs::read_to_string(dir.join("a.txt")).unwrap(),
        "<<<<<<< HEAD\nw\n=======\nz\n>>>>>>>\n"
    );

    let log = stdout_of(dir, &["log"]);
    assert!(log.contains("\nMerge: "));
    assert!(log.contains("Merged b1 into master."));
}

#[test]
fn test_merge_ancestor_and_fast_forward() {
    let temp = setup_repo();
    let dir = temp.path();
    commit_file(dir, "a.txt", "x", "c1");
    twig(dir).args(["branch", "behind"]).assert().success();
    commit_file(dir, "a.txt", "y", "c2");

    let before = commit_hashes(&stdout_of(dir, &["global-log"])).len();
    twig(dir)
        .args(["merge", "behind"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Given branch is an ancestor of the current branch."));

    twig(dir).args(["checkout", "behind"]).assert().success();
    twig(dir)
        .args(["merge", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current branch fast-forwarded."));
    assert_eq!(fs::read_to_string(dir.join("a.txt")).unwrap(), "y");
    assert_eq!(commit_hashes(&stdout_of(dir, &["global-log"])).len(), before);
}

#[test]
fn test_merge_with_staged_changes() {
    let temp = setup_repo();
    twig(temp.path()).args(["branch", "b1"]).assert().success();
    fs::write(temp.path().join("a.txt"), "x").unwrap();
    twig(temp.path()).args(["add", "a.txt"]).assert().success();

    twig(temp.path())
        .args(["merge", "b1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You have uncommitted changes."));
}

// ============================================================================
// Remotes
// ============================================================================

/// Two repositories side by side; `local` has `remote` registered as origin.
fn setup_pair() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let local = temp.path().join("local");
    let remote = temp.path().join("remote");
    fs::create_dir(&local).unwrap();
    fs::create_dir(&remote).unwrap();
    twig(&local).arg("init").assert().success();
    twig(&remote).arg("init").assert().success();
    twig(&local)
        .args(["add-remote", "origin", "../remote/.twig"])
        .assert()
        .success();
    (temp, local, remote)
}

#[test]
fn test_push_success_and_rejection() {
    let (_temp, local, remote) = setup_pair();
    commit_file(&local, "a.txt", "x", "c1");

    twig(&local).args(["push", "origin", "master"]).assert().success();
    assert_eq!(fs::read_to_string(remote.join("a.txt")).unwrap(), "x");
    assert_eq!(
        commit_hashes(&stdout_of(&local, &["log"])),
        commit_hashes(&stdout_of(&remote, &["log"]))
    );

    commit_file(&remote, "a.txt", "remote", "remote work");
    commit_file(&local, "a.txt", "local", "local work");
    twig(&local)
        .args(["push", "origin", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please pull down remote changes before pushing."));
}

#[test]
fn test_fetch_and_pull() {
    let (_temp, local, remote) = setup_pair();
    commit_file(&remote, "r.txt", "remote", "r1");

    twig(&local).args(["fetch", "origin", "master"]).assert().success();
    let status = stdout_of(&local, &["status"]);
    assert!(status.contains("origin/master\n"));

    twig(&local)
        .args(["fetch", "origin", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("That remote does not have that branch."));

    twig(&local).args(["pull", "origin", "master"]).assert().success();
    assert_eq!(fs::read_to_string(local.join("r.txt")).unwrap(), "remote");
}

#[test]
fn test_remote_registration_errors() {
    let (_temp, local, _remote) = setup_pair();
    twig(&local)
        .args(["add-remote", "origin", "/elsewhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A remote with that name already exists."));
    twig(&local)
        .args(["rm-remote", "upstream"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A remote with that name does not exist."));

    twig(&local)
        .args(["add-remote", "ghost", "/definitely/not/here"])
        .assert()
        .success();
    twig(&local)
        .args(["push", "ghost", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Remote directory not found."));
}
