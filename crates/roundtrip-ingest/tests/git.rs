//! Git backend tests against a throwaway repository.
//!
//! Skipped when no `git` binary is available.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use roundtrip_ingest::{GitError, GitRepository, VersionControl};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn commit_all(dir: &Path, message: &str) -> String {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

#[test]
fn diff_reports_changes_under_subtree_only() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let repo_dir = dir.path().join("corpus");
    fs::create_dir_all(&repo_dir).unwrap();
    git(&repo_dir, &["init", "-q"]);
    write(&repo_dir, "DDB/a.xml", "<a/>");
    write(&repo_dir, "DDB/b.xml", "<b/>");
    write(&repo_dir, "HGV/c.xml", "<c/>");
    let first = commit_all(&repo_dir, "initial");

    write(&repo_dir, "DDB/a.xml", "<a>changed</a>");
    fs::remove_file(repo_dir.join("DDB/b.xml")).unwrap();
    write(&repo_dir, "DDB/new.xml", "<new/>");
    write(&repo_dir, "HGV/c.xml", "<c>changed</c>");
    let second = commit_all(&repo_dir, "update");

    let repo = GitRepository::new(&repo_dir);
    repo.validate_checkout().unwrap();
    assert_eq!(repo.current_revision().unwrap(), second);
    repo.ensure_history_available(&first).unwrap();

    let subtree = repo_dir.join("DDB");
    let changes = repo.diff(&first, &second, &subtree).unwrap();
    assert_eq!(changes.added, vec![subtree.join("new.xml")]);
    assert_eq!(changes.modified, vec![subtree.join("a.xml")]);
    assert_eq!(changes.deleted, vec![subtree.join("b.xml")]);
}

#[test]
fn plain_directory_is_not_a_checkout() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let repo = GitRepository::new(dir.path());
    let err = repo.validate_checkout().unwrap_err();
    assert!(matches!(err, GitError::NotACheckout { .. }));
    assert!(err.remediation().is_some());
}

#[test]
fn missing_directory_is_not_a_checkout() {
    let repo = GitRepository::new(PathBuf::from("/nonexistent/corpus/checkout"));
    let err = repo.validate_checkout().unwrap_err();
    assert!(matches!(err, GitError::NotACheckout { .. }));
}

#[test]
fn subtree_outside_checkout_is_rejected() {
    let repo = GitRepository::new("corpus");
    let err = repo.diff("a", "b", Path::new("elsewhere/DDB")).unwrap_err();
    assert!(matches!(err, GitError::OutsideCheckout { .. }));
}
