//! Version-control access for the corpus checkout.
//!
//! [`VersionControl`] is the capability the reconciliation logic depends on;
//! [`GitRepository`] implements it by shelling out to the `git` binary.

use std::path::{Component, Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from version-control operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The corpus directory is not a usable git work tree.
    #[error("{path} is not a git checkout: {details}")]
    NotACheckout { path: PathBuf, details: String },

    /// Git command failed.
    #[error("git command failed: {command}\nstderr: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The revision is still missing after fetching.
    #[error("revision {revision} is not available locally and could not be fetched")]
    HistoryUnavailable { revision: String },

    /// A revision that is not a hexadecimal object id.
    #[error("'{revision}' is not a commit id")]
    InvalidRevision { revision: String },

    /// The requested subtree lies outside the work tree.
    #[error("{subtree} is outside the checkout at {workdir}")]
    OutsideCheckout { subtree: PathBuf, workdir: PathBuf },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Hint printed alongside fatal setup errors.
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::NotACheckout { path, .. } => Some(format!(
                "clone the corpus repository into {} (e.g. `git clone <corpus-url> {}`)",
                path.display(),
                path.display()
            )),
            Self::HistoryUnavailable { .. } => Some(
                "check network access to the corpus remote, or delete the state file to force a full run"
                    .to_string(),
            ),
            Self::InvalidRevision { .. } => {
                Some("delete the state file to force a full run".to_string())
            }
            _ => None,
        }
    }
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Paths changed between two revisions. The three sets are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
}

/// History queries needed to compute incremental work.
pub trait VersionControl {
    /// Fails when the checkout is missing or not a work tree.
    fn validate_checkout(&self) -> GitResult<()>;

    /// Revision currently checked out.
    fn current_revision(&self) -> GitResult<String>;

    /// Make sure `revision` exists locally, fetching if needed.
    fn ensure_history_available(&self, revision: &str) -> GitResult<()>;

    /// Paths below `subtree` that changed between `from` and `to`.
    ///
    /// Returned paths are `subtree`-rooted in the same form the caller passed,
    /// so they compare equal to paths produced by listing `subtree` directly.
    fn diff(&self, from: &str, to: &str, subtree: &Path) -> GitResult<ChangeSet>;
}

/// A corpus checkout driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
}

impl GitRepository {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn has_commit(&self, revision: &str) -> GitResult<bool> {
        let output = git_command(&self.workdir)
            .args(["cat-file", "-e", &format!("{revision}^{{commit}}")])
            .output()?;
        Ok(output.status.success())
    }

    fn is_shallow(&self) -> GitResult<bool> {
        let value = run_git_stdout(&self.workdir, &["rev-parse", "--is-shallow-repository"])?;
        Ok(value == "true")
    }
}

impl VersionControl for GitRepository {
    fn validate_checkout(&self) -> GitResult<()> {
        if !self.workdir.is_dir() {
            return Err(GitError::NotACheckout {
                path: self.workdir.clone(),
                details: "directory does not exist".to_string(),
            });
        }
        match run_git_stdout(&self.workdir, &["rev-parse", "--is-inside-work-tree"]) {
            Ok(value) if value == "true" => Ok(()),
            Ok(value) => Err(GitError::NotACheckout {
                path: self.workdir.clone(),
                details: format!("unexpected rev-parse output '{value}'"),
            }),
            Err(GitError::CommandFailed { stderr, .. }) => Err(GitError::NotACheckout {
                path: self.workdir.clone(),
                details: stderr.trim().to_string(),
            }),
            Err(other) => Err(other),
        }
    }

    fn current_revision(&self) -> GitResult<String> {
        run_git_stdout(&self.workdir, &["rev-parse", "HEAD"])
    }

    fn ensure_history_available(&self, revision: &str) -> GitResult<()> {
        check_revision(revision)?;
        if self.has_commit(revision)? {
            return Ok(());
        }

        if self.is_shallow()? {
            info!(%revision, "revision missing from shallow clone, fetching full history");
            run_git_sync(&self.workdir, &["fetch", "--unshallow", "origin"])?;
        } else {
            info!(%revision, "revision missing locally, fetching from origin");
            run_git_sync(&self.workdir, &["fetch", "origin"])?;
        }

        if self.has_commit(revision)? {
            Ok(())
        } else {
            warn!(%revision, "revision still missing after fetch");
            Err(GitError::HistoryUnavailable {
                revision: revision.to_string(),
            })
        }
    }

    fn diff(&self, from: &str, to: &str, subtree: &Path) -> GitResult<ChangeSet> {
        let relative = without_cur_dir(subtree)
            .strip_prefix(without_cur_dir(&self.workdir))
            .map(Path::to_path_buf)
            .map_err(|_| GitError::OutsideCheckout {
                subtree: subtree.to_path_buf(),
                workdir: self.workdir.clone(),
            })?;
        check_revision(from)?;
        check_revision(to)?;
        let pathspec = if relative.as_os_str().is_empty() {
            ".".to_string()
        } else {
            relative.to_string_lossy().into_owned()
        };

        let output = run_git_sync(
            &self.workdir,
            &[
                "diff",
                "--name-status",
                "--no-renames",
                "--relative",
                "-z",
                from,
                to,
                "--",
                &pathspec,
            ],
        )?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let changes = parse_name_status(&stdout, Path::new(""))
            .map_paths(|path| rebase(&path, &relative, subtree, &self.workdir));
        debug!(
            from,
            to,
            subtree = %subtree.display(),
            added = changes.added.len(),
            modified = changes.modified.len(),
            deleted = changes.deleted.len(),
            "diffed revisions"
        );
        Ok(changes)
    }
}

impl ChangeSet {
    fn map_paths(self, mut f: impl FnMut(PathBuf) -> PathBuf) -> Self {
        Self {
            added: self.added.into_iter().map(&mut f).collect(),
            modified: self.modified.into_iter().map(&mut f).collect(),
            deleted: self.deleted.into_iter().map(&mut f).collect(),
        }
    }
}

/// Accept only an abbreviated or full hexadecimal object id.
fn check_revision(revision: &str) -> GitResult<()> {
    let valid = (4..=64).contains(&revision.len())
        && revision.bytes().all(|b| b.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(GitError::InvalidRevision {
            revision: revision.to_string(),
        })
    }
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Move a workdir-relative diff path under `subtree` as the caller spelled it.
fn rebase(path: &Path, relative: &Path, subtree: &Path, workdir: &Path) -> PathBuf {
    match path.strip_prefix(relative) {
        Ok(rest) => subtree.join(rest),
        Err(_) => workdir.join(path),
    }
}

/// Parse `git diff --name-status -z` output, rooting every path at `root`.
///
/// Type changes count as modifications; statuses that cannot appear without
/// rename detection are ignored.
pub fn parse_name_status(output: &str, root: &Path) -> ChangeSet {
    let mut changes = ChangeSet::default();
    let mut fields = output.split('\0').filter(|field| !field.is_empty());

    while let Some(status) = fields.next() {
        let Some(path) = fields.next() else {
            break;
        };
        let path = root.join(path);
        match status.chars().next() {
            Some('A') => changes.added.push(path),
            Some('M' | 'T') => changes.modified.push(path),
            Some('D') => changes.deleted.push(path),
            _ => debug!(status, path = %path.display(), "ignoring diff entry"),
        }
    }

    changes
}

/// Create a git Command with clean environment (no system/user config).
pub(crate) fn git_command(workdir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

/// Run a git command in the given working directory.
pub fn run_git_sync(workdir: &Path, args: &[&str]) -> GitResult<Output> {
    let output = git_command(workdir).args(args).output()?;

    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let command = format!("git {}", args.join(" "));
        Err(GitError::CommandFailed { command, stderr })
    }
}

/// Run a git command and return stdout as a string.
pub fn run_git_stdout(workdir: &Path, args: &[&str]) -> GitResult<String> {
    let output = run_git_sync(workdir, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_status_records() {
        let output = "A\0DDB/a.xml\0M\0DDB/b.xml\0D\0DDB/c.xml\0T\0DDB/d.xml\0";
        let changes = parse_name_status(output, Path::new("idp.data"));
        assert_eq!(changes.added, vec![PathBuf::from("idp.data/DDB/a.xml")]);
        assert_eq!(
            changes.modified,
            vec![
                PathBuf::from("idp.data/DDB/b.xml"),
                PathBuf::from("idp.data/DDB/d.xml")
            ]
        );
        assert_eq!(changes.deleted, vec![PathBuf::from("idp.data/DDB/c.xml")]);
    }

    #[test]
    fn empty_output_is_empty_change_set() {
        assert_eq!(parse_name_status("", Path::new(".")), ChangeSet::default());
    }

    #[test]
    fn revisions_must_be_object_ids() {
        check_revision("3f2a9c1").unwrap();
        check_revision(&"a".repeat(40)).unwrap();
        for revision in ["--upload-pack=touch pwned", "HEAD~1", "main", "abc", "", "a..b"] {
            assert!(
                matches!(check_revision(revision), Err(GitError::InvalidRevision { .. })),
                "{revision}"
            );
        }
    }

    #[test]
    fn option_like_revision_never_reaches_git() {
        let repo = GitRepository::new("/nonexistent/corpus/checkout");
        let err = repo
            .ensure_history_available("--upload-pack=touch pwned")
            .unwrap_err();
        assert!(matches!(err, GitError::InvalidRevision { .. }));
        assert!(err.remediation().unwrap().contains("state file"));
    }

    #[test]
    fn diff_paths_keep_the_callers_spelling() {
        let workdir = Path::new("idp.data");
        let subtree = Path::new("./idp.data/DDB_EpiDoc_XML");
        let relative = without_cur_dir(subtree)
            .strip_prefix(without_cur_dir(workdir))
            .unwrap()
            .to_path_buf();
        assert_eq!(relative, PathBuf::from("DDB_EpiDoc_XML"));
        assert_eq!(
            rebase(Path::new("DDB_EpiDoc_XML/p.mich/1.xml"), &relative, subtree, workdir),
            PathBuf::from("./idp.data/DDB_EpiDoc_XML/p.mich/1.xml")
        );
    }

    #[test]
    fn dotted_subtree_is_inside_checkout() {
        let repo = GitRepository::new("./idp.data");
        let err = repo
            .diff("zz", "yy", Path::new("idp.data/DDB_EpiDoc_XML"))
            .unwrap_err();
        assert!(matches!(err, GitError::InvalidRevision { .. }));
    }

    #[test]
    fn not_a_checkout_has_remediation() {
        let err = GitError::NotACheckout {
            path: PathBuf::from("idp.data"),
            details: "not a git repository".to_string(),
        };
        assert!(err.remediation().unwrap().contains("git clone"));
        let err = GitError::CommandFailed {
            command: "git status".to_string(),
            stderr: String::new(),
        };
        assert!(err.remediation().is_none());
    }
}
