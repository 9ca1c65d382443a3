//! git::interface
//!
//! The capability interface every reconciliation step goes through.
//!
//! # Architecture
//!
//! [`GitBackend`] has one method per thing the reconciler needs from git.
//! [`GitCli`](super::GitCli) implements it against the real executable and
//! [`FakeGit`](super::fake::FakeGit) implements it in memory for tests.
//! Callers receive structured values (parsed statuses, OIDs, counts) and
//! never see raw command output except where the output itself is the
//! product (commit logs, push output).
//!
//! # Error Handling
//!
//! Every method returns `Result<_, GitError>`. The reconciler decides per
//! call site whether a failure skips one submodule or ends the run:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::CommandFailed`]: git ran but exited non-zero
//! - [`GitError::Spawn`]: git could not be started at all
//! - [`GitError::Parse`]: git output did not have the expected shape

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{BranchName, Oid, Revision, SubmodulePath, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The git executable could not be started.
    #[error("failed to run `{command}`: {message}")]
    Spawn {
        /// The command line that was attempted
        command: String,
        /// The OS error
        message: String,
    },

    /// git ran and reported failure.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Exit status description
        status: String,
        /// Trimmed stderr (or stdout when stderr was empty)
        stderr: String,
    },

    /// Output could not be interpreted.
    #[error("unexpected output from `{command}`: {message}")]
    Parse {
        /// The command whose output was rejected
        command: String,
        /// What was wrong with it
        message: String,
    },

    /// A value read from git failed validation.
    #[error("invalid value from git: {0}")]
    InvalidValue(#[from] TypeError),
}

/// Working-tree state of a submodule as reported by `git submodule status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    /// Checked out at the recorded commit (` `).
    InSync,
    /// Checked out at a different commit than recorded (`+`).
    OutOfSync,
    /// Not initialized (`-`).
    Uninitialized,
    /// Merge conflict on the submodule pointer (`U`).
    Conflict,
}

impl StatusFlag {
    /// Map the leading status character to a flag.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' => Some(StatusFlag::InSync),
            '+' => Some(StatusFlag::OutOfSync),
            '-' => Some(StatusFlag::Uninitialized),
            'U' => Some(StatusFlag::Conflict),
            _ => None,
        }
    }

    /// Check whether git commands can run inside the submodule.
    pub fn is_usable(&self) -> bool {
        matches!(self, StatusFlag::InSync | StatusFlag::OutOfSync)
    }
}

/// One line of `git submodule status --cached`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleStatus {
    /// Path (and user-facing name) of the submodule
    pub path: SubmodulePath,
    /// Commit the parent repository records for it
    pub commit: Oid,
    /// Checkout state
    pub flag: StatusFlag,
}

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Index (staged) status column
    pub index: char,
    /// Work tree status column
    pub worktree: char,
    /// Path as printed by git
    pub path: String,
}

impl StatusEntry {
    /// A staged modification (`M` in the index column).
    pub fn is_staged_modification(&self) -> bool {
        self.index == 'M'
    }
}

impl std::fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} {}", self.index, self.worktree, self.path)
    }
}

/// Capabilities required to reconcile submodule pointers.
///
/// Submodule-scoped methods run inside the submodule's work tree; the rest
/// run in the parent repository.
pub trait GitBackend {
    /// List submodules with the commit the parent records for each.
    fn list_submodules(&self) -> Result<Vec<SubmoduleStatus>, GitError>;

    /// Fetch all remotes of a submodule.
    fn fetch_all(&self, path: &SubmodulePath) -> Result<(), GitError>;

    /// Check out a submodule's work tree at `rev`.
    fn checkout(&self, path: &SubmodulePath, rev: &Revision) -> Result<(), GitError>;

    /// Commit hashes from the `Subproject commit` markers of the working-tree
    /// diff for `path`, in output order (recorded first, checked-out second).
    fn diff_subproject_pointers(&self, path: &SubmodulePath) -> Result<Vec<Oid>, GitError>;

    /// Graph log of commits reachable from `to` but not from `from`, newest first.
    fn commit_range_log(
        &self,
        path: &SubmodulePath,
        from: &Oid,
        to: &Revision,
    ) -> Result<String, GitError>;

    /// Number of commits reachable from `to` but not from `from`.
    fn commit_range_count(
        &self,
        path: &SubmodulePath,
        from: &Oid,
        to: &Revision,
    ) -> Result<usize, GitError>;

    /// Whether `rev` is known to the submodule's local history.
    fn branch_contains(&self, path: &SubmodulePath, rev: &Revision) -> Result<bool, GitError>;

    /// Stage the submodule pointer in the parent index.
    fn stage_path(&self, path: &SubmodulePath) -> Result<(), GitError>;

    /// Parent repository status entries.
    fn status_porcelain(&self) -> Result<Vec<StatusEntry>, GitError>;

    /// Create a commit in the parent repository.
    fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Human-readable description of the parent's latest commit.
    fn last_commit(&self) -> Result<String, GitError>;

    /// Push `branch` to `remote`, returning git's report.
    fn push(&self, remote: &str, branch: &BranchName) -> Result<String, GitError>;
}
