//! git::fake
//!
//! In-memory [`GitBackend`] for deterministic testing.
//!
//! # Design
//!
//! Each fake submodule has a linear history (oldest first) and a recorded
//! commit. Range counts and logs are computed from positions in that
//! history, so "ahead", "behind" and "unknown commit" all behave like the
//! real thing without a repository on disk. Every call is recorded, and any
//! operation can be made to fail.
//!
//! # Example
//!
//! ```
//! use meta_update::core::types::{Oid, Revision, SubmodulePath};
//! use meta_update::git::fake::FakeGit;
//! use meta_update::git::GitBackend;
//!
//! let git = FakeGit::new().with_submodule("libA", &["abc123", "bcd234", "def456"]);
//! let path = SubmodulePath::new("libA").unwrap();
//! let from = Oid::new("abc123").unwrap();
//! let to = Revision::new("def456").unwrap();
//!
//! assert_eq!(git.commit_range_count(&path, &from, &to).unwrap(), 2);
//! assert!(!git.branch_contains(&path, &Revision::new("zzz999").unwrap()).unwrap());
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::types::{BranchName, Oid, Revision, SubmodulePath};

use super::interface::{GitBackend, GitError, StatusEntry, StatusFlag, SubmoduleStatus};

/// Author name used for every fake commit.
pub const FAKE_AUTHOR: &str = "Fake Author";

/// Fake git backend.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeGit {
    inner: Arc<Mutex<FakeGitInner>>,
}

#[derive(Debug, Default)]
struct FakeGitInner {
    /// Submodules in discovery order.
    submodules: Vec<FakeSubmodule>,
    /// Paths staged through `stage_path`.
    staged: BTreeSet<String>,
    /// Additional porcelain entries reported by `status_porcelain`.
    extra_status: Vec<StatusEntry>,
    /// Messages of created commits.
    commits: Vec<String>,
    /// Operations to fail.
    fail_on: Vec<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<FakeOperation>,
}

#[derive(Debug)]
struct FakeSubmodule {
    path: SubmodulePath,
    recorded: Oid,
    flag: StatusFlag,
    history: Vec<Oid>,
    subjects: HashMap<Oid, String>,
    checked_out: Oid,
    markers: Option<Vec<Oid>>,
}

impl FakeSubmodule {
    fn position(&self, rev: &str) -> Option<usize> {
        if rev.len() < 4 {
            return None;
        }
        let rev = rev.to_ascii_lowercase();
        self.history
            .iter()
            .position(|oid| oid.as_str().starts_with(&rev))
    }
}

/// Operation that should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    ListSubmodules,
    Fetch(String),
    Checkout(String),
    Diff(String),
    Log(String),
    Count(String),
    Stage(String),
    Status,
    Commit,
    LastCommit,
    Push,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeOperation {
    ListSubmodules,
    Fetch { path: String },
    Checkout { path: String, rev: String },
    Diff { path: String },
    Log { path: String, from: String, to: String },
    Count { path: String, from: String, to: String },
    BranchContains { path: String, rev: String },
    Stage { path: String },
    Status,
    Commit { message: String },
    LastCommit,
    Push { remote: String, branch: String },
}

fn oid(value: &str) -> Oid {
    Oid::new(value).unwrap_or_else(|e| panic!("fake history needs hex commit ids: {e}"))
}

fn injected(operation: &str) -> GitError {
    GitError::CommandFailed {
        command: format!("git {operation}"),
        status: "exit status: 1".into(),
        stderr: "injected failure".into(),
    }
}

impl FakeGit {
    /// Create an empty fake repository (no submodules).
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeGitInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a submodule whose history is `history` (oldest first).
    ///
    /// The parent records, and the work tree has checked out, the first commit.
    /// Without explicit markers its diff is empty.
    ///
    /// # Panics
    ///
    /// Panics when `history` is empty or holds a non-hex id, or when `path`
    /// is not a valid submodule path.
    #[must_use]
    pub fn with_submodule(self, path: &str, history: &[&str]) -> Self {
        let history: Vec<Oid> = history.iter().map(|h| oid(h)).collect();
        let first = history
            .first()
            .cloned()
            .unwrap_or_else(|| panic!("submodule '{path}' needs at least one commit"));
        let path = SubmodulePath::new(path)
            .unwrap_or_else(|e| panic!("invalid fake submodule path: {e}"));

        self.lock().submodules.push(FakeSubmodule {
            path,
            recorded: first.clone(),
            flag: StatusFlag::InSync,
            history,
            subjects: HashMap::new(),
            checked_out: first,
            markers: None,
        });
        self
    }

    fn with_entry<T>(&self, path: &str, f: impl FnOnce(&mut FakeSubmodule) -> T) -> T {
        let mut inner = self.lock();
        let sub = inner
            .submodules
            .iter_mut()
            .find(|s| s.path.as_str() == path)
            .unwrap_or_else(|| panic!("no fake submodule '{path}'"));
        f(sub)
    }

    /// Change the commit the parent records for `path`.
    ///
    /// Like every setter below, panics for a submodule that was never added.
    pub fn set_recorded(&self, path: &str, commit: &str) {
        self.with_entry(path, |s| s.recorded = oid(commit));
    }

    /// Change the status flag reported for `path`.
    pub fn set_flag(&self, path: &str, flag: StatusFlag) {
        self.with_entry(path, |s| s.flag = flag);
    }

    /// Make the working-tree diff for `path` contain these markers.
    pub fn set_diff_markers(&self, path: &str, markers: &[&str]) {
        self.with_entry(path, |s| {
            s.markers = Some(markers.iter().map(|m| oid(m)).collect());
        });
    }

    /// Set the subject line of a commit in `path`'s history.
    pub fn set_subject(&self, path: &str, commit: &str, subject: &str) {
        self.with_entry(path, |s| {
            s.subjects.insert(oid(commit), subject.to_string());
        });
    }

    /// Report an extra `git status --porcelain` entry.
    pub fn add_status_entry(&self, index: char, worktree: char, path: &str) {
        self.lock().extra_status.push(StatusEntry {
            index,
            worktree,
            path: path.to_string(),
        });
    }

    /// Make an operation fail.
    pub fn fail_on(&self, fail: FailOn) {
        self.lock().fail_on.push(fail);
    }

    /// All recorded operations, in call order.
    pub fn operations(&self) -> Vec<FakeOperation> {
        self.lock().operations.clone()
    }

    /// Messages of all created commits.
    pub fn commits(&self) -> Vec<String> {
        self.lock().commits.clone()
    }

    /// Paths staged so far.
    pub fn staged(&self) -> Vec<String> {
        self.lock().staged.iter().cloned().collect()
    }

    /// The commit currently checked out in `path`.
    pub fn checked_out(&self, path: &str) -> String {
        self.with_entry(path, |s| s.checked_out.to_string())
    }

    /// Checkouts attempted, as `(path, rev)`.
    pub fn checkouts(&self) -> Vec<(String, String)> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                FakeOperation::Checkout { path, rev } => Some((path.clone(), rev.clone())),
                _ => None,
            })
            .collect()
    }

    /// Pushes performed, as `(remote, branch)`.
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                FakeOperation::Push { remote, branch } => Some((remote.clone(), branch.clone())),
                _ => None,
            })
            .collect()
    }

    /// Record `op` and report whether `fail` was injected.
    fn record(&self, op: FakeOperation, fail: Option<FailOn>) -> bool {
        let mut inner = self.lock();
        inner.operations.push(op);
        fail.is_some_and(|f| inner.fail_on.contains(&f))
    }

    /// Resolve a range inside a submodule to history positions.
    fn positions(
        &self,
        path: &SubmodulePath,
        from: &Oid,
        to: &Revision,
    ) -> Result<(usize, usize), GitError> {
        self.with_entry(path.as_str(), |s| {
            let start = s.position(from.as_str());
            let end = s.position(to.as_str());
            match (start, end) {
                (Some(start), Some(end)) => Ok((start, end)),
                _ => Err(GitError::CommandFailed {
                    command: format!("git rev-list {from}..{to}"),
                    status: "exit status: 128".into(),
                    stderr: format!("fatal: bad revision '{from}..{to}'"),
                }),
            }
        })
    }
}

impl GitBackend for FakeGit {
    fn list_submodules(&self) -> Result<Vec<SubmoduleStatus>, GitError> {
        if self.record(FakeOperation::ListSubmodules, Some(FailOn::ListSubmodules)) {
            return Err(injected("submodule status"));
        }
        Ok(self
            .lock()
            .submodules
            .iter()
            .map(|s| SubmoduleStatus {
                path: s.path.clone(),
                commit: s.recorded.clone(),
                flag: s.flag,
            })
            .collect())
    }

    fn fetch_all(&self, path: &SubmodulePath) -> Result<(), GitError> {
        let op = FakeOperation::Fetch {
            path: path.to_string(),
        };
        if self.record(op, Some(FailOn::Fetch(path.to_string()))) {
            return Err(injected("fetch --all"));
        }
        Ok(())
    }

    fn checkout(&self, path: &SubmodulePath, rev: &Revision) -> Result<(), GitError> {
        let op = FakeOperation::Checkout {
            path: path.to_string(),
            rev: rev.to_string(),
        };
        if self.record(op, Some(FailOn::Checkout(path.to_string()))) {
            return Err(injected("checkout"));
        }
        self.with_entry(path.as_str(), |s| match s.position(rev.as_str()) {
            Some(index) => {
                s.checked_out = s.history[index].clone();
                Ok(())
            }
            None => Err(GitError::CommandFailed {
                command: format!("git checkout {rev}"),
                status: "exit status: 1".into(),
                stderr: format!("error: pathspec '{rev}' did not match"),
            }),
        })
    }

    fn diff_subproject_pointers(&self, path: &SubmodulePath) -> Result<Vec<Oid>, GitError> {
        let op = FakeOperation::Diff {
            path: path.to_string(),
        };
        if self.record(op, Some(FailOn::Diff(path.to_string()))) {
            return Err(injected("diff"));
        }
        Ok(self.with_entry(path.as_str(), |s| s.markers.clone().unwrap_or_default()))
    }

    fn commit_range_log(
        &self,
        path: &SubmodulePath,
        from: &Oid,
        to: &Revision,
    ) -> Result<String, GitError> {
        let op = FakeOperation::Log {
            path: path.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        };
        if self.record(op, Some(FailOn::Log(path.to_string()))) {
            return Err(injected("log"));
        }
        let (start, end) = self.positions(path, from, to)?;
        Ok(self.with_entry(path.as_str(), |s| {
            if end <= start {
                return String::new();
            }
            s.history[start + 1..=end]
                .iter()
                .rev()
                .map(|commit| {
                    let subject = s
                        .subjects
                        .get(commit)
                        .cloned()
                        .unwrap_or_else(|| format!("commit {}", commit.short(7)));
                    format!("*  {}  - {} ({})", commit.short(7), subject, FAKE_AUTHOR)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }))
    }

    fn commit_range_count(
        &self,
        path: &SubmodulePath,
        from: &Oid,
        to: &Revision,
    ) -> Result<usize, GitError> {
        let op = FakeOperation::Count {
            path: path.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        };
        if self.record(op, Some(FailOn::Count(path.to_string()))) {
            return Err(injected("rev-list --count"));
        }
        let (start, end) = self.positions(path, from, to)?;
        Ok(end.saturating_sub(start))
    }

    fn branch_contains(&self, path: &SubmodulePath, rev: &Revision) -> Result<bool, GitError> {
        let op = FakeOperation::BranchContains {
            path: path.to_string(),
            rev: rev.to_string(),
        };
        self.record(op, None);
        Ok(self.with_entry(path.as_str(), |s| s.position(rev.as_str()).is_some()))
    }

    fn stage_path(&self, path: &SubmodulePath) -> Result<(), GitError> {
        let op = FakeOperation::Stage {
            path: path.to_string(),
        };
        if self.record(op, Some(FailOn::Stage(path.to_string()))) {
            return Err(injected("add"));
        }
        self.lock().staged.insert(path.to_string());
        Ok(())
    }

    fn status_porcelain(&self) -> Result<Vec<StatusEntry>, GitError> {
        if self.record(FakeOperation::Status, Some(FailOn::Status)) {
            return Err(injected("status --porcelain"));
        }
        let inner = self.lock();
        let mut entries: Vec<StatusEntry> = inner
            .staged
            .iter()
            .map(|path| StatusEntry {
                index: 'M',
                worktree: ' ',
                path: path.clone(),
            })
            .collect();
        entries.extend(inner.extra_status.iter().cloned());
        Ok(entries)
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        let op = FakeOperation::Commit {
            message: message.to_string(),
        };
        if self.record(op, Some(FailOn::Commit)) {
            return Err(injected("commit"));
        }
        let mut inner = self.lock();
        inner.commits.push(message.to_string());
        inner.staged.clear();
        Ok(())
    }

    fn last_commit(&self) -> Result<String, GitError> {
        if self.record(FakeOperation::LastCommit, Some(FailOn::LastCommit)) {
            return Err(injected("log -n 1"));
        }
        let inner = self.lock();
        let message = inner.commits.last().cloned().unwrap_or_default();
        let count = inner.commits.len();
        Ok(format!(
            "commit {count:040x}\nAuthor: {FAKE_AUTHOR}\n\n    {}",
            message.lines().next().unwrap_or_default()
        ))
    }

    fn push(&self, remote: &str, branch: &BranchName) -> Result<String, GitError> {
        let op = FakeOperation::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
        };
        if self.record(op, Some(FailOn::Push)) {
            return Err(injected("push"));
        }
        Ok(format!("To {remote}\n   {branch} -> {branch}\n"))
    }
}
