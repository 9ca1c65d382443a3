//! engine::reconcile
//!
//! The submodule reconciler: discover, determine, validate, stage, commit.
//!
//! # Flow
//!
//! ```text
//! discover ─► auto: diff markers      ─┐
//!         └─► manual: CLI assignments ─┴─► forward-progress check
//!                                          ─► stage + compose ─► commit ─► push
//! ```
//!
//! # Failure policy
//!
//! Failures of a single submodule's git commands are reported and exclude
//! that submodule; the run continues with the rest. Only failed discovery
//! and an empty staging area stop the run early, and only a failed commit
//! or push is returned as an error.

use thiserror::Error;

use crate::core::message::CommitMessage;
use crate::core::record::{Rejection, RecordState, SubmoduleRecord};
use crate::core::types::{BranchName, Oid, Revision, SHORT_HASH_LEN};
use crate::git::{GitBackend, GitError};
use crate::ui::Reporter;

use super::modes::{Assignment, Mode};

const RECORD_SEPARATOR: &str = "--------------------";
const COMMIT_SEPARATOR: &str = "-----------------------------------";

/// Everything a run needs besides the repository.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// How desired commits are determined
    pub mode: Mode,
    /// Branch pushed after committing
    pub parent_branch: BranchName,
    /// Remote pushed to
    pub remote: String,
    /// Push after committing
    pub push: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No submodules could be listed; nothing was attempted.
    DiscoveryFailed,
    /// Nothing was staged, so no commit was created.
    NothingToCommit,
    /// A commit was created.
    Committed {
        /// Header line of the commit message
        header: String,
        /// Whether the commit was pushed
        pushed: bool,
    },
}

/// Outcome plus the final state of every record.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub records: Vec<SubmoduleRecord>,
}

/// Failures that end a run with an error.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to create commit: {0}")]
    Commit(#[source] GitError),

    #[error("failed to push to {remote} {branch}: {source}")]
    Push {
        remote: String,
        branch: String,
        #[source]
        source: GitError,
    },
}

/// What the working-tree diff says about a submodule pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerChange {
    /// No markers at all.
    None,
    /// Recorded and checked-out commit are the same (e.g. only dirty).
    Unchanged,
    /// Checked out a different commit.
    Moved { from: Oid, to: Oid },
    /// Any other number of markers.
    Unusable(usize),
}

impl PointerChange {
    /// Classify the markers of one submodule's diff.
    pub fn classify(markers: &[Oid]) -> Self {
        match markers {
            [] => PointerChange::None,
            [from, to] if from == to => PointerChange::Unchanged,
            [from, to] => PointerChange::Moved {
                from: from.clone(),
                to: to.clone(),
            },
            other => PointerChange::Unusable(other.len()),
        }
    }
}

/// Drives one run against a git backend.
pub struct Reconciler<'a> {
    git: &'a dyn GitBackend,
    reporter: &'a dyn Reporter,
}

impl<'a> Reconciler<'a> {
    pub fn new(git: &'a dyn GitBackend, reporter: &'a dyn Reporter) -> Self {
        Self { git, reporter }
    }

    /// Run the whole flow.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when creating or pushing the commit fails.
    pub fn run(&self, options: &RunOptions) -> Result<RunReport, ReconcileError> {
        let Some(mut records) = self.discover() else {
            return Ok(RunReport {
                outcome: RunOutcome::DiscoveryFailed,
                records: Vec::new(),
            });
        };

        match &options.mode {
            Mode::Auto => self.detect_auto(&mut records),
            Mode::Manual(assignments) => self.apply_manual(&mut records, assignments),
        }

        let message = self.stage_and_compose(&mut records);
        let outcome = self.commit_and_push(&message, options)?;

        Ok(RunReport { outcome, records })
    }

    /// List submodules and build one record per entry.
    ///
    /// Returns `None` (after reporting) when listing fails or finds nothing.
    pub fn discover(&self) -> Option<Vec<SubmoduleRecord>> {
        match self.git.list_submodules() {
            Ok(statuses) if !statuses.is_empty() => {
                tracing::debug!(count = statuses.len(), "discovered submodules");
                Some(statuses.into_iter().map(SubmoduleRecord::from).collect())
            }
            Ok(_) => {
                self.report_discovery_failure();
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "listing submodules failed");
                self.report_discovery_failure();
                None
            }
        }
    }

    fn report_discovery_failure(&self) {
        self.reporter
            .error("Failed to detect submodule(s). Are you in correct repository?");
    }

    /// Determine desired commits from checked-out submodules.
    pub fn detect_auto(&self, records: &mut [SubmoduleRecord]) {
        self.reporter.info("Working in auto mode");

        for record in records.iter_mut() {
            self.reporter.info(RECORD_SEPARATOR);

            if !self.ensure_usable(record) {
                continue;
            }

            let name = record.path.to_string();
            let markers = match self.git.diff_subproject_pointers(&record.path) {
                Ok(markers) => markers,
                Err(e) => {
                    tracing::debug!(submodule = %name, error = %e, "diff failed");
                    Vec::new()
                }
            };

            match PointerChange::classify(&markers) {
                PointerChange::None => {
                    self.reporter.info(&format!(
                        "No new commits or modifications detected in '{name}' submodule"
                    ));
                    record.mark_no_change();
                    continue;
                }
                PointerChange::Unchanged => {
                    self.reporter.info(&format!(
                        "Detected modifications, but no new commits in '{name}' submodule"
                    ));
                    record.mark_no_change();
                    continue;
                }
                PointerChange::Unusable(count) => {
                    self.reporter.warn(&format!(
                        "Unexpected diff for '{name}' submodule ({count} commit markers), skipping"
                    ));
                    record.mark_no_change();
                    continue;
                }
                PointerChange::Moved { from, to } => {
                    record.determine(Some(from), Revision::from(to));
                }
            }

            match self.ahead_count(record) {
                Ok(0) => {
                    self.reporter.warn(&format!(
                        "Chosen commit in {name} submodule is not ahead of current one"
                    ));
                    self.reporter.warn(&format!("Skipping submodule {name}"));
                    record.reject(Rejection::NotAhead);
                }
                Ok(_) => {
                    record.accept();
                }
                Err(e) => {
                    self.reporter.error(&format!(
                        "Cannot compare commits in '{name}' submodule: {e}"
                    ));
                    record.reject(Rejection::CountFailed(e.to_string()));
                }
            }
        }
    }

    /// Apply CLI assignments, then fetch, verify and check out each record.
    pub fn apply_manual(&self, records: &mut [SubmoduleRecord], assignments: &[Assignment]) {
        for assignment in assignments {
            let Some(record) = records
                .iter_mut()
                .find(|r| r.path.as_str() == assignment.name)
            else {
                tracing::debug!(submodule = %assignment.name, "no such submodule, ignoring");
                continue;
            };

            match Revision::new(assignment.commit.as_str()) {
                Ok(rev) => {
                    if record.determine(None, rev) {
                        self.reporter.info(&format!(
                            "Setting {} as new_commit for '{}' submodule",
                            assignment.commit, assignment.name
                        ));
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "rejected revision");
                    self.report_unknown_commit(&assignment.commit, &assignment.name);
                    record.reject(Rejection::UnknownCommit);
                }
            }
        }

        for record in records.iter_mut() {
            if !self.ensure_usable(record) {
                continue;
            }

            let name = record.path.to_string();
            if let Err(e) = self.git.fetch_all(&record.path) {
                self.reporter
                    .warn(&format!("Failed to fetch '{name}' submodule: {e}"));
            }

            let Some(desired) = record.desired.clone() else {
                record.mark_no_change();
                continue;
            };
            if record.state() != &RecordState::Determined {
                continue;
            }

            match self.git.branch_contains(&record.path, &desired) {
                Ok(true) => {}
                Ok(false) => {
                    self.report_unknown_commit(desired.as_str(), &name);
                    record.reject(Rejection::UnknownCommit);
                    continue;
                }
                Err(e) => {
                    tracing::debug!(submodule = %name, error = %e, "branch --contains failed");
                    self.report_unknown_commit(desired.as_str(), &name);
                    record.reject(Rejection::UnknownCommit);
                    continue;
                }
            }

            match self.ahead_count(record) {
                Ok(0) => {
                    self.reporter.error(&format!(
                        "Submodule '{name}' cannot be checked out to commit older than current one"
                    ));
                    record.reject(Rejection::NotAhead);
                }
                Ok(_) => match self.git.checkout(&record.path, &desired) {
                    Ok(()) => {
                        record.accept();
                    }
                    Err(e) => {
                        self.reporter.error(&format!(
                            "Failed to check out '{name}' submodule to {}: {e}",
                            desired.short()
                        ));
                        record.reject(Rejection::CheckoutFailed(e.to_string()));
                    }
                },
                Err(e) => {
                    self.reporter.error(&format!(
                        "Cannot compare commits in '{name}' submodule: {e}"
                    ));
                    record.reject(Rejection::CountFailed(e.to_string()));
                }
            }
        }
    }

    fn report_unknown_commit(&self, commit: &str, name: &str) {
        let short: String = commit.chars().take(SHORT_HASH_LEN).collect();
        self.reporter.error(&format!(
            "Commit {short} does not exist in '{name}' submodule"
        ));
    }

    /// Skip submodules git cannot operate in. Returns whether the record is usable.
    fn ensure_usable(&self, record: &mut SubmoduleRecord) -> bool {
        if record.flag.is_usable() {
            return true;
        }
        self.reporter.warn(&format!(
            "Submodule '{}' is not initialized, skipping",
            record.path
        ));
        if record.desired.is_some() {
            record.reject(Rejection::NotInitialized);
        } else {
            record.mark_no_change();
        }
        false
    }

    /// Commits the desired commit is ahead of the current one.
    fn ahead_count(&self, record: &SubmoduleRecord) -> Result<usize, GitError> {
        let Some(desired) = &record.desired else {
            return Ok(0);
        };
        if desired.is_same_commit(&record.current) {
            return Ok(0);
        }
        self.git
            .commit_range_count(&record.path, &record.current, desired)
    }

    /// Stage every valid record and compose the commit message.
    pub fn stage_and_compose(&self, records: &mut [SubmoduleRecord]) -> CommitMessage {
        let mut message = CommitMessage::new();

        for record in records.iter_mut().filter(|r| r.state() == &RecordState::Valid) {
            let Some(desired) = record.desired.clone() else {
                continue;
            };
            let name = record.path.to_string();

            if let Err(e) = self.git.stage_path(&record.path) {
                self.reporter
                    .error(&format!("Failed to stage '{name}' submodule: {e}"));
                record.reject(Rejection::StageFailed(e.to_string()));
                continue;
            }
            record.mark_staged();

            let log = self
                .git
                .commit_range_log(&record.path, &record.current, &desired)
                .unwrap_or_else(|e| {
                    self.reporter
                        .warn(&format!("Cannot read commit log of '{name}' submodule: {e}"));
                    String::new()
                });

            message.add_submodule(&name, desired.short(), &log);
        }

        message
    }

    /// Commit when something is staged, then push if requested.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the commit or the push fails.
    pub fn commit_and_push(
        &self,
        message: &CommitMessage,
        options: &RunOptions,
    ) -> Result<RunOutcome, ReconcileError> {
        if !self.check_stage() {
            self.reporter.warn("Nothing to commit!");
            return Ok(RunOutcome::NothingToCommit);
        }

        self.git
            .commit(&message.render())
            .map_err(ReconcileError::Commit)?;

        match self.git.last_commit() {
            Ok(summary) => self.reporter.info(&format!(
                "Commit created!\n{COMMIT_SEPARATOR}\n{}",
                summary.trim_end()
            )),
            Err(e) => {
                self.reporter.info("Commit created!");
                self.reporter
                    .warn(&format!("Cannot show created commit: {e}"));
            }
        }

        let mut pushed = false;
        if options.push {
            let output = self
                .git
                .push(&options.remote, &options.parent_branch)
                .map_err(|source| ReconcileError::Push {
                    remote: options.remote.clone(),
                    branch: options.parent_branch.to_string(),
                    source,
                })?;
            self.reporter.info(&format!(
                "Commit pushed to remote!\n{}",
                output.trim_end()
            ));
            pushed = true;
        }

        Ok(RunOutcome::Committed {
            header: message.header().to_string(),
            pushed,
        })
    }

    /// Whether the index holds staged modifications.
    fn check_stage(&self) -> bool {
        let entries = match self.git.status_porcelain() {
            Ok(entries) => entries,
            Err(e) => {
                self.reporter
                    .warn(&format!("Cannot read repository status: {e}"));
                Vec::new()
            }
        };

        let staged: Vec<String> = entries
            .iter()
            .filter(|e| e.is_staged_modification())
            .map(ToString::to_string)
            .collect();

        if staged.is_empty() {
            self.reporter.warn("Staging area empty!");
            return false;
        }

        self.reporter.info(&format!(
            "Files staged for commit: \n{}",
            staged.join("\n")
        ));
        true
    }
}
