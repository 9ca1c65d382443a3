//! core::record
//!
//! Per-submodule bookkeeping for one run.
//!
//! # Lifecycle
//!
//! ```text
//! Discovered ──► NoChange                      (terminal)
//!      │
//!      └──► Determined ──► Valid ──► Staged    (terminal)
//!                 │
//!                 └──► Invalid(rejection)      (terminal)
//! ```
//!
//! Transition methods return `false` and leave the record untouched when
//! called from a state that does not allow them.

use std::fmt;

use crate::core::types::{Oid, Revision, SubmodulePath};
use crate::git::{StatusFlag, SubmoduleStatus};

/// Why a record was excluded from the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Desired commit is not ahead of the recorded one.
    NotAhead,
    /// Desired commit is not in the submodule's local history.
    UnknownCommit,
    /// The ahead-count could not be computed.
    CountFailed(String),
    /// Checking out the desired commit failed.
    CheckoutFailed(String),
    /// Staging the submodule pointer failed.
    StageFailed(String),
    /// Submodule has no usable work tree (uninitialized or conflicted).
    NotInitialized,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAhead => write!(f, "not ahead of current commit"),
            Rejection::UnknownCommit => write!(f, "commit does not exist"),
            Rejection::CountFailed(e) => write!(f, "cannot count commits: {e}"),
            Rejection::CheckoutFailed(e) => write!(f, "checkout failed: {e}"),
            Rejection::StageFailed(e) => write!(f, "staging failed: {e}"),
            Rejection::NotInitialized => write!(f, "submodule not initialized"),
        }
    }
}

/// Where a record is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    Discovered,
    NoChange,
    Determined,
    Valid,
    Invalid(Rejection),
    Staged,
}

impl RecordState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RecordState::NoChange | RecordState::Invalid(_) | RecordState::Staged
        )
    }
}

/// One submodule of the parent repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleRecord {
    /// Path and user-facing name
    pub path: SubmodulePath,
    /// Commit the parent records
    pub current: Oid,
    /// Commit to advance to, once determined
    pub desired: Option<Revision>,
    /// Checkout state at discovery
    pub flag: StatusFlag,
    state: RecordState,
}

impl SubmoduleRecord {
    /// Create a freshly discovered record.
    pub fn new(path: SubmodulePath, current: Oid, flag: StatusFlag) -> Self {
        Self {
            path,
            current,
            desired: None,
            flag,
            state: RecordState::Discovered,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &RecordState {
        &self.state
    }

    /// Whether the record passed validation (and may already be staged).
    pub fn is_valid(&self) -> bool {
        matches!(self.state, RecordState::Valid | RecordState::Staged)
    }

    /// No usable change was found.
    pub fn mark_no_change(&mut self) -> bool {
        self.transition(&[RecordState::Discovered], RecordState::NoChange)
    }

    /// Set the desired commit, optionally replacing the current one.
    ///
    /// A desired commit may be re-assigned while the record is still
    /// `Determined` (the last assignment wins).
    pub fn determine(&mut self, current: Option<Oid>, desired: Revision) -> bool {
        if !matches!(self.state, RecordState::Discovered | RecordState::Determined) {
            return false;
        }
        if let Some(current) = current {
            self.current = current;
        }
        self.desired = Some(desired);
        self.state = RecordState::Determined;
        true
    }

    /// The transition passed validation.
    pub fn accept(&mut self) -> bool {
        self.transition(&[RecordState::Determined], RecordState::Valid)
    }

    /// Exclude the record from the commit.
    pub fn reject(&mut self, rejection: Rejection) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = RecordState::Invalid(rejection);
        true
    }

    /// The submodule pointer was added to the index.
    pub fn mark_staged(&mut self) -> bool {
        self.transition(&[RecordState::Valid], RecordState::Staged)
    }

    fn transition(&mut self, from: &[RecordState], to: RecordState) -> bool {
        if from.contains(&self.state) {
            self.state = to;
            true
        } else {
            false
        }
    }
}

impl From<SubmoduleStatus> for SubmoduleRecord {
    fn from(status: SubmoduleStatus) -> Self {
        Self::new(status.path, status.commit, status.flag)
    }
}
