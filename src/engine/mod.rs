//! engine
//!
//! Orchestrates a run: Discover -> Determine -> Validate -> Stage -> Commit.
//!
//! # Architecture
//!
//! The engine owns the per-submodule bookkeeping and every decision about
//! which submodules make it into the commit. It talks to the repository only
//! through [`crate::git::GitBackend`] and to the user only through
//! [`crate::ui::Reporter`], so a run can be driven end to end against
//! [`crate::git::fake::FakeGit`].
//!
//! # Invariants
//!
//! - A submodule is staged only after its desired commit was shown to be
//!   ahead of the current one
//! - A commit is created only when the index holds staged modifications
//! - Per-submodule failures never abort the run
//!
//! # Example
//!
//! ```
//! use meta_update::core::types::BranchName;
//! use meta_update::engine::modes::Mode;
//! use meta_update::engine::{Reconciler, RunOptions, RunOutcome};
//! use meta_update::git::fake::FakeGit;
//! use meta_update::ui::CaptureReporter;
//!
//! let git = FakeGit::new().with_submodule("libA", &["abc123", "bcd234", "def456"]);
//! git.set_diff_markers("libA", &["abc123", "def456"]);
//! let reporter = CaptureReporter::new();
//!
//! let options = RunOptions {
//!     mode: Mode::Auto,
//!     parent_branch: BranchName::new("master").unwrap(),
//!     remote: "origin".into(),
//!     push: false,
//! };
//! let report = Reconciler::new(&git, &reporter).run(&options).unwrap();
//!
//! assert_eq!(
//!     report.outcome,
//!     RunOutcome::Committed {
//!         header: "Updated submodules: libA -> ( def456 ) ".into(),
//!         pushed: false,
//!     }
//! );
//! ```

pub mod modes;
pub mod reconcile;

pub use modes::{Assignment, Mode, ResolvedMode};
pub use reconcile::{
    PointerChange, ReconcileError, Reconciler, RunOptions, RunOutcome, RunReport,
};

use std::path::PathBuf;

/// Execution context derived from global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (warnings and errors only).
    pub quiet: bool,
}
