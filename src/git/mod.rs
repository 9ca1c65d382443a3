//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. The reconciler talks to the
//! [`GitBackend`] trait; no other module spawns processes or imports `git2`.
//!
//! - [`interface`] - The capability trait, error type and status values
//! - [`cli`] - Implementation against the `git` executable
//! - [`parse`] - Parsers for git's textual output
//! - [`fake`] - In-memory implementation for tests
//!
//! # Example
//!
//! ```ignore
//! use meta_update::git::{GitBackend, GitCli};
//! use std::path::Path;
//!
//! let git = GitCli::open(Path::new("."))?;
//! for status in git.list_submodules()? {
//!     println!("{} at {}", status.path, status.commit.short(7));
//! }
//! ```

pub mod cli;
pub mod fake;
pub mod interface;
pub mod parse;

pub use cli::{GitCli, RepoInfo};
pub use interface::{GitBackend, GitError, StatusEntry, StatusFlag, SubmoduleStatus};
