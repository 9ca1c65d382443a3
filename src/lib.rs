//! meta-update - Commit updated submodule pointers in a parent repository
//!
//! meta-update moves the submodules of a parent repository forward, either to
//! commits named on the command line or to whatever each submodule has
//! checked out, and records the move as one commit whose message lists the
//! new commits of every submodule.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Discover → Determine → Validate → Stage → Commit
//! - [`core`] - Domain types, records, commit message, configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. A submodule pointer only ever moves forward
//! 2. A commit is created only when something is staged
//! 3. Only [`git`] runs git or opens repositories

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
