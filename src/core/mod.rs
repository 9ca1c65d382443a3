//! core
//!
//! Core domain types and bookkeeping.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, Revision, SubmodulePath, BranchName
//! - [`record`] - Per-submodule record and its lifecycle
//! - [`message`] - Commit message composition
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing here talks to git; values come in already parsed

pub mod config;
pub mod message;
pub mod record;
pub mod types;
