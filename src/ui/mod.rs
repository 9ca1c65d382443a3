//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Tagged outcome lines and the [`output::Reporter`] sink
//!
//! # Design
//!
//! All user-facing output of a run goes through a [`output::Reporter`], so
//! the engine can be driven with a capturing reporter in tests.

pub mod output;

pub use output::{CaptureReporter, ConsoleReporter, Level, Reporter, Verbosity};
