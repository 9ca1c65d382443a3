//! engine::modes
//!
//! How desired submodule commits are determined for a run.
//!
//! - [`Mode::Auto`]: read from the submodules' current checkouts
//! - [`Mode::Manual`]: taken from `--submodule <name> <sha> ...` pairs
//!
//! # Example
//!
//! ```
//! use meta_update::engine::modes::Mode;
//!
//! let args: Vec<String> = ["libA", "abc1234", "libB"].iter().map(|s| s.to_string()).collect();
//! let resolved = Mode::resolve(false, &args);
//!
//! assert_eq!(resolved.unpaired.as_deref(), Some("libB"));
//! match resolved.mode {
//!     Mode::Manual(pairs) => assert_eq!(pairs[0].name, "libA"),
//!     Mode::Auto => unreachable!(),
//! }
//! ```

/// A desired commit given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Submodule name as typed
    pub name: String,
    /// Commit as typed
    pub commit: String,
}

/// Run mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Infer desired commits from checked-out submodules.
    Auto,
    /// Desired commits given explicitly, in command-line order.
    Manual(Vec<Assignment>),
}

/// Result of resolving the mode from flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMode {
    pub mode: Mode,
    /// Trailing `--submodule` value without a commit
    pub unpaired: Option<String>,
}

impl Mode {
    /// Resolve the mode from `--auto` and the `--submodule` values.
    ///
    /// `--auto` wins; the values are then ignored entirely.
    pub fn resolve(auto: bool, submodule_args: &[String]) -> ResolvedMode {
        if auto {
            return ResolvedMode {
                mode: Mode::Auto,
                unpaired: None,
            };
        }

        let chunks = submodule_args.chunks_exact(2);
        let unpaired = chunks.remainder().first().cloned();
        let pairs = chunks
            .map(|pair| Assignment {
                name: pair[0].clone(),
                commit: pair[1].clone(),
            })
            .collect();

        ResolvedMode {
            mode: Mode::Manual(pairs),
            unpaired,
        }
    }

    /// Check for auto mode.
    pub fn is_auto(&self) -> bool {
        matches!(self, Mode::Auto)
    }
}
