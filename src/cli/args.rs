//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `--parent-branch-name <name>`: Branch pushed after committing
//! - `--submodule <name> <sha> ...`: Desired commits (manual mode)
//! - `--auto`: Infer desired commits from checked-out submodules
//! - `--push`: Push the created commit
//! - `--no-push`: Skip the push even when configured
//! - `--remote <name>`: Remote to push to
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Warnings and errors only

use clap::Parser;
use std::path::PathBuf;

/// Commit updated submodule pointers in the parent repository
#[derive(Parser, Debug)]
#[command(name = "meta-update")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Commit whatever the submodules have checked out
    meta-update --auto

    # Move two submodules to given commits and push
    meta-update --submodule libA 1a2b3c4 libB 5d6e7f8 --push --parent-branch-name main")]
pub struct Cli {
    /// Branch pushed after committing [default: master]
    #[arg(long, value_name = "NAME")]
    pub parent_branch_name: Option<String>,

    /// Submodule name and commit pairs
    #[arg(long, value_name = "PAIRS", num_args = 1..)]
    pub submodule: Vec<String>,

    /// Detect new commits from the submodules' checkouts; ignores --submodule
    #[arg(long)]
    pub auto: bool,

    /// Push the created commit
    #[arg(long)]
    pub push: bool,

    /// Do not push, even if configured
    #[arg(long, conflicts_with = "push")]
    pub no_push: bool,

    /// Remote to push to [default: origin]
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Run as if meta-update was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
