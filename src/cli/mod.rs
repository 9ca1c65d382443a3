//! cli
//!
//! Command-line interface layer for meta-update.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Set up diagnostic logging
//! - Open the repository and load configuration
//! - Resolve run options and hand off to the [`crate::engine`]
//!
//! # Architecture
//!
//! The CLI layer is thin. Flags override configuration, configuration
//! overrides built-in defaults, and everything after that is the engine's
//! business.

pub mod args;

pub use args::Cli;

use std::io::IsTerminal;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::core::types::BranchName;
use crate::engine::{self, Mode, Reconciler, RunOptions, RunOutcome};
use crate::git::{GitCli, GitError};
use crate::ui::{ConsoleReporter, Reporter, Verbosity};

const DISCOVERY_FAILED: &str = "Failed to detect submodule(s). Are you in correct repository?";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<RunOutcome> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };
    init_tracing(ctx.debug);

    let reporter = ConsoleReporter::new(Verbosity::from_flags(ctx.quiet, ctx.debug));
    execute(&cli, &ctx, &reporter)
}

/// Run with already parsed arguments.
pub fn execute(cli: &Cli, ctx: &engine::Context, reporter: &dyn Reporter) -> Result<RunOutcome> {
    let start = match &ctx.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let git = match GitCli::open(&start) {
        Ok(git) => git,
        Err(GitError::NotARepo { path }) => {
            tracing::debug!(path = %path.display(), "no repository found");
            reporter.error(DISCOVERY_FAILED);
            return Ok(RunOutcome::DiscoveryFailed);
        }
        // No work tree, so no submodules to find.
        Err(GitError::BareRepo) => {
            tracing::debug!(path = %start.display(), "bare repository");
            reporter.error(DISCOVERY_FAILED);
            return Ok(RunOutcome::DiscoveryFailed);
        }
        Err(e) => return Err(e).context("failed to open repository"),
    };

    let config =
        Config::load(Some(&git.info().git_dir)).context("failed to load configuration")?;
    for source in config.sources() {
        tracing::debug!(path = %source.display(), "loaded config");
    }

    let options = resolve_options(cli, &config, reporter)?;
    let report = Reconciler::new(&git, reporter).run(&options)?;
    Ok(report.outcome)
}

/// Combine flags and configuration into run options.
///
/// # Errors
///
/// Returns an error when the resulting branch name or remote is invalid.
pub fn resolve_options(cli: &Cli, config: &Config, reporter: &dyn Reporter) -> Result<RunOptions> {
    let resolved = Mode::resolve(cli.auto, &cli.submodule);
    if let Some(name) = &resolved.unpaired {
        reporter.warn(&format!("No commit given for '{name}' submodule, ignoring"));
    }

    let branch = cli
        .parent_branch_name
        .clone()
        .unwrap_or_else(|| config.parent_branch());
    let parent_branch = BranchName::new(branch).context("invalid parent branch name")?;

    let remote = cli.remote.clone().unwrap_or_else(|| config.remote());
    if remote.trim().is_empty() {
        anyhow::bail!("remote name cannot be empty");
    }

    Ok(RunOptions {
        mode: resolved.mode,
        parent_branch,
        remote,
        push: !cli.no_push && (cli.push || config.push()),
    })
}

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--debug` selects `debug`, else `warn`.
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be set when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
