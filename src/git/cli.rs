//! git::cli
//!
//! [`GitBackend`] backed by the `git` executable.
//!
//! The repository is located once with `git2` (so "not a repository" and
//! bare repositories are detected before any command runs); every operation
//! afterwards is a `git` invocation with an explicit argument vector and an
//! explicit working directory. Nothing is passed through a shell.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::core::types::{BranchName, Oid, Revision, SubmodulePath};

use super::interface::{GitBackend, GitError, StatusEntry, SubmoduleStatus};
use super::parse;

/// Format for submodule commit logs: short hash, subject, author name.
const LOG_FORMAT: &str = "format: %h  - %s (%aN)";

/// Information about the parent repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to the git directory
    pub git_dir: PathBuf,
    /// Path to the work tree root
    pub work_dir: PathBuf,
}

/// The real git backend.
#[derive(Debug, Clone)]
pub struct GitCli {
    info: RepoInfo,
    program: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`.
    ///
    /// `path` can be any directory inside the work tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        let work_dir = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();
        let info = RepoInfo {
            git_dir: repo.path().to_path_buf(),
            work_dir,
        };

        tracing::debug!(
            work_dir = %info.work_dir.display(),
            git_dir = %info.git_dir.display(),
            "opened repository"
        );

        Ok(Self {
            info,
            program: PathBuf::from("git"),
        })
    }

    /// Use a different git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Repository paths.
    pub fn info(&self) -> &RepoInfo {
        &self.info
    }

    fn submodule_dir(&self, path: &SubmodulePath) -> PathBuf {
        self.info.work_dir.join(path.as_str())
    }

    /// Run git in `dir`, returning the raw output regardless of exit status.
    fn output(&self, dir: &Path, args: &[&str]) -> Result<Output, GitError> {
        let command = describe(args);
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| GitError::Spawn {
                command: command.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            command = %command,
            dir = %dir.display(),
            status = %output.status,
            "ran git"
        );

        Ok(output)
    }

    /// Run git in `dir` and return stdout, failing on non-zero exit.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(dir, args)?;
        if !output.status.success() {
            return Err(failure(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_parent(&self, args: &[&str]) -> Result<String, GitError> {
        self.run(&self.info.work_dir, args)
    }

    fn run_submodule(&self, path: &SubmodulePath, args: &[&str]) -> Result<String, GitError> {
        self.run(&self.submodule_dir(path), args)
    }
}

fn describe(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn failure(args: &[&str], output: &Output) -> GitError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stderr = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };
    GitError::CommandFailed {
        command: describe(args),
        status: output.status.to_string(),
        stderr,
    }
}

fn range(from: &Oid, to: &Revision) -> String {
    format!("{from}..{to}")
}

impl GitBackend for GitCli {
    fn list_submodules(&self) -> Result<Vec<SubmoduleStatus>, GitError> {
        let args = ["submodule", "status", "--cached"];
        let output = self.run_parent(&args)?;
        parse::parse_submodule_status(&output).map_err(|message| GitError::Parse {
            command: describe(&args),
            message,
        })
    }

    fn fetch_all(&self, path: &SubmodulePath) -> Result<(), GitError> {
        self.run_submodule(path, &["fetch", "--all"]).map(|_| ())
    }

    fn checkout(&self, path: &SubmodulePath, rev: &Revision) -> Result<(), GitError> {
        self.run_submodule(path, &["checkout", "--quiet", rev.as_str()])
            .map(|_| ())
    }

    fn diff_subproject_pointers(&self, path: &SubmodulePath) -> Result<Vec<Oid>, GitError> {
        let output = self.run_parent(&[
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--submodule=short",
            "--",
            path.as_str(),
        ])?;
        Ok(parse::parse_subproject_markers(&output))
    }

    fn commit_range_log(
        &self,
        path: &SubmodulePath,
        from: &Oid,
        to: &Revision,
    ) -> Result<String, GitError> {
        let pretty = format!("--pretty={LOG_FORMAT}");
        self.run_submodule(
            path,
            &[
                "--no-pager",
                "log",
                "--graph",
                "--no-color",
                &pretty,
                &range(from, to),
            ],
        )
    }

    fn commit_range_count(
        &self,
        path: &SubmodulePath,
        from: &Oid,
        to: &Revision,
    ) -> Result<usize, GitError> {
        let range = range(from, to);
        let args = ["rev-list", "--count", range.as_str()];
        let output = self.run_submodule(path, &args)?;
        parse::parse_count(&output).map_err(|message| GitError::Parse {
            command: describe(&args),
            message,
        })
    }

    fn branch_contains(&self, path: &SubmodulePath, rev: &Revision) -> Result<bool, GitError> {
        let output = self.output(
            &self.submodule_dir(path),
            &["branch", "--contains", rev.as_str()],
        )?;
        Ok(output.status.success())
    }

    fn stage_path(&self, path: &SubmodulePath) -> Result<(), GitError> {
        self.run_parent(&["add", "--", path.as_str()]).map(|_| ())
    }

    fn status_porcelain(&self) -> Result<Vec<StatusEntry>, GitError> {
        let args = ["status", "--porcelain"];
        let output = self.run_parent(&args)?;
        parse::parse_porcelain(&output).map_err(|message| GitError::Parse {
            command: describe(&args),
            message,
        })
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run_parent(&["commit", "--quiet", "-m", message])
            .map(|_| ())
    }

    fn last_commit(&self) -> Result<String, GitError> {
        self.run_parent(&["--no-pager", "log", "-n", "1", "--no-color"])
    }

    fn push(&self, remote: &str, branch: &BranchName) -> Result<String, GitError> {
        let args = ["push", remote, branch.as_str()];
        let output = self.output(&self.info.work_dir, &args)?;
        if !output.status.success() {
            return Err(failure(&args, &output));
        }
        // git reports push progress on stderr
        let mut report = String::from_utf8_lossy(&output.stdout).into_owned();
        report.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(report)
    }
}
