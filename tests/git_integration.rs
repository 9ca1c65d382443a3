//! Integration tests for the git backend.
//!
//! These tests use real git repositories created via tempfile: a parent
//! repository with one submodule cloned from a local upstream.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use meta_update::core::types::{BranchName, Oid, Revision, SubmodulePath};
use meta_update::engine::modes::{Assignment, Mode};
use meta_update::engine::{Reconciler, RunOptions, RunOutcome};
use meta_update::git::{GitBackend, GitCli, GitError, StatusFlag};
use meta_update::ui::CaptureReporter;

/// A parent repository with submodule `libA`.
struct TestRepos {
    dir: TempDir,
}

impl TestRepos {
    /// Create `upstream` (two commits) and `parent` with `libA` added from it.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let upstream = dir.path().join("upstream");
        let parent = dir.path().join("parent");

        init_repo(&upstream);
        commit_file(&upstream, "lib.txt", "one\n", "First lib commit");

        init_repo(&parent);
        commit_file(&parent, "README.md", "# Parent\n", "Initial commit");
        run_git(
            &parent,
            &[
                "-c",
                "protocol.file.allow=always",
                "submodule",
                "add",
                upstream.to_str().unwrap(),
                "libA",
            ],
        );
        run_git(&parent, &["commit", "-m", "Add libA"]);

        let repos = Self { dir };
        configure_identity(&repos.submodule());
        repos
    }

    fn parent(&self) -> PathBuf {
        self.dir.path().join("parent")
    }

    fn submodule(&self) -> PathBuf {
        self.parent().join("libA")
    }

    fn git(&self) -> GitCli {
        GitCli::open(&self.parent()).expect("failed to open parent")
    }

    /// Commit inside the submodule work tree, returning the new HEAD.
    fn advance_submodule(&self, content: &str, message: &str) -> String {
        commit_file(&self.submodule(), "lib.txt", content, message);
        head(&self.submodule())
    }

    /// Create a bare repository and register it as the parent's `origin`.
    fn add_remote(&self) -> PathBuf {
        let remote = self.dir.path().join("remote.git");
        run_git(self.dir.path(), &["init", "--bare", "-q", remote.to_str().unwrap()]);
        run_git(
            &self.parent(),
            &["remote", "add", "origin", remote.to_str().unwrap()],
        );
        remote
    }
}

fn lib_a() -> SubmodulePath {
    SubmodulePath::new("libA").unwrap()
}

fn init_repo(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    run_git(dir, &["init", "-q", "-b", "master"]);
    configure_identity(dir);
}

fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
}

fn commit_file(dir: &Path, path: &str, content: &str, message: &str) {
    std::fs::write(dir.join(path), content).unwrap();
    run_git(dir, &["add", path]);
    run_git(dir, &["commit", "-q", "-m", message]);
}

fn head(dir: &Path) -> String {
    git_stdout(dir, &["rev-parse", "HEAD"])
}

fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn options(mode: Mode) -> RunOptions {
    RunOptions {
        mode,
        parent_branch: BranchName::new("master").unwrap(),
        remote: "origin".into(),
        push: false,
    }
}

// =============================================================================
// Repository Opening Tests
// =============================================================================

#[test]
fn open_from_subdirectory() {
    let repos = TestRepos::new();
    let subdir = repos.parent().join("docs");
    std::fs::create_dir(&subdir).unwrap();

    let git = GitCli::open(&subdir).unwrap();
    assert_eq!(
        git.info().work_dir.canonicalize().unwrap(),
        repos.parent().canonicalize().unwrap()
    );
}

#[test]
fn open_non_repository_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        GitCli::open(dir.path()),
        Err(GitError::NotARepo { .. })
    ));
}

#[test]
fn open_bare_repository_fails() {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init", "--bare", "-q"]);
    assert!(matches!(GitCli::open(dir.path()), Err(GitError::BareRepo)));
}

// =============================================================================
// Backend Operations
// =============================================================================

#[test]
fn lists_submodule_with_recorded_commit() {
    let repos = TestRepos::new();
    let recorded = head(&repos.submodule());

    let submodules = repos.git().list_submodules().unwrap();

    assert_eq!(submodules.len(), 1);
    assert_eq!(submodules[0].path, lib_a());
    assert_eq!(submodules[0].commit.as_str(), recorded);
    assert_eq!(submodules[0].flag, StatusFlag::InSync);
}

#[test]
fn moved_checkout_changes_flag_but_not_recorded_commit() {
    let repos = TestRepos::new();
    let recorded = head(&repos.submodule());
    repos.advance_submodule("two\n", "Second lib commit");

    let submodules = repos.git().list_submodules().unwrap();

    assert_eq!(submodules[0].commit.as_str(), recorded);
    assert_eq!(submodules[0].flag, StatusFlag::OutOfSync);
}

#[test]
fn diff_reports_old_and_new_pointer() {
    let repos = TestRepos::new();
    let old = head(&repos.submodule());
    let new = repos.advance_submodule("two\n", "Second lib commit");

    let markers = repos.git().diff_subproject_pointers(&lib_a()).unwrap();

    assert_eq!(markers, vec![Oid::new(old).unwrap(), Oid::new(new).unwrap()]);
}

#[test]
fn diff_ignores_user_submodule_format() {
    let repos = TestRepos::new();
    repos.advance_submodule("two\n", "Second lib commit");
    run_git(&repos.parent(), &["config", "diff.submodule", "log"]);

    let markers = repos.git().diff_subproject_pointers(&lib_a()).unwrap();

    assert_eq!(markers.len(), 2);
}

#[test]
fn diff_empty_when_unchanged() {
    let repos = TestRepos::new();
    let markers = repos.git().diff_subproject_pointers(&lib_a()).unwrap();
    assert!(markers.is_empty());
}

#[test]
fn range_count_and_log() {
    let repos = TestRepos::new();
    let old = Oid::new(head(&repos.submodule())).unwrap();
    repos.advance_submodule("two\n", "Second lib commit");
    let new = repos.advance_submodule("three\n", "Say \"three\"");
    let to = Revision::new(new.as_str()).unwrap();
    let git = repos.git();

    assert_eq!(git.commit_range_count(&lib_a(), &old, &to).unwrap(), 2);

    let log = git.commit_range_log(&lib_a(), &old, &to).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&format!("*  {}  - Say \"three\" (Test User)", &new[..7])));
    assert!(lines[1].ends_with("- Second lib commit (Test User)"));
}

#[test]
fn backwards_range_counts_zero() {
    let repos = TestRepos::new();
    let old = head(&repos.submodule());
    let new = Oid::new(repos.advance_submodule("two\n", "Second lib commit")).unwrap();

    let count = repos
        .git()
        .commit_range_count(&lib_a(), &new, &Revision::new(old).unwrap())
        .unwrap();

    assert_eq!(count, 0);
}

#[test]
fn branch_contains_known_and_unknown() {
    let repos = TestRepos::new();
    let known = Revision::new(head(&repos.submodule())).unwrap();
    let unknown = Revision::new("0123456789abcdef0123456789abcdef01234567").unwrap();
    let git = repos.git();

    assert!(git.branch_contains(&lib_a(), &known).unwrap());
    assert!(!git.branch_contains(&lib_a(), &unknown).unwrap());
}

#[test]
fn stage_and_porcelain_status() {
    let repos = TestRepos::new();
    repos.advance_submodule("two\n", "Second lib commit");
    let git = repos.git();

    git.stage_path(&lib_a()).unwrap();
    let entries = git.status_porcelain().unwrap();

    let entry = entries.iter().find(|e| e.path == "libA").unwrap();
    assert!(entry.is_staged_modification());
}

#[test]
fn checkout_moves_submodule_work_tree() {
    let repos = TestRepos::new();
    let old = head(&repos.submodule());
    repos.advance_submodule("two\n", "Second lib commit");

    repos
        .git()
        .checkout(&lib_a(), &Revision::new(old.as_str()).unwrap())
        .unwrap();

    assert_eq!(head(&repos.submodule()), old);
}

#[test]
fn checkout_unknown_commit_fails() {
    let repos = TestRepos::new();
    let result = repos
        .git()
        .checkout(&lib_a(), &Revision::new("0123456789abcdef").unwrap());
    assert!(matches!(result, Err(GitError::CommandFailed { .. })));
}

#[test]
fn fetch_all_succeeds_with_local_upstream() {
    let repos = TestRepos::new();
    repos.git().fetch_all(&lib_a()).unwrap();
}

// =============================================================================
// Full Runs
// =============================================================================

#[test]
fn auto_run_commits_pointer_update() {
    let repos = TestRepos::new();
    let new = repos.advance_submodule("two\n", "Second lib commit");
    let reporter = CaptureReporter::new();
    let git = repos.git();

    let report = Reconciler::new(&git, &reporter)
        .run(&options(Mode::Auto))
        .unwrap();

    let header = format!("Updated submodules: libA -> ( {} ) ", &new[..7]);
    assert_eq!(
        report.outcome,
        RunOutcome::Committed {
            header: header.clone(),
            pushed: false,
        }
    );
    assert_eq!(
        git_stdout(&repos.parent(), &["log", "-1", "--format=%s"]),
        header.trim_end()
    );
    assert_eq!(
        git_stdout(&repos.parent(), &["rev-parse", "HEAD:libA"]),
        new
    );
}

#[test]
fn manual_run_checks_out_and_pushes() {
    let repos = TestRepos::new();
    let old = head(&repos.submodule());
    let new = repos.advance_submodule("two\n", "Second lib commit");
    run_git(&repos.submodule(), &["checkout", "-q", old.as_str()]);
    let remote = repos.add_remote();

    let reporter = CaptureReporter::new();
    let git = repos.git();
    let mut opts = options(Mode::Manual(vec![Assignment {
        name: "libA".into(),
        commit: new.clone(),
    }]));
    opts.push = true;

    let report = Reconciler::new(&git, &reporter).run(&opts).unwrap();

    assert!(matches!(
        report.outcome,
        RunOutcome::Committed { pushed: true, .. }
    ));
    assert_eq!(head(&repos.submodule()), new);
    assert_eq!(
        git_stdout(&remote, &["rev-parse", "master"]),
        head(&repos.parent())
    );
}

#[test]
fn manual_run_unknown_commit_creates_nothing() {
    let repos = TestRepos::new();
    let before = head(&repos.parent());
    let reporter = CaptureReporter::new();
    let git = repos.git();

    let report = Reconciler::new(&git, &reporter)
        .run(&options(Mode::Manual(vec![Assignment {
            name: "libA".into(),
            commit: "0123456789abcdef".into(),
        }])))
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::NothingToCommit);
    assert!(reporter.contains("[ERROR] Commit 0123456 does not exist in 'libA' submodule"));
    assert_eq!(head(&repos.parent()), before);
}
