//! Binary-level tests for the `meta-update` executable.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn init_repo(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    run_git(dir, &["init", "-q", "-b", "master"]);
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
    std::fs::write(dir.join("README.md"), "# Test\n").unwrap();
    run_git(dir, &["add", "README.md"]);
    run_git(dir, &["commit", "-q", "-m", "Initial commit"]);
}

/// Parent repository at `<root>/parent` with submodule `libA`.
fn repo_with_submodule(root: &Path) -> std::path::PathBuf {
    let upstream = root.join("upstream");
    let parent = root.join("parent");
    init_repo(&upstream);
    init_repo(&parent);
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
    run_git(&parent, &["commit", "-q", "-m", "Add libA"]);
    parent
}

/// The binary, isolated from the user's config files.
fn meta_update(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("meta-update").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("META_UPDATE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_flags() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    meta_update(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--parent-branch-name"))
        .stdout(predicate::str::contains("--submodule"))
        .stdout(predicate::str::contains("--auto"))
        .stdout(predicate::str::contains("--push"));
    Ok(())
}

#[test]
fn version_is_printed() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    meta_update(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn outside_repository_reports_discovery_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    meta_update(dir.path())
        .arg("--cwd")
        .arg(dir.path())
        .arg("--auto")
        .assert()
        .success()
        .stdout("[ERROR] Failed to detect submodule(s). Are you in correct repository?\n");
    Ok(())
}

#[test]
fn bare_repository_reports_discovery_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let bare = dir.path().join("bare.git");
    run_git(dir.path(), &["init", "--bare", "-q", "bare.git"]);

    meta_update(dir.path())
        .current_dir(&bare)
        .arg("--auto")
        .assert()
        .success()
        .stdout("[ERROR] Failed to detect submodule(s). Are you in correct repository?\n");
    Ok(())
}

#[test]
fn repository_without_submodules_reports_discovery_failure(
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let repo = dir.path().join("repo");
    init_repo(&repo);

    meta_update(dir.path())
        .current_dir(&repo)
        .arg("--auto")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[ERROR] Failed to detect submodule(s)",
        ))
        .stdout(predicate::str::contains("Working in auto mode").not());
    Ok(())
}

#[test]
fn unchanged_submodule_has_nothing_to_commit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let parent = repo_with_submodule(dir.path());

    meta_update(dir.path())
        .current_dir(&parent)
        .arg("--auto")
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO] Working in auto mode"))
        .stdout(predicate::str::contains(
            "No new commits or modifications detected in 'libA' submodule",
        ))
        .stdout(predicate::str::contains("[WARNING] Nothing to commit!"));
    Ok(())
}

#[test]
fn quiet_hides_info_lines() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let parent = repo_with_submodule(dir.path());

    meta_update(dir.path())
        .current_dir(&parent)
        .args(["--auto", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO]").not())
        .stdout(predicate::str::contains("[WARNING] Nothing to commit!"));
    Ok(())
}

#[test]
fn unpaired_submodule_value_is_warned() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let parent = repo_with_submodule(dir.path());

    meta_update(dir.path())
        .current_dir(&parent)
        .args(["--submodule", "libA"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[WARNING] No commit given for 'libA' submodule, ignoring",
        ));
    Ok(())
}

#[test]
fn invalid_parent_branch_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let repo = dir.path().join("repo");
    init_repo(&repo);

    meta_update(dir.path())
        .current_dir(&repo)
        .args(["--auto", "--parent-branch-name", "bad..name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: invalid parent branch name"));
    Ok(())
}

#[test]
fn malformed_repo_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let repo = dir.path().join("repo");
    init_repo(&repo);
    let config_dir = repo.join(".git/meta-update");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(config_dir.join("config.toml"), "unknown_key = 1\n")?;

    meta_update(dir.path())
        .current_dir(&repo)
        .arg("--auto")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: failed to load configuration"));
    Ok(())
}

#[test]
fn global_config_file_is_honored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let repo = dir.path().join("repo");
    init_repo(&repo);
    let config = dir.path().join("meta-update.toml");
    std::fs::write(&config, "parent_branch = \"bad..name\"\n")?;

    meta_update(dir.path())
        .current_dir(&repo)
        .env("META_UPDATE_CONFIG", &config)
        .arg("--auto")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
    Ok(())
}
