//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Settings for one parent repository
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values (`master`, `origin`, no push)
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$META_UPDATE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/meta-update/config.toml`
//! 3. `~/.meta-update/config.toml`
//!
//! # Repo Config Location
//!
//! `<git-dir>/meta-update/config.toml`. The git directory is used rather
//! than `<work-tree>/.git` so worktrees and nested checkouts resolve too.
//!
//! # Example
//!
//! ```no_run
//! use meta_update::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! println!("Remote: {}", config.remote());
//! println!("Push: {}", config.push());
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default branch pushed to when nothing else is configured.
pub const DEFAULT_PARENT_BRANCH: &str = "master";

/// Default remote pushed to when nothing else is configured.
pub const DEFAULT_REMOTE: &str = "origin";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Repository configuration (if a file was found)
    pub repo: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// When `git_dir` is given, the repository file under it is loaded too.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let global_path = Self::find_global();
        let repo_path = git_dir
            .map(Self::repo_config_path)
            .filter(|path| path.exists());
        Self::load_from(global_path.as_deref(), repo_path.as_deref())
    }

    /// Load configuration from explicit file paths.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`]; here a given path must exist.
    pub fn load_from(global: Option<&Path>, repo: Option<&Path>) -> Result<Self, ConfigError> {
        let global_file = match global {
            Some(path) => Self::read_file(path)?,
            None => ConfigFile::default(),
        };
        let repo_file = repo.map(Self::read_file).transpose()?;

        global_file.validate()?;
        if let Some(ref r) = repo_file {
            r.validate()?;
        }

        Ok(Config {
            global: global_file,
            repo: repo_file,
            global_path: global.map(Path::to_path_buf),
            repo_path: repo.map(Path::to_path_buf),
        })
    }

    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("META_UPDATE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("meta-update/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".meta-update/config.toml"))
            .filter(|path| path.exists())
    }

    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Repository config path for a git directory.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("meta-update/config.toml")
    }

    fn effective(&self) -> ConfigFile {
        match &self.repo {
            Some(repo) => self.global.merged_with(repo),
            None => self.global.clone(),
        }
    }

    /// Branch to push to.
    pub fn parent_branch(&self) -> String {
        self.effective()
            .parent_branch
            .unwrap_or_else(|| DEFAULT_PARENT_BRANCH.to_string())
    }

    /// Remote to push to.
    pub fn remote(&self) -> String {
        self.effective()
            .remote
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string())
    }

    /// Whether to push by default.
    pub fn push(&self) -> bool {
        self.effective().push.unwrap_or(false)
    }

    /// Paths of the files that were loaded.
    pub fn sources(&self) -> Vec<&Path> {
        self.global_path
            .iter()
            .chain(self.repo_path.iter())
            .map(PathBuf::as_path)
            .collect()
    }
}
