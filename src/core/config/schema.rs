//! core::config::schema
//!
//! Configuration file schema.
//!
//! The same keys are accepted in the global and the repository file; the
//! repository file wins key by key.
//!
//! # Example
//!
//! ```toml
//! parent_branch = "main"
//! remote = "upstream"
//! push = true
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// One configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Branch of the parent repository to push to
    pub parent_branch: Option<String>,

    /// Remote to push to
    pub remote: Option<String>,

    /// Push after committing
    pub push: Option<bool>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.parent_branch {
            BranchName::new(branch).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid parent_branch: {e}"))
            })?;
        }

        if let Some(remote) = &self.remote {
            if remote.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "remote cannot be empty".to_string(),
                ));
            }
            if remote.starts_with('-') {
                return Err(ConfigError::InvalidValue(format!(
                    "remote '{remote}' cannot start with '-'"
                )));
            }
        }

        Ok(())
    }

    /// Overlay `other` on top of `self`, key by key.
    #[must_use]
    pub fn merged_with(&self, other: &ConfigFile) -> ConfigFile {
        ConfigFile {
            parent_branch: other
                .parent_branch
                .clone()
                .or_else(|| self.parent_branch.clone()),
            remote: other.remote.clone().or_else(|| self.remote.clone()),
            push: other.push.or(self.push),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let file: ConfigFile =
            toml::from_str("parent_branch = \"main\"\nremote = \"up\"\npush = true\n").unwrap();
        assert_eq!(file.parent_branch.as_deref(), Some("main"));
        assert_eq!(file.remote.as_deref(), Some("up"));
        assert_eq!(file.push, Some(true));
    }

    #[test]
    fn empty_file_is_default() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("trunk = \"main\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_branch_rejected() {
        let file = ConfigFile {
            parent_branch: Some("bad..branch".into()),
            ..Default::default()
        };
        assert!(matches!(file.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn empty_remote_rejected() {
        let file = ConfigFile {
            remote: Some("  ".into()),
            ..Default::default()
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn overlay_prefers_other() {
        let base = ConfigFile {
            parent_branch: Some("master".into()),
            remote: Some("origin".into()),
            push: Some(true),
        };
        let over = ConfigFile {
            parent_branch: Some("main".into()),
            remote: None,
            push: Some(false),
        };
        let merged = base.merged_with(&over);
        assert_eq!(merged.parent_branch.as_deref(), Some("main"));
        assert_eq!(merged.remote.as_deref(), Some("origin"));
        assert_eq!(merged.push, Some(false));
    }
}
