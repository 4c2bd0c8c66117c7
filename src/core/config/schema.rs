//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$GITSKETCH_CONFIG` if set
//! 2. `<config dir>/gitsketch/config.toml` (`$XDG_CONFIG_HOME` on Linux)
//! 3. `~/.gitsketch/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing: branch names must be valid
//! ref names and layout sizes must be positive.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::RefName;

/// User configuration.
///
/// # Example
///
/// ```toml
/// default_branch = "main"
/// legacy_default_branches = ["master"]
/// remote_name = "origin"
/// storage_key = "git-viz-snapshot"
/// state_file = "/home/me/.local/share/gitsketch/state.json"
///
/// [layout]
/// width = 883
/// height = 400
/// commit_radius = 15
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Name of the default branch (default: "main")
    pub default_branch: Option<String>,

    /// Older default-branch names renamed on load (default: ["master"])
    pub legacy_default_branches: Option<Vec<String>>,

    /// Name of the simulated remote (default: "origin")
    pub remote_name: Option<String>,

    /// Key under which the undo history is saved
    pub storage_key: Option<String>,

    /// File backing the saved state; unset means nothing is persisted
    pub state_file: Option<PathBuf>,

    /// Whether sandboxes get a simulated origin (default: true)
    pub origin: Option<bool>,

    /// Canvas settings
    pub layout: Option<LayoutConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.default_branch {
            RefName::new(branch.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid default branch name: {}", e))
            })?;
        }

        for legacy in self.legacy_default_branches.iter().flatten() {
            RefName::new(legacy.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid legacy branch name: {}", e))
            })?;
        }

        if let Some(remote) = &self.remote_name {
            if remote.is_empty() || remote.contains('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid remote name '{remote}'"
                )));
            }
        }

        if let Some(key) = &self.storage_key {
            if key.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "storage_key cannot be empty".to_string(),
                ));
            }
        }

        if let Some(layout) = &self.layout {
            layout.validate()?;
        }

        Ok(())
    }
}

/// Canvas dimensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub commit_radius: Option<i32>,
}

impl LayoutConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("commit_radius", self.commit_radius),
        ] {
            if let Some(v) = value {
                if v <= 0 {
                    return Err(ConfigError::InvalidValue(format!(
                        "layout.{field} must be positive, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
            default_branch = "trunk"
            legacy_default_branches = ["master", "main"]
            remote_name = "upstream"
            storage_key = "my-key"
            state_file = "/tmp/state.json"
            origin = false

            [layout]
            width = 640
            height = 300
            commit_radius = 10
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_branch.as_deref(), Some("trunk"));
        assert_eq!(config.origin, Some(false));
        assert_eq!(config.layout.as_ref().unwrap().width, Some(640));
        config.validate().unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("trunk = \"main\"");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_branch_fails_validation() {
        let config = FileConfig {
            default_branch: Some("bad name".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn remote_with_slash_fails_validation() {
        let config = FileConfig {
            remote_name: Some("up/stream".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_layout_fails_validation() {
        let config = FileConfig {
            layout: Some(LayoutConfig {
                commit_radius: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
