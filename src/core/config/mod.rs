//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (applied through the `with_*` methods)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$GITSKETCH_CONFIG` if set
//! 2. `<config dir>/gitsketch/config.toml`
//! 3. `~/.gitsketch/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use gitsketch::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("Default branch: {}", config.default_branch());
//! println!("Remote: {}", config.remote_name());
//! ```

pub mod schema;

pub use schema::{FileConfig, LayoutConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::layout::Dimensions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GITSKETCH_CONFIG";

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_STORAGE_KEY: &str = "git-viz-snapshot";

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

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Configuration with defaults and overrides applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the config file
    pub file: FileConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist; otherwise the standard locations are
    /// searched and a missing file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config(),
        };

        let Some(path) = path else {
            return Ok(ConfigLoadResult {
                config: Config::default(),
                warnings: vec![],
            });
        };

        let file = Self::read_config(&path)?;
        file.validate()?;

        let mut warnings = Vec::new();
        if let Some(legacy) = &file.legacy_default_branches {
            let default = file.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH);
            if legacy.iter().any(|name| name == default) {
                warnings.push(ConfigWarning {
                    message: format!(
                        "'{default}' is both the default branch and a legacy name; it will not be renamed"
                    ),
                    path: path.clone(),
                });
            }
        }

        Ok(ConfigLoadResult {
            config: Config {
                file,
                path: Some(path),
            },
            warnings,
        })
    }

    /// Find the first existing config file in the standard locations.
    fn find_config() -> Option<PathBuf> {
        // 1. Check $GITSKETCH_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check <config dir>/gitsketch/config.toml
        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("gitsketch/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.gitsketch/config.toml
        dirs::home_dir()
            .map(|home| home.join(".gitsketch/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Overrides
    // =========================================================================

    /// Override the default branch (CLI flag).
    pub fn with_default_branch(mut self, branch: Option<String>) -> Result<Self, ConfigError> {
        if branch.is_some() {
            self.file.default_branch = branch;
            self.file.validate()?;
        }
        Ok(self)
    }

    /// Override the state file (CLI flag).
    pub fn with_state_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.file.state_file = path;
        }
        self
    }

    /// Disable the simulated origin (CLI flag).
    pub fn without_origin(mut self, disable: bool) -> Self {
        if disable {
            self.file.origin = Some(false);
        }
        self
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the default branch name.
    ///
    /// Defaults to "main" if not configured.
    pub fn default_branch(&self) -> &str {
        self.file.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    /// Get the legacy default-branch names, minus the current default.
    ///
    /// Defaults to `["master"]` if not configured.
    pub fn legacy_default_branches(&self) -> Vec<String> {
        let names = match &self.file.legacy_default_branches {
            Some(names) => names.clone(),
            None => vec!["master".to_string()],
        };
        names
            .into_iter()
            .filter(|name| name != self.default_branch())
            .collect()
    }

    /// Get the remote name.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote_name(&self) -> &str {
        self.file.remote_name.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    /// Get the storage key for the undo history.
    pub fn storage_key(&self) -> &str {
        self.file.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }

    /// Get the state file, if persistence is enabled.
    pub fn state_file(&self) -> Option<&Path> {
        self.file.state_file.as_deref()
    }

    /// Whether sandboxes get a simulated origin.
    ///
    /// Defaults to `true` if not configured.
    pub fn origin_enabled(&self) -> bool {
        self.file.origin.unwrap_or(true)
    }

    /// Canvas dimensions with defaults filled in.
    pub fn dimensions(&self) -> Dimensions {
        let defaults = Dimensions::default();
        let layout = self.file.layout.clone().unwrap_or_default();
        Dimensions {
            width: layout.width.unwrap_or(defaults.width),
            height: layout.height.unwrap_or(defaults.height),
            commit_radius: layout.commit_radius.unwrap_or(defaults.commit_radius),
        }
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.default_branch(), "main");
        assert_eq!(config.legacy_default_branches(), vec!["master"]);
        assert_eq!(config.remote_name(), "origin");
        assert_eq!(config.storage_key(), "git-viz-snapshot");
        assert!(config.state_file().is_none());
        assert!(config.origin_enabled());
        assert_eq!(config.dimensions(), Dimensions::default());
    }

    #[test]
    fn load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            default_branch = "trunk"
            remote_name = "upstream"

            [layout]
            commit_radius = 10
            "#,
        )
        .unwrap();

        let result = Config::load(Some(&path)).unwrap();
        let config = result.config;
        assert_eq!(config.default_branch(), "trunk");
        assert_eq!(config.remote_name(), "upstream");
        assert_eq!(config.dimensions().commit_radius, 10);
        assert_eq!(config.dimensions().width, Dimensions::default().width);
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "default_branch = \"invalid..name\"").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "trunk = \"main\"").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn legacy_name_equal_to_default_warns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            default_branch = "master"
            legacy_default_branches = ["master"]
            "#,
        )
        .unwrap();

        let result = Config::load(Some(&path)).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.config.legacy_default_branches().is_empty());
    }

    #[test]
    fn cli_overrides_apply() {
        let config = Config::default()
            .with_default_branch(Some("trunk".into()))
            .unwrap()
            .with_state_file(Some(PathBuf::from("/tmp/state.json")))
            .without_origin(true);
        assert_eq!(config.default_branch(), "trunk");
        assert_eq!(config.state_file(), Some(Path::new("/tmp/state.json")));
        assert!(!config.origin_enabled());
    }

    #[test]
    fn invalid_override_rejected() {
        let result = Config::default().with_default_branch(Some("a b".into()));
        assert!(result.is_err());
    }
}
