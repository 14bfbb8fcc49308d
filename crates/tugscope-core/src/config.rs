//! Configuration handling for tugscope

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding the project configuration file.
pub const CONFIG_DIR: &str = ".tugscope";

/// File name of the project configuration file.
pub const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// What to do with an identifier whose scope chain holds no declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnboundPolicy {
    /// Treat the root scope as the implicit declaring scope.
    #[default]
    ImplicitRoot,
    /// Surface the name as an unbound-declaring-scope error.
    Reject,
}

/// tugscope configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Resolution settings
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Streaming query settings
    #[serde(default)]
    pub stream: StreamConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Free-name policy
    #[serde(default)]
    pub unbound: UnboundPolicy,
}

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamConfig {
    /// Bounded channel size for streamed groups
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Pretty JSON instead of compact
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_capacity() -> usize {
    4
}

fn default_pretty() -> bool {
    true
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        // A zero-capacity channel cannot be created.
        config.stream.capacity = config.stream.capacity.max(1);
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content, path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load configuration from .tugscope/config.toml in the given project root
    pub fn load_from_project(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = project_root.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Discover configuration by searching upward from `start`.
    ///
    /// Falls back to defaults when no `.tugscope/` directory exists.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        match find_project_root_from(start) {
            Some(root) => Self::load_from_project(&root),
            None => Ok(Config::default()),
        }
    }
}

/// Find the nearest ancestor of `start` (inclusive) containing `.tugscope/`
pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.resolve.unbound, UnboundPolicy::ImplicitRoot);
        assert_eq!(config.stream.capacity, 4);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[resolve]\nunbound = \"reject\"\n", Path::new("x")).unwrap();
        assert_eq!(config.resolve.unbound, UnboundPolicy::Reject);
        assert_eq!(config.stream.capacity, 4);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let config = Config::from_toml("[stream]\ncapacity = 0\n", Path::new("x")).unwrap();
        assert_eq!(config.stream.capacity, 1);
    }

    #[test]
    fn test_bad_policy_is_parse_error() {
        let err = Config::from_toml("[resolve]\nunbound = \"maybe\"\n", Path::new("x")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_discover_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join(CONFIG_FILE),
            "[output]\npretty = false\n[stream]\ncapacity = 16\n",
        )
        .unwrap();
        let nested = dir.path().join("pkg").join("sub");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_project_root_from(&nested).as_deref(),
            Some(dir.path())
        );
        let config = Config::discover(&nested).unwrap();
        assert!(!config.output.pretty);
        assert_eq!(config.stream.capacity, 16);
    }

    #[test]
    fn test_missing_project_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_project(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }
}
