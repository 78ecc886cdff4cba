// Player configuration - optional TOML file with defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::player::page::DEFAULT_SOURCE_PARAM;

/// Default tracing filter when neither RUST_LOG nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "embed_autoplay=info,embed_autoplay_lib=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for the player page.
///
/// The autoplay check delay is deliberately absent: it is a fixed constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Query parameter that carries the video source
    pub source_param: String,
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source_param: DEFAULT_SOURCE_PARAM.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl PlayerConfig {
    /// `<config dir>/embed-autoplay/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("embed-autoplay").join("config.toml"))
    }

    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file that must exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load `path` if given, else the default location if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_source_param(mut self, param: impl Into<String>) -> Self {
        self.source_param = param.into();
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let param = self.source_param.trim();
        if param.is_empty() {
            return Err(ConfigError::Invalid("source_param must not be empty".to_string()));
        }
        if param.contains(['&', '=', '?', '#']) {
            return Err(ConfigError::Invalid(format!(
                "source_param '{}' contains query delimiters",
                self.source_param
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PlayerConfig, ConfigError> {
        PlayerConfig::from_toml(text, Path::new("config.toml"))
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), PlayerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse("source_param = \"src\"\n").unwrap();
        assert_eq!(config.source_param, "src");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_malformed_file() {
        assert!(matches!(parse("source_param = "), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_rejects_bad_param() {
        assert!(matches!(parse("source_param = \"\""), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("source_param = \"a&b\""), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = PlayerConfig::load_or_default(Some(Path::new("/nonexistent/embed.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_builders() {
        let config = PlayerConfig::default()
            .with_source_param("v")
            .with_log_filter("debug");
        assert_eq!(config.source_param, "v");
        assert_eq!(config.log_filter, "debug");
    }
}
