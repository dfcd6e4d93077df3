//! Application configuration.
//!
//! Loaded from `<config_dir>/cropguard/config.toml`. A missing file yields
//! defaults; a malformed file is a configuration error.
//!
//! Data directory resolution order:
//! 1. Command-line argument
//! 2. `CROPGUARD_DATA_DIR` environment variable
//! 3. `[storage] data_dir` in the config file
//! 4. Platform default (see [`crate::services::storage::default_data_dir`])

use crate::error::CropGuardError;
use crate::services::classifier::SeedMode;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CROPGUARD_DATA_DIR";

/// Default ImgBB-compatible upload endpoint.
pub const DEFAULT_IMAGE_HOST_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub image_host: ImageHostConfig,
    pub analysis: AnalysisConfig,
    pub outbreaks: OutbreakConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info,cropguard_core=debug"`.
    pub filter: Option<String>,
    /// Overrides `<data_dir>/logs`.
    pub dir: Option<PathBuf>,
    /// Never write a log file, even when not attached to a terminal.
    pub console_only: bool,
}

/// Image hosting service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageHostConfig {
    /// Upload endpoint
    pub endpoint: String,
    /// Optional album to file uploads under
    pub album_id: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ImageHostConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_IMAGE_HOST_ENDPOINT.to_string(), album_id: None, timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub seed_mode: SeedMode,
}

/// Outbreak report moderation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutbreakConfig {
    /// Users allowed to approve or reject reports
    pub reviewers: Vec<String>,
}

impl OutbreakConfig {
    pub fn is_reviewer(&self, user_id: &str) -> bool {
        self.reviewers.iter().any(|r| r == user_id)
    }
}

impl AppConfig {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cropguard").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load_default() -> Result<Self, CropGuardError> {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`, returning defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, CropGuardError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, CropGuardError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CropGuardError::config(format!("Failed to read '{}': {e}", path.display()))
        })?;
        let config = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Parse config from TOML text.
    pub fn parse(contents: &str) -> Result<Self, CropGuardError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CropGuardError> {
        if self.image_host.endpoint.trim().is_empty() {
            return Err(CropGuardError::config("image_host.endpoint must not be empty"));
        }
        if self.image_host.timeout_secs == 0 {
            return Err(CropGuardError::config("image_host.timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Resolve the data directory, honoring the CLI argument and environment first.
    pub fn resolve_data_dir(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(DATA_DIR_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        if let Some(path) = &self.storage.data_dir {
            return path.clone();
        }
        crate::services::storage::default_data_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.image_host.endpoint, DEFAULT_IMAGE_HOST_ENDPOINT);
        assert_eq!(config.analysis.seed_mode, SeedMode::Content);
    }

    #[test]
    fn test_parse_sections() {
        let config = AppConfig::parse(
            r#"
            [storage]
            data_dir = "/srv/cropguard"

            [logging]
            filter = "debug"
            console_only = true

            [image_host]
            album_id = "field-scans"
            timeout_secs = 10

            [analysis]
            seed_mode = "wall_clock"

            [outbreaks]
            reviewers = ["extension-officer"]
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/srv/cropguard")));
        assert_eq!(config.logging.filter.as_deref(), Some("debug"));
        assert!(config.logging.console_only);
        assert_eq!(config.logging.dir, None);
        assert_eq!(config.image_host.album_id.as_deref(), Some("field-scans"));
        assert_eq!(config.image_host.timeout_secs, 10);
        assert_eq!(config.image_host.endpoint, DEFAULT_IMAGE_HOST_ENDPOINT);
        assert_eq!(config.analysis.seed_mode, SeedMode::WallClock);
        assert!(config.outbreaks.is_reviewer("extension-officer"));
        assert!(!config.outbreaks.is_reviewer("local"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let err = AppConfig::parse("[image_host\nendpoint = 1").unwrap_err();
        assert_eq!(err.category(), "Config");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AppConfig::parse("[image_host]\ntimeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_cli_argument_wins() {
        let config = AppConfig {
            storage: StorageConfig { data_dir: Some(PathBuf::from("/from/config")) },
            ..Default::default()
        };
        let resolved = config.resolve_data_dir(Some(Path::new("/from/cli")));
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }
}
