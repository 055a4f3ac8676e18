//! Configuration management for skylog.
//!
//! Configuration loading and validation using figment, supporting TOML
//! config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "skylog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "logbook.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SKYLOG_`)
/// 2. TOML config file at `~/.config/skylog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Pilot configuration.
    pub pilot: PilotConfig,
    /// Export configuration.
    pub export: ExportConfig,
    /// Publish configuration.
    pub publish: PublishConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/skylog/logbook.db`
    pub database_path: Option<PathBuf>,
}

/// Pilot-related configuration.
///
/// The logbook is single-user: every command operates on the records of one
/// primary pilot. The pilot is an explicit configuration value rather than
/// an implicit lookup so a future multi-user setup only needs to vary this
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Database id of the primary pilot.
    pub primary_id: i64,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory for the static bundle.
    pub output_dir: PathBuf,
    /// Title shown on the generated pages.
    pub site_title: String,
    /// Number of trailing months in the monthly-hours chart.
    pub chart_months: u32,
    /// Maximum entries per leaderboard.
    pub leaderboard_limit: usize,
    /// Number of flights shown in the dashboard's recent-flights table.
    pub recent_flights_limit: usize,
}

/// Publish-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Git remote to push to.
    pub remote: String,
    /// Branch the hosting service serves from.
    pub branch: String,
    /// Push after committing. When false the publish procedure stops after
    /// the commit and the operator pushes manually.
    pub push: bool,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self { primary_id: 1 }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("static_site"),
            site_title: "Flight Logbook".to_string(),
            chart_months: 12,
            leaderboard_limit: 10,
            recent_flights_limit: 10,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            push: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("SKYLOG_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.pilot.primary_id <= 0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "pilot.primary_id must be positive (got {})",
                    self.pilot.primary_id
                ),
            });
        }

        if self.export.chart_months == 0 {
            return Err(Error::ConfigValidation {
                message: "export.chart_months must be greater than 0".to_string(),
            });
        }

        if self.export.output_dir.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "export.output_dir must not be empty".to_string(),
            });
        }

        if self.publish.remote.is_empty() || self.publish.branch.is_empty() {
            return Err(Error::ConfigValidation {
                message: "publish.remote and publish.branch must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.pilot.primary_id, 1);
        assert_eq!(config.export.output_dir, PathBuf::from("static_site"));
        assert_eq!(config.export.chart_months, 12);
        assert_eq!(config.export.leaderboard_limit, 10);
        assert_eq!(config.publish.remote, "origin");
        assert_eq!(config.publish.branch, "main");
        assert!(config.publish.push);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_primary_id() {
        let mut config = Config::default();
        config.pilot.primary_id = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("primary_id"));
    }

    #[test]
    fn test_validate_zero_chart_months() {
        let mut config = Config::default();
        config.export.chart_months = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("chart_months"));
    }

    #[test]
    fn test_validate_empty_output_dir() {
        let mut config = Config::default();
        config.export.output_dir = PathBuf::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_branch() {
        let mut config = Config::default();
        config.publish.branch = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("branch"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();
        assert!(path.to_string_lossy().contains("logbook.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("skylog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults).
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[pilot]
primary_id = 3

[export]
site_title = "My Logbook"

[publish]
push = false
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.pilot.primary_id, 3);
        assert_eq!(config.export.site_title, "My Logbook");
        assert!(!config.publish.push);
        // Unset sections fall back to defaults.
        assert_eq!(config.export.chart_months, 12);
    }

    #[test]
    fn test_load_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[export]\nchart_months = 0\n").unwrap();

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("primary_id"));
        assert!(json.contains("output_dir"));
        assert!(json.contains("branch"));
    }
}
