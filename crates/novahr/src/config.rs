//! Configuration management for novahr.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "novahr";

/// Default storage file name.
const DATABASE_FILE_NAME: &str = "storage.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NOVAHR_`)
/// 2. TOML config file at `~/.config/novahr/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Activity log configuration.
    pub activity: ActivityConfig,
    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
    /// Seed values for the dynamic type lists.
    pub lists: ListsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the storage file.
    /// Defaults to `~/.local/share/novahr/storage.db`
    pub database_path: Option<PathBuf>,
    /// Maximum number of bytes (keys plus values) the storage area may hold.
    pub quota_bytes: u64,
}

/// Activity log configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Number of entries kept in the persisted log.
    pub max_entries: usize,
    /// Number of entries shown when listing recent activity.
    pub display_limit: usize,
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval between full re-reads in watch mode, in milliseconds.
    pub refresh_interval_ms: u64,
    /// Raise an insight when more employees than this are on leave today.
    pub on_leave_alert: usize,
    /// Raise an insight when more requests than this are pending.
    pub pending_alert: usize,
}

/// Seed values for the dynamic type lists, written on first read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    /// Default departments.
    pub departments: Vec<String>,
    /// Default leave types.
    pub leave_types: Vec<String>,
    /// Default document types.
    pub document_types: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            quota_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            display_limit: 50,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            on_leave_alert: 5,
            pending_alert: 10,
        }
    }
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            departments: to_strings(&["Engenharia", "Marketing", "Vendas", "RH", "Design"]),
            leave_types: to_strings(&["Férias", "Doença", "Pessoal", "Paternidade"]),
            document_types: to_strings(&[
                "Contrato",
                "Avaliação de Desempenho",
                "Reconhecimento de Política",
                "ID",
            ]),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
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
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("NOVAHR_").split("__"));

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
        if self.storage.quota_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "quota_bytes must be greater than 0".to_string(),
            });
        }

        if self.activity.max_entries == 0 {
            return Err(Error::ConfigValidation {
                message: "max_entries must be greater than 0".to_string(),
            });
        }

        if self.dashboard.refresh_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "refresh_interval_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the storage path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the dashboard refresh interval as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.dashboard.refresh_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.database_path.is_none());
        assert_eq!(storage.quota_bytes, 5_242_880);
    }

    #[test]
    fn test_default_activity_config() {
        let activity = ActivityConfig::default();
        assert_eq!(activity.max_entries, 100);
        assert_eq!(activity.display_limit, 50);
    }

    #[test]
    fn test_default_lists() {
        let lists = ListsConfig::default();
        assert_eq!(lists.departments.len(), 5);
        assert_eq!(lists.departments[0], "Engenharia");
        assert!(lists.leave_types.contains(&"Férias".to_string()));
        assert_eq!(lists.document_types.last().map(String::as_str), Some("ID"));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_refresh_interval() {
        let mut config = Config::default();
        config.dashboard.refresh_interval_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("refresh_interval_ms"));
    }

    #[test]
    fn test_validate_zero_quota() {
        let mut config = Config::default();
        config.storage.quota_bytes = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("quota_bytes"));
    }

    #[test]
    fn test_validate_zero_activity_cap() {
        let mut config = Config::default();
        config.activity.max_entries = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("storage.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/hr.db"));

        assert_eq!(config.database_path(), PathBuf::from("/custom/path/hr.db"));
    }

    #[test]
    fn test_refresh_interval() {
        let config = Config::default();
        assert_eq!(config.refresh_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("novahr"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        figment::Jail::expect_with(|_jail| {
            let config =
                Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_sectioned_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [storage]
                database_path = "/srv/hr/storage.db"
                quota_bytes = 1234

                [activity]
                max_entries = 7
                display_limit = 3

                [dashboard]
                refresh_interval_ms = 250
                pending_alert = 2

                [lists]
                departments = ["Ops", "Finance"]
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml"))).unwrap();
            assert_eq!(config.storage.quota_bytes, 1234);
            assert_eq!(config.database_path(), PathBuf::from("/srv/hr/storage.db"));
            assert_eq!(config.activity.max_entries, 7);
            assert_eq!(config.activity.display_limit, 3);
            assert_eq!(config.refresh_interval(), Duration::from_millis(250));
            assert_eq!(config.dashboard.pending_alert, 2);
            assert_eq!(config.dashboard.on_leave_alert, 5);
            assert_eq!(config.lists.departments, vec!["Ops", "Finance"]);
            assert_eq!(config.lists.leave_types, ListsConfig::default().leave_types);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[dashboard]\nrefresh_interval_ms = 250\n[activity]\nmax_entries = 7\n",
            )?;
            jail.set_env("NOVAHR_DASHBOARD__REFRESH_INTERVAL_MS", "500");

            let config = Config::load_from(Some(PathBuf::from("config.toml"))).unwrap();
            assert_eq!(config.dashboard.refresh_interval_ms, 500);
            assert_eq!(config.activity.max_entries, 7);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[activity]\nmax_entries = 0\n")?;

            let err = Config::load_from(Some(PathBuf::from("config.toml"))).unwrap_err();
            assert!(err.to_string().contains("max_entries"));
            Ok(())
        });
    }

    #[test]
    fn test_lists_config_deserialize() {
        let json = r#"{"departments": ["Ops"]}"#;
        let lists: ListsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(lists.departments, vec!["Ops".to_string()]);
        assert_eq!(lists.leave_types, ListsConfig::default().leave_types);
    }
}
