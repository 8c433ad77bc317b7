//! Configuration file support for Taper.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/taper/config.toml`.
//! Every section is optional; missing keys fall back to defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub shoe: ShoeConfig,

    #[serde(default)]
    pub strava: StravaConfig,
}

/// Plan storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File stem of the persisted plan inside `data_dir`
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
        }
    }
}

/// Coordinate used for forecast lookups
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

/// Shoe wear tracking
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShoeConfig {
    #[serde(default = "default_shoe_limit")]
    pub limit_miles: f64,
}

impl Default for ShoeConfig {
    fn default() -> Self {
        Self {
            limit_miles: default_shoe_limit(),
        }
    }
}

/// Strava credentials
///
/// Either a short-lived `access_token`, or the client id/secret plus a
/// refresh token so a fresh access token can be requested on each sync.
/// `STRAVA_*` environment variables override the file.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StravaConfig {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl StravaConfig {
    /// Apply `STRAVA_ACCESS_TOKEN`, `STRAVA_CLIENT_ID`, `STRAVA_CLIENT_SECRET`
    /// and `STRAVA_REFRESH_TOKEN` over the file values
    pub fn with_env_overrides(mut self) -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        if let Some(v) = read("STRAVA_ACCESS_TOKEN") {
            self.access_token = Some(v);
        }
        if let Some(v) = read("STRAVA_CLIENT_ID") {
            self.client_id = Some(v);
        }
        if let Some(v) = read("STRAVA_CLIENT_SECRET") {
            self.client_secret = Some(v);
        }
        if let Some(v) = read("STRAVA_REFRESH_TOKEN") {
            self.refresh_token = Some(v);
        }
        self
    }

    /// True when a refresh-token exchange can be attempted
    pub fn can_refresh(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.refresh_token.is_some()
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("taper")
}

fn default_storage_key() -> String {
    "taper_plan_v2".into()
}

fn default_latitude() -> f64 {
    47.16
}

fn default_longitude() -> f64 {
    -122.51
}

fn default_timezone() -> String {
    "America/Los_Angeles".into()
}

fn default_shoe_limit() -> f64 {
    350.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.data.storage_key.trim().is_empty() {
            return Err(Error::Config("data.storage_key must not be empty".into()));
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("taper").join("config.toml")
    }

    /// Path of the persisted plan document
    pub fn plan_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.json", self.data.storage_key))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.storage_key, "taper_plan_v2");
        assert_eq!(config.shoe.limit_miles, 350.0);
        assert!((config.location.latitude - 47.16).abs() < f64::EPSILON);
        assert!(!config.strava.can_refresh());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.shoe.limit_miles = 400.0;
        config.strava.refresh_token = Some("refresh".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.shoe.limit_miles, 400.0);
        assert_eq!(loaded.strava.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[location]
latitude = 40.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.location.latitude, 40.0);
        assert_eq!(config.location.longitude, -122.51); // default
        assert_eq!(config.shoe.limit_miles, 350.0);
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[data]\nstorage_key = \"  \"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_plan_path_uses_storage_key() {
        let config = Config::default();
        let path = config.plan_path(Path::new("/tmp/taper"));
        assert_eq!(path, PathBuf::from("/tmp/taper/taper_plan_v2.json"));
    }
}
