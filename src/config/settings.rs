use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::prayer_times::aladhan::DEFAULT_BASE_URL;

fn default_location_name() -> String {
    "القاهرة".to_string()
}
fn default_latitude() -> f64 {
    30.0444
}
fn default_longitude() -> f64 {
    31.2357
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_method() -> u8 {
    // Egyptian General Authority of Survey
    5
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_calc_method() -> String {
    "Egyptian".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_timezone_offset() -> i32 {
    120
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Aladhan,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Aladhan calculation method id
    #[serde(default = "default_method")]
    pub method: u8,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Keep fetched timings in the local database
    #[serde(default = "default_true")]
    pub cache: bool,
    // offline calculator
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32, // minutes from UTC
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            base_url: default_base_url(),
            method: default_method(),
            timeout_secs: default_timeout_secs(),
            cache: true,
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            timezone_offset: default_timezone_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Days to add/subtract from the Hijri date for local moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hijri_offset: default_hijri_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "salati")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("salati.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    /// Identifies the settings that decide prayer times. Cached timings are
    /// only reused while this stays the same.
    pub fn source_fingerprint(&self) -> String {
        let loc = &self.location;
        let src = &self.source;
        match src.kind {
            SourceKind::Aladhan => format!(
                "aladhan|{}|{:.4}|{:.4}|{}",
                src.base_url, loc.latitude, loc.longitude, src.method
            ),
            SourceKind::Offline => format!(
                "offline|{:.4}|{:.4}|{}|{}|{}",
                loc.latitude, loc.longitude, src.calc_method, src.madhab, src.timezone_offset
            ),
        }
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.source.kind, SourceKind::Aladhan);
        assert_eq!(config.source.method, 5);
        assert_eq!(config.display.hijri_offset, 0);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[location]\nlatitude = 21.4225\nlongitude = 39.8262\n\n[source]\nkind = \"offline\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.location.latitude, 21.4225);
        assert_eq!(config.location.name, "القاهرة");
        assert_eq!(config.source.kind, SourceKind::Offline);
        assert_eq!(config.source.calc_method, "Egyptian");
        assert!(config.source.cache);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.location.name = "Makkah".to_string();
        config.display.hijri_offset = -1;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.location.name, "Makkah");
        assert_eq!(loaded.display.hijri_offset, -1);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source]\nkind = \"carrier-pigeon\"\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn fingerprint_follows_time_deciding_settings() {
        let base = AppConfig::default();

        let mut renamed = base.clone();
        renamed.location.name = "Home".to_string();
        renamed.display.hijri_offset = 1;
        renamed.source.timeout_secs = 30;
        assert_eq!(base.source_fingerprint(), renamed.source_fingerprint());

        let mut moved = base.clone();
        moved.location.latitude = -6.2;
        assert_ne!(base.source_fingerprint(), moved.source_fingerprint());

        let mut method = base.clone();
        method.source.method = 3;
        assert_ne!(base.source_fingerprint(), method.source_fingerprint());

        let mut offline = base.clone();
        offline.source.kind = SourceKind::Offline;
        let mut shifted = offline.clone();
        shifted.source.timezone_offset = 180;
        assert_ne!(base.source_fingerprint(), offline.source_fingerprint());
        assert_ne!(offline.source_fingerprint(), shifted.source_fingerprint());
    }
}
