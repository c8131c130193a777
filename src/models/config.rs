use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::date::DEFAULT_TIMEZONE;
use crate::utils::path::{get_config_path, get_database_path};

/// Applikationsinställningar som inte sparas i databasen (settings.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// IANA-tidszon för dagsskifte och veckonummer
    pub timezone: String,
    /// Egen databassökväg i stället för plattformens datakatalog
    pub database_path: Option<PathBuf>,
    /// JSON-fil som läses vid första start i stället för inbyggd standarddata
    pub bootstrap_file: Option<PathBuf>,
    /// error, warn, info, debug eller trace
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            database_path: None,
            bootstrap_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppSettings {
    /// Ladda från standardsökvägen
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&get_config_path())
    }

    /// Saknad fil ger standardvärden; en fil som inte går att läsa
    /// eller tolka ger fel.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Kunde inte läsa inställningsfil {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Ogiltig inställningsfil {:?}", path))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(get_database_path)
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_toml_roundtrip() {
        let settings = AppSettings {
            timezone: "Europe/Stockholm".into(),
            database_path: Some(PathBuf::from("/data/plm.db")),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let loaded: AppSettings = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: AppSettings = toml::from_str("log_level = \"debug\"\n").unwrap();
        assert_eq!(loaded.timezone, DEFAULT_TIMEZONE);
        assert_eq!(loaded.tracing_level(), tracing::Level::DEBUG);
        assert!(loaded.database_path().ends_with("plm-dashboard.db"));
    }

    #[test]
    fn test_load_from_missing_or_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.toml");
        assert_eq!(AppSettings::load_from(&missing).unwrap(), AppSettings::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "timezone = [").unwrap();
        assert!(AppSettings::load_from(&broken).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "timezone = \"Europe/Stockholm\"\nlog_level = \"warn\"\n").unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.timezone, "Europe/Stockholm");
        assert_eq!(loaded.tracing_level(), tracing::Level::WARN);
    }
}
