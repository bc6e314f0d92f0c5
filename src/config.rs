use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "SKILLNOTES_DATA_DIR";

/// XP granted per keypress in the badge view when the config does not say otherwise
pub const DEFAULT_XP_GRANT: i64 = 50;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub xp_grant: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: None,
            xp_grant: DEFAULT_XP_GRANT,
        }
    }
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Where records and the log file live.
    ///
    /// `SKILLNOTES_DATA_DIR` wins over the config file, which wins over the platform
    /// data directory.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let dir = dir.trim();
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }

        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }

        dirs::data_dir()
            .map(|dir| dir.join("skillnotes"))
            .unwrap_or_else(|| PathBuf::from(".skillnotes"))
    }
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("skillnotes").join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// A missing file is not an error, it just means defaults
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            data_dir = "/tmp/skillnotes-data"
            log_level = "debug"
            xp_grant = 25
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/skillnotes-data")));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.xp_grant, 25);
    }

    #[test]
    fn test_config_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.xp_grant, DEFAULT_XP_GRANT);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_blank_log_level_falls_back() {
        let config = Config {
            log_level: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert_eq!(load_config_from(&missing).unwrap(), Config::default());

        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "xp_grant = 80\n").unwrap();
        assert_eq!(load_config_from(&path).unwrap().xp_grant, 80);

        fs::write(&path, "xp_grant = \"lots\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_data_dir_priority() {
        use std::env;
        let original_env = env::var(DATA_DIR_ENV).ok();
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };

        unsafe {
            env::set_var(DATA_DIR_ENV, "/from/env");
        }
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/from/env"));

        unsafe {
            env::remove_var(DATA_DIR_ENV);
        }
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/from/config"));

        // Restore env var
        unsafe {
            if let Some(val) = original_env {
                env::set_var(DATA_DIR_ENV, val);
            }
        }
    }
}
