//! Configuration management for jiractl.
//!
//! This module handles locating and loading the TOML configuration file.
//! A missing file is not an error: the shipped placeholders are used and
//! reported as warnings on first connection.

mod settings;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use settings::{Settings, INVALID_DEFAULT, PLACEHOLDER_SITE};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "JIRACTL_CONFIG";

/// Errors raised while locating or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The config file exists but could not be read.
    #[error("failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    /// The config file is not valid TOML.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// No site is configured, so there is nothing to connect to.
    #[error("no JIRA site configured; set 'site' in config.toml")]
    MissingSite,
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The config file path: `$JIRACTL_CONFIG`, else `<config dir>/jiractl/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("jiractl").join("config.toml"))
}

/// Load settings from `path`, or from [`config_path`] when `None`.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&contents)?;
    debug!(path = %path.display(), site = %settings.site, "Loaded config");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "site = \"https://jira.example.com\"\ncontext_path = \"/jira\"\nusername = \"jdoe\"\nproject = \"ABC\""
        )
        .unwrap();

        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.site, "https://jira.example.com");
        assert_eq!(settings.context_path, "/jira");
        assert_eq!(settings.username, "jdoe");
        assert_eq!(settings.project, "ABC");
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "site = ").unwrap();
        assert!(matches!(
            load(Some(file.path())),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        std::env::set_var(CONFIG_ENV, "/tmp/elsewhere.toml");
        let path = config_path().unwrap();
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(path, PathBuf::from("/tmp/elsewhere.toml"));
    }

    #[test]
    #[serial]
    fn test_config_path_default_location() {
        std::env::remove_var(CONFIG_ENV);
        if let Ok(path) = config_path() {
            assert!(path.ends_with("jiractl/config.toml"));
        }
    }
}
