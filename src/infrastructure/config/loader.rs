use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".pronoun-cache";

/// Prefix of environment variable overrides (`PRONOUN_CACHE_LOOKUP__PLATFORM`).
pub const ENV_PREFIX: &str = "PRONOUN_CACHE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Lookup base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Lookup platform cannot be empty")]
    EmptyPlatform,

    #[error("Invalid quiescence_ms: {0}. Must be at least 1")]
    InvalidQuiescence(u64),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .pronoun-cache/config.yaml
    /// 3. .pronoun-cache/local.yaml (optional, for local overrides)
    /// 4. Environment variables (PRONOUN_CACHE_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(format!("{CONFIG_DIR}/config.yaml")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment variables still win.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let lookup = &config.lookup;
        if lookup.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if lookup.platform.trim().is_empty() {
            return Err(ConfigError::EmptyPlatform);
        }
        if lookup.quiescence_ms == 0 {
            return Err(ConfigError::InvalidQuiescence(lookup.quiescence_ms));
        }
        if lookup.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(lookup.timeout_secs));
        }
        if lookup.initial_backoff_ms > lookup.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                lookup.initial_backoff_ms,
                lookup.max_backoff_ms,
            ));
        }

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PronounStyle;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lookup.base_url, "https://pronoundb.org");
        assert_eq!(config.lookup.platform, "discord");
        assert_eq!(config.lookup.quiescence_ms, 20);
        assert_eq!(config.database.path, ".pronoun-cache/overrides.db");
        assert_eq!(config.display.style, PronounStyle::Capitalized);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
lookup:
  base_url: http://localhost:8080
  quiescence_ms: 100
database:
  path: /tmp/overrides.db
logging:
  level: debug
  format: json
display:
  style: lowercase
  show_self: false
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.lookup.base_url, "http://localhost:8080");
        assert_eq!(config.lookup.quiescence_ms, 100);
        assert_eq!(config.lookup.platform, "discord");
        assert_eq!(config.database.path, "/tmp/overrides.db");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.display.style, PronounStyle::Lowercase);
        assert!(!config.display.show_self);
        assert!(config.display.show_in_messages);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_quiescence() {
        let mut config = Config::default();
        config.lookup.quiescence_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidQuiescence(0))
        ));
    }

    #[test]
    fn test_validate_empty_platform() {
        let mut config = Config::default();
        config.lookup.platform = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyPlatform)
        ));
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.lookup.initial_backoff_ms = 10_000;
        config.lookup.max_backoff_ms = 1_000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(10_000, 1_000))
        ));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.database.path = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogFormat(format)) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file_merges_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "lookup:\n  platform: minecraft\nlogging:\n  level: info").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.lookup.platform, "minecraft");
        assert_eq!(config.lookup.base_url, "https://pronoundb.org");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(base_file, "lookup:\n  quiescence_ms: 50\n  timeout_secs: 3").unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "lookup:\n  quiescence_ms: 5").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.lookup.quiescence_ms, 5, "Override should win");
        assert_eq!(
            config.lookup.timeout_secs, 3,
            "Base value should persist when not overridden"
        );
    }
}
