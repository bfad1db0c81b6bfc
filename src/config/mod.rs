//! Application configuration loading and validation.
//!
//! The top-level `Config` aggregates logging, broker, decoder, and
//! device-registry settings, loaded once from a TOML file at startup
//! and immutable afterwards.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::logger::LoggerConfig;

pub mod logger;

/// Simple macros for printing timestamped messages before the tracing
/// subscriber is initialized. Used during early configuration loading.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        println!("{}  {} {}",
            console::style(
                time::OffsetDateTime::now_utc()
                    .format(&time::format_description::parse(
                        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
                    ).unwrap())
                    .unwrap()
            ).dim(),
            console::style("INFO").green(),
            format_args!($($arg)*)
        );
    };
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        println!("{}  {} {}",
            console::style(
                time::OffsetDateTime::now_utc()
                    .format(&time::format_description::parse(
                        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
                    ).unwrap())
                    .unwrap()
            ).dim(),
            console::style("WARN").yellow(),
            format_args!($($arg)*)
        );
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        println!("{}  {} {}",
            console::style(
                time::OffsetDateTime::now_utc()
                    .format(&time::format_description::parse(
                        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
                    ).unwrap())
                    .unwrap()
            ).dim(),
            console::style("ERROR").red(),
            format_args!($($arg)*)
        );
    };
}

/// Errors that can occur during configuration loading, parsing, or
/// validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error while reading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error while reading configuration: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Broker connection settings, including the discovery topic prefix.
pub type MqttConfig = leakwatch_mqtt::Config;

/// Decoder process settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Rtl433Config {
    /// Path to the rtl_433 binary.
    #[validate(length(min = 1, message = "rtl_433.path must not be empty"))]
    pub path: String,

    /// Extra arguments appended after the fixed decoder flags,
    /// e.g. `["-d", ":1234"]` to select a specific dongle.
    pub extra_args: Vec<String>,
}

impl Default for Rtl433Config {
    fn default() -> Self {
        Rtl433Config {
            path: "rtl_433".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Logging subsystem configuration.
    #[validate(nested)]
    pub logger: LoggerConfig,

    /// Broker connection configuration.
    #[validate(nested)]
    pub mqtt: MqttConfig,

    /// Decoder process configuration.
    #[serde(rename = "rtl_433")]
    #[validate(nested)]
    pub rtl433: Rtl433Config,

    /// Registry of monitored devices: transmitter id to location.
    #[validate(length(min = 1, message = "at least one device must be configured"))]
    pub devices: HashMap<String, String>,
}

impl Config {
    /// Constructs a configuration by locating and loading the config
    /// file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration file cannot be
    /// found, read, parsed, or validated.
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;
        Self::load(&config_path)
    }

    /// Determines the configuration file path.
    ///
    /// Priority:
    /// 1. `LEAKWATCH_CONFIG` environment variable
    /// 2. `/etc/leakwatch/config.toml`
    fn get_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(config_path) = std::env::var("LEAKWATCH_CONFIG") {
            let path = PathBuf::from(config_path);
            print_info!("Using config from LEAKWATCH_CONFIG: {}", path.display());
            return Ok(path);
        }

        let fallback = Path::new("/etc/leakwatch/config.toml");
        if fallback.exists() {
            print_info!("Using default config path: {}", fallback.display());
            return Ok(fallback.to_path_buf());
        }

        Err(ConfigError::Config(
            "No configuration file found.".to_string(),
        ))
    }

    /// Loads and validates configuration from the specified path.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&config_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        print_info!("Successfully loaded config from: {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const EXAMPLE: &str = include_str!("../../config.example.toml");

    fn minimal() -> String {
        r#"
        [mqtt]
        host = "homeassistant.local"
        username = "govee"
        password = "govee"

        [devices]
        12345 = "Dishwasher"
        "#
        .to_string()
    }

    #[test]
    fn example_config_parses_and_validates() {
        let config: Config = toml::from_str(EXAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.devices["12345"], "Dishwasher");
        assert_eq!(config.devices["54321"], "Refrigerator");
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(&minimal()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.prefix, "homeassistant");
        assert_eq!(config.rtl433.path, "rtl_433");
        assert!(config.rtl433.extra_args.is_empty());
    }

    #[test]
    fn empty_device_registry_fails_validation() {
        let config: Config = toml::from_str(
            r#"
            [mqtt]
            host = "homeassistant.local"
            username = "govee"
            password = "govee"
            "#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one device"));
    }

    #[test]
    fn missing_broker_host_fails_validation() {
        let config: Config = toml::from_str(
            r#"
            [devices]
            12345 = "Dishwasher"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_and_validates_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(minimal().as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.mqtt.host, "homeassistant.local");
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"devices = not toml").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
