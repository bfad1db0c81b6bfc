//! Broker connection configuration.
//!
//! Deserialized from the `[mqtt]` table of the application config file
//! and validated with the `validator` crate before a client is built.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Broker connection settings.
///
/// All fields have serde defaults so a partial `[mqtt]` table parses;
/// validation then rejects configurations that are missing the required
/// host and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Broker hostname or IP address. Required.
    #[validate(length(min = 1, max = 255, message = "mqtt.host must be set"))]
    pub host: String,

    /// Broker port.
    #[validate(range(min = 1, message = "mqtt.port must be non-zero"))]
    pub port: u16,

    /// Broker username. Required; passed through to the broker as-is.
    #[validate(length(min = 1, message = "mqtt.username must be set"))]
    pub username: String,

    /// Broker password. Required; passed through to the broker as-is.
    #[validate(length(min = 1, message = "mqtt.password must be set"))]
    pub password: String,

    /// Topic prefix under which discovery and state topics are rooted.
    #[validate(length(min = 1, message = "mqtt.prefix must not be empty"))]
    pub prefix: String,

    /// Client identifier. A random UUID is generated when empty.
    /// The MQTT specification caps identifiers at 36 characters.
    #[validate(length(max = 36, message = "mqtt.client_id must be at most 36 characters"))]
    pub client_id: String,

    /// Keep-alive interval in seconds.
    #[validate(range(min = 5, max = 3600, message = "mqtt.keep_alive must be 5-3600 seconds"))]
    pub keep_alive: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: String::new(),
            port: 1883,
            username: String::new(),
            password: String::new(),
            prefix: "homeassistant".to_string(),
            client_id: String::new(),
            keep_alive: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            host: "homeassistant.local".into(),
            username: "govee".into(),
            password: "govee".into(),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let config: Config = toml::from_str(
            r#"
            host = "broker.example.com"
            username = "user"
            password = "pass"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 1883);
        assert_eq!(config.prefix, "homeassistant");
        assert_eq!(config.keep_alive, 60);
        assert!(config.client_id.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_host_fails_validation() {
        let config = Config {
            host: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let config = Config {
            username: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = Config {
            password: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlong_client_id_fails_validation() {
        let config = Config {
            client_id: "x".repeat(37),
            ..valid()
        };
        assert!(config.validate().is_err());
    }
}
