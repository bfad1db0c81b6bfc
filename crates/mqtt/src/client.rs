//! MQTT client construction.
//!
//! `ClientBuilder` wraps the setup of rumqttc's `AsyncClient` and
//! `EventLoop`. The returned pair must be used together: the client
//! queues publishes, the event loop moves packets on the wire and is
//! handed to a [`Supervisor`](crate::Supervisor).

use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions};

use super::{config::Config, error::TransferError};

/// Default capacity of the client's internal request channel.
const DEFAULT_CAPACITY: usize = 10;

/// Builder for an MQTT client connection.
pub struct ClientBuilder {
    opts: MqttOptions,
    cap: usize,
}

impl ClientBuilder {
    /// Creates a builder with the given identity and broker address.
    pub fn new(client_id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            opts: MqttOptions::new(client_id, host, port),
            cap: DEFAULT_CAPACITY,
        }
    }

    /// Creates a builder from a validated [`Config`].
    ///
    /// An empty `client_id` is replaced with a random UUID so that two
    /// bridge instances against the same broker do not evict each other.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::Config` if the configuration fails
    /// validation.
    pub fn from_config(config: &Config) -> Result<Self, TransferError> {
        use validator::Validate;
        config.validate()?;

        let client_id = if config.client_id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            config.client_id.clone()
        };

        let mut opts = MqttOptions::new(client_id, config.host.as_str(), config.port);
        opts.set_keep_alive(Duration::from_secs(config.keep_alive));
        opts.set_credentials(config.username.as_str(), config.password.as_str());

        Ok(Self {
            opts,
            cap: DEFAULT_CAPACITY,
        })
    }

    /// Sets the keep-alive interval in seconds.
    pub fn keep_alive(mut self, secs: u64) -> Self {
        self.opts.set_keep_alive(Duration::from_secs(secs));
        self
    }

    /// Sets broker credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.opts.set_credentials(username, password);
        self
    }

    /// Sets the request channel capacity.
    pub fn capacity(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Constructs the client and its event loop.
    ///
    /// The client is cloneable and safe to share across tasks; the
    /// event loop must be driven by exactly one task.
    pub fn build(self) -> (AsyncClient, EventLoop) {
        AsyncClient::new(self.opts, self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_creation() {
        let builder = ClientBuilder::new("test_client", "localhost", 1883);
        assert_eq!(builder.cap, DEFAULT_CAPACITY);
    }

    #[test]
    fn builder_chain_methods() {
        let builder = ClientBuilder::new("test_client", "localhost", 1883)
            .keep_alive(30)
            .credentials("user", "pass")
            .capacity(100);
        assert_eq!(builder.cap, 100);
    }

    #[test]
    fn build_from_config() {
        let config = Config {
            host: "localhost".into(),
            username: "user".into(),
            password: "pass".into(),
            client_id: "test_client".into(),
            ..Config::default()
        };

        let builder = ClientBuilder::from_config(&config).unwrap();
        let (client, _event_loop) = builder.build();
        assert!(!format!("{:?}", client).is_empty());
    }

    #[test]
    fn build_from_config_generates_client_id() {
        let config = Config {
            host: "localhost".into(),
            username: "user".into(),
            password: "pass".into(),
            ..Config::default()
        };

        assert!(ClientBuilder::from_config(&config).is_ok());
    }

    #[test]
    fn build_from_invalid_config_fails() {
        let config = Config {
            host: String::new(),
            username: "user".into(),
            password: "pass".into(),
            ..Config::default()
        };

        assert!(ClientBuilder::from_config(&config).is_err());
    }
}
