//! Broker client for leakwatch.
//!
//! A small layer over `rumqttc` providing the pieces the bridge needs
//! and nothing more:
//!
//! - [`Config`]: broker settings deserialized from the application
//!   config file and validated before use.
//! - [`ClientBuilder`]: constructs the `AsyncClient`/`EventLoop` pair.
//! - [`Supervisor`]: the one task that drives the event loop, exposing
//!   connection state through a watch channel and a
//!   [`Supervisor::wait_connected`] startup handshake.
//! - [`Publisher`]: publish with QoS/retain, sharing one connection
//!   across concurrent call sites.
//!
//! ```ignore
//! let (client, event_loop) = ClientBuilder::from_config(&config)?.build();
//! let supervisor = Supervisor::start(event_loop);
//! supervisor.wait_connected().await?;
//!
//! let publisher = Publisher::new(client);
//! publisher.publish("homeassistant/status", b"online".to_vec(), 2, true).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod publisher;
pub mod supervisor;

pub use client::ClientBuilder;
pub use config::Config;
pub use error::TransferError;
pub use publisher::Publisher;
pub use supervisor::{ConnectionState, Supervisor};

/// Result type for broker operations.
pub type Result<T> = std::result::Result<T, TransferError>;
