//! Event dispatch and discovery registration.
//!
//! The `Bridge` owns the device registry and the broker handle. At
//! startup it announces every known device to the discovery consumer
//! ([`Bridge::configure_devices`]); afterwards it runs the ingestion
//! loop ([`Bridge::monitor`]), translating each decoded event into
//! retained state publications.
//!
//! Failure policy differs between the two phases: a configuration
//! publish failure aborts startup, while a state publish failure is
//! logged per capability and the remaining publications for the same
//! event are still attempted.

use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{error, info, warn};

use super::{
    discovery::Configuration,
    event::{decode, EventKind, SensorEvent},
    topic::{topic, Capability, Endpoint},
};

/// Acknowledgement level requested for every publish: exactly-once.
const STATE_QOS: u8 = 2;

/// Wire encoding of a published value.
///
/// The discovery consumer expects binary-sensor states as the literal
/// `ON`/`OFF` tokens; everything else goes out as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Flag(bool),
    Json(Vec<u8>),
}

impl Payload {
    pub fn flag(on: bool) -> Self {
        Payload::Flag(on)
    }

    /// Encodes any serializable value as a JSON payload.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Payload::Json(serde_json::to_vec(value)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Flag(true) => b"ON",
            Payload::Flag(false) => b"OFF",
            Payload::Json(bytes) => bytes,
        }
    }
}

/// Error produced by a broker publish, opaque to the bridge.
pub type PublishError = Box<dyn std::error::Error + Send + Sync>;

/// The narrow contract the bridge has with the broker connection.
///
/// Completion of the returned future is the acknowledgement wait; the
/// implementation decides how delivery is tracked. Implementations
/// must be safe for concurrent calls over one shared connection.
#[async_trait::async_trait]
pub trait StatePublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &Payload) -> Result<(), PublishError>;
}

/// Broker-backed publisher. Every publish is retained; the broker
/// keeps the last value per topic across subscriber reconnects.
#[async_trait::async_trait]
impl StatePublisher for leakwatch_mqtt::Publisher {
    async fn publish(&self, topic: &str, payload: &Payload) -> Result<(), PublishError> {
        leakwatch_mqtt::Publisher::publish(self, topic, payload.as_bytes().to_vec(), STATE_QOS, true)
            .await
            .map_err(|e| Box::new(e) as PublishError)
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// A discovery configuration did not serialize.
    #[error("could not encode {capability} configuration: {source}")]
    Encode {
        capability: Capability,
        source: serde_json::Error,
    },

    /// A discovery configuration publish was not acknowledged.
    #[error("could not publish {capability} configuration: {reason}")]
    Publish {
        capability: Capability,
        reason: PublishError,
    },

    /// Registration failed for one device; remaining devices were not
    /// attempted.
    #[error("could not configure {id} ({location}): {source}")]
    Configure {
        id: String,
        location: String,
        source: Box<BridgeError>,
    },

    /// The decoder stream failed mid-read.
    #[error("could not read line: {0}")]
    Read(#[from] std::io::Error),

    /// The decoder stream reached end of input.
    #[error("decoder stream closed")]
    StreamClosed,
}

/// Connects the decoded event stream to topic-addressed publications.
pub struct Bridge {
    publisher: Arc<dyn StatePublisher>,
    prefix: String,
    devices: HashMap<String, String>,
}

impl Bridge {
    /// Creates a bridge over a shared broker handle.
    ///
    /// `devices` maps transmitter id to a human-readable location and
    /// is never mutated afterwards.
    pub fn new(
        publisher: Arc<dyn StatePublisher>,
        prefix: impl Into<String>,
        devices: HashMap<String, String>,
    ) -> Self {
        Self {
            publisher,
            prefix: prefix.into(),
            devices,
        }
    }

    /// Location label for a device, empty for ids missing from the
    /// registry.
    fn location(&self, id: &str) -> &str {
        self.devices.get(id).map(String::as_str).unwrap_or_default()
    }

    /// Publishes discovery configurations for every registered device.
    ///
    /// Devices are processed sequentially; the first failure aborts the
    /// remaining devices. Configurations already accepted by the broker
    /// are not withdrawn.
    pub async fn configure_devices(&self) -> Result<(), BridgeError> {
        for (id, location) in &self.devices {
            self.configure_device(id, location)
                .await
                .map_err(|source| BridgeError::Configure {
                    id: id.clone(),
                    location: location.clone(),
                    source: Box::new(source),
                })?;
        }
        info!("devices configured");
        Ok(())
    }

    /// Announces all four capabilities of one device. The publishes are
    /// issued concurrently and jointly awaited.
    async fn configure_device(&self, id: &str, location: &str) -> Result<(), BridgeError> {
        tokio::try_join!(
            self.publish_configuration(id, location, Capability::BatteryHealth),
            self.publish_configuration(id, location, Capability::BatteryLevel),
            self.publish_configuration(id, location, Capability::LastSeen),
            self.publish_configuration(id, location, Capability::Moisture),
        )?;
        Ok(())
    }

    async fn publish_configuration(
        &self,
        id: &str,
        location: &str,
        capability: Capability,
    ) -> Result<(), BridgeError> {
        let configuration = Configuration::new(&self.prefix, id, location, capability);
        let payload = Payload::json(&configuration)
            .map_err(|source| BridgeError::Encode { capability, source })?;
        let topic = topic(&self.prefix, id, capability, Endpoint::Config);

        self.publisher
            .publish(&topic, &payload)
            .await
            .map_err(|reason| BridgeError::Publish { capability, reason })
    }

    /// Best-effort state publish; failures are logged per capability.
    async fn publish_state(&self, id: &str, capability: Capability, payload: Payload) {
        let topic = topic(&self.prefix, id, capability, Endpoint::Set);
        if let Err(e) = self.publisher.publish(&topic, &payload).await {
            error!("could not publish {} for {}: {}", capability, id, e);
        }
    }

    async fn publish_json<T: Serialize>(&self, id: &str, capability: Capability, value: &T) {
        match Payload::json(value) {
            Ok(payload) => self.publish_state(id, capability, payload).await,
            Err(e) => error!("could not encode {} for {}: {}", capability, id, e),
        }
    }

    /// Translates one decoded event into its state publications.
    ///
    /// Every event, whatever its kind, refreshes the device's last-seen
    /// topic with the event timestamp.
    pub async fn dispatch(&self, event: &SensorEvent) {
        let id = event.id.to_string();
        match event.kind() {
            EventKind::BatteryReport => {
                let ok = event.battery_is_ok();
                let volts = event.battery_volts();
                info!(
                    "battery report from {} ({}): ok: {}, {:.2}V",
                    id,
                    self.location(&id),
                    ok,
                    volts
                );
                // the consumer's battery class reads ON as "problem detected"
                self.publish_state(&id, Capability::BatteryHealth, Payload::flag(!ok))
                    .await;
                self.publish_json(&id, Capability::BatteryLevel, &volts).await;
            }
            EventKind::WaterLeak => {
                info!("water leak detected from {} ({})", id, self.location(&id));
                self.publish_state(&id, Capability::Moisture, Payload::flag(true))
                    .await;
            }
            EventKind::ButtonPress => {
                info!("water leak cleared from {} ({})", id, self.location(&id));
                self.publish_state(&id, Capability::Moisture, Payload::flag(false))
                    .await;
            }
            EventKind::Unknown => {
                warn!("unknown event `{}` from {}", event.event, id);
            }
        }
        self.publish_json(&id, Capability::LastSeen, &event.time).await;
    }

    /// Runs the ingestion loop over a line-oriented byte stream.
    ///
    /// One line is fully decoded and dispatched before the next is
    /// read. Rejected lines are logged and skipped. Returns an error
    /// when the stream ends or fails; there is no reconnect.
    pub async fn monitor<R>(&self, reader: R) -> Result<(), BridgeError>
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        loop {
            let line = lines
                .next_line()
                .await?
                .ok_or(BridgeError::StreamClosed)?;

            match decode(&line) {
                Ok(event) => self.dispatch(&event).await,
                Err(e) => warn!("{}", e),
            }
        }
    }
}
