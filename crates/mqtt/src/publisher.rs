//! Message publishing.
//!
//! A thin wrapper around `AsyncClient` that maps a plain `u8` QoS to
//! the protocol enum and turns queueing failures into [`TransferError`].
//! Awaiting [`Publisher::publish`] is the acknowledgement wait from the
//! caller's point of view; delivery tracking for QoS 1 and 2 packets
//! happens inside the event loop driven by the supervisor.

use rumqttc::{AsyncClient, QoS};

use super::error::TransferError;

/// Publishes raw payloads to broker topics.
///
/// Cloneable; concurrent publishes from multiple tasks over one shared
/// connection are safe.
#[derive(Clone)]
pub struct Publisher {
    client: AsyncClient,
}

impl Publisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &AsyncClient {
        &self.client
    }

    /// Publishes `payload` to `topic`.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::InvalidMetadata` when `qos` is not 0, 1,
    /// or 2, and `TransferError::ClientTransfer` when the packet cannot
    /// be queued.
    pub async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: u8,
        retain: bool,
    ) -> Result<(), TransferError> {
        let qos = match qos {
            0 => QoS::AtMostOnce,
            1 => QoS::AtLeastOnce,
            2 => QoS::ExactlyOnce,
            _ => {
                return Err(TransferError::InvalidMetadata(
                    "invalid QoS value".to_string(),
                ))
            }
        };

        self.client.publish(topic, qos, retain, payload).await?;
        Ok(())
    }
}
