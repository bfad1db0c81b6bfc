//! Connection supervision.
//!
//! The `Supervisor` owns the single task that drives rumqttc's
//! `EventLoop` for the lifetime of the process. Connection state is
//! published through a `tokio::sync::watch` channel so that any number
//! of observers can react to it; the bridge uses this once, at startup,
//! to block until the CONNACK handshake completes.

use std::{fmt, time::Duration};

use rumqttc::{ConnectReturnCode, Event, EventLoop, Packet};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use super::error::TransferError;

/// Delay before the event loop is polled again after a connection
/// error, to avoid a hot reconnect loop against an unreachable broker.
const REPOLL_DELAY: Duration = Duration::from_secs(1);

/// Observable state of the broker connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// CONNECT sent, waiting for CONNACK.
    Connecting,
    /// Handshake complete; publishes are flowing.
    Connected,
    /// The connection failed or was lost, with the reason.
    Disconnected(String),
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Disconnected(reason) => write!(f, "Disconnected ({reason})"),
        }
    }
}

/// Drives the MQTT event loop and tracks connection state.
pub struct Supervisor {
    state_rx: watch::Receiver<ConnectionState>,
}

impl Supervisor {
    /// Spawns the event loop driver task and returns its handle.
    pub fn start(event_loop: EventLoop) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        tokio::spawn(run(event_loop, state_tx));
        Self { state_rx }
    }

    /// Returns a receiver observing connection state transitions.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Waits for the initial handshake to complete.
    ///
    /// Returns `Ok(())` on the first CONNACK and an error on the first
    /// connection failure, whichever comes first. There is no timeout;
    /// the caller blocks until the broker answers one way or the other.
    pub async fn wait_connected(&self) -> Result<(), TransferError> {
        let mut rx = self.state_rx.clone();
        loop {
            let state = rx.borrow_and_update().clone();
            match state {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Disconnected(reason) => {
                    return Err(TransferError::Connect(reason));
                }
                ConnectionState::Connecting => {
                    if rx.changed().await.is_err() {
                        return Err(TransferError::Connect("supervisor stopped".to_string()));
                    }
                }
            }
        }
    }
}

/// The event loop driver. Polls until the process exits.
async fn run(mut event_loop: EventLoop, state_tx: watch::Sender<ConnectionState>) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    debug!("mqtt: connection acknowledged");
                    let _ = state_tx.send(ConnectionState::Connected);
                } else {
                    warn!("mqtt: connection refused: {:?}", ack.code);
                    let _ = state_tx.send(ConnectionState::Disconnected(format!(
                        "connection refused: {:?}",
                        ack.code
                    )));
                }
            }
            Ok(event) => trace!("mqtt: event: {:?}", event),
            Err(e) => {
                warn!("mqtt: connection error: {}", e);
                let _ = state_tx.send(ConnectionState::Disconnected(e.to_string()));
                // rumqttc reconnects on the next poll
                tokio::time::sleep(REPOLL_DELAY).await;
                let _ = state_tx.send(ConnectionState::Connecting);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientBuilder;

    #[test]
    fn state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
        assert_eq!(ConnectionState::Connected.to_string(), "Connected");
        assert_eq!(
            ConnectionState::Disconnected("broker gone".into()).to_string(),
            "Disconnected (broker gone)"
        );
    }

    #[tokio::test]
    async fn wait_connected_fails_without_broker() {
        // Nothing listens on this port; the first poll yields a
        // connection error and the handshake wait reports it.
        let (_client, event_loop) = ClientBuilder::new("test_client", "127.0.0.1", 18830).build();
        let supervisor = Supervisor::start(event_loop);

        let result = supervisor.wait_connected().await;
        assert!(matches!(result, Err(TransferError::Connect(_))));
    }
}
