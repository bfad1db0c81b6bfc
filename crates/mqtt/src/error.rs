//! Error handling for broker operations.
//!
//! `TransferError` is the unified error type for everything this crate
//! does: configuration validation, client construction, publishing, and
//! the initial connection handshake. Callers decide per call site
//! whether a variant is fatal (startup paths) or logged and skipped
//! (per-publish paths).

use thiserror::Error;

/// The unified error type for broker client operations.
#[derive(Debug, Error)]
pub enum TransferError {
    /// A publish parameter is out of range, e.g. a QoS value that is
    /// not 0, 1, or 2. This is a programming error at the call site.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Client construction failed before any network activity.
    #[error("client setup error: {0}")]
    ClientSetup(String),

    /// Configuration validation failed. Caught at startup when the
    /// config file is loaded; the process should not continue.
    #[error("configuration error: {0}")]
    Config(#[from] validator::ValidationErrors),

    /// The local client could not queue a packet, typically because the
    /// request channel is full or the event loop has stopped.
    #[error("client transfer error: {0}")]
    ClientTransfer(#[from] rumqttc::ClientError),

    /// The broker connection could not be established. Reported by
    /// [`Supervisor::wait_connected`](crate::Supervisor::wait_connected)
    /// during the startup handshake.
    #[error("could not connect: {0}")]
    Connect(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = TransferError::InvalidMetadata("invalid QoS value".into());
        assert_eq!(err.to_string(), "invalid metadata: invalid QoS value");

        let err = TransferError::Connect("connection refused".into());
        assert_eq!(err.to_string(), "could not connect: connection refused");
    }

    #[test]
    fn is_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(TransferError::ClientSetup("bad host".into()));
        assert!(err.to_string().contains("bad host"));
    }
}
