//! rtl_433 process management.
//!
//! Spawns the decoder with JSON output on stdout and hands the stdout
//! pipe to the ingestion loop. The decoder's stderr goes straight to
//! ours. A background task observes the child so its exit status ends
//! up in the logs; the ingestion loop notices the death independently,
//! through the closed pipe.

use std::process::Stdio;

use thiserror::Error;
use tokio::process::{ChildStdout, Command};
use tracing::{info, warn};

use crate::config::Rtl433Config;

/// Arguments selecting the Govee water sensor protocol and the line
/// format the decoder expects downstream.
const RTL433_ARGS: [&str; 6] = ["-R", "192", "-F", "json", "-M", "time:iso:tz:local"];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not start {path}: {source}")]
    Spawn {
        path: String,
        source: std::io::Error,
    },

    #[error("decoder stdout was not captured")]
    Stdout,
}

/// Starts the decoder process and returns its stdout stream.
pub fn spawn(config: &Rtl433Config) -> Result<ChildStdout, SourceError> {
    let mut child = Command::new(&config.path)
        .args(RTL433_ARGS)
        .args(&config.extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| SourceError::Spawn {
            path: config.path.clone(),
            source,
        })?;

    let stdout = child.stdout.take().ok_or(SourceError::Stdout)?;
    info!("rtl_433: started successfully");

    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => info!("rtl_433: exited successfully"),
            Ok(status) => warn!("rtl_433: exited with nonzero status: {}", status),
            Err(e) => warn!("rtl_433: could not observe exit: {}", e),
        }
    });

    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_reports_path() {
        let config = Rtl433Config {
            path: "/nonexistent/rtl_433".into(),
            extra_args: Vec::new(),
        };

        let err = spawn(&config).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rtl_433"));
    }

    #[tokio::test]
    async fn spawn_pipes_decoder_stdout() {
        use tokio::io::AsyncReadExt;

        // echo stands in for the decoder and prints its arguments
        let config = Rtl433Config {
            path: "echo".into(),
            extra_args: vec!["done".into()],
        };

        let mut stdout = spawn(&config).unwrap();
        let mut buffer = String::new();
        stdout.read_to_string(&mut buffer).await.unwrap();
        assert!(buffer.contains("-R 192 -F json"));
        assert!(buffer.trim_end().ends_with("done"));
    }
}
