//! Logging initialization.
//!
//! Installs the global `tracing` subscriber with a console layer in the
//! configured format and, optionally, a journald layer. Called once at
//! startup, after the configuration file has been loaded and validated.

use std::io;

use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use crate::{
    config::logger::{LogFormat, LoggerConfig},
    print_warn,
};

/// Errors that can occur during logger initialization.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Failure to parse an environment-based filter directive.
    #[error("Environment filter error: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::FromEnvError),

    /// IO error, typically while opening the journald socket.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No output layers were enabled in the configuration.
    #[error("No logging layers were configured")]
    NoLayersConfigured,
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Initializes the global subscriber from the logging configuration.
///
/// `RUST_LOG` overrides the configured level when present. Journald
/// failures are downgraded to a warning as long as console output is
/// available.
pub fn init(config: &LoggerConfig) -> Result<(), LoggerError> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console.enabled {
        layers.push(console_layer(config, env_filter(config)));
    }

    if config.journald.enabled {
        match tracing_journald::layer() {
            Ok(layer) => layers.push(layer.with_filter(env_filter(config)).boxed()),
            Err(e) => {
                print_warn!("Failed to initialize journald logger: {}", e);
                if !config.console.enabled {
                    return Err(LoggerError::Io(e));
                }
            }
        }
    }

    if layers.is_empty() {
        return Err(LoggerError::NoLayersConfigured);
    }

    tracing_subscriber::registry().with(layers).init();
    Ok(())
}

fn env_filter(config: &LoggerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

fn console_layer(config: &LoggerConfig, filter: EnvFilter) -> BoxedLayer {
    let console = &config.console;
    match console.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_ansi(console.ansi_colors)
            .with_writer(io::stdout)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(console.ansi_colors)
            .with_writer(io::stdout)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(console.ansi_colors)
            .with_writer(io::stdout)
            .with_filter(filter)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::logger::{ConsoleConfig, JournaldConfig};

    #[test]
    fn no_enabled_outputs_is_an_error() {
        let config = LoggerConfig {
            console: ConsoleConfig {
                enabled: false,
                ..ConsoleConfig::default()
            },
            journald: JournaldConfig { enabled: false },
            ..LoggerConfig::default()
        };

        assert!(matches!(init(&config), Err(LoggerError::NoLayersConfigured)));
    }
}
