use std::{process, sync::Arc};

use leakwatch::{
    config::Config,
    core::{bridge::Bridge, source},
    logger, print_error,
};
use leakwatch_mqtt::{ClientBuilder, Publisher, Supervisor};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cfg = Config::new().unwrap_or_else(|e| {
        print_error!("{}", e);
        process::exit(1);
    });

    logger::init(&cfg.logger).unwrap_or_else(|e| {
        print_error!("Failed to initialize logger: {}", e);
        process::exit(1);
    });

    info!("Starting leakwatch version {}...", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", cfg.logger.level);
    for (id, location) in &cfg.devices {
        info!("monitoring device {} ({})", id, location);
    }

    let (client, event_loop) = ClientBuilder::from_config(&cfg.mqtt)
        .unwrap_or_else(|e| {
            error!("Failed to create MQTT client: {}", e);
            process::exit(1);
        })
        .build();

    let supervisor = Supervisor::start(event_loop);
    supervisor.wait_connected().await.unwrap_or_else(|e| {
        error!("could not start mqtt service: {}", e);
        process::exit(1);
    });
    info!("mqtt: connected");

    let publisher = Arc::new(Publisher::new(client));
    let bridge = Bridge::new(publisher, cfg.mqtt.prefix.clone(), cfg.devices.clone());

    bridge.configure_devices().await.unwrap_or_else(|e| {
        error!("could not configure devices: {}", e);
        process::exit(1);
    });

    let stdout = source::spawn(&cfg.rtl433).unwrap_or_else(|e| {
        error!("could not start rtl_433: {}", e);
        process::exit(1);
    });

    tokio::select! {
        result = bridge.monitor(stdout) => {
            if let Err(e) = result {
                error!("error while monitoring rtl_433: {}", e);
                process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
}
