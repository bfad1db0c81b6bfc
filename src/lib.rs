//! leakwatch: rtl_433 to Home Assistant MQTT bridge
//!
//! Listens to a Govee H5054 water-leak sensor fleet through an rtl_433
//! decoder process and republishes everything to an MQTT broker in
//! Home Assistant's discovery format: each configured device is
//! announced once at startup, then live state (moisture, battery
//! health, battery voltage, last-seen timestamp) flows as retained
//! messages while decoder output arrives.
//!
//! ## Modules
//!
//! * `config`: TOML configuration loading and validation for logging,
//!   broker, decoder process, and the device registry.
//!
//! * `core`: the pipeline itself. Decoder process source, event
//!   decoding and classification, topic derivation, discovery
//!   configurations, and the bridge with its ingestion loop.
//!
//! * `logger`: `tracing` subscriber setup (console and optional
//!   journald output).
//!
//! The broker connection lives in the workspace crate
//! `leakwatch-mqtt`.

pub mod config;
pub mod core;
pub mod logger;
