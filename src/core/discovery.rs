//! Home Assistant discovery configurations.
//!
//! One retained configuration message per (device, capability) pair
//! tells the discovery consumer what entity to create and which topic
//! carries its live value. Field names follow Home Assistant's
//! abbreviated MQTT discovery schema.

use serde::Serialize;

use super::topic::{topic, Capability, Endpoint, VENDOR};

/// Sensor model announced in the device descriptor.
const MODEL_NAME: &str = "H5054";

/// Owning-device descriptor, shared by all four configurations of one
/// physical sensor so the consumer groups them under a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    #[serde(rename = "ids")]
    pub id: String,
    #[serde(rename = "mf")]
    pub manufacturer: String,
    #[serde(rename = "mdl")]
    pub model: String,
    pub name: String,
}

impl Device {
    pub fn new(id: &str, location: &str) -> Self {
        Device {
            id: format!("{VENDOR}_{id}"),
            manufacturer: VENDOR.to_string(),
            model: MODEL_NAME.to_string(),
            name: format!("{location} Water Sensor"),
        }
    }
}

/// Discovery configuration for a single capability of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub name: String,
    #[serde(rename = "uniq_id")]
    pub unique_id: String,
    #[serde(rename = "dev")]
    pub device: Device,
    #[serde(rename = "dev_cla", skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    #[serde(rename = "ent_cat", skip_serializing_if = "Option::is_none")]
    pub entity_category: Option<&'static str>,
    #[serde(rename = "stat_cla", skip_serializing_if = "Option::is_none")]
    pub state_class: Option<&'static str>,
    #[serde(rename = "stat_t")]
    pub state_topic: String,
    #[serde(rename = "val_tpl", skip_serializing_if = "Option::is_none")]
    pub value_template: Option<&'static str>,
    #[serde(rename = "unit_of_meas", skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

impl Configuration {
    /// Builds the configuration for one capability of one device.
    ///
    /// The declared state topic is always the capability's `set`
    /// endpoint, which is where subsequent state updates land.
    pub fn new(prefix: &str, id: &str, location: &str, capability: Capability) -> Self {
        let base = Configuration {
            name: String::new(),
            unique_id: format!("{VENDOR}_{id}_{}", capability.suffix()),
            device: Device::new(id, location),
            device_class: None,
            entity_category: None,
            state_class: None,
            state_topic: topic(prefix, id, capability, Endpoint::Set),
            value_template: None,
            unit: None,
        };

        match capability {
            Capability::BatteryHealth => Configuration {
                name: format!("{location} Water Sensor Battery Health"),
                device_class: Some("battery"),
                entity_category: Some("diagnostic"),
                ..base
            },
            Capability::BatteryLevel => Configuration {
                name: format!("{location} Water Sensor Battery Level"),
                device_class: Some("voltage"),
                entity_category: Some("diagnostic"),
                state_class: Some("measurement"),
                unit: Some("V"),
                ..base
            },
            Capability::LastSeen => Configuration {
                name: format!("{location} Water Sensor Last Seen"),
                device_class: Some("timestamp"),
                entity_category: Some("diagnostic"),
                state_class: Some("measurement"),
                value_template: Some("{{ value_json | as_datetime }}"),
                ..base
            },
            Capability::Moisture => Configuration {
                name: format!("{location} Water Sensor Water Detected"),
                device_class: Some("moisture"),
                ..base
            },
        }
    }
}
