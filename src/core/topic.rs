//! Topic name derivation.
//!
//! Every topic this bridge touches has the shape
//! `<prefix>/<component>/Govee_<id>_<capability>/<endpoint>`. The
//! discovery consumer matches on these names exactly, so they are built
//! in one place from compile-time templates.

use std::fmt;

/// Vendor tag used in topic names and unique identifiers.
pub const VENDOR: &str = "Govee";

/// The four monitored facets of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    BatteryHealth,
    BatteryLevel,
    LastSeen,
    Moisture,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::BatteryHealth,
        Capability::BatteryLevel,
        Capability::LastSeen,
        Capability::Moisture,
    ];

    /// Home Assistant component the capability is announced under.
    fn component(self) -> &'static str {
        match self {
            Capability::BatteryHealth | Capability::Moisture => "binary_sensor",
            Capability::BatteryLevel | Capability::LastSeen => "sensor",
        }
    }

    /// Topic and unique-id suffix.
    pub fn suffix(self) -> &'static str {
        match self {
            Capability::BatteryHealth => "battery_health",
            Capability::BatteryLevel => "battery_level",
            Capability::LastSeen => "last_seen",
            Capability::Moisture => "moisture",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Distinguishes a capability's configuration topic from its live
/// value topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Config,
    Set,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Endpoint::Config => "config",
            Endpoint::Set => "set",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the topic for one (device, capability, endpoint) triple.
pub fn topic(prefix: &str, id: &str, capability: Capability, endpoint: Endpoint) -> String {
    format!(
        "{}/{}/{}_{}_{}/{}",
        prefix,
        capability.component(),
        VENDOR,
        id,
        capability.suffix(),
        endpoint
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_match_discovery_convention() {
        assert_eq!(
            topic("homeassistant", "12345", Capability::BatteryHealth, Endpoint::Config),
            "homeassistant/binary_sensor/Govee_12345_battery_health/config"
        );
        assert_eq!(
            topic("homeassistant", "12345", Capability::BatteryLevel, Endpoint::Set),
            "homeassistant/sensor/Govee_12345_battery_level/set"
        );
        assert_eq!(
            topic("homeassistant", "54321", Capability::LastSeen, Endpoint::Set),
            "homeassistant/sensor/Govee_54321_last_seen/set"
        );
        assert_eq!(
            topic("ha", "54321", Capability::Moisture, Endpoint::Config),
            "ha/binary_sensor/Govee_54321_moisture/config"
        );
    }

    #[test]
    fn all_lists_every_capability_once() {
        assert_eq!(Capability::ALL.len(), 4);
        for capability in Capability::ALL {
            assert_eq!(
                Capability::ALL.iter().filter(|c| **c == capability).count(),
                1
            );
        }
    }
}
