//! Decoding of rtl_433 event records.
//!
//! rtl_433 emits one JSON object per line on stdout. Each line is
//! decoded into a [`SensorEvent`], rejected if it does not parse or
//! does not come from the supported sensor model, and classified into
//! an [`EventKind`] for dispatch.

use serde::Deserialize;
use thiserror::Error;

/// The only sensor model this bridge understands.
pub const MODEL_GOVEE_WATER: &str = "Govee-Water";

const EVENT_BATTERY_REPORT: &str = "Battery Report";
const EVENT_WATER_LEAK: &str = "Water Leak";
const EVENT_BUTTON_PRESS: &str = "Button Press";

/// One decoded rtl_433 record.
///
/// Fields absent from the input line are left at their zero values;
/// fields the decoder does not know about are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SensorEvent {
    /// Event timestamp as emitted by rtl_433 (ISO-8601 local time).
    pub time: String,

    /// Transmitter identifier.
    pub id: u32,

    /// Device model tag.
    pub model: String,

    /// Raw event name, see [`SensorEvent::kind`].
    pub event: String,

    /// Battery state flag, 1 when the battery is healthy.
    pub battery_ok: f32,

    /// Battery voltage in millivolts.
    #[serde(rename = "battery_mV")]
    pub battery_mv: i32,
}

impl SensorEvent {
    /// Classifies the raw `event` string.
    pub fn kind(&self) -> EventKind {
        match self.event.as_str() {
            EVENT_BATTERY_REPORT => EventKind::BatteryReport,
            EVENT_WATER_LEAK => EventKind::WaterLeak,
            EVENT_BUTTON_PRESS => EventKind::ButtonPress,
            _ => EventKind::Unknown,
        }
    }

    /// Whether the sensor reports its battery as healthy.
    pub fn battery_is_ok(&self) -> bool {
        self.battery_ok == 1.0
    }

    /// Battery voltage in volts.
    pub fn battery_volts(&self) -> f32 {
        self.battery_mv as f32 / 1000.0
    }
}

/// What a record means for dispatch.
///
/// Event names are matched exactly; anything unrecognized falls through
/// to `Unknown` so that new firmware event types still refresh the
/// device's last-seen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    BatteryReport,
    WaterLeak,
    ButtonPress,
    Unknown,
}

/// Reasons a line is rejected. Both are per-line and non-fatal.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not decode line `{line}`: {source}")]
    Json {
        line: String,
        source: serde_json::Error,
    },

    #[error("unknown model `{model}` for {id}")]
    UnknownModel { id: u32, model: String },
}

/// Decodes one stdout line into a [`SensorEvent`].
pub fn decode(line: &str) -> Result<SensorEvent, DecodeError> {
    let event: SensorEvent = serde_json::from_str(line).map_err(|source| DecodeError::Json {
        line: line.to_string(),
        source,
    })?;

    if event.model != MODEL_GOVEE_WATER {
        return Err(DecodeError::UnknownModel {
            id: event.id,
            model: event.model,
        });
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATTERY_LINE: &str = r#"{"time":"2024-01-01T00:00:00","id":12345,"model":"Govee-Water","event":"Battery Report","battery_ok":0,"battery_mV":2600}"#;

    #[test]
    fn decodes_battery_report() {
        let event = decode(BATTERY_LINE).unwrap();
        assert_eq!(event.time, "2024-01-01T00:00:00");
        assert_eq!(event.id, 12345);
        assert_eq!(event.kind(), EventKind::BatteryReport);
        assert!(!event.battery_is_ok());
        assert!((event.battery_volts() - 2.6).abs() < f32::EPSILON);
    }

    #[test]
    fn classifies_all_event_kinds() {
        let mut event = SensorEvent {
            event: "Water Leak".into(),
            ..SensorEvent::default()
        };
        assert_eq!(event.kind(), EventKind::WaterLeak);

        event.event = "Button Press".into();
        assert_eq!(event.kind(), EventKind::ButtonPress);

        event.event = "Battery Report".into();
        assert_eq!(event.kind(), EventKind::BatteryReport);

        event.event = "Firmware Update".into();
        assert_eq!(event.kind(), EventKind::Unknown);

        // near-misses must not match
        event.event = "battery report".into();
        assert_eq!(event.kind(), EventKind::Unknown);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json { .. }));
        assert!(err.to_string().contains("{not json"));
    }

    #[test]
    fn rejects_unknown_model() {
        let err = decode(r#"{"id":7,"model":"Other","event":"Water Leak"}"#).unwrap_err();
        match err {
            DecodeError::UnknownModel { id, model } => {
                assert_eq!(id, 7);
                assert_eq!(model, "Other");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let event = decode(r#"{"model":"Govee-Water"}"#).unwrap();
        assert_eq!(event.id, 0);
        assert_eq!(event.battery_mv, 0);
        assert!(event.time.is_empty());
        assert_eq!(event.kind(), EventKind::Unknown);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let event = decode(
            r#"{"model":"Govee-Water","event":"Water Leak","id":9,"mic":"CRC","channel":1}"#,
        )
        .unwrap();
        assert_eq!(event.id, 9);
        assert_eq!(event.kind(), EventKind::WaterLeak);
    }
}
