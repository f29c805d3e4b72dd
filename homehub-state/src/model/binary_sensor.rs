//! Binary sensor entity state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Context, OnOff};

/// Device class of a binary sensor.
///
/// Only door-like classes feed the virtual cover derivation, but the full
/// set decodes so every sensor lands in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorClass {
    Battery,
    BatteryCharging,
    CarbonMonoxide,
    Cold,
    Connectivity,
    Door,
    GarageDoor,
    Gas,
    Heat,
    Light,
    Lock,
    Moisture,
    Motion,
    Moving,
    Occupancy,
    Opening,
    Plug,
    Power,
    Presence,
    Problem,
    Running,
    Safety,
    Smoke,
    Sound,
    Tamper,
    Update,
    Vibration,
    Window,
    #[serde(other)]
    Other,
}

/// Live state of a binary sensor entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinarySensorState {
    pub entity_id: String,
    pub state: OnOff,
    #[serde(default)]
    pub attributes: BinarySensorAttributes,
    #[serde(default)]
    pub last_changed: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub context: Option<Context>,
    /// Resolved location membership; absent until the registry has loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarySensorAttributes {
    pub device_class: Option<SensorClass>,
    pub friendly_name: Option<String>,
    /// Battery percentage
    pub battery: Option<f64>,
    pub contact: Option<bool>,
    pub last_seen: Option<String>,
    pub voltage: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_reed_contact() {
        let state: BinarySensorState = serde_json::from_str(
            r#"{
                "entity_id": "binary_sensor.entrance_door",
                "state": "off",
                "attributes": {
                    "device_class": "door",
                    "friendly_name": "Entrance Door",
                    "battery": 63,
                    "contact": true,
                    "power_outage_count": 1408
                }
            }"#,
        )
        .unwrap();

        assert_eq!(state.state, OnOff::Off);
        assert_eq!(state.attributes.device_class, Some(SensorClass::Door));
        assert_eq!(state.attributes.battery, Some(63.0));
        assert_eq!(state.attributes.extra["power_outage_count"], 1408);
    }
}
