//! Typed entity state as the hub serves it.
//!
//! Every domain shares the same base shape (entity id, state string,
//! attributes, timestamps, event context) with a domain-specific
//! attribute payload. The domain tag in the entity id selects which typed
//! variant a raw state body parses into.

mod binary_sensor;
mod cover;
mod light;

pub use binary_sensor::{BinarySensorAttributes, BinarySensorState, SensorClass};
pub use cover::{CoverAttributes, CoverClass, CoverPosition, CoverState};
pub use light::{LightAttributes, LightState};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity domains this SDK keeps stores for.
///
/// The hub streams events for many more domains; anything not listed here
/// is ignored by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Light,
    Cover,
    BinarySensor,
}

impl Domain {
    /// Parse the domain prefix of an entity id.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Domain::Light),
            "cover" => Some(Domain::Cover),
            "binary_sensor" => Some(Domain::BinarySensor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Light => "light",
            Domain::Cover => "cover",
            Domain::BinarySensor => "binary_sensor",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split an entity id into its domain prefix and object id.
///
/// Returns `None` unless there is a `.` with a non-empty left part.
pub fn split_entity_id(entity_id: &str) -> Option<(&str, &str)> {
    match entity_id.split_once('.') {
        Some((domain, object_id)) if !domain.is_empty() => Some((domain, object_id)),
        _ => None,
    }
}

/// Binary on/off state shared by lights and binary sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnOff {
    On,
    Off,
    /// Anything else the hub reports (`unavailable`, `unknown`, ...)
    #[serde(other)]
    Unavailable,
}

/// Origin context attached to events and states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_entity_id_takes_first_dot() {
        assert_eq!(
            split_entity_id("light.kitchen.main"),
            Some(("light", "kitchen.main"))
        );
        assert_eq!(split_entity_id("nodot"), None);
        assert_eq!(split_entity_id(".leading"), None);
    }

    #[test]
    fn domain_round_trips() {
        assert_eq!(Domain::parse("binary_sensor"), Some(Domain::BinarySensor));
        assert_eq!(Domain::parse("climate"), None);
        assert_eq!(Domain::Cover.as_str(), "cover");
    }

    #[test]
    fn on_off_tolerates_unknown_states() {
        let state: OnOff = serde_json::from_str("\"unavailable\"").unwrap();
        assert_eq!(state, OnOff::Unavailable);
        let state: OnOff = serde_json::from_str("\"on\"").unwrap();
        assert_eq!(state, OnOff::On);
    }
}
