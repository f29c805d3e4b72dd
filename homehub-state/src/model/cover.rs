//! Cover entity state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Context;

/// Movement/position state of a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverPosition {
    Opening,
    Closing,
    Closed,
    Open,
    Stopped,
    #[serde(other)]
    Unavailable,
}

/// Device class of a cover as reported by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverClass {
    Shutter,
    Blind,
    Curtain,
    Shade,
    Garage,
    Awning,
    Damper,
    Door,
    Gate,
    Window,
    #[serde(other)]
    Other,
}

/// Live state of a cover entity.
///
/// Virtual covers derived from door/window sensors flow through the same
/// type and are indistinguishable from hub-native covers downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverState {
    pub entity_id: String,
    pub state: CoverPosition,
    #[serde(default)]
    pub attributes: CoverAttributes,
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
pub struct CoverAttributes {
    pub device_class: Option<CoverClass>,
    pub friendly_name: Option<String>,
    /// Opening position between 0 and 100
    pub current_position: Option<u8>,
    /// Tilt position between 0 and 100
    pub current_tilt_position: Option<u8>,
    /// Bitmask of supported commands
    pub supported_features: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
