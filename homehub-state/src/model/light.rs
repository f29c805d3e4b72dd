//! Light entity state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Context, OnOff};

/// Live state of a light entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub entity_id: String,
    pub state: OnOff,
    #[serde(default)]
    pub attributes: LightAttributes,
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
pub struct LightAttributes {
    pub friendly_name: Option<String>,
    /// Brightness between 1 and 255, only present while on
    pub brightness: Option<u8>,
    pub rgb_color: Option<[u8; 3]>,
    pub hs_color: Option<[f64; 2]>,
    pub xy_color: Option<[f64; 2]>,
    pub color_temp_kelvin: Option<u32>,
    pub min_color_temp_kelvin: Option<u32>,
    pub max_color_temp_kelvin: Option<u32>,
    pub supported_features: u32,
    /// Anything else the integration reports (effect lists, link quality, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
