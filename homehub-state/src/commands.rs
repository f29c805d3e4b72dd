//! Outbound hub command shapes and UI-originated intents.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A `call_service` message ready to be written to the hub.
///
/// The transport embeds the message id; this type only carries the service
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub domain: &'static str,
    pub service: &'static str,
    pub entity_id: String,
    pub data: Option<Map<String, Value>>,
}

impl ServiceCall {
    pub fn new(domain: &'static str, service: &'static str, entity_id: impl Into<String>) -> Self {
        Self {
            domain,
            service,
            entity_id: entity_id.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Render the wire message, without an id.
    pub fn into_message(self) -> Value {
        let mut msg = json!({
            "type": "call_service",
            "domain": self.domain,
            "service": self.service,
            "target": { "entity_id": self.entity_id },
        });
        if let Some(data) = self.data {
            msg["service_data"] = Value::Object(data);
        }
        msg
    }
}

/// Switch target for a light command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightSwitch {
    On,
    Off,
    /// Flip based on the currently known state
    Toggle,
}

/// Color payload for a light turn-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightColor {
    Named(String),
    Rgb([u8; 3]),
    Hs([f64; 2]),
    Xy([f64; 2]),
    ColorTempKelvin(u32),
}

/// A UI-originated light intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCommand {
    pub ident: String,
    pub state: LightSwitch,
    #[serde(default)]
    pub brightness: Option<u8>,
    #[serde(default)]
    pub color: Option<LightColor>,
}

/// Movement target for a cover command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverAction {
    Open,
    Close,
    Stop,
}

/// A UI-originated cover intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverCommand {
    pub ident: String,
    pub action: CoverAction,
}

/// Cover group addressed by a location-wide command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverKind {
    Shutters,
    Doors,
    Windows,
}

/// Build the service_data object for a light turn-on.
pub(crate) fn light_on_data(
    brightness: Option<u8>,
    color: Option<&LightColor>,
) -> Option<Map<String, Value>> {
    let mut data = Map::new();
    if let Some(brightness) = brightness {
        data.insert("brightness".to_string(), json!(brightness));
    }
    match color {
        Some(LightColor::Named(name)) => {
            data.insert("color_name".to_string(), json!(name));
        }
        Some(LightColor::Rgb(rgb)) => {
            data.insert("rgb_color".to_string(), json!(rgb));
        }
        Some(LightColor::Hs(hs)) => {
            data.insert("hs_color".to_string(), json!(hs));
        }
        Some(LightColor::Xy(xy)) => {
            data.insert("xy_color".to_string(), json!(xy));
        }
        Some(LightColor::ColorTempKelvin(kelvin)) => {
            data.insert("color_temp_kelvin".to_string(), json!(kelvin));
        }
        None => {}
    }
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_call_renders_without_data() {
        let msg = ServiceCall::new("cover", "open_cover", "cover.garage").into_message();
        assert_eq!(
            msg,
            json!({
                "type": "call_service",
                "domain": "cover",
                "service": "open_cover",
                "target": { "entity_id": "cover.garage" },
            })
        );
    }

    #[test]
    fn service_call_renders_service_data() {
        let data = light_on_data(Some(128), Some(&LightColor::Rgb([255, 0, 0]))).unwrap();
        let msg = ServiceCall::new("light", "turn_on", "light.desk")
            .with_data(data)
            .into_message();
        assert_eq!(msg["service_data"]["brightness"], 128);
        assert_eq!(msg["service_data"]["rgb_color"], json!([255, 0, 0]));
    }

    #[test]
    fn empty_light_payload_is_omitted() {
        assert!(light_on_data(None, None).is_none());
    }
}
