//! Display-ready projections of the stores.
//!
//! The host UI never sees raw hub states; each store flattens its entities
//! into a view type, applying configured renames and decoding the cover
//! feature bitmask, and pushes the result through the [`DisplaySink`]
//! after every mutation.

use serde::{Deserialize, Serialize};

use crate::model::{CoverClass, CoverPosition, OnOff};

/// A configured display rename for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub entity_id: String,
    pub name: String,
}

/// Window kinds a user can assign to a window cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Casement,
    Awning,
    Hung,
    Sliding,
    Skylight,
    Door,
    SlidingDoor,
}

/// User configuration for one window sensor: its kind and an optional
/// display rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSetup {
    pub sensor_id: String,
    #[serde(default)]
    pub window_type: Option<WindowType>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Cover kind as shown to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverViewType {
    Door,
    GarageDoor,
    Window,
    Gate,
    Blind,
    Curtain,
    Shade,
    Shutter,
}

impl CoverViewType {
    /// Map the hub's device class onto a display kind; classes without a
    /// display representation (awning, damper, ...) stay untyped.
    pub fn from_class(class: CoverClass) -> Option<Self> {
        match class {
            CoverClass::Door => Some(CoverViewType::Door),
            CoverClass::Garage => Some(CoverViewType::GarageDoor),
            CoverClass::Window => Some(CoverViewType::Window),
            CoverClass::Gate => Some(CoverViewType::Gate),
            CoverClass::Blind => Some(CoverViewType::Blind),
            CoverClass::Curtain => Some(CoverViewType::Curtain),
            CoverClass::Shade => Some(CoverViewType::Shade),
            CoverClass::Shutter => Some(CoverViewType::Shutter),
            CoverClass::Awning | CoverClass::Damper | CoverClass::Other => None,
        }
    }
}

/// Commands a cover supports, decoded from its feature bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverFeature {
    Open,
    Close,
    SetPosition,
    Stop,
    OpenTilt,
    CloseTilt,
    StopTilt,
    SetTiltPosition,
}

impl CoverFeature {
    /// Decode the hub's `supported_features` bitmask.
    pub fn from_bitmask(bitmask: u32) -> Vec<CoverFeature> {
        const TABLE: [(u32, CoverFeature); 8] = [
            (1, CoverFeature::Open),
            (2, CoverFeature::Close),
            (4, CoverFeature::SetPosition),
            (8, CoverFeature::Stop),
            (16, CoverFeature::OpenTilt),
            (32, CoverFeature::CloseTilt),
            (64, CoverFeature::StopTilt),
            (128, CoverFeature::SetTiltPosition),
        ];
        TABLE
            .iter()
            .filter(|(bit, _)| bitmask & bit != 0)
            .map(|(_, feature)| *feature)
            .collect()
    }
}

/// One light as shown to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightView {
    pub ident: String,
    pub name: String,
    pub brightness: Option<u8>,
    pub state: OnOff,
}

/// One cover as shown to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverView {
    pub ident: String,
    #[serde(rename = "type")]
    pub cover_type: Option<CoverViewType>,
    pub name: String,
    pub open_position: Option<u8>,
    pub tilt_position: Option<u8>,
    pub state: CoverPosition,
    pub window_type: Option<WindowType>,
    pub features: Vec<CoverFeature>,
}

/// Full lights projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightsData {
    pub lights: Vec<LightView>,
}

/// Full covers projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoversData {
    pub covers: Vec<CoverView>,
}

/// Payload pushed to the host display channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DisplayPayload {
    Lights(LightsData),
    Covers(CoversData),
    Overview(crate::overview::OverviewData),
}

/// Host display channel; receives a fresh projection after every store
/// mutation.
pub trait DisplaySink: Send + Sync {
    fn transmit(&self, payload: DisplayPayload);
}
