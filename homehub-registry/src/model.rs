//! Registry row types as the hub serves them.

use serde::{Deserialize, Serialize};

/// A named area (room) on the hub.
///
/// Registry rows carry more fields than these; anything not needed for
/// location resolution is ignored at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub area_id: String,
    pub name: String,
}

/// A physical device, optionally assigned to an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub area_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// An entity registration: links an entity id to its owning device
/// and/or directly to an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntity {
    pub entity_id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub area_id: Option<String>,
}

/// A user-configured floor grouping one or more areas.
///
/// Floors are not hub-sourced; they come from the SDK configuration and
/// stay fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    /// Identifier used in location sets
    pub ident: String,
    /// Display name
    pub name: String,
    /// Areas belonging to this floor
    pub area_ids: Vec<String>,
}

/// A selectable location: the wildcard, an area, or a floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
}
