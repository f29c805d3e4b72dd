//! SDK configuration.
//!
//! Everything here is user-supplied and fixed for the process lifetime;
//! the hub never sees it. Floors group areas into location identifiers,
//! renames override display names, and the window setup assigns a window
//! kind (and optional name) to individual window sensors.

use serde::{Deserialize, Serialize};

use homehub_registry::Floor;
use homehub_state::{Rename, WindowSetup};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Floor groupings appended to resolved location sets
    pub floors: Vec<Floor>,
    /// Display renames by entity id
    pub renames: Vec<Rename>,
    /// Window kind assignments for window sensors
    pub window_setup: Vec<WindowSetup>,
    /// Log display payloads and command translations at debug level
    pub verbose: bool,
}
