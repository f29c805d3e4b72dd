//! Entity state stores for the homehub SDK.
//!
//! One store per supported domain (lights, covers, binary sensors), each
//! holding the latest known state per entity id. Stores stay current from
//! the hub's incremental event stream, carry resolved location sets along
//! (copy-forward on state changes, full recompute on registry changes),
//! and push display projections and change notifications after every
//! mutation.
//!
//! # Architecture
//!
//! ```text
//! state_changed ──▶ LightSource ────┐
//!                   CoverSource ◀───┼── virtual covers
//!                   BinarySensorSource
//!                        │
//!                        ├─▶ DisplaySink (projections, overview)
//!                        └─▶ change listeners
//! ```
//!
//! Door, garage-door, and window sensors are re-projected as virtual
//! covers owned by the binary-sensor source; downstream nothing can tell
//! them apart from hub-native covers.

pub mod commands;
pub mod display;
pub mod model;
pub mod overview;
pub mod store;

mod sources;

pub use commands::{
    CoverAction, CoverCommand, CoverKind, LightColor, LightCommand, LightSwitch, ServiceCall,
};
pub use display::{
    CoverFeature, CoverView, CoverViewType, CoversData, DisplayPayload, DisplaySink, LightView,
    LightsData, Rename, WindowSetup, WindowType,
};
pub use model::{
    BinarySensorAttributes, BinarySensorState, Context, CoverAttributes, CoverClass,
    CoverPosition, CoverState, Domain, LightAttributes, LightState, OnOff, SensorClass,
    split_entity_id,
};
pub use overview::{build_overview, OverviewCounts, OverviewData, OverviewDevices, OverviewSummary};
pub use sources::{virtual_cover, BinarySensorSource, ChangeListener, CoverSource, LightSource};
pub use store::{EntityRecord, EntityStore};
