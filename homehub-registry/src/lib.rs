//! Registry cache and location resolution.
//!
//! The hub keeps a metadata catalogue of areas, devices, and entity
//! registrations, separate from live entity state. This crate mirrors
//! that catalogue in memory and answers the one question the state layer
//! keeps asking: *which locations does this entity belong to?*
//!
//! Snapshots are fetched through the command correlator as three
//! concurrent list requests and replaced wholesale; a failed or malformed
//! list leaves its previous snapshot in place so a flaky hub never wipes
//! known-good data. Location resolution walks wildcard → own area →
//! owning device's area → configured floors, preserving first-seen order.

mod cache;
mod model;

pub use cache::{
    LocationResolver, RegistryCache, RegistryObserver, LOCATION_ALL_ID, LOCATION_ALL_NAME,
};
pub use model::{Area, Device, Floor, Location, RegistryEntity};
