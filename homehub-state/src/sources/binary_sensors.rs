//! Binary sensor store and virtual cover derivation.
//!
//! Door, garage-door, and window sensors are re-projected as covers: the
//! sensor's on/off state becomes open/closed and the derived state is fed
//! into the cover store through the regular merge path. The cover store
//! never mutates a virtual cover on its own; this source is the only
//! writer.

use std::sync::Arc;

use homehub_registry::{LocationResolver, RegistryObserver};

use crate::model::{
    BinarySensorState, CoverAttributes, CoverClass, CoverPosition, CoverState, Domain, OnOff,
    SensorClass,
};
use crate::store::EntityStore;

use super::{ChangeListener, CoverSource, SourceHooks};

/// Derive the virtual cover for a door-like sensor.
///
/// Sensors of any other class derive nothing. The virtual cover keeps the
/// sensor's entity id, name, and context, reports no supported commands,
/// and maps `off` to closed and anything else to open.
pub fn virtual_cover(sensor: &BinarySensorState) -> Option<CoverState> {
    let class = match sensor.attributes.device_class? {
        SensorClass::Door => CoverClass::Door,
        SensorClass::GarageDoor => CoverClass::Garage,
        SensorClass::Window => CoverClass::Window,
        _ => return None,
    };
    let state = if sensor.state == OnOff::Off {
        CoverPosition::Closed
    } else {
        CoverPosition::Open
    };
    Some(CoverState {
        entity_id: sensor.entity_id.clone(),
        state,
        attributes: CoverAttributes {
            device_class: Some(class),
            friendly_name: sensor.attributes.friendly_name.clone(),
            current_position: None,
            current_tilt_position: None,
            supported_features: 0,
            extra: Default::default(),
        },
        last_changed: sensor.last_changed.clone(),
        last_updated: sensor.last_updated.clone(),
        context: sensor.context.clone(),
        location_ids: None,
    })
}

pub struct BinarySensorSource {
    store: EntityStore<BinarySensorState>,
    covers: Arc<CoverSource>,
    hooks: SourceHooks,
}

impl BinarySensorSource {
    pub fn new(resolver: Arc<dyn LocationResolver>, covers: Arc<CoverSource>) -> Self {
        Self {
            store: EntityStore::new(resolver),
            covers,
            hooks: SourceHooks::new(),
        }
    }

    pub fn add_change_listener(&self, listener: ChangeListener) {
        self.hooks.add_listener(listener);
    }

    /// Merge a batch of sensor states, forwarding derived covers.
    pub fn set_states(&self, states: Vec<BinarySensorState>) {
        let virtual_covers: Vec<_> = states.iter().filter_map(virtual_cover).collect();
        self.store.set_states(states);
        if !virtual_covers.is_empty() {
            self.covers.set_states(virtual_covers);
        }
        self.hooks.notify(Domain::BinarySensor);
    }

    /// Apply a single state change, forwarding the derived cover.
    pub fn state_change(&self, state: BinarySensorState) {
        let derived = virtual_cover(&state);
        self.store.state_change(state);
        if let Some(cover) = derived {
            self.covers.set_states(vec![cover]);
        }
        self.hooks.notify(Domain::BinarySensor);
    }

    /// Sensors of class window, for configuration pickers.
    pub fn window_sensors(&self) -> Vec<BinarySensorState> {
        self.store
            .snapshot()
            .into_iter()
            .filter(|s| s.attributes.device_class == Some(SensorClass::Window))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl RegistryObserver for BinarySensorSource {
    fn registry_updated(&self) {
        self.store.registry_updated();
        self.hooks.notify(Domain::BinarySensor);
    }
}
