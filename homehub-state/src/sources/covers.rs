//! Cover store, projection, and command translation.
//!
//! Both hub-native covers and virtual covers derived from binary sensors
//! land here through the same merge path.

use std::sync::Arc;

use homehub_registry::{LocationResolver, RegistryObserver};

use crate::commands::{CoverAction, CoverCommand, CoverKind, ServiceCall};
use crate::display::{
    CoverFeature, CoverView, CoverViewType, CoversData, DisplayPayload, DisplaySink, Rename,
    WindowSetup,
};
use crate::model::{CoverPosition, CoverState, Domain};
use crate::overview::{is_door, is_window};
use crate::store::EntityStore;

use super::{ChangeListener, SourceHooks};

pub struct CoverSource {
    store: EntityStore<CoverState>,
    renames: Vec<Rename>,
    window_setup: Vec<WindowSetup>,
    hooks: SourceHooks,
}

impl CoverSource {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        renames: Vec<Rename>,
        window_setup: Vec<WindowSetup>,
    ) -> Self {
        Self {
            store: EntityStore::new(resolver),
            renames,
            window_setup,
            hooks: SourceHooks::new(),
        }
    }

    pub fn set_display_sink(&self, sink: Arc<dyn DisplaySink>) {
        self.hooks.set_sink(sink);
    }

    pub fn add_change_listener(&self, listener: ChangeListener) {
        self.hooks.add_listener(listener);
    }

    /// Merge a batch of cover states (hub-native or virtual).
    pub fn set_states(&self, states: Vec<CoverState>) {
        self.store.set_states(states);
        self.after_mutation();
    }

    /// Apply a single state change.
    pub fn state_change(&self, state: CoverState) {
        self.store.state_change(state);
        self.after_mutation();
    }

    fn after_mutation(&self) {
        self.hooks.transmit(DisplayPayload::Covers(self.data()));
        self.hooks.notify(Domain::Cover);
    }

    fn view(&self, cover: &CoverState) -> CoverView {
        let mut rename = self
            .renames
            .iter()
            .find(|r| r.entity_id == cover.entity_id)
            .map(|r| r.name.clone());

        let cover_type = cover
            .attributes
            .device_class
            .and_then(CoverViewType::from_class);

        // Window covers can carry a user-assigned kind and name.
        let mut window_type = None;
        if cover_type == Some(CoverViewType::Window) {
            if let Some(setup) = self
                .window_setup
                .iter()
                .find(|s| s.sensor_id == cover.entity_id)
            {
                window_type = setup.window_type;
                if let Some(name) = &setup.name {
                    rename = Some(name.clone());
                }
            }
        }

        let name = rename
            .or_else(|| cover.attributes.friendly_name.clone())
            .unwrap_or_else(|| cover.entity_id.clone());

        CoverView {
            ident: cover.entity_id.clone(),
            cover_type,
            name,
            open_position: cover.attributes.current_position,
            tilt_position: cover.attributes.current_tilt_position,
            state: cover.state,
            window_type,
            features: CoverFeature::from_bitmask(cover.attributes.supported_features),
        }
    }

    /// The full display projection.
    pub fn data(&self) -> CoversData {
        CoversData {
            covers: self.store.snapshot().iter().map(|c| self.view(c)).collect(),
        }
    }

    /// Covers that are not fully closed (nor stopped).
    pub fn active_covers(&self) -> Vec<CoverView> {
        self.store
            .snapshot()
            .iter()
            .filter(|c| c.state != CoverPosition::Closed && c.state != CoverPosition::Stopped)
            .map(|c| self.view(c))
            .collect()
    }

    /// Translate a UI intent into a hub service call.
    pub fn command(&self, cmd: &CoverCommand) -> Option<ServiceCall> {
        self.store.get(&cmd.ident)?;
        let service = match cmd.action {
            CoverAction::Open => "open_cover",
            CoverAction::Close => "close_cover",
            CoverAction::Stop => "stop_cover",
        };
        Some(ServiceCall::new("cover", service, cmd.ident.clone()))
    }

    /// Translate a location-wide intent into one call per member cover of
    /// the requested kind.
    pub fn commands_for_location(
        &self,
        location_id: &str,
        action: CoverAction,
        kind: CoverKind,
    ) -> Vec<ServiceCall> {
        self.store
            .snapshot()
            .iter()
            .filter(|c| {
                c.location_ids
                    .as_deref()
                    .is_some_and(|ids| ids.iter().any(|id| id == location_id))
            })
            .filter(|c| {
                let view = self.view(c);
                match kind {
                    CoverKind::Doors => is_door(&view),
                    CoverKind::Windows => is_window(&view),
                    CoverKind::Shutters => view.cover_type == Some(CoverViewType::Shutter),
                }
            })
            .filter_map(|c| {
                self.command(&CoverCommand {
                    ident: c.entity_id.clone(),
                    action,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl RegistryObserver for CoverSource {
    fn registry_updated(&self) {
        self.store.registry_updated();
        self.after_mutation();
    }
}
