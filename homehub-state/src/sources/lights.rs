//! Light store, projection, and command translation.

use std::sync::Arc;

use homehub_registry::{LocationResolver, RegistryObserver};

use crate::commands::{light_on_data, LightCommand, LightSwitch, ServiceCall};
use crate::display::{DisplayPayload, DisplaySink, LightView, LightsData, Rename};
use crate::model::{Domain, LightState, OnOff};
use crate::store::EntityStore;

use super::{ChangeListener, SourceHooks};

pub struct LightSource {
    store: EntityStore<LightState>,
    renames: Vec<Rename>,
    hooks: SourceHooks,
}

impl LightSource {
    pub fn new(resolver: Arc<dyn LocationResolver>, renames: Vec<Rename>) -> Self {
        Self {
            store: EntityStore::new(resolver),
            renames,
            hooks: SourceHooks::new(),
        }
    }

    pub fn set_display_sink(&self, sink: Arc<dyn DisplaySink>) {
        self.hooks.set_sink(sink);
    }

    pub fn add_change_listener(&self, listener: ChangeListener) {
        self.hooks.add_listener(listener);
    }

    /// Merge a batch of light states.
    pub fn set_states(&self, states: Vec<LightState>) {
        self.store.set_states(states);
        self.after_mutation();
    }

    /// Apply a single state change.
    pub fn state_change(&self, state: LightState) {
        self.store.state_change(state);
        self.after_mutation();
    }

    fn after_mutation(&self) {
        self.hooks.transmit(DisplayPayload::Lights(self.data()));
        self.hooks.notify(Domain::Light);
    }

    fn view(&self, light: &LightState) -> LightView {
        let rename = self
            .renames
            .iter()
            .find(|r| r.entity_id == light.entity_id)
            .map(|r| r.name.clone());
        let name = rename
            .or_else(|| light.attributes.friendly_name.clone())
            .unwrap_or_else(|| light.entity_id.clone());
        LightView {
            ident: light.entity_id.clone(),
            name,
            brightness: light.attributes.brightness,
            state: light.state,
        }
    }

    /// The full display projection.
    pub fn data(&self) -> LightsData {
        LightsData {
            lights: self.store.snapshot().iter().map(|l| self.view(l)).collect(),
        }
    }

    /// Lights currently on.
    pub fn active_lights(&self) -> Vec<LightView> {
        self.store
            .snapshot()
            .iter()
            .filter(|l| l.state == OnOff::On)
            .map(|l| self.view(l))
            .collect()
    }

    /// Translate a UI intent into a hub service call.
    ///
    /// Unknown entities translate to nothing; toggling resolves against
    /// the currently known state.
    pub fn command(&self, cmd: &LightCommand) -> Option<ServiceCall> {
        let light = self.store.get(&cmd.ident)?;
        let turn_on = match cmd.state {
            LightSwitch::On => true,
            LightSwitch::Off => false,
            LightSwitch::Toggle => light.state == OnOff::Off,
        };
        if turn_on {
            let mut call = ServiceCall::new("light", "turn_on", cmd.ident.clone());
            if let Some(data) = light_on_data(cmd.brightness, cmd.color.as_ref()) {
                call = call.with_data(data);
            }
            Some(call)
        } else {
            Some(ServiceCall::new("light", "turn_off", cmd.ident.clone()))
        }
    }

    /// Translate a location-wide intent into one call per member light.
    pub fn commands_for_location(&self, location_id: &str, target: LightSwitch) -> Vec<ServiceCall> {
        self.store
            .snapshot()
            .iter()
            .filter(|l| {
                l.location_ids
                    .as_deref()
                    .is_some_and(|ids| ids.iter().any(|id| id == location_id))
            })
            .filter_map(|l| {
                self.command(&LightCommand {
                    ident: l.entity_id.clone(),
                    state: target,
                    brightness: None,
                    color: None,
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

impl RegistryObserver for LightSource {
    fn registry_updated(&self) {
        self.store.registry_updated();
        self.after_mutation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{light, FakeResolver};

    fn source_with(renames: Vec<Rename>) -> LightSource {
        let resolver = Arc::new(FakeResolver::with(&[
            ("light.desk", &["all", "office"]),
            ("light.hall", &["all", "hall"]),
        ]));
        LightSource::new(resolver, renames)
    }

    #[test]
    fn projection_applies_renames() {
        let source = source_with(vec![Rename {
            entity_id: "light.desk".to_string(),
            name: "Reading Light".to_string(),
        }]);
        source.set_states(vec![light("light.desk", OnOff::On)]);

        let data = source.data();
        assert_eq!(data.lights[0].name, "Reading Light");
    }

    #[test]
    fn active_lights_are_the_ones_on() {
        let source = source_with(Vec::new());
        source.set_states(vec![
            light("light.desk", OnOff::On),
            light("light.hall", OnOff::Off),
        ]);

        let active = source.active_lights();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].ident, "light.desk");
    }

    #[test]
    fn toggle_resolves_against_known_state() {
        let source = source_with(Vec::new());
        source.set_states(vec![light("light.desk", OnOff::Off)]);

        let call = source
            .command(&LightCommand {
                ident: "light.desk".to_string(),
                state: LightSwitch::Toggle,
                brightness: None,
                color: None,
            })
            .unwrap();
        assert_eq!(call.service, "turn_on");

        source.state_change(light("light.desk", OnOff::On));
        let call = source
            .command(&LightCommand {
                ident: "light.desk".to_string(),
                state: LightSwitch::Toggle,
                brightness: None,
                color: None,
            })
            .unwrap();
        assert_eq!(call.service, "turn_off");
    }

    #[test]
    fn unknown_entity_translates_to_nothing() {
        let source = source_with(Vec::new());
        assert!(source
            .command(&LightCommand {
                ident: "light.ghost".to_string(),
                state: LightSwitch::On,
                brightness: None,
                color: None,
            })
            .is_none());
    }

    #[test]
    fn location_commands_cover_member_lights_only() {
        let source = source_with(Vec::new());
        source.set_states(vec![
            light("light.desk", OnOff::Off),
            light("light.hall", OnOff::Off),
        ]);

        let calls = source.commands_for_location("office", LightSwitch::On);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].entity_id, "light.desk");
        assert_eq!(calls[0].service, "turn_on");
    }

    #[test]
    fn change_listeners_fire_after_mutation() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let source = source_with(Vec::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        source.add_change_listener(Arc::new(move |domain| {
            assert_eq!(domain, Domain::Light);
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        source.set_states(vec![light("light.desk", OnOff::On)]);
        source.state_change(light("light.desk", OnOff::Off));

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
