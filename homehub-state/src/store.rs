//! Generic per-domain entity store with incremental location resolution.

use std::sync::{Arc, RwLock};

use homehub_registry::{LocationResolver, LOCATION_ALL_ID};

use crate::model::{BinarySensorState, CoverState, Domain, LightState};

/// Access the shared base fields of a domain state type.
///
/// Implemented by every per-domain state struct so the store can merge and
/// resolve without knowing the attribute payload.
pub trait EntityRecord: Clone + Send + Sync + 'static {
    const DOMAIN: Domain;

    fn entity_id(&self) -> &str;
    fn location_ids(&self) -> Option<&[String]>;
    fn set_location_ids(&mut self, ids: Vec<String>);
}

macro_rules! impl_entity_record {
    ($ty:ty, $domain:expr) => {
        impl EntityRecord for $ty {
            const DOMAIN: Domain = $domain;

            fn entity_id(&self) -> &str {
                &self.entity_id
            }

            fn location_ids(&self) -> Option<&[String]> {
                self.location_ids.as_deref()
            }

            fn set_location_ids(&mut self, ids: Vec<String>) {
                self.location_ids = Some(ids);
            }
        }
    };
}

impl_entity_record!(LightState, Domain::Light);
impl_entity_record!(CoverState, Domain::Cover);
impl_entity_record!(BinarySensorState, Domain::BinarySensor);

/// Latest known state per entity id for one domain.
///
/// Merging keeps exactly one record per id, preserves first-seen order, and
/// carries previously resolved locations forward on plain state updates:
/// state changes alone never invalidate location membership, only registry
/// changes do. New entities are resolved incrementally, so a steady stream
/// of updates costs O(batch), not O(store).
pub struct EntityStore<T: EntityRecord> {
    resolver: Arc<dyn LocationResolver>,
    entities: RwLock<Vec<T>>,
}

impl<T: EntityRecord> EntityStore<T> {
    pub fn new(resolver: Arc<dyn LocationResolver>) -> Self {
        Self {
            resolver,
            entities: RwLock::new(Vec::new()),
        }
    }

    /// Merge a batch of states.
    ///
    /// Existing entities are replaced in place (locations carried forward);
    /// new entities are appended and then resolved in one incremental pass.
    pub fn set_states(&self, states: Vec<T>) {
        let mut entities = self.entities.write().unwrap();
        let mut added = 0usize;
        for state in states {
            if Self::merge(&mut entities, state) {
                added += 1;
            }
        }
        if added > 0 {
            self.resolve_added(&mut entities, added);
        }
    }

    /// Apply a single state update, same merge rule as [`set_states`](Self::set_states).
    pub fn state_change(&self, state: T) {
        let mut entities = self.entities.write().unwrap();
        if Self::merge(&mut entities, state) {
            self.resolve_added(&mut entities, 1);
        }
    }

    /// Replace or append one state; returns true when it was new.
    fn merge(entities: &mut Vec<T>, mut state: T) -> bool {
        match entities
            .iter_mut()
            .find(|e| e.entity_id() == state.entity_id())
        {
            Some(existing) => {
                if let Some(ids) = existing.location_ids() {
                    state.set_location_ids(ids.to_vec());
                }
                *existing = state;
                false
            }
            None => {
                entities.push(state);
                true
            }
        }
    }

    /// Resolve locations for the `added` entities at the tail of the store.
    ///
    /// Skipped entirely while the registry has never loaded; those entities
    /// keep `location_ids` absent until the first registry refresh. An
    /// entity missing from the registry still gets the wildcard location;
    /// only a full recompute drops it.
    fn resolve_added(&self, entities: &mut [T], added: usize) {
        if !self.resolver.has_entities() {
            tracing::debug!(
                domain = %T::DOMAIN,
                added,
                "registry not loaded yet, skipping location resolution"
            );
            return;
        }
        let start = entities.len() - added;
        for entity in &mut entities[start..] {
            let ids = self
                .resolver
                .resolve_locations(entity.entity_id())
                .unwrap_or_else(|| vec![LOCATION_ALL_ID.to_string()]);
            entity.set_location_ids(ids);
        }
    }

    /// Re-resolve every stored entity against the current registry.
    ///
    /// Entities that no longer resolve are dropped; the count of dropped
    /// entities is returned. This is the only path that shrinks the store.
    /// A never-loaded registry makes this a no-op so a pre-first-load
    /// refresh cannot clear live data.
    pub fn registry_updated(&self) -> usize {
        if !self.resolver.has_entities() {
            tracing::debug!(domain = %T::DOMAIN, "registry empty, skipping recompute");
            return 0;
        }
        let mut entities = self.entities.write().unwrap();
        let before = entities.len();
        entities.retain_mut(|entity| match self.resolver.resolve_locations(entity.entity_id()) {
            Some(ids) => {
                entity.set_location_ids(ids);
                true
            }
            None => false,
        });
        let removed = before - entities.len();
        if removed > 0 {
            tracing::info!(
                domain = %T::DOMAIN,
                removed,
                "dropped entities no longer present in the registry"
            );
        }
        removed
    }

    /// Clone of the current contents, in first-seen order.
    pub fn snapshot(&self) -> Vec<T> {
        self.entities.read().map(|e| e.to_vec()).unwrap_or_default()
    }

    /// Look up one entity by id.
    pub fn get(&self, entity_id: &str) -> Option<T> {
        self.entities
            .read()
            .ok()?
            .iter()
            .find(|e| e.entity_id() == entity_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{LightAttributes, OnOff};
    use std::collections::HashMap;
    use std::sync::RwLock as StdRwLock;

    /// Registry fake: a plain map of entity id → resolved locations.
    pub(crate) struct FakeResolver {
        locations: StdRwLock<HashMap<String, Vec<String>>>,
        loaded: StdRwLock<bool>,
    }

    impl FakeResolver {
        pub(crate) fn empty() -> Self {
            Self {
                locations: StdRwLock::new(HashMap::new()),
                loaded: StdRwLock::new(false),
            }
        }

        pub(crate) fn with(entries: &[(&str, &[&str])]) -> Self {
            let resolver = Self::empty();
            resolver.load(entries);
            resolver
        }

        /// Replace the known entities, marking the registry as loaded.
        pub(crate) fn load(&self, entries: &[(&str, &[&str])]) {
            let mut locations = self.locations.write().unwrap();
            locations.clear();
            for (id, ids) in entries {
                locations.insert(
                    id.to_string(),
                    ids.iter().map(|s| s.to_string()).collect(),
                );
            }
            *self.loaded.write().unwrap() = true;
        }
    }

    impl LocationResolver for FakeResolver {
        fn has_entities(&self) -> bool {
            *self.loaded.read().unwrap()
        }

        fn resolve_locations(&self, entity_id: &str) -> Option<Vec<String>> {
            self.locations.read().unwrap().get(entity_id).cloned()
        }
    }

    pub(crate) fn light(entity_id: &str, state: OnOff) -> LightState {
        LightState {
            entity_id: entity_id.to_string(),
            state,
            attributes: LightAttributes {
                friendly_name: Some(entity_id.to_string()),
                ..LightAttributes::default()
            },
            last_changed: None,
            last_updated: None,
            context: None,
            location_ids: None,
        }
    }

    #[test]
    fn merge_keeps_one_record_per_id() {
        let resolver = Arc::new(FakeResolver::empty());
        let store = EntityStore::<LightState>::new(resolver);

        store.set_states(vec![light("light.a", OnOff::Off), light("light.b", OnOff::Off)]);
        store.set_states(vec![light("light.a", OnOff::On)]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("light.a").unwrap().state, OnOff::On);
        // First-seen order preserved.
        let ids: Vec<_> = store.snapshot().into_iter().map(|e| e.entity_id).collect();
        assert_eq!(ids, vec!["light.a", "light.b"]);
    }

    #[test]
    fn locations_absent_until_registry_loads() {
        let resolver = Arc::new(FakeResolver::empty());
        let store = EntityStore::<LightState>::new(resolver);

        store.set_states(vec![light("light.a", OnOff::On)]);
        assert!(store.get("light.a").unwrap().location_ids.is_none());
    }

    #[test]
    fn new_entities_resolve_incrementally() {
        let resolver = Arc::new(FakeResolver::with(&[("light.a", &["all", "kitchen"])]));
        let store = EntityStore::<LightState>::new(resolver);

        store.set_states(vec![light("light.a", OnOff::On)]);
        assert_eq!(
            store.get("light.a").unwrap().location_ids,
            Some(vec!["all".to_string(), "kitchen".to_string()])
        );
    }

    #[test]
    fn state_updates_copy_locations_forward() {
        let resolver = Arc::new(FakeResolver::with(&[("light.a", &["all", "kitchen"])]));
        let store = EntityStore::<LightState>::new(Arc::clone(&resolver) as _);

        store.set_states(vec![light("light.a", OnOff::On)]);
        // The registry moves the light, but a plain state update must not
        // re-resolve; the stale set is carried forward until the next
        // registry event.
        resolver.load(&[("light.a", &["all", "hall"])]);
        store.state_change(light("light.a", OnOff::Off));

        assert_eq!(
            store.get("light.a").unwrap().location_ids,
            Some(vec!["all".to_string(), "kitchen".to_string()])
        );

        store.registry_updated();
        assert_eq!(
            store.get("light.a").unwrap().location_ids,
            Some(vec!["all".to_string(), "hall".to_string()])
        );
    }

    #[test]
    fn unregistered_entities_keep_wildcard_until_recompute() {
        let resolver = Arc::new(FakeResolver::with(&[("light.known", &["all"])]));
        let store = EntityStore::<LightState>::new(resolver);

        store.set_states(vec![light("light.stray", OnOff::On)]);
        assert_eq!(
            store.get("light.stray").unwrap().location_ids,
            Some(vec!["all".to_string()])
        );
    }

    #[test]
    fn full_recompute_drops_unregistered_entities() {
        let resolver = Arc::new(FakeResolver::with(&[("light.a", &["all"])]));
        let store = EntityStore::<LightState>::new(resolver);

        store.set_states(vec![light("light.a", OnOff::On), light("light.gone", OnOff::On)]);
        let before = store.len();

        let removed = store.registry_updated();

        assert_eq!(removed, 1);
        assert_eq!(removed, before - store.len());
        assert!(store.get("light.gone").is_none());
        assert!(store.get("light.a").is_some());
    }

    #[test]
    fn recompute_is_noop_while_registry_empty() {
        let resolver = Arc::new(FakeResolver::empty());
        let store = EntityStore::<LightState>::new(resolver);

        store.set_states(vec![light("light.a", OnOff::On)]);
        let removed = store.registry_updated();

        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);
        assert!(store.get("light.a").unwrap().location_ids.is_none());
    }
}
