//! Registry snapshots, lookup indices, and the location resolver.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde_json::json;

use homehub_command::CommandCorrelator;

use crate::model::{Area, Device, Floor, Location, RegistryEntity};

/// Id of the synthetic wildcard location every entity belongs to.
pub const LOCATION_ALL_ID: &str = "all";
/// Display name of the wildcard location.
pub const LOCATION_ALL_NAME: &str = "All Devices";

/// Callback invoked after every registry refresh.
///
/// Stores register themselves here at wiring time and run their location
/// recompute when the snapshots change.
pub trait RegistryObserver: Send + Sync {
    fn registry_updated(&self);
}

/// Read side of the cache as the state layer sees it.
///
/// Kept as a trait so stores can be exercised without a live command
/// channel behind them.
pub trait LocationResolver: Send + Sync {
    /// Whether the entity registry has loaded at least once.
    fn has_entities(&self) -> bool;

    /// Resolve the ordered location set of an entity, `None` when the
    /// entity is not registered.
    fn resolve_locations(&self, entity_id: &str) -> Option<Vec<String>>;
}

impl LocationResolver for RegistryCache {
    fn has_entities(&self) -> bool {
        RegistryCache::has_entities(self)
    }

    fn resolve_locations(&self, entity_id: &str) -> Option<Vec<String>> {
        RegistryCache::resolve_locations(self, entity_id)
    }
}

/// In-memory mirror of the hub's area/device/entity registry.
///
/// Snapshots are replaced wholesale per fetch; the two lookup indices
/// (entity id → registration, device id → device) are rebuilt alongside so
/// per-entity resolution never rescans the row arrays. A list request that
/// fails or returns a non-array leaves that one snapshot untouched:
/// partial-failure tolerant per list, not atomic across lists.
pub struct RegistryCache {
    correlator: Arc<CommandCorrelator>,
    floors: Vec<Floor>,

    areas: RwLock<Vec<Area>>,
    devices: RwLock<Vec<Device>>,
    entities: RwLock<Vec<RegistryEntity>>,

    entity_index: RwLock<HashMap<String, RegistryEntity>>,
    device_index: RwLock<HashMap<String, Device>>,

    observers: RwLock<Vec<Arc<dyn RegistryObserver>>>,
}

impl RegistryCache {
    /// Create an empty cache; snapshots arrive with the first
    /// [`refresh`](Self::refresh).
    pub fn new(correlator: Arc<CommandCorrelator>, floors: Vec<Floor>) -> Self {
        Self {
            correlator,
            floors,
            areas: RwLock::new(Vec::new()),
            devices: RwLock::new(Vec::new()),
            entities: RwLock::new(Vec::new()),
            entity_index: RwLock::new(HashMap::new()),
            device_index: RwLock::new(HashMap::new()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer to be notified after each refresh.
    pub fn add_observer(&self, observer: Arc<dyn RegistryObserver>) {
        self.observers.write().unwrap().push(observer);
    }

    /// Fetch all three registry lists and replace the snapshots.
    ///
    /// The list requests run concurrently; each response replaces its
    /// snapshot independently. Afterwards the lookup indices are rebuilt
    /// and every registered observer's `registry_updated` runs.
    pub async fn refresh(&self) {
        let (areas, devices, entities) = tokio::join!(
            self.fetch_list::<Area>("config/area_registry/list"),
            self.fetch_list::<Device>("config/device_registry/list"),
            self.fetch_list::<RegistryEntity>("config/entity_registry/list"),
        );

        if let Some(rows) = areas {
            tracing::debug!(count = rows.len(), "area registry replaced");
            *self.areas.write().unwrap() = rows;
        }
        if let Some(rows) = devices {
            tracing::debug!(count = rows.len(), "device registry replaced");
            let index = rows.iter().map(|d| (d.id.clone(), d.clone())).collect();
            *self.devices.write().unwrap() = rows;
            *self.device_index.write().unwrap() = index;
        }
        if let Some(rows) = entities {
            tracing::debug!(count = rows.len(), "entity registry replaced");
            let index = rows
                .iter()
                .map(|e| (e.entity_id.clone(), e.clone()))
                .collect();
            *self.entities.write().unwrap() = rows;
            *self.entity_index.write().unwrap() = index;
        }

        let observers: Vec<_> = self.observers.read().unwrap().clone();
        for observer in observers {
            observer.registry_updated();
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, msg_type: &str) -> Option<Vec<T>> {
        match self.correlator.send(json!({ "type": msg_type })).await {
            Ok(response) => match serde_json::from_value::<Vec<T>>(response.result) {
                Ok(rows) => Some(rows),
                Err(err) => {
                    tracing::warn!(msg_type, %err, "registry list malformed, keeping previous snapshot");
                    None
                }
            },
            Err(err) => {
                tracing::warn!(msg_type, %err, "registry list request failed, keeping previous snapshot");
                None
            }
        }
    }

    /// The synthetic wildcard location.
    pub fn location_all(&self) -> Location {
        Location {
            id: LOCATION_ALL_ID.to_string(),
            name: LOCATION_ALL_NAME.to_string(),
        }
    }

    /// Whether the entity registry has loaded at least once.
    ///
    /// Callers skip location recomputes while this is false: resolving
    /// against a never-loaded registry would only clear data.
    pub fn has_entities(&self) -> bool {
        self.entities.read().map(|e| !e.is_empty()).unwrap_or(false)
    }

    /// Resolve the ordered location set of an entity.
    ///
    /// Returns `None` when the entity is not in the registry snapshot; the
    /// caller decides whether that drops the entity. A resolved set always
    /// starts with the wildcard id, followed by the entity's own area, the
    /// owning device's area (if different), then every configured floor
    /// intersecting the set so far. Duplicates are suppressed by presence
    /// check; insertion order is preserved.
    pub fn resolve_locations(&self, entity_id: &str) -> Option<Vec<String>> {
        let entity = self
            .entity_index
            .read()
            .ok()?
            .get(entity_id)
            .cloned()?;

        let mut location_ids = vec![LOCATION_ALL_ID.to_string()];
        if let Some(area_id) = &entity.area_id {
            location_ids.push(area_id.clone());
        }
        let device_area = entity.device_id.as_ref().and_then(|device_id| {
            self.device_index
                .read()
                .ok()?
                .get(device_id)
                .and_then(|d| d.area_id.clone())
        });
        if let Some(area_id) = device_area {
            if !location_ids.contains(&area_id) {
                location_ids.push(area_id);
            }
        }
        for floor in &self.floors {
            if location_ids.iter().any(|id| floor.area_ids.contains(id)) {
                location_ids.push(floor.ident.clone());
            }
        }
        Some(location_ids)
    }

    /// All selectable locations: wildcard, every area, every floor.
    pub fn all_locations(&self) -> Vec<Location> {
        let mut locations = vec![self.location_all()];
        for area in self.areas.read().unwrap().iter() {
            locations.push(Location {
                id: area.area_id.clone(),
                name: area.name.clone(),
            });
        }
        for floor in &self.floors {
            locations.push(Location {
                id: floor.ident.clone(),
                name: floor.name.clone(),
            });
        }
        locations
    }

    /// Current area snapshot.
    pub fn areas(&self) -> Vec<Area> {
        self.areas.read().map(|a| a.to_vec()).unwrap_or_default()
    }

    /// Configured floors.
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }
}
