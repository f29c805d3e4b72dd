//! Frame classification and dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use homehub_command::CommandCorrelator;
use homehub_registry::RegistryCache;
use homehub_state::{
    split_entity_id, BinarySensorSource, BinarySensorState, CoverSource, CoverState, Domain,
    LightSource, LightState,
};

use crate::frame::{HubEvent, HubMessage, StateChangedEvent};

/// Connection-layer hooks for the authentication handshake.
///
/// The router recognizes auth frames but never answers them; credentials
/// and the handshake live with whoever owns the socket.
pub trait AuthHandler: Send + Sync {
    /// The hub asked for credentials.
    fn auth_required(&self);
    /// The handshake completed; commands are accepted from now on.
    fn auth_ok(&self);
    /// The hub rejected the credentials.
    fn auth_invalid(&self, message: Option<String>);
}

/// Store handle for one dispatchable domain.
#[derive(Clone)]
pub enum DomainStore {
    Lights(Arc<LightSource>),
    Covers(Arc<CoverSource>),
    BinarySensors(Arc<BinarySensorSource>),
}

/// Classifies inbound frames and dispatches them to the correlator, the
/// per-domain stores, and the registry cache.
///
/// Every dispatch runs to completion before the next frame is processed.
/// The one exception is a registry refresh: it waits on list responses
/// that arrive as later frames, so it runs as a spawned task instead of
/// inline.
pub struct EventRouter {
    correlator: Arc<CommandCorrelator>,
    registry: Arc<RegistryCache>,
    stores: HashMap<Domain, DomainStore>,
    auth: Arc<dyn AuthHandler>,
}

impl EventRouter {
    /// Build the router with its domain table. The table is fixed at
    /// startup; events for domains without a store are dropped with a log.
    pub fn new(
        correlator: Arc<CommandCorrelator>,
        registry: Arc<RegistryCache>,
        lights: Arc<LightSource>,
        covers: Arc<CoverSource>,
        binary_sensors: Arc<BinarySensorSource>,
        auth: Arc<dyn AuthHandler>,
    ) -> Self {
        let mut stores = HashMap::new();
        stores.insert(Domain::Light, DomainStore::Lights(lights));
        stores.insert(Domain::Cover, DomainStore::Covers(covers));
        stores.insert(
            Domain::BinarySensor,
            DomainStore::BinarySensors(binary_sensors),
        );
        Self {
            correlator,
            registry,
            stores,
            auth,
        }
    }

    /// Process one raw frame from the connection.
    ///
    /// A frame is a JSON object or an array of objects; array elements
    /// dispatch independently and in order, and a bad element never blocks
    /// the ones after it.
    pub fn on_frame(&self, raw: &str) {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "failed to parse frame, dropping");
                return;
            }
        };
        match value {
            Value::Array(items) => {
                for item in items {
                    self.dispatch_value(item);
                }
            }
            other => self.dispatch_value(other),
        }
    }

    fn dispatch_value(&self, value: Value) {
        let Some(msg_type) = value.get("type").and_then(Value::as_str).map(String::from) else {
            tracing::warn!("frame without a type field, ignoring");
            return;
        };
        match serde_json::from_value::<HubMessage>(value) {
            Ok(HubMessage::AuthRequired { .. }) => self.auth.auth_required(),
            Ok(HubMessage::AuthOk { .. }) => self.auth.auth_ok(),
            Ok(HubMessage::AuthInvalid { message }) => self.auth.auth_invalid(message),
            Ok(HubMessage::Result(frame)) => self.correlator.handle_result(frame),
            Ok(HubMessage::Event(frame)) => self.dispatch_event(frame.event),
            Ok(HubMessage::Unknown) => {
                tracing::debug!(%msg_type, "unrecognized frame type, ignoring");
            }
            Err(err) => {
                tracing::warn!(%msg_type, %err, "failed to decode frame, dropping");
            }
        }
    }

    fn dispatch_event(&self, event: HubEvent) {
        match event {
            HubEvent::StateChanged(ev) => self.dispatch_state_change(ev),
            HubEvent::AreaRegistryUpdated(_)
            | HubEvent::DeviceRegistryUpdated(_)
            | HubEvent::EntityRegistryUpdated(_) => {
                // Always a full refresh; per-field diffing is not worth the
                // consistency risk.
                let registry = Arc::clone(&self.registry);
                tokio::spawn(async move {
                    registry.refresh().await;
                });
            }
            HubEvent::Unknown => {
                tracing::debug!("unhandled event type, ignoring");
            }
        }
    }

    fn dispatch_state_change(&self, ev: StateChangedEvent) {
        let entity_id = ev.data.entity_id;
        let Some((domain_str, _)) = split_entity_id(&entity_id) else {
            tracing::warn!(%entity_id, "state_changed with malformed entity id, dropping");
            return;
        };
        let store = Domain::parse(domain_str).and_then(|domain| self.stores.get(&domain));
        let Some(store) = store else {
            tracing::debug!(domain = domain_str, "no store for domain, ignoring state change");
            return;
        };
        if ev.data.new_state.is_null() {
            // Entity removed from the live stream; the next registry
            // recompute drops it from the store.
            tracing::debug!(%entity_id, "state_changed without new_state, ignoring");
            return;
        }
        match store {
            DomainStore::Lights(source) => {
                match serde_json::from_value::<LightState>(ev.data.new_state) {
                    Ok(state) => source.state_change(state),
                    Err(err) => tracing::warn!(%entity_id, %err, "undecodable light state, dropping"),
                }
            }
            DomainStore::Covers(source) => {
                match serde_json::from_value::<CoverState>(ev.data.new_state) {
                    Ok(state) => source.state_change(state),
                    Err(err) => tracing::warn!(%entity_id, %err, "undecodable cover state, dropping"),
                }
            }
            DomainStore::BinarySensors(source) => {
                match serde_json::from_value::<BinarySensorState>(ev.data.new_state) {
                    Ok(state) => source.state_change(state),
                    Err(err) => {
                        tracing::warn!(%entity_id, %err, "undecodable binary sensor state, dropping")
                    }
                }
            }
        }
    }

}
