//! Construction, wiring, and the embedder-facing surface.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use homehub_command::{CommandCorrelator, CommandResponse, MessageSink};
use homehub_registry::{Location, RegistryCache, RegistryObserver};
use homehub_state::{
    build_overview, BinarySensorSource, BinarySensorState, ChangeListener, CoverAction,
    CoverCommand, CoverKind, CoverSource, CoverState, CoversData, DisplayPayload, DisplaySink,
    Domain, LightCommand, LightSource, LightState, LightSwitch, LightsData, OverviewData,
    ServiceCall, split_entity_id,
};
use homehub_stream::{AuthHandler, EventRouter};

use crate::config::HubConfig;

/// A location-scoped intent from the overview UI: switch every light
/// and/or move every cover of a kind within one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCommand {
    pub location_id: String,
    #[serde(default)]
    pub lights: Option<LightSwitch>,
    #[serde(default)]
    pub shutters: Option<CoverAction>,
    #[serde(default)]
    pub doors: Option<CoverAction>,
    #[serde(default)]
    pub windows: Option<CoverAction>,
}

/// The wired-up SDK: correlator, registry cache, per-domain stores, and
/// the frame router, constructed once at startup and shared by handle.
///
/// The embedding application owns the socket. It feeds every inbound
/// frame to [`on_frame`](Self::on_frame), answers the authentication
/// handshake through its [`AuthHandler`], and calls
/// [`connection_ready`](Self::connection_ready) once the handshake
/// completes, on the first connect and after every reconnect. Everything
/// else flows from there.
pub struct HubClient {
    transport: Arc<dyn MessageSink>,
    correlator: Arc<CommandCorrelator>,
    registry: Arc<RegistryCache>,
    lights: Arc<LightSource>,
    covers: Arc<CoverSource>,
    binary_sensors: Arc<BinarySensorSource>,
    router: EventRouter,
    verbose: bool,
}

impl HubClient {
    /// Wire all components. No global state: every handle is created here
    /// and passed explicitly.
    pub fn new(
        transport: Arc<dyn MessageSink>,
        display: Arc<dyn DisplaySink>,
        auth: Arc<dyn AuthHandler>,
        config: HubConfig,
    ) -> Self {
        let correlator = Arc::new(CommandCorrelator::new(Arc::clone(&transport)));
        let registry = Arc::new(RegistryCache::new(
            Arc::clone(&correlator),
            config.floors.clone(),
        ));

        let covers = Arc::new(CoverSource::new(
            Arc::clone(&registry) as _,
            config.renames.clone(),
            config.window_setup.clone(),
        ));
        let lights = Arc::new(LightSource::new(
            Arc::clone(&registry) as _,
            config.renames.clone(),
        ));
        let binary_sensors = Arc::new(BinarySensorSource::new(
            Arc::clone(&registry) as _,
            Arc::clone(&covers),
        ));

        registry.add_observer(Arc::clone(&lights) as Arc<dyn RegistryObserver>);
        registry.add_observer(Arc::clone(&covers) as Arc<dyn RegistryObserver>);
        registry.add_observer(Arc::clone(&binary_sensors) as Arc<dyn RegistryObserver>);

        lights.set_display_sink(Arc::clone(&display));
        covers.set_display_sink(Arc::clone(&display));

        // Any store mutation refreshes the aggregate overview.
        let overview_listener: ChangeListener = {
            let display = Arc::clone(&display);
            let lights = Arc::clone(&lights);
            let covers = Arc::clone(&covers);
            Arc::new(move |_domain: Domain| {
                let data = build_overview(lights.active_lights(), covers.active_covers());
                display.transmit(DisplayPayload::Overview(data));
            })
        };
        lights.add_change_listener(Arc::clone(&overview_listener));
        covers.add_change_listener(Arc::clone(&overview_listener));
        binary_sensors.add_change_listener(overview_listener);

        let router = EventRouter::new(
            Arc::clone(&correlator),
            Arc::clone(&registry),
            Arc::clone(&lights),
            Arc::clone(&covers),
            Arc::clone(&binary_sensors),
            auth,
        );

        Self {
            transport,
            correlator,
            registry,
            lights,
            covers,
            binary_sensors,
            router,
            verbose: config.verbose,
        }
    }

    /// Feed one raw inbound frame from the connection.
    pub fn on_frame(&self, raw: &str) {
        self.router.on_frame(raw);
    }

    /// Signal that the transport finished its handshake.
    ///
    /// Spawns a full resync: subscribe to the event stream, merge a state
    /// dump into the stores, then refresh the registry. Call it on every
    /// reconnect as well; merging the dump is idempotent.
    pub fn connection_ready(&self) {
        tokio::spawn(resync(
            Arc::clone(&self.transport),
            Arc::clone(&self.correlator),
            Arc::clone(&self.registry),
            Arc::clone(&self.lights),
            Arc::clone(&self.covers),
            Arc::clone(&self.binary_sensors),
        ));
    }

    /// Run the resync inline; [`connection_ready`](Self::connection_ready)
    /// is the spawned variant.
    pub async fn resync(&self) {
        resync(
            Arc::clone(&self.transport),
            Arc::clone(&self.correlator),
            Arc::clone(&self.registry),
            Arc::clone(&self.lights),
            Arc::clone(&self.covers),
            Arc::clone(&self.binary_sensors),
        )
        .await;
    }

    /// Issue a correlated command against the hub.
    pub async fn send_command(&self, msg: Value) -> homehub_command::Result<CommandResponse> {
        self.correlator.send(msg).await
    }

    // ------------------------------------------------------------------
    // Display queries
    // ------------------------------------------------------------------

    pub fn lights_data(&self) -> LightsData {
        self.lights.data()
    }

    pub fn covers_data(&self) -> CoversData {
        self.covers.data()
    }

    /// Aggregate of everything currently on or open.
    pub fn overview_data(&self) -> OverviewData {
        build_overview(self.lights.active_lights(), self.covers.active_covers())
    }

    /// Window-class sensors, for configuration pickers.
    pub fn window_sensors(&self) -> Vec<BinarySensorState> {
        self.binary_sensors.window_sensors()
    }

    // ------------------------------------------------------------------
    // Location queries
    // ------------------------------------------------------------------

    /// Every selectable location: wildcard, areas, floors.
    pub fn all_locations(&self) -> Vec<Location> {
        self.registry.all_locations()
    }

    /// Resolved location set of one entity, `None` when unregistered.
    pub fn locations_for_entity(&self, entity_id: &str) -> Option<Vec<String>> {
        self.registry.resolve_locations(entity_id)
    }

    // ------------------------------------------------------------------
    // Command execution
    // ------------------------------------------------------------------

    /// Translate and send a light intent. Returns whether a message was
    /// written to the hub.
    pub fn execute_light_command(&self, cmd: &LightCommand) -> bool {
        if self.verbose {
            tracing::debug!(?cmd, "light command");
        }
        match self.lights.command(cmd) {
            Some(call) => self.send_call(call),
            None => {
                tracing::warn!(ident = %cmd.ident, "no handler for light command");
                false
            }
        }
    }

    /// Translate and send a cover intent. Returns whether a message was
    /// written to the hub.
    pub fn execute_cover_command(&self, cmd: &CoverCommand) -> bool {
        if self.verbose {
            tracing::debug!(?cmd, "cover command");
        }
        match self.covers.command(cmd) {
            Some(call) => self.send_call(call),
            None => {
                tracing::warn!(ident = %cmd.ident, "no handler for cover command");
                false
            }
        }
    }

    /// Fan a location-scoped intent out to every matching entity.
    /// Returns the number of messages written.
    pub fn execute_location_command(&self, cmd: &LocationCommand) -> usize {
        if self.verbose {
            tracing::debug!(?cmd, "location command");
        }
        let mut calls: Vec<ServiceCall> = Vec::new();
        if let Some(target) = cmd.lights {
            calls.extend(self.lights.commands_for_location(&cmd.location_id, target));
        }
        for (action, kind) in [
            (cmd.shutters, CoverKind::Shutters),
            (cmd.doors, CoverKind::Doors),
            (cmd.windows, CoverKind::Windows),
        ] {
            if let Some(action) = action {
                calls.extend(
                    self.covers
                        .commands_for_location(&cmd.location_id, action, kind),
                );
            }
        }
        let mut sent = 0;
        for call in calls {
            if self.send_call(call) {
                sent += 1;
            }
        }
        sent
    }

    fn send_call(&self, call: ServiceCall) -> bool {
        match self.transport.send_message(call.into_message()) {
            Some(_) => true,
            None => {
                tracing::warn!("no connection, dropping service call");
                false
            }
        }
    }
}

/// Full state resync after a (re)connect: subscribe to the live stream,
/// merge the state dump, then refresh the registry so locations resolve.
async fn resync(
    transport: Arc<dyn MessageSink>,
    correlator: Arc<CommandCorrelator>,
    registry: Arc<RegistryCache>,
    lights: Arc<LightSource>,
    covers: Arc<CoverSource>,
    binary_sensors: Arc<BinarySensorSource>,
) {
    // Subscribe first so no event falls between the dump and the stream.
    if transport
        .send_message(json!({ "type": "subscribe_events" }))
        .is_none()
    {
        tracing::warn!("resync: no connection, skipping");
        return;
    }

    match correlator.send(json!({ "type": "get_states" })).await {
        Ok(response) => {
            apply_state_dump(&lights, &covers, &binary_sensors, response.result);
        }
        Err(err) => {
            tracing::warn!(%err, "state dump failed during resync");
        }
    }

    registry.refresh().await;
}

/// Split a `get_states` dump by domain prefix and merge each batch into
/// its store. Unsupported domains coexist silently.
fn apply_state_dump(
    lights: &LightSource,
    covers: &CoverSource,
    binary_sensors: &BinarySensorSource,
    result: Value,
) {
    let Value::Array(states) = result else {
        tracing::warn!("state dump is not an array, ignoring");
        return;
    };

    let mut light_states: Vec<LightState> = Vec::new();
    let mut cover_states: Vec<CoverState> = Vec::new();
    let mut sensor_states: Vec<BinarySensorState> = Vec::new();

    for state in states {
        let Some(entity_id) = state.get("entity_id").and_then(Value::as_str) else {
            continue;
        };
        let Some((domain, _)) = split_entity_id(entity_id) else {
            continue;
        };
        match Domain::parse(domain) {
            Some(Domain::Light) => match serde_json::from_value(state) {
                Ok(parsed) => light_states.push(parsed),
                Err(err) => tracing::warn!(%err, "undecodable light in dump, skipping"),
            },
            Some(Domain::Cover) => match serde_json::from_value(state) {
                Ok(parsed) => cover_states.push(parsed),
                Err(err) => tracing::warn!(%err, "undecodable cover in dump, skipping"),
            },
            Some(Domain::BinarySensor) => match serde_json::from_value(state) {
                Ok(parsed) => sensor_states.push(parsed),
                Err(err) => tracing::warn!(%err, "undecodable binary sensor in dump, skipping"),
            },
            None => {}
        }
    }

    tracing::info!(
        lights = light_states.len(),
        covers = cover_states.len(),
        binary_sensors = sensor_states.len(),
        "merging state dump"
    );

    if !light_states.is_empty() {
        lights.set_states(light_states);
    }
    if !cover_states.is_empty() {
        covers.set_states(cover_states);
    }
    if !sensor_states.is_empty() {
        binary_sensors.set_states(sensor_states);
    }
}
