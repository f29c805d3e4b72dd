//! homehub-sdk
//!
//! A live, in-memory mirror of a home-automation hub. The hub owns the
//! truth (entities, devices, areas) and streams incremental events over
//! a persistent connection; this SDK keeps local stores current, enriches
//! every entity with hierarchical location metadata (area → floor), and
//! correlates commands with their responses on the same connection.
//!
//! # Architecture
//!
//! ```text
//!             raw frames                    display projections
//! transport ─────────────▶ EventRouter ┐        ▲
//!     ▲                                ├▶ stores (lights / covers / sensors)
//!     │ commands + ids                 │        │ locations
//!     └────── CommandCorrelator ◀──────┘  RegistryCache
//! ```
//!
//! The connection itself stays with the embedding application: it
//! implements [`MessageSink`] (outbound writes with id assignment) and
//! [`AuthHandler`] (the authentication handshake), feeds frames to
//! [`HubClient::on_frame`], and calls [`HubClient::connection_ready`]
//! after each completed handshake.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use homehub_sdk::{HubClient, HubConfig, LoggingMode};
//!
//! homehub_sdk::init_logging(LoggingMode::Development)?;
//!
//! let config: HubConfig = serde_json::from_str(&config_json)?;
//! let client = HubClient::new(transport, display, auth, config);
//!
//! // connection layer
//! client.on_frame(r#"{"type": "auth_ok"}"#);
//! client.connection_ready();
//!
//! // host UI
//! let lights = client.lights_data();
//! let overview = client.overview_data();
//! ```

mod client;
mod config;
pub mod logging;

pub use client::{HubClient, LocationCommand};
pub use config::HubConfig;
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};

// The embedder-facing pieces of the internal crates.
pub use homehub_command::{
    CommandCorrelator, CommandError, CommandResponse, ConnectionWriter, FrameSink, MessageSink,
    ResultFrame, COMMAND_TIMEOUT,
};
pub use homehub_registry::{Area, Device, Floor, Location, RegistryEntity};
pub use homehub_state::{
    BinarySensorState, CoverAction, CoverCommand, CoverState, CoversData, DisplayPayload,
    DisplaySink, LightCommand, LightColor, LightState, LightSwitch, LightsData, OverviewData,
    Rename, WindowSetup, WindowType,
};
pub use homehub_stream::AuthHandler;
