//! Frame classification and event dispatch.
//!
//! The hub connection delivers a stream of JSON frames: command results,
//! pushed events, and handshake messages, sometimes batched into arrays.
//! This crate decodes them into typed messages and routes each one:
//!
//! ```text
//! raw frame ──▶ EventRouter
//!                 ├─ result ─────────────▶ CommandCorrelator
//!                 ├─ state_changed ──────▶ store for the entity's domain
//!                 ├─ *_registry_updated ─▶ RegistryCache::refresh (spawned)
//!                 ├─ auth_* ─────────────▶ AuthHandler (connection layer)
//!                 └─ anything else ──────▶ logged and dropped
//! ```
//!
//! The hub is an independently failing peer: malformed frames, unknown
//! types, and unroutable domains are never fatal.

mod frame;
mod router;

pub use frame::{
    EventFrame, HubEvent, HubMessage, RegistryUpdatedEvent, StateChangedData, StateChangedEvent,
};
pub use router::{AuthHandler, DomainStore, EventRouter};
