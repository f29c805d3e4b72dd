//! Command/response correlation for hub connections.
//!
//! The hub answers commands asynchronously on the shared connection: every
//! outbound message carries a numeric id, and the matching `result` frame
//! echoes it back. This crate tracks the in-flight commands and resolves
//! each caller exactly once, either with the hub's response or with a
//! timeout.
//!
//! # Architecture
//!
//! ```text
//! caller ──▶ CommandCorrelator::send ──▶ MessageSink (transport)
//!                   │                         │
//!                   │ pending map             │ result frame
//!                   ◀── handle_result ◀───────┘
//! ```
//!
//! The transport itself (connection establishment, authentication,
//! reconnects) lives outside this crate behind the [`MessageSink`] trait.

mod correlator;
mod error;
mod sink;

pub use correlator::{CommandCorrelator, CommandResponse, ResultFrame, COMMAND_TIMEOUT};
pub use error::{CommandError, Result};
pub use sink::{ConnectionWriter, FrameSink, MessageSink};
