//! Transport seam for outbound hub messages.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

/// Write half of the hub connection.
///
/// Implementations embed the next connection-wide message id into `msg`
/// before transmission and return it; correlated and fire-and-forget sends
/// share the same id sequence. The id is monotonically increasing for the
/// lifetime of a connection.
///
/// Writes are accepted unconditionally; the transport does not apply
/// back-pressure. Returning `None` means no connection is currently
/// available (e.g. mid-reconnect) and nothing was written.
pub trait MessageSink: Send + Sync {
    /// Embed an id into `msg`, write it to the hub, and return the id.
    fn send_message(&self, msg: Value) -> Option<u64>;
}

/// Raw write half of a live connection, as the embedder provides it.
///
/// This is the only transport surface the connection layer implements.
/// Handshake frames (which carry no id) are written here directly by the
/// connection layer; everything else goes through a [`ConnectionWriter`].
pub trait FrameSink: Send + Sync {
    /// Write one fully formed message. Returns `false` when no connection
    /// is available; the message is dropped in that case.
    fn write_frame(&self, msg: Value) -> bool;
}

/// [`MessageSink`] owning the connection-wide id sequence.
///
/// Every outbound message gets the next monotonically increasing `id`
/// embedded before it reaches the raw sink. An id consumed by a failed
/// write is never reused; gaps are harmless, order is what matters.
pub struct ConnectionWriter {
    sink: Arc<dyn FrameSink>,
    next_id: AtomicU64,
}

impl ConnectionWriter {
    pub fn new(sink: Arc<dyn FrameSink>) -> Self {
        Self {
            sink,
            next_id: AtomicU64::new(1),
        }
    }
}

impl MessageSink for ConnectionWriter {
    fn send_message(&self, mut msg: Value) -> Option<u64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Some(obj) = msg.as_object_mut() {
            obj.insert("id".to_string(), json!(id));
        }
        if self.sink.write_frame(msg) {
            Some(id)
        } else {
            tracing::debug!(id, "no connection, message dropped");
            None
        }
    }
}
