//! In-flight command tracking with exactly-once resolution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{CommandError, Result};
use crate::sink::MessageSink;

/// Fixed per-command timeout.
///
/// The hub answers list and service calls well within this window; anything
/// slower is treated as lost. Retry policy, if any, belongs to the caller.
pub const COMMAND_TIMEOUT: Duration = Duration::from_millis(2000);

/// A successful command response from the hub.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse {
    /// The `result` payload of the response frame
    pub result: Value,
    /// Round trip between write and response arrival
    pub latency: Duration,
}

/// A decoded `result` frame as received from the hub.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultFrame {
    /// Id echoed back from the outbound message
    pub id: u64,
    /// Whether the hub accepted the command
    #[serde(default)]
    pub success: bool,
    /// Response payload, `null` for commands without one
    #[serde(default)]
    pub result: Value,
}

struct PendingCommand {
    sent_at: Instant,
    tx: oneshot::Sender<CommandResponse>,
}

/// Tracks in-flight request/response pairs over the shared connection.
///
/// Each call to [`send`](CommandCorrelator::send) registers a pending entry
/// under the id the transport assigned and suspends the caller until either
/// the matching `result` frame arrives or [`COMMAND_TIMEOUT`] elapses.
/// Whichever path fires first removes the entry; the loser finds nothing
/// and has no effect. In-flight commands are independent: resolution of
/// one never blocks or orders another.
pub struct CommandCorrelator {
    sink: Arc<dyn MessageSink>,
    pending: DashMap<u64, PendingCommand>,
}

impl CommandCorrelator {
    /// Create a correlator writing through the given transport.
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            sink,
            pending: DashMap::new(),
        }
    }

    /// Send a command and wait for its response.
    ///
    /// Returns [`CommandError::Offline`] synchronously when no connection
    /// is available; no entry is registered and no timer started.
    /// Otherwise resolves exactly once: with the hub's response and the
    /// measured latency, or with [`CommandError::Expired`] after
    /// [`COMMAND_TIMEOUT`].
    pub async fn send(&self, msg: Value) -> Result<CommandResponse> {
        let Some(id) = self.sink.send_message(msg) else {
            return Err(CommandError::Offline);
        };

        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            id,
            PendingCommand {
                sent_at: Instant::now(),
                tx,
            },
        );

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(response)) => Ok(response),
            // Sender dropped without resolving; only happens if the
            // correlator is torn down while the command is in flight.
            Ok(Err(_)) => Err(CommandError::Expired),
            Err(_) => {
                self.pending.remove(&id);
                tracing::debug!(id, "command expired without a response");
                Err(CommandError::Expired)
            }
        }
    }

    /// Route a `result` frame to the caller waiting on its id.
    ///
    /// A frame whose id matches no pending entry (already expired, or
    /// never sent through this correlator) is dropped silently.
    pub fn handle_result(&self, frame: ResultFrame) {
        match self.pending.remove(&frame.id) {
            Some((_, cmd)) => {
                let latency = cmd.sent_at.elapsed();
                // Receiver gone means the timeout path already resolved
                // the caller; the response is dropped.
                let _ = cmd.tx.send(CommandResponse {
                    result: frame.result,
                    latency,
                });
            }
            None => {
                tracing::debug!(id = frame.id, "result for unknown or expired command, dropping");
            }
        }
    }

    /// Number of commands currently awaiting a response.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Transport fake: assigns sequential ids and records every write.
    struct FakeSink {
        next_id: AtomicU64,
        offline: AtomicBool,
        sent: Mutex<Vec<(u64, Value)>>,
    }

    impl FakeSink {
        fn online() -> Self {
            Self {
                next_id: AtomicU64::new(1),
                offline: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn offline() -> Self {
            let sink = Self::online();
            sink.offline.store(true, Ordering::SeqCst);
            sink
        }

        fn sent_len(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl MessageSink for FakeSink {
        fn send_message(&self, msg: Value) -> Option<u64> {
            if self.offline.load(Ordering::SeqCst) {
                return None;
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push((id, msg));
            Some(id)
        }
    }

    #[tokio::test]
    async fn resolves_via_response_path() {
        let sink = Arc::new(FakeSink::online());
        let correlator = Arc::new(CommandCorrelator::new(sink));

        let c = Arc::clone(&correlator);
        let caller = tokio::spawn(async move { c.send(json!({"type": "get_states"})).await });

        while correlator.pending_len() == 0 {
            tokio::task::yield_now().await;
        }
        correlator.handle_result(ResultFrame {
            id: 1,
            success: true,
            result: json!([{"entity_id": "light.kitchen"}]),
        });

        let response = caller.await.unwrap().unwrap();
        assert_eq!(response.result, json!([{"entity_id": "light.kitchen"}]));
        assert_eq!(correlator.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_timeout() {
        let sink = Arc::new(FakeSink::online());
        let correlator = CommandCorrelator::new(sink);

        let outcome = correlator.send(json!({"type": "get_states"})).await;

        assert_eq!(outcome, Err(CommandError::Expired));
        assert_eq!(correlator.pending_len(), 0);
    }

    #[tokio::test]
    async fn offline_returns_synchronously_without_entry() {
        let sink = Arc::new(FakeSink::offline());
        let correlator = CommandCorrelator::new(Arc::clone(&sink) as Arc<dyn MessageSink>);

        let outcome = correlator.send(json!({"type": "get_states"})).await;

        assert_eq!(outcome, Err(CommandError::Offline));
        assert_eq!(correlator.pending_len(), 0);
        assert_eq!(sink.sent_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_after_expiry_is_dropped() {
        let sink = Arc::new(FakeSink::online());
        let correlator = CommandCorrelator::new(sink);

        let outcome = correlator.send(json!({"type": "get_states"})).await;
        assert_eq!(outcome, Err(CommandError::Expired));

        // The entry is gone; a straggling response must be a no-op.
        correlator.handle_result(ResultFrame {
            id: 1,
            success: true,
            result: json!({}),
        });
        assert_eq!(correlator.pending_len(), 0);
    }

    #[tokio::test]
    async fn response_wins_over_timeout_exactly_once() {
        let sink = Arc::new(FakeSink::online());
        let correlator = Arc::new(CommandCorrelator::new(sink));

        let c = Arc::clone(&correlator);
        let caller = tokio::spawn(async move { c.send(json!({"type": "ping"})).await });

        while correlator.pending_len() == 0 {
            tokio::task::yield_now().await;
        }
        correlator.handle_result(ResultFrame {
            id: 1,
            success: true,
            result: json!("pong"),
        });
        // Duplicate result for the same id: entry already removed.
        correlator.handle_result(ResultFrame {
            id: 1,
            success: true,
            result: json!("pong again"),
        });

        let response = caller.await.unwrap().unwrap();
        assert_eq!(response.result, json!("pong"));
    }

    #[tokio::test]
    async fn in_flight_commands_resolve_independently() {
        let sink = Arc::new(FakeSink::online());
        let correlator = Arc::new(CommandCorrelator::new(sink));

        let c1 = Arc::clone(&correlator);
        let first = tokio::spawn(async move { c1.send(json!({"type": "a"})).await });
        let c2 = Arc::clone(&correlator);
        let second = tokio::spawn(async move { c2.send(json!({"type": "b"})).await });

        while correlator.pending_len() < 2 {
            tokio::task::yield_now().await;
        }
        // Resolve out of order; neither blocks the other.
        correlator.handle_result(ResultFrame {
            id: 2,
            success: true,
            result: json!("second"),
        });
        correlator.handle_result(ResultFrame {
            id: 1,
            success: true,
            result: json!("first"),
        });

        assert_eq!(second.await.unwrap().unwrap().result, json!("second"));
        assert_eq!(first.await.unwrap().unwrap().result, json!("first"));
    }

    #[test]
    fn result_frame_decodes_with_defaults() {
        let frame: ResultFrame =
            serde_json::from_str(r#"{"id": 7, "type": "result", "success": true}"#).unwrap();
        assert_eq!(frame.id, 7);
        assert!(frame.success);
        assert_eq!(frame.result, Value::Null);
    }
}
