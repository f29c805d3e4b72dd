//! Per-domain sources: a store plus its domain-specific projection,
//! command translation, and mutation side effects.

mod binary_sensors;
mod covers;
mod lights;

pub use binary_sensors::{virtual_cover, BinarySensorSource};
pub use covers::CoverSource;
pub use lights::LightSource;

use std::sync::{Arc, RwLock};

use crate::display::{DisplayPayload, DisplaySink};
use crate::model::Domain;

/// Listener invoked after every store mutation, carrying the mutated
/// domain.
pub type ChangeListener = Arc<dyn Fn(Domain) + Send + Sync>;

/// Shared mutation side effects: change-listener fan-out plus the display
/// channel. A source holds one of these and fires it after every merge or
/// recompute.
pub(crate) struct SourceHooks {
    listeners: RwLock<Vec<ChangeListener>>,
    sink: RwLock<Option<Arc<dyn DisplaySink>>>,
}

impl SourceHooks {
    pub(crate) fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            sink: RwLock::new(None),
        }
    }

    pub(crate) fn add_listener(&self, listener: ChangeListener) {
        self.listeners.write().unwrap().push(listener);
    }

    pub(crate) fn set_sink(&self, sink: Arc<dyn DisplaySink>) {
        *self.sink.write().unwrap() = Some(sink);
    }

    pub(crate) fn notify(&self, domain: Domain) {
        let listeners: Vec<_> = self.listeners.read().unwrap().clone();
        for listener in listeners {
            listener(domain);
        }
    }

    pub(crate) fn transmit(&self, payload: DisplayPayload) {
        let sink = self.sink.read().unwrap().clone();
        match sink {
            Some(sink) => sink.transmit(payload),
            None => tracing::debug!("no display sink registered, dropping projection"),
        }
    }
}
