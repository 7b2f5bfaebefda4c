//! Hook fixtures

use coord_core::{Arbiter, Coordinates, MalformedHandler, MalformedValue, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Malformed handler that records every batch it receives.
///
/// Clones share the same record, so keep one clone for assertions and hand
/// the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    batches: Arc<Mutex<Vec<Vec<MalformedValue>>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<MalformedValue>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

impl MalformedHandler for RecordingHandler {
    fn handle(&self, _coordinates: &Coordinates, _name: &str, values: &[MalformedValue]) {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(values.to_vec());
        }
    }
}

/// Arbiter that counts its invocations and then defers to an inner decision.
#[derive(Clone)]
pub struct CountingArbiter {
    calls: Arc<AtomicUsize>,
    decide: Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>,
}

impl CountingArbiter {
    /// An arbiter that always declines.
    pub fn declining() -> Self {
        Self::deciding(|_| None)
    }

    /// An arbiter that picks the last tied value.
    pub fn picking_last() -> Self {
        Self::deciding(|tied| tied.last().cloned())
    }

    pub fn deciding(decide: impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            decide: Arc::new(decide),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Arbiter for CountingArbiter {
    fn arbitrate(&self, _coordinates: &Coordinates, _name: &str, tied: &[Value]) -> Option<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.decide)(tied)
    }
}
