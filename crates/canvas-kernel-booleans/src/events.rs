//! Lifecycle event reporting.
//!
//! The engine announces each operation on an injected [`EventBus`]. Hosts
//! that never install a bus pay nothing: emission is a no-op.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::api::BooleanOp;

/// Emitted before any work is done.
pub const OPERATION_STARTED: &str = "operation-started";
/// Emitted after a successful (possibly partial) result.
pub const OPERATION_COMPLETED: &str = "operation-completed";
/// Emitted when an operation fails.
pub const OPERATION_FAILED: &str = "operation-failed";

/// Publish side of a host event bus.
pub trait EventBus: Send + Sync {
    /// Publish `payload` under `event`.
    fn emit(&self, event: &str, payload: Value);
}

impl<F> EventBus for F
where
    F: Fn(&str, Value) + Send + Sync,
{
    fn emit(&self, event: &str, payload: Value) {
        self(event, payload)
    }
}

/// Bus that records events for later delivery.
///
/// Useful when the real listener cannot cross threads (a JavaScript
/// callback, for instance): install an `EventLog` on the engine and drain it
/// on the listener's side after each call.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<(String, Value)>>,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every recorded event, oldest first.
    pub fn drain(&self) -> Vec<(String, Value)> {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *events)
    }

    /// Number of events waiting to be drained.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventBus for EventLog {
    fn emit(&self, event: &str, payload: Value) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((event.to_string(), payload));
    }
}

/// Thin wrapper that tolerates a missing bus.
#[derive(Clone, Copy)]
pub(crate) struct Emitter<'a> {
    bus: Option<&'a dyn EventBus>,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(bus: Option<&'a dyn EventBus>) -> Self {
        Self { bus }
    }

    fn emit(&self, event: &str, payload: Value) {
        if let Some(bus) = self.bus {
            bus.emit(event, payload);
        }
    }

    pub(crate) fn started(&self, op: BooleanOp) {
        self.emit(
            OPERATION_STARTED,
            json!({ "operation": op.name(), "pathCount": 2 }),
        );
    }

    pub(crate) fn completed(&self, op: BooleanOp, result_path_count: usize) {
        self.emit(
            OPERATION_COMPLETED,
            json!({ "operation": op.name(), "resultPathCount": result_path_count }),
        );
    }

    pub(crate) fn failed(&self, op: BooleanOp, error: &str) {
        self.emit(
            OPERATION_FAILED,
            json!({ "operation": op.name(), "error": error }),
        );
    }
}
