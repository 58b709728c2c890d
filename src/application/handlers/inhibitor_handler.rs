//! Inhibitor handler - named predicates checked before command execution

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::Inhibitor;
use crate::domain::traits::EventPayload;
use crate::infrastructure::emitter::Emitter;

/// Runs every inhibitor against a message payload and emits `blocked` when
/// one trips.
pub struct InhibitorHandler {
    inhibitors: HashMap<String, Inhibitor>,
    events: Arc<Emitter>,
}

impl InhibitorHandler {
    pub fn new() -> Self {
        Self {
            inhibitors: HashMap::new(),
            events: Arc::new(Emitter::new()),
        }
    }

    /// Lifecycle event emitter for this subsystem.
    pub fn events(&self) -> Arc<Emitter> {
        self.events.clone()
    }

    pub fn register(&mut self, inhibitor: Inhibitor) {
        self.inhibitors.insert(inhibitor.id.clone(), inhibitor);
    }

    pub fn len(&self) -> usize {
        self.inhibitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inhibitors.is_empty()
    }

    /// Returns the blocking reason of the first inhibitor that trips, or
    /// `None` when the payload may proceed.
    pub fn test(&self, payload: &EventPayload) -> Option<String> {
        for inhibitor in self.inhibitors.values() {
            if inhibitor.blocks(payload) {
                self.events.emit(
                    "blocked",
                    &json!({ "inhibitor": inhibitor.id, "reason": inhibitor.reason }),
                );
                return Some(inhibitor.reason.clone());
            }
        }
        None
    }
}

impl Default for InhibitorHandler {
    fn default() -> Self {
        Self::new()
    }
}
