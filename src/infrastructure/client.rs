//! Bot client - the primary event source of the framework
//!
//! Adapters feed platform traffic into the client's emitter; listeners bound
//! to the `client` source observe it from the other side.

use std::sync::Arc;

use serde_json::json;

use crate::domain::traits::EventPayload;
use crate::infrastructure::emitter::Emitter;

pub struct Client {
    name: String,
    events: Arc<Emitter>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Arc::new(Emitter::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client's event emitter.
    pub fn events(&self) -> Arc<Emitter> {
        self.events.clone()
    }

    /// Emit an event on the client.
    pub fn emit(&self, event: &str, payload: &EventPayload) {
        self.events.emit(event, payload);
    }

    /// Announce readiness. Adapters call this once their transport is up.
    pub fn connect(&self) {
        tracing::info!("Client '{}' ready", self.name);
        self.emit("ready", &json!({ "name": self.name }));
    }
}
