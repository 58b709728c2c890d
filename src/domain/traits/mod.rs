//! Domain traits - Abstractions for infrastructure implementations

pub mod adapter;
pub mod event_source;

pub use adapter::{Adapter, AdapterInfo};
pub use event_source::{Callback, EventPayload, EventSource};
