//! Listener loading - file-backed listener discovery and hot-reload
//!
//! Listeners are declared as YAML manifests inside a directory. Each
//! manifest names the emitter and event to bind, the subscription kind, and
//! an `action` resolved through the [`ActionRegistry`] to the callback that
//! actually runs.

pub mod actions;
pub mod manifest;
pub mod store;

pub use actions::ActionRegistry;
pub use manifest::ListenerManifest;
pub use store::ListenerStore;
