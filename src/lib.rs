//! warta-bot - a minimal event-driven bot framework
//!
//! The core of the framework is the listener subsystem: listeners are
//! declared as YAML manifests in a directory, bound by name to event sources
//! (the bot client, the command and inhibitor handlers, the listener
//! handler's own lifecycle emitter, or caller-supplied emitters), and kept
//! in sync with live subscriptions by the [`ListenerHandler`].

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{BotError, CommandError, ConfigError, HandlerError};
pub use application::handlers::{
    CommandHandler, DefaultEmitters, InhibitorHandler, ListenerHandler, ListenerHandlerOptions,
};
pub use domain::entities::{Command, EmitterRef, Inhibitor, Listener, ListenerKind};
pub use domain::traits::{Adapter, AdapterInfo, Callback, EventPayload, EventSource};
pub use infrastructure::client::Client;
pub use infrastructure::config::Config;
pub use infrastructure::emitter::Emitter;
pub use infrastructure::listeners::{ActionRegistry, ListenerManifest, ListenerStore};
