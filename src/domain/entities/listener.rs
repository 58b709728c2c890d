use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::traits::{Callback, EventPayload, EventSource};

/// How a listener stays subscribed after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListenerKind {
    /// Fires on every occurrence until explicitly deregistered.
    #[default]
    Normal,
    /// Fires on the next occurrence, then the subscription is dropped.
    Once,
}

/// The event source a listener binds to: either a name resolved through the
/// handler's emitter registry, or an emitter handle used directly.
#[derive(Clone)]
pub enum EmitterRef {
    Named(String),
    Direct(Arc<dyn EventSource>),
}

impl fmt::Debug for EmitterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitterRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            EmitterRef::Direct(_) => f.write_str("Direct(..)"),
        }
    }
}

impl From<&str> for EmitterRef {
    fn from(name: &str) -> Self {
        EmitterRef::Named(name.to_string())
    }
}

impl From<Arc<dyn EventSource>> for EmitterRef {
    fn from(source: Arc<dyn EventSource>) -> Self {
        EmitterRef::Direct(source)
    }
}

/// Represents one event listener: a callback bound to one event on one
/// event source.
pub struct Listener {
    pub id: String,
    pub emitter: EmitterRef,
    pub event: String,
    pub kind: ListenerKind,
    /// Manifest this listener was loaded from. `None` for listeners
    /// inserted programmatically, which therefore cannot be reloaded.
    pub path: Option<PathBuf>,
    enabled: AtomicBool,
    exec: Callback,
}

impl Listener {
    pub fn new<E, F>(id: impl Into<String>, emitter: E, event: impl Into<String>, exec: F) -> Self
    where
        E: Into<EmitterRef>,
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            emitter: emitter.into(),
            event: event.into(),
            kind: ListenerKind::Normal,
            path: None,
            enabled: AtomicBool::new(true),
            exec: Arc::new(exec),
        }
    }

    /// Build a listener around an already-shared callback.
    pub fn with_callback<E>(
        id: impl Into<String>,
        emitter: E,
        event: impl Into<String>,
        exec: Callback,
    ) -> Self
    where
        E: Into<EmitterRef>,
    {
        Self {
            id: id.into(),
            emitter: emitter.into(),
            event: event.into(),
            kind: ListenerKind::Normal,
            path: None,
            enabled: AtomicBool::new(true),
            exec,
        }
    }

    pub fn with_kind(mut self, kind: ListenerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The callback subscribed on the resolved emitter. Registration and
    /// removal both go through this exact `Arc`.
    pub fn exec(&self) -> &Callback {
        &self.exec
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("emitter", &self.emitter)
            .field("event", &self.event)
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("enabled", &self.enabled())
            .finish()
    }
}
