//! Listener handler - keeps emitter subscriptions in sync with loaded listeners
//!
//! Construction seeds the emitter registry (reserved names first, then
//! caller-supplied extras), loads every manifest in the listener directory,
//! and registers each loaded listener. Afterwards, individual listeners can
//! be loaded, removed, reloaded, enabled, and disabled; every operation
//! keeps the live subscriptions consistent with the module mapping.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::application::errors::HandlerError;
use crate::domain::entities::{EmitterRef, Listener, ListenerKind};
use crate::domain::traits::EventSource;
use crate::infrastructure::listeners::{ActionRegistry, ListenerStore};

/// Reserved emitter name for the bot client.
pub const CLIENT: &str = "client";
/// Reserved emitter name for the command handler subsystem.
pub const COMMAND_HANDLER: &str = "command-handler";
/// Reserved emitter name for the inhibitor handler subsystem.
pub const INHIBITOR_HANDLER: &str = "inhibitor-handler";
/// Reserved emitter name for the listener handler's own lifecycle events.
pub const LISTENER_HANDLER: &str = "listener-handler";

/// The default event sources every handler instance is wired with. Passed
/// explicitly so tests can substitute their own.
pub struct DefaultEmitters {
    pub client: Arc<dyn EventSource>,
    pub command_handler: Arc<dyn EventSource>,
    pub inhibitor_handler: Arc<dyn EventSource>,
}

/// Construction options.
pub struct ListenerHandlerOptions {
    /// Directory to discover listener manifests in.
    pub directory: PathBuf,
    /// Extra named emitters. Entries colliding with a reserved name are
    /// ignored; the first registration wins.
    pub emitters: IndexMap<String, Arc<dyn EventSource>>,
}

impl ListenerHandlerOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            emitters: IndexMap::new(),
        }
    }

    pub fn with_emitter(
        mut self,
        name: impl Into<String>,
        emitter: Arc<dyn EventSource>,
    ) -> Self {
        self.emitters.insert(name.into(), emitter);
        self
    }
}

/// Synchronizes listener modules with live emitter subscriptions.
pub struct ListenerHandler {
    emitters: IndexMap<String, Arc<dyn EventSource>>,
    store: ListenerStore,
}

impl ListenerHandler {
    /// Build the emitter registry, load every listener in the directory,
    /// and register each one. Live subscriptions exist once this returns.
    pub fn new(
        defaults: DefaultEmitters,
        options: ListenerHandlerOptions,
        actions: ActionRegistry,
    ) -> Result<Self, HandlerError> {
        let mut store = ListenerStore::new(options.directory, actions);

        let mut emitters: IndexMap<String, Arc<dyn EventSource>> = IndexMap::new();
        emitters.insert(CLIENT.to_string(), defaults.client);
        emitters.insert(COMMAND_HANDLER.to_string(), defaults.command_handler);
        emitters.insert(INHIBITOR_HANDLER.to_string(), defaults.inhibitor_handler);
        emitters.insert(LISTENER_HANDLER.to_string(), store.events());

        for (name, emitter) in options.emitters {
            if emitters.contains_key(&name) {
                tracing::warn!("Ignoring emitter '{}': name already registered", name);
                continue;
            }
            emitters.insert(name, emitter);
        }

        let loaded = store.load_all()?;
        let handler = Self { emitters, store };
        for id in &loaded {
            handler.register(id)?;
        }
        tracing::info!("Registered {} listener(s)", loaded.len());
        Ok(handler)
    }

    /// Loaded listeners, mapped by id.
    pub fn listeners(&self) -> &IndexMap<String, Arc<Listener>> {
        self.store.modules()
    }

    /// Named event sources available to listeners.
    pub fn emitters(&self) -> &IndexMap<String, Arc<dyn EventSource>> {
        &self.emitters
    }

    /// Directory listeners are discovered in.
    pub fn directory(&self) -> &Path {
        self.store.directory()
    }

    /// Subscribe a loaded listener to its event source.
    ///
    /// Any existing subscription for the listener is removed first, so a
    /// repeated `register` never stacks a duplicate callback.
    pub fn register(&self, id: &str) -> Result<(), HandlerError> {
        let listener = self
            .store
            .get(id)
            .ok_or_else(|| HandlerError::ListenerNotFound(id.to_string()))?;
        let source = self.resolve(listener)?;

        let exec = listener.exec().clone();
        source.remove_listener(&listener.event, &exec);
        match listener.kind {
            ListenerKind::Once => source.once(&listener.event, exec),
            ListenerKind::Normal => source.on(&listener.event, exec),
        }
        tracing::debug!("Registered listener '{}' for '{}'", id, listener.event);
        Ok(())
    }

    /// Remove a loaded listener's subscription from its event source.
    /// A listener that is not currently subscribed is left as-is.
    pub fn deregister(&self, id: &str) -> Result<(), HandlerError> {
        let listener = self
            .store
            .get(id)
            .ok_or_else(|| HandlerError::ListenerNotFound(id.to_string()))?;
        let source = self.resolve(listener)?;

        source.remove_listener(&listener.event, listener.exec());
        tracing::debug!("Deregistered listener '{}' from '{}'", id, listener.event);
        Ok(())
    }

    /// Load a listener manifest. The caller registers it separately.
    pub fn load(&mut self, filepath: impl AsRef<Path>) -> Result<Arc<Listener>, HandlerError> {
        self.store.load(filepath)
    }

    /// Store a listener built in code. The caller registers it separately.
    pub fn insert(&mut self, listener: Listener) -> Result<Arc<Listener>, HandlerError> {
        self.store.insert(listener)
    }

    /// Deregister a listener and drop it from the module mapping.
    pub fn remove(&mut self, id: &str) -> Result<Arc<Listener>, HandlerError> {
        self.deregister(id)?;
        self.store.remove(id)
    }

    /// Deregister, re-read the listener's manifest, and register the new
    /// instance. The ordering guarantees the old callback never outlives
    /// the reload and the new instance receives all future events.
    pub fn reload(&mut self, id: &str) -> Result<Arc<Listener>, HandlerError> {
        self.deregister(id)?;
        let listener = self.store.reload(id)?;
        self.register(&listener.id)?;
        Ok(listener)
    }

    /// Re-register a disabled listener and mark it enabled.
    pub fn enable(&self, id: &str) -> Result<(), HandlerError> {
        self.register(id)?;
        let listener = self
            .store
            .get(id)
            .ok_or_else(|| HandlerError::ListenerNotFound(id.to_string()))?;
        listener.set_enabled(true);
        self.store.notify("enable", listener);
        Ok(())
    }

    /// Deregister a listener without unloading it.
    pub fn disable(&self, id: &str) -> Result<(), HandlerError> {
        self.deregister(id)?;
        let listener = self
            .store
            .get(id)
            .ok_or_else(|| HandlerError::ListenerNotFound(id.to_string()))?;
        listener.set_enabled(false);
        self.store.notify("disable", listener);
        Ok(())
    }

    /// Resolve a listener's emitter reference to an event source. This is
    /// the only place `EmitterRef` is interpreted.
    fn resolve(&self, listener: &Listener) -> Result<Arc<dyn EventSource>, HandlerError> {
        match &listener.emitter {
            EmitterRef::Direct(source) => Ok(source.clone()),
            EmitterRef::Named(name) => self
                .emitters
                .get(name)
                .cloned()
                .ok_or_else(|| HandlerError::UnknownEmitter {
                    listener: listener.id.clone(),
                    emitter: name.clone(),
                }),
        }
    }
}
