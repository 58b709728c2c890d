//! Listener store - loads listener manifests and owns the module mapping

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::json;

use crate::application::errors::HandlerError;
use crate::domain::entities::{EmitterRef, Listener};
use crate::infrastructure::emitter::Emitter;
use crate::infrastructure::listeners::{ActionRegistry, ListenerManifest};

/// File-backed listener store.
///
/// Owns the id → listener mapping in insertion order and emits lifecycle
/// notifications (`add`, `remove`, `reload`, `enable`, `disable`) on its own
/// emitter, which the handler exposes as the `listener-handler` source.
pub struct ListenerStore {
    directory: PathBuf,
    actions: ActionRegistry,
    modules: IndexMap<String, Arc<Listener>>,
    events: Arc<Emitter>,
}

impl ListenerStore {
    pub fn new(directory: impl Into<PathBuf>, actions: ActionRegistry) -> Self {
        Self {
            directory: directory.into(),
            actions,
            modules: IndexMap::new(),
            events: Arc::new(Emitter::new()),
        }
    }

    /// Directory the store discovers manifests in.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Loaded listeners, mapped by id, in load order.
    pub fn modules(&self) -> &IndexMap<String, Arc<Listener>> {
        &self.modules
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Listener>> {
        self.modules.get(id)
    }

    /// Lifecycle notification emitter.
    pub fn events(&self) -> Arc<Emitter> {
        self.events.clone()
    }

    /// Load every manifest in the directory, sorted by file name so load
    /// order is deterministic. Returns the loaded ids in order.
    pub fn load_all(&mut self) -> Result<Vec<String>, HandlerError> {
        if !self.directory.exists() {
            tracing::warn!(
                "Listener directory does not exist: {}",
                self.directory.display()
            );
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.directory)
            .map_err(|e| {
                HandlerError::Load(format!(
                    "Failed to read listener directory {}: {}",
                    self.directory.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
            })
            .collect();
        paths.sort();

        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            let listener = self.load(&path)?;
            loaded.push(listener.id.clone());
        }
        Ok(loaded)
    }

    /// Load one listener from a manifest file and store it.
    pub fn load(&mut self, filepath: impl AsRef<Path>) -> Result<Arc<Listener>, HandlerError> {
        let filepath = filepath.as_ref();
        let manifest = ListenerManifest::from_file(filepath)?;

        let id = match manifest.id {
            Some(id) => id,
            None => filepath
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    HandlerError::Load(format!(
                        "Cannot derive listener id from {}",
                        filepath.display()
                    ))
                })?,
        };

        let exec = self.actions.build(&manifest.action, &manifest.args)?;
        let listener = Listener::with_callback(
            id,
            EmitterRef::Named(manifest.emitter),
            manifest.event,
            exec,
        )
        .with_kind(manifest.kind)
        .with_path(filepath);

        let listener = self.store(listener)?;
        tracing::info!(
            "Loaded listener '{}' from {}",
            listener.id,
            filepath.display()
        );
        self.notify("add", &listener);
        Ok(listener)
    }

    /// Store a listener built in code. Such listeners carry no manifest
    /// path and cannot be reloaded.
    pub fn insert(&mut self, listener: Listener) -> Result<Arc<Listener>, HandlerError> {
        let listener = self.store(listener)?;
        self.notify("add", &listener);
        Ok(listener)
    }

    /// Remove a listener from the mapping and return it.
    pub fn remove(&mut self, id: &str) -> Result<Arc<Listener>, HandlerError> {
        let listener = self
            .modules
            .shift_remove(id)
            .ok_or_else(|| HandlerError::ListenerNotFound(id.to_string()))?;
        tracing::info!("Removed listener '{}'", id);
        self.notify("remove", &listener);
        Ok(listener)
    }

    /// Re-read a listener's manifest and replace the stored instance.
    pub fn reload(&mut self, id: &str) -> Result<Arc<Listener>, HandlerError> {
        let old = self
            .modules
            .get(id)
            .ok_or_else(|| HandlerError::ListenerNotFound(id.to_string()))?;
        let path = old
            .path
            .clone()
            .ok_or_else(|| HandlerError::NotReloadable(id.to_string()))?;

        self.modules.shift_remove(id);

        let manifest = ListenerManifest::from_file(&path)?;
        let new_id = manifest.id.clone().unwrap_or_else(|| id.to_string());
        let exec = self.actions.build(&manifest.action, &manifest.args)?;
        let listener = Listener::with_callback(
            new_id,
            EmitterRef::Named(manifest.emitter),
            manifest.event,
            exec,
        )
        .with_kind(manifest.kind)
        .with_path(&path);

        let listener = self.store(listener)?;
        tracing::info!("Reloaded listener '{}'", listener.id);
        self.notify("reload", &listener);
        Ok(listener)
    }

    /// Emit a lifecycle notification carrying the affected listener.
    pub fn notify(&self, lifecycle: &str, listener: &Listener) {
        self.events.emit(
            lifecycle,
            &json!({
                "id": listener.id,
                "event": listener.event,
            }),
        );
    }

    fn store(&mut self, listener: Listener) -> Result<Arc<Listener>, HandlerError> {
        if self.modules.contains_key(&listener.id) {
            return Err(HandlerError::AlreadyLoaded(listener.id));
        }
        let listener = Arc::new(listener);
        self.modules.insert(listener.id.clone(), listener.clone());
        Ok(listener)
    }
}
