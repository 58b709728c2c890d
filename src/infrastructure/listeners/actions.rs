//! Action registry - named callback factories for manifest-declared listeners
//!
//! A manifest's `action` field is looked up here and the matching factory
//! builds the listener's callback from the manifest's `with` arguments. This
//! is the single entry point by which on-disk declarations reach executable
//! code.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::HandlerError;
use crate::domain::traits::{Callback, EventPayload};

/// Builds a callback from manifest arguments.
pub type ActionFactory = Arc<dyn Fn(&EventPayload) -> Callback + Send + Sync>;

/// Registry of named actions available to listener manifests.
pub struct ActionRegistry {
    factories: HashMap<String, ActionFactory>,
}

impl ActionRegistry {
    /// Empty registry with no actions.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in actions.
    ///
    /// - `log`: logs each delivery at info level; `with.message` overrides
    ///   the logged text.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("log", |args| {
            let message = args
                .get("message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string());
            Arc::new(move |payload| match &message {
                Some(message) => tracing::info!("{}", message),
                None => tracing::info!(%payload, "event received"),
            })
        });
        registry
    }

    /// Register an action factory under `name`. A later registration with
    /// the same name replaces the earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&EventPayload) -> Callback + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Build the callback for `name` from `args`.
    pub fn build(&self, name: &str, args: &EventPayload) -> Result<Callback, HandlerError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| HandlerError::UnknownAction(name.to_string()))?;
        Ok(factory(args))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
