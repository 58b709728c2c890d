use std::sync::Arc;

use crate::domain::traits::EventPayload;

/// Inhibitor predicate type. Returns `true` when the message should be
/// blocked.
pub type InhibitorPredicate = Arc<dyn Fn(&EventPayload) -> bool + Send + Sync>;

/// Represents a message inhibitor - a named predicate checked before
/// command execution.
pub struct Inhibitor {
    pub id: String,
    pub reason: String,
    pub predicate: InhibitorPredicate,
}

impl Inhibitor {
    pub fn new<F>(id: impl Into<String>, reason: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&EventPayload) -> bool + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            reason: reason.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn blocks(&self, payload: &EventPayload) -> bool {
        (self.predicate)(payload)
    }
}
