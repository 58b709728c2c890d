use std::sync::Arc;

/// Payload delivered to listener callbacks.
pub type EventPayload = serde_json::Value;

/// Listener callback. Subscriptions are identified by `Arc` pointer
/// identity, so the same `Callback` clone must be used to subscribe and to
/// remove.
pub type Callback = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// EventSource trait - the minimal publish/subscribe surface
///
/// Anything listeners can bind to implements this: the bot client, the
/// handler subsystems, or caller-supplied emitters.
pub trait EventSource: Send + Sync {
    /// Subscribe a callback that fires on every occurrence of `event`
    /// until it is explicitly removed.
    fn on(&self, event: &str, callback: Callback);

    /// Subscribe a callback that fires on the next occurrence of `event`
    /// and is then removed automatically.
    fn once(&self, event: &str, callback: Callback);

    /// Remove at most one subscription matching `event` and the callback's
    /// pointer identity. Removing a callback that is not subscribed is a
    /// no-op.
    fn remove_listener(&self, event: &str, callback: &Callback);
}
