//! Listener manifest definition

use serde::{Deserialize, Serialize};

use crate::application::errors::HandlerError;
use crate::domain::entities::ListenerKind;

/// One listener declaration on disk
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListenerManifest {
    /// Listener id. Defaults to the manifest's file stem.
    pub id: Option<String>,

    /// Name of the event source to bind to (required)
    pub emitter: String,

    /// Event to listen for (required)
    pub event: String,

    /// Subscription kind: `normal` or `once`
    #[serde(default)]
    pub kind: ListenerKind,

    /// Name of the action that provides the callback (required)
    pub action: String,

    /// Arguments handed to the action factory
    #[serde(rename = "with", default)]
    pub args: serde_json::Value,
}

impl ListenerManifest {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, HandlerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HandlerError::Load(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            HandlerError::Load(format!("Failed to parse manifest {}: {}", path.display(), e))
        })
    }
}
