use async_trait::async_trait;

use crate::application::errors::BotError;

/// Adapter trait - abstraction for messaging platform frontends
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Start the adapter and begin feeding messages into the client.
    async fn start(&self) -> Result<(), BotError>;

    /// Get adapter info
    fn info(&self) -> AdapterInfo;
}

/// Adapter information
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    pub id: String,
    pub name: String,
}
