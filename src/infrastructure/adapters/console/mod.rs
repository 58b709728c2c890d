//! Console adapter for development/testing

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::application::errors::BotError;
use crate::domain::traits::{Adapter, AdapterInfo};
use crate::infrastructure::client::Client;

/// Console adapter - reads stdin lines and feeds them into the client as
/// `message` events.
pub struct ConsoleAdapter {
    client: Arc<Client>,
    info: AdapterInfo,
}

impl ConsoleAdapter {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            info: AdapterInfo {
                id: "console".to_string(),
                name: "Console".to_string(),
            },
        }
    }
}

#[async_trait]
impl Adapter for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        self.client.connect();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| BotError::Adapter(format!("stdin read failed: {}", e)))?;
            let Some(line) = line else {
                break;
            };
            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            self.client.emit(
                "message",
                &json!({
                    "id": Uuid::new_v4().to_string(),
                    "text": text,
                }),
            );
        }

        tracing::info!("Console adapter stopped (stdin closed)");
        Ok(())
    }

    fn info(&self) -> AdapterInfo {
        self.info.clone()
    }
}
