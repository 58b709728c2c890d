//! Command handler - routes parsed commands and announces their lifecycle

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::application::errors::CommandError;
use crate::domain::entities::Command;
use crate::domain::traits::EventPayload;
use crate::infrastructure::emitter::Emitter;

/// Executes named commands and emits `command-started`, `command-finished`,
/// and `command-error` on its emitter.
pub struct CommandHandler {
    commands: HashMap<String, Command>,
    events: Arc<Emitter>,
}

impl CommandHandler {
    pub fn new() -> Self {
        let mut handler = Self {
            commands: HashMap::new(),
            events: Arc::new(Emitter::new()),
        };

        handler.register(
            Command::new("help")
                .with_description("Show help message")
                .with_exec(|_payload| {
                    Ok("Available commands:\n/help - Show this message\n/version - Show version"
                        .to_string())
                }),
        );
        handler.register(
            Command::new("version")
                .with_description("Show bot version")
                .with_exec(|_payload| Ok(format!("warta-bot v{}", env!("CARGO_PKG_VERSION")))),
        );

        handler
    }

    /// Lifecycle event emitter for this subsystem.
    pub fn events(&self) -> Arc<Emitter> {
        self.events.clone()
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands.values().find(|c| c.matches(input))
    }

    /// Execute a command by name.
    pub fn handle(&self, name: &str, payload: &EventPayload) -> Result<String, CommandError> {
        let command = self
            .find(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;
        let exec = command
            .exec
            .as_ref()
            .ok_or_else(|| CommandError::ExecutionFailed(format!("'{}' has no handler", name)))?;

        self.events
            .emit("command-started", &json!({ "command": command.name }));

        match exec(payload) {
            Ok(response) => {
                self.events
                    .emit("command-finished", &json!({ "command": command.name }));
                Ok(response)
            }
            Err(e) => {
                self.events.emit(
                    "command-error",
                    &json!({ "command": command.name, "error": e.to_string() }),
                );
                Err(e)
            }
        }
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
