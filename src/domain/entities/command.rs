use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::traits::EventPayload;

/// Command handler function type
pub type CommandExec =
    Arc<dyn Fn(&EventPayload) -> Result<String, CommandError> + Send + Sync>;

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub exec: Option<CommandExec>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            exec: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_exec<F>(mut self, exec: F) -> Self
    where
        F: Fn(&EventPayload) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        self.exec = Some(Arc::new(exec));
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        let input_lower = input.to_lowercase();
        self.name.to_lowercase() == input_lower
            || self.aliases.iter().any(|a| a.to_lowercase() == input_lower)
    }
}
