//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Listener handler errors
///
/// These surface misconfiguration and are meant to fail fast; none of them
/// is retried or recovered from.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Listener '{0}' does not exist")]
    ListenerNotFound(String),

    #[error("Listener '{listener}' names unknown emitter '{emitter}'")]
    UnknownEmitter { listener: String, emitter: String },

    #[error("Listener '{0}' is already loaded")]
    AlreadyLoaded(String),

    #[error("Listener '{0}' was not loaded from a file and cannot be reloaded")]
    NotReloadable(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Load error: {0}")]
    Load(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Blocked: {0}")]
    Blocked(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
