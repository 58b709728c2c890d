//! Application handlers - the subsystems behind the reserved emitter names

pub mod command_handler;
pub mod inhibitor_handler;
pub mod listener_handler;

pub use command_handler::CommandHandler;
pub use inhibitor_handler::InhibitorHandler;
pub use listener_handler::{DefaultEmitters, ListenerHandler, ListenerHandlerOptions};
