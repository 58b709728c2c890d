//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod inhibitor;
pub mod listener;

pub use command::Command;
pub use inhibitor::Inhibitor;
pub use listener::{EmitterRef, Listener, ListenerKind};
