//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Handlers: Listener, command, and inhibitor subsystems
//! - Errors: Domain-specific errors

pub mod errors;
pub mod handlers;
