//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Emitter: The concrete event source implementation
//! - Client: The bot client event source
//! - Listeners: File-backed listener discovery and hot-reload
//! - Adapters: Platform integrations (console, etc.)

pub mod adapters;
pub mod client;
pub mod config;
pub mod emitter;
pub mod listeners;
