//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (Listener, Command, Inhibitor)
//! - Traits: Abstractions for infrastructure (EventSource, Adapter)

pub mod entities;
pub mod traits;
