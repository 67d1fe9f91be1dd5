//! Munin plugin mode implementations for munin-irqstats.
//!
//! This module provides one implementation per plugin mode:
//! - `autoconf`: readability probe for the interrupts file
//! - `config`: graph and field declaration block
//! - `fetch`: current counter values

pub mod autoconf;
pub mod config;
pub mod fetch;

// Re-export command functions
pub use autoconf::command_autoconf;
pub use config::command_config;
pub use fetch::command_fetch;
