//! Application-level utilities for the Liftbook CLI.
//!
//! This module provides:
//! - Path resolution for the config file and database
//! - User id resolution
//! - The per-invocation [`AppContext`]

mod context;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::resolve_config_path;
