//! Input and parsing helper functions for the CLI.
//!
//! This module provides utilities for:
//! - JSON payload reading and delete confirmation (`input`)
//! - Id, datetime and exercise reference parsing (`parsing`)

mod input;
mod parsing;

// Re-export public API
pub use input::{confirm_delete, read_payload};
pub use parsing::{parse_datetime, parse_id, resolve_exercise};
