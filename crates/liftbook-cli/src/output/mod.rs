//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying templates,
//! sessions and the exercise catalog as JSON or as text tables.

mod json;
mod text;

// Re-export public API
pub use json::print_json;
pub use text::{
    exercise_name_map, print_exercises, print_session, print_session_list, print_workout,
    print_workout_list,
};
