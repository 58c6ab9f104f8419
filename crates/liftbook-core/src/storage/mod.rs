//! Storage abstraction for Liftbook.
//!
//! This module defines the `WorkoutStore` operation surface, the row-level
//! `EntityStore` gateway the engine is written against, and the entity types
//! shared by both.
//!
//! ## Architecture
//!
//! - `traits`: the two seams
//! - `types`: entities, request payloads, pagination
//! - `sqlite`: the canonical backend; one connection, one transaction per
//!   mutating call
//!
//! Reads exclude soft-deleted rows. Nothing is ever hard-deleted.

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::{Gateway, SqliteOptions, SqliteStore};
pub use traits::{EntityStore, Owner, Table, WorkoutStore};
pub use types::{
    Exercise, ExerciseEntry, ExerciseInstance, ExerciseSet, FinishSession, NewSet, Page,
    PageRequest, SessionRequest, SessionStatus, SetEntry, SetPatch, SetStatus, Workout,
    WorkoutDetail, WorkoutExercise, WorkoutLog, WorkoutLogDetail, WorkoutRequest,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
