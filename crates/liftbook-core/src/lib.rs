//! # Liftbook Core
//!
//! Core library for Liftbook - the data and transaction engine behind a
//! workout tracker.
//!
//! Users define reusable workout templates, start sessions that copy a
//! template into an editable record of what was performed, and resubmit whole
//! templates or sessions for reconciliation against stored state.
//!
//! ## Architecture
//!
//! - **storage**: entity model, `WorkoutStore` / `EntityStore` traits and the
//!   SQLite backend
//! - **engine**: ownership guard, template engine, session materializer,
//!   reconciliation and cascade deletion, all generic over `EntityStore`
//! - **error**: `LiftbookError` and its caller-facing classification
//!
//! ## Example
//!
//! ```
//! use liftbook_core::{ExerciseEntry, SqliteStore, WorkoutRequest, WorkoutStore};
//! use uuid::Uuid;
//!
//! let store = SqliteStore::open_in_memory()?;
//! let user = Uuid::new_v4();
//! let squat = store.create_exercise("Squat")?;
//!
//! let request = WorkoutRequest::new("Leg day")
//!     .with_exercise(ExerciseEntry::new(squat.id).with_sets(3).with_reps(5));
//! let template = store.create_workout(&user, &request)?;
//!
//! let session = store.start_session(&user, &template.workout.id)?;
//! assert_eq!(session.sets.len(), 3);
//! # Ok::<(), liftbook_core::LiftbookError>(())
//! ```

pub mod engine;
pub mod error;
pub mod storage;

pub use error::{ErrorKind, LiftbookError, Result};
pub use storage::{
    EntityStore, Exercise, ExerciseEntry, ExerciseInstance, ExerciseSet, FinishSession, Gateway,
    NewSet, Page, PageRequest, SessionRequest, SessionStatus, SetEntry, SetPatch, SetStatus,
    SqliteOptions, SqliteStore, Workout, WorkoutDetail, WorkoutExercise, WorkoutLog,
    WorkoutLogDetail, WorkoutRequest, WorkoutStore,
};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteStore>();
    }
}
