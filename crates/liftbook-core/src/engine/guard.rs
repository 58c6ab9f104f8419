//! Ownership guard.
//!
//! A row is visible to a user only if it is live and its owning template or
//! session belongs to that user. Absent, deleted and foreign rows produce the
//! same `NotFound` error.

use uuid::Uuid;

use crate::error::{LiftbookError, Result};
use crate::storage::traits::EntityStore;
use crate::storage::types::{ExerciseSet, Workout, WorkoutLog};

pub fn owned_workout<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<Workout> {
    match store.workout(id)? {
        Some(workout) if workout.user_id == *user_id => Ok(workout),
        _ => Err(LiftbookError::not_found("Workout", id)),
    }
}

pub fn owned_log<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<WorkoutLog> {
    match store.log(id)? {
        Some(log) if log.user_id == *user_id => Ok(log),
        _ => Err(LiftbookError::not_found("Session", id)),
    }
}

/// Resolve a set through its session.
pub fn owned_set<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<(WorkoutLog, ExerciseSet)> {
    let not_found = || LiftbookError::not_found("Set", id);
    let set = store.set(id)?.ok_or_else(not_found)?;
    match store.log(&set.workout_log_id)? {
        Some(log) if log.user_id == *user_id => Ok((log, set)),
        _ => Err(not_found()),
    }
}
