//! Session materialization.
//!
//! Starting a session from a template snapshots every template entry into
//! planned sets. Each set reuses the entry's exercise instance, so repeated
//! occurrences of one exercise stay distinguishable in the session exactly as
//! they were in the template.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{at_storage_precision, guard, now};
use crate::error::Result;
use crate::storage::traits::EntityStore;
use crate::storage::types::{
    ExerciseSet, SessionStatus, SetStatus, WorkoutExercise, WorkoutLog, WorkoutLogDetail,
};

fn new_log(
    user_id: &Uuid,
    workout_id: Option<Uuid>,
    started_at: DateTime<Utc>,
    at: DateTime<Utc>,
) -> WorkoutLog {
    WorkoutLog {
        id: Uuid::new_v4(),
        user_id: *user_id,
        workout_id,
        started_at,
        finished_at: None,
        status: SessionStatus::InProgress,
        active_duration_secs: 0,
        pause_duration_secs: 0,
        created_at: at,
        updated_at: at,
        deleted_at: None,
    }
}

/// The instance an entry's sets should use, or `None` to skip the entry.
fn usable_instance<S: EntityStore + ?Sized>(
    store: &S,
    entry: &WorkoutExercise,
) -> Result<Option<Uuid>> {
    if store.exercise(&entry.exercise_id)?.is_none() {
        log::warn!(
            "Skipping workout exercise {}: exercise {} is missing or retired",
            entry.id,
            entry.exercise_id
        );
        return Ok(None);
    }
    let Some(instance_id) = entry.exercise_instance_id else {
        log::warn!(
            "Skipping workout exercise {}: no exercise instance",
            entry.id
        );
        return Ok(None);
    };
    if store.instance(&instance_id)?.is_none() {
        log::warn!(
            "Skipping workout exercise {}: exercise instance {} is missing or deleted",
            entry.id,
            instance_id
        );
        return Ok(None);
    }
    Ok(Some(instance_id))
}

/// Start a session from a template.
///
/// Every entry yields `sets` pending sets (one when unset), numbered from 1
/// per instance and carrying the planned weight and reps. Entries whose
/// exercise or instance is gone are skipped with a warning.
pub fn start_session<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    workout_id: &Uuid,
) -> Result<WorkoutLogDetail> {
    let workout = guard::owned_workout(store, user_id, workout_id)?;
    let entries = store.workout_exercises(&workout.id)?;

    let at = now();
    let log = new_log(user_id, Some(workout.id), at, at);
    store.insert_log(&log)?;

    let mut counters: HashMap<Uuid, i32> = HashMap::new();
    let mut sets = Vec::new();
    for entry in &entries {
        let Some(instance_id) = usable_instance(store, entry)? else {
            continue;
        };
        for _ in 0..entry.sets.unwrap_or(1) {
            let counter = counters.entry(instance_id).or_insert(0);
            *counter += 1;
            let set = ExerciseSet {
                id: Uuid::new_v4(),
                workout_log_id: log.id,
                exercise_id: entry.exercise_id,
                exercise_instance_id: instance_id,
                set_number: *counter,
                weight: entry.weight,
                reps: entry.reps,
                finished_at: None,
                status: SetStatus::Pending,
                created_at: at,
                updated_at: at,
                deleted_at: None,
            };
            store.insert_set(&set)?;
            sets.push(set);
        }
    }

    log::info!(
        "Started session {} from workout {} with {} set(s)",
        log.id,
        workout.id,
        sets.len()
    );
    Ok(WorkoutLogDetail { log, sets })
}

/// Start an empty session that is not tied to a template.
pub fn create_session<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    started_at: Option<DateTime<Utc>>,
) -> Result<WorkoutLogDetail> {
    let at = now();
    let started_at = started_at.map(at_storage_precision).unwrap_or(at);
    let log = new_log(user_id, None, started_at, at);
    store.insert_log(&log)?;
    log::info!("Started session {}", log.id);
    Ok(WorkoutLogDetail {
        log,
        sets: Vec::new(),
    })
}
