//! Session reads, finishing, and single-set operations.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::reconcile::InstanceResolver;
use super::validation::{check_duration, check_exercises, check_reps, check_weight};
use super::{at_storage_precision, cascade, guard, now};
use crate::error::{LiftbookError, Result};
use crate::storage::traits::{EntityStore, Owner, Table};
use crate::storage::types::{
    ExerciseSet, FinishSession, NewSet, Page, PageRequest, SessionStatus, SetPatch, WorkoutLog,
    WorkoutLogDetail,
};

pub fn get_session<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<WorkoutLogDetail> {
    let log = guard::owned_log(store, user_id, id)?;
    let sets = store.sets_of_log(&log.id)?;
    Ok(WorkoutLogDetail { log, sets })
}

/// List the user's sessions, most recently started first.
pub fn list_sessions<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    page: PageRequest,
) -> Result<Page<WorkoutLog>> {
    page.validate()?;
    Ok(Page {
        items: store.list_logs(user_id, &page)?,
        total: store.count_logs(user_id)?,
        page: page.page,
        limit: page.limit,
    })
}

/// Mark a session completed now.
///
/// # Errors
///
/// Returns `LiftbookError::Validation` if the session is already completed.
pub fn finish_session<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
    finish: &FinishSession,
) -> Result<WorkoutLog> {
    let mut log = guard::owned_log(store, user_id, id)?;
    if log.status == SessionStatus::Completed {
        return Err(LiftbookError::Validation(format!(
            "Session {} is already finished",
            log.id
        )));
    }
    check_duration("active_duration_secs", finish.active_duration_secs)?;
    check_duration("pause_duration_secs", finish.pause_duration_secs)?;

    let at = now();
    log.finished_at = Some(at);
    log.status = SessionStatus::Completed;
    if let Some(secs) = finish.active_duration_secs {
        log.active_duration_secs = secs;
    }
    if let Some(secs) = finish.pause_duration_secs {
        log.pause_duration_secs = secs;
    }
    log.updated_at = at;
    store.update_log(&log)?;

    log::info!("Finished session {}", log.id);
    Ok(log)
}

fn touch_log<S: EntityStore + ?Sized>(
    store: &S,
    mut log: WorkoutLog,
    at: DateTime<Utc>,
) -> Result<()> {
    log.updated_at = at;
    store.update_log(&log)
}

fn number_taken(
    sets: &[ExerciseSet],
    except: Option<Uuid>,
    instance_id: Uuid,
    number: i32,
) -> bool {
    sets.iter().any(|set| {
        Some(set.id) != except
            && set.exercise_instance_id == instance_id
            && set.set_number == number
    })
}

fn check_set_number(number: i32) -> Result<()> {
    if number < 1 {
        return Err(LiftbookError::Validation(
            "set_number must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Append one set to a session.
///
/// A named instance must already belong to the session; without one a fresh
/// instance is minted for it. The set number defaults to one past the highest
/// live number in the instance.
pub fn log_set<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    log_id: &Uuid,
    new: &NewSet,
) -> Result<ExerciseSet> {
    let log = guard::owned_log(store, user_id, log_id)?;
    check_reps("set", new.reps)?;
    check_weight("set", new.weight)?;
    if let Some(number) = new.set_number {
        check_set_number(number)?;
    }
    check_exercises(store, &[("set".to_string(), new.exercise_id)])?;

    let at = now();
    let instance_id = match new.exercise_instance_id {
        Some(instance_id) => {
            let owned: BTreeSet<Uuid> = store.owned_instance_ids(Owner::Log(log.id))?;
            if !owned.contains(&instance_id) {
                return Err(LiftbookError::Conflict(format!(
                    "Exercise instance {} is not part of session {}",
                    instance_id, log.id
                )));
            }
            instance_id
        }
        None => InstanceResolver::new(store, Some(log.id), at).mint(new.exercise_id)?,
    };

    let set_number = match new.set_number {
        Some(number) => {
            let sets = store.sets_of_log(&log.id)?;
            if number_taken(&sets, None, instance_id, number) {
                return Err(LiftbookError::Validation(format!(
                    "Set number {} is already used in exercise instance {}",
                    number, instance_id
                )));
            }
            number
        }
        None => store
            .max_set_number(&log.id, &instance_id)?
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| {
                LiftbookError::Validation(format!(
                    "Exercise instance {} has no set number left after {}; pass set_number",
                    instance_id,
                    i32::MAX
                ))
            })?,
    };

    let set = ExerciseSet {
        id: Uuid::new_v4(),
        workout_log_id: log.id,
        exercise_id: new.exercise_id,
        exercise_instance_id: instance_id,
        set_number,
        weight: new.weight,
        reps: new.reps,
        finished_at: None,
        status: new.status.unwrap_or_default(),
        created_at: at,
        updated_at: at,
        deleted_at: None,
    };
    store.insert_set(&set)?;
    touch_log(store, log, at)?;

    log::debug!(
        "Logged set {} #{} in instance {}",
        set.id,
        set.set_number,
        set.exercise_instance_id
    );
    Ok(set)
}

pub fn get_set<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    set_id: &Uuid,
) -> Result<ExerciseSet> {
    let (_, set) = guard::owned_set(store, user_id, set_id)?;
    Ok(set)
}

/// Apply a partial update to one set. Fields left `None` keep their value.
pub fn update_set<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    set_id: &Uuid,
    patch: &SetPatch,
) -> Result<ExerciseSet> {
    let (log, set) = guard::owned_set(store, user_id, set_id)?;
    check_reps("set", patch.reps)?;
    check_weight("set", patch.weight)?;

    let mut updated = set.clone();
    if let Some(number) = patch.set_number {
        check_set_number(number)?;
        if number != set.set_number {
            let sets = store.sets_of_log(&log.id)?;
            if number_taken(&sets, Some(set.id), set.exercise_instance_id, number) {
                return Err(LiftbookError::Validation(format!(
                    "Set number {} is already used in exercise instance {}",
                    number, set.exercise_instance_id
                )));
            }
        }
        updated.set_number = number;
    }
    if patch.weight.is_some() {
        updated.weight = patch.weight;
    }
    if patch.reps.is_some() {
        updated.reps = patch.reps;
    }
    if let Some(finished_at) = patch.finished_at {
        updated.finished_at = Some(at_storage_precision(finished_at));
    }
    if let Some(status) = patch.status {
        updated.status = status;
    }

    if updated != set {
        let at = now();
        updated.updated_at = at;
        store.update_set(&updated)?;
        touch_log(store, log, at)?;
    }
    Ok(updated)
}

/// Soft-delete one set, sweeping its instance if nothing else uses it.
pub fn delete_set<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    set_id: &Uuid,
) -> Result<()> {
    let (log, set) = guard::owned_set(store, user_id, set_id)?;
    let at = now();
    store.soft_delete(Table::ExerciseSets, &[set.id], at)?;
    cascade::sweep(store, &BTreeSet::from([set.exercise_instance_id]), at)?;
    touch_log(store, log, at)?;
    log::info!("Deleted set {} from session {}", set.id, set.workout_log_id);
    Ok(())
}
