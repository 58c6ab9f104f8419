//! Cascading soft deletion.
//!
//! Deleting a template or session runs four steps in the caller's
//! transaction:
//!
//! 1. collect the instances that would be left without a live referrer
//! 2. soft-delete the parent
//! 3. soft-delete its live children
//! 4. soft-delete the collected instances
//!
//! The parent goes first so that readers never see children under a parent
//! that looks live. Instances still referenced by another live template or
//! session are kept.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{guard, now};
use crate::error::Result;
use crate::storage::traits::{EntityStore, Owner, Table};

/// Instances reachable from `owner` that no other live parent references.
pub fn collect_orphans<S: EntityStore + ?Sized>(store: &S, owner: Owner) -> Result<Vec<Uuid>> {
    let mut orphans = Vec::new();
    for instance_id in store.owned_instance_ids(owner)? {
        if !store.instance_referenced(&instance_id, Some(owner))? {
            orphans.push(instance_id);
        }
    }
    Ok(orphans)
}

pub fn delete_workout<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<()> {
    let workout = guard::owned_workout(store, user_id, id)?;
    let owner = Owner::Workout(workout.id);
    let orphans = collect_orphans(store, owner)?;
    let children: Vec<Uuid> = store
        .workout_exercises(&workout.id)?
        .iter()
        .map(|row| row.id)
        .collect();

    let at = now();
    store.soft_delete(Table::Workouts, &[workout.id], at)?;
    store.soft_delete(Table::WorkoutExercises, &children, at)?;
    store.soft_delete(Table::ExerciseInstances, &orphans, at)?;

    log::info!(
        "Deleted workout {} with {} exercise(s) and {} instance(s)",
        workout.id,
        children.len(),
        orphans.len()
    );
    Ok(())
}

pub fn delete_session<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<()> {
    let session = guard::owned_log(store, user_id, id)?;
    let owner = Owner::Log(session.id);
    let orphans = collect_orphans(store, owner)?;
    let children: Vec<Uuid> = store
        .sets_of_log(&session.id)?
        .iter()
        .map(|set| set.id)
        .collect();

    let at = now();
    store.soft_delete(Table::WorkoutLogs, &[session.id], at)?;
    store.soft_delete(Table::ExerciseSets, &children, at)?;
    store.soft_delete(Table::ExerciseInstances, &orphans, at)?;

    log::info!(
        "Deleted session {} with {} set(s) and {} instance(s)",
        session.id,
        children.len(),
        orphans.len()
    );
    Ok(())
}

/// Soft-delete the candidates that no live child of a live parent references.
///
/// Runs after removals, so the removed rows no longer count as referrers.
/// Returns the number of instances deleted.
pub fn sweep<S: EntityStore + ?Sized>(
    store: &S,
    candidates: &BTreeSet<Uuid>,
    at: DateTime<Utc>,
) -> Result<usize> {
    let mut orphans = Vec::new();
    for instance_id in candidates {
        if store.instance(instance_id)?.is_some()
            && !store.instance_referenced(instance_id, None)?
        {
            orphans.push(*instance_id);
        }
    }
    if orphans.is_empty() {
        return Ok(0);
    }
    log::debug!("Sweeping {} orphaned instance(s)", orphans.len());
    store.soft_delete(Table::ExerciseInstances, &orphans, at)
}
