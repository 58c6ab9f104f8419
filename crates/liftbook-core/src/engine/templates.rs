//! Workout templates.
//!
//! Updates go through [`reconcile::update_workout`] and deletes through
//! [`cascade::delete_workout`]; this module covers creation and reads.
//!
//! [`reconcile::update_workout`]: super::reconcile::update_workout
//! [`cascade::delete_workout`]: super::cascade::delete_workout

use uuid::Uuid;

use super::validation::normalize_name;
use super::{guard, now, reconcile};
use crate::error::Result;
use crate::storage::traits::EntityStore;
use crate::storage::types::{Page, PageRequest, Workout, WorkoutDetail, WorkoutRequest};

/// Create a template and its entries.
///
/// Entries are validated exactly as an update against an empty template, so
/// an entry that carries an id or names an existing instance is a conflict.
pub fn create_workout<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    request: &WorkoutRequest,
) -> Result<WorkoutDetail> {
    let name = normalize_name(&request.name, "Workout name")?;
    let id = Uuid::new_v4();
    let plan = reconcile::plan_workout(store, &id, &[], &request.exercises)?;

    let at = now();
    let workout = Workout {
        id,
        user_id: *user_id,
        name,
        created_at: at,
        updated_at: at,
        deleted_at: None,
    };
    store.insert_workout(&workout)?;
    reconcile::apply_workout(store, &workout.id, plan, at)?;

    let exercises = store.workout_exercises(&workout.id)?;
    log::info!(
        "Created workout '{}' ({}) with {} exercise(s)",
        workout.name,
        workout.id,
        exercises.len()
    );
    Ok(WorkoutDetail { workout, exercises })
}

/// List the user's templates, newest first.
pub fn list_workouts<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    page: PageRequest,
) -> Result<Page<Workout>> {
    page.validate()?;
    Ok(Page {
        items: store.list_workouts(user_id, &page)?,
        total: store.count_workouts(user_id)?,
        page: page.page,
        limit: page.limit,
    })
}

pub fn get_workout<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
) -> Result<WorkoutDetail> {
    let workout = guard::owned_workout(store, user_id, id)?;
    let exercises = store.workout_exercises(&workout.id)?;
    Ok(WorkoutDetail { workout, exercises })
}
