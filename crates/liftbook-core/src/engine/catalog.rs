//! Exercise catalog.

use uuid::Uuid;

use super::validation::normalize_name;
use crate::error::{LiftbookError, Result};
use crate::storage::traits::{EntityStore, Table};
use crate::storage::types::Exercise;

pub fn create_exercise<S: EntityStore + ?Sized>(store: &S, name: &str) -> Result<Exercise> {
    let name = normalize_name(name, "Exercise name")?;
    if store.exercise_by_name(&name)?.is_some() {
        return Err(LiftbookError::Validation(format!(
            "An exercise named '{}' already exists",
            name
        )));
    }

    let now = super::now();
    let exercise = Exercise {
        id: Uuid::new_v4(),
        name,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    store.insert_exercise(&exercise)?;
    log::info!("Created exercise {} ({})", exercise.name, exercise.id);
    Ok(exercise)
}

pub fn get_exercise<S: EntityStore + ?Sized>(store: &S, id: &Uuid) -> Result<Exercise> {
    store
        .exercise(id)?
        .ok_or_else(|| LiftbookError::not_found("Exercise", id))
}

pub fn list_exercises<S: EntityStore + ?Sized>(store: &S) -> Result<Vec<Exercise>> {
    store.list_exercises()
}

/// Soft-delete a catalog exercise. Rows that already reference it are kept.
pub fn retire_exercise<S: EntityStore + ?Sized>(store: &S, id: &Uuid) -> Result<()> {
    let exercise = get_exercise(store, id)?;
    store.soft_delete(Table::Exercises, &[exercise.id], super::now())?;
    log::info!("Retired exercise {} ({})", exercise.name, exercise.id);
    Ok(())
}
