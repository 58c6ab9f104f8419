//! Storage trait definitions.
//!
//! Two seams live here:
//!
//! - [`WorkoutStore`] is the operation surface callers use. Every method takes
//!   the caller's user id (already authenticated upstream) and runs as one
//!   atomic unit.
//! - [`EntityStore`] is the row-level gateway the engine is written against:
//!   typed inserts, live-row reads, updates and soft deletes over the six
//!   tables. Implementations bind it to a single connection or transaction.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{
    Exercise, ExerciseInstance, ExerciseSet, FinishSession, NewSet, Page, PageRequest,
    SessionRequest, SetPatch, Workout, WorkoutDetail, WorkoutExercise, WorkoutLog,
    WorkoutLogDetail, WorkoutRequest,
};
use crate::error::Result;

/// Workout engine interface.
///
/// All implementations must ensure:
/// - Each mutating call commits completely or not at all
/// - Soft-deleted rows never appear in results
/// - Rows owned by another user are reported as not found
pub trait WorkoutStore: Send + Sync {
    // --- Exercise catalog ---

    /// Add an exercise to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `LiftbookError::Validation` if the name is empty, too long, or
    /// already used by a live exercise.
    fn create_exercise(&self, name: &str) -> Result<Exercise>;

    fn get_exercise(&self, id: &Uuid) -> Result<Exercise>;

    /// List live catalog exercises ordered by name.
    fn list_exercises(&self) -> Result<Vec<Exercise>>;

    /// Soft-delete a catalog exercise. Existing references are kept; new
    /// references are rejected.
    fn retire_exercise(&self, id: &Uuid) -> Result<()>;

    // --- Templates ---

    /// Create a template with its exercise entries.
    ///
    /// # Errors
    ///
    /// Returns `LiftbookError::Validation` if an entry references an unknown
    /// or retired exercise, or if the payload is contradictory.
    fn create_workout(&self, user_id: &Uuid, request: &WorkoutRequest) -> Result<WorkoutDetail>;

    /// List the user's templates, newest first.
    fn list_workouts(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<Workout>>;

    fn get_workout(&self, user_id: &Uuid, id: &Uuid) -> Result<WorkoutDetail>;

    /// Replace a template's name and exercise list with the desired state.
    ///
    /// # Errors
    ///
    /// Returns `LiftbookError::Conflict` if an entry id does not belong to the
    /// template; nothing is written in that case.
    fn update_workout(
        &self,
        user_id: &Uuid,
        id: &Uuid,
        request: &WorkoutRequest,
    ) -> Result<WorkoutDetail>;

    /// Soft-delete a template, its entries, and the instances only it used.
    fn delete_workout(&self, user_id: &Uuid, id: &Uuid) -> Result<()>;

    // --- Sessions ---

    /// Start a session from a template, materializing one pending set per
    /// planned set.
    fn start_session(&self, user_id: &Uuid, workout_id: &Uuid) -> Result<WorkoutLogDetail>;

    /// Start an empty session that is not tied to a template.
    fn create_session(
        &self,
        user_id: &Uuid,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<WorkoutLogDetail>;

    /// List the user's sessions, most recently started first.
    fn list_sessions(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<WorkoutLog>>;

    fn get_session(&self, user_id: &Uuid, id: &Uuid) -> Result<WorkoutLogDetail>;

    /// Replace a session's scalar fields and set list with the desired state.
    fn update_session(
        &self,
        user_id: &Uuid,
        id: &Uuid,
        request: &SessionRequest,
    ) -> Result<WorkoutLogDetail>;

    /// Mark a session completed now, recording its duration counters.
    fn finish_session(
        &self,
        user_id: &Uuid,
        id: &Uuid,
        finish: &FinishSession,
    ) -> Result<WorkoutLog>;

    /// Soft-delete a session, its sets, and the instances only it used.
    fn delete_session(&self, user_id: &Uuid, id: &Uuid) -> Result<()>;

    // --- Sets ---

    /// Append one set to a session.
    fn log_set(&self, user_id: &Uuid, log_id: &Uuid, set: &NewSet) -> Result<ExerciseSet>;

    fn get_set(&self, user_id: &Uuid, set_id: &Uuid) -> Result<ExerciseSet>;

    fn update_set(&self, user_id: &Uuid, set_id: &Uuid, patch: &SetPatch) -> Result<ExerciseSet>;

    fn delete_set(&self, user_id: &Uuid, set_id: &Uuid) -> Result<()>;

    // --- Maintenance ---

    /// Check store integrity.
    ///
    /// Verifies:
    /// - Foreign key relationships
    /// - No live child rows under soft-deleted parents
    /// - No live sets pointing at soft-deleted instances
    fn check_integrity(&self) -> Result<()>;
}

/// Tables that carry a soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Exercises,
    ExerciseInstances,
    Workouts,
    WorkoutExercises,
    WorkoutLogs,
    ExerciseSets,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Exercises => "exercises",
            Table::ExerciseInstances => "exercise_instances",
            Table::Workouts => "workouts",
            Table::WorkoutExercises => "workout_exercises",
            Table::WorkoutLogs => "workout_logs",
            Table::ExerciseSets => "exercise_sets",
        }
    }
}

/// A parent that owns exercise instances through its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Workout(Uuid),
    Log(Uuid),
}

/// Row-level gateway over the entity tables.
///
/// Reads named after an entity return live rows only. Writes never commit on
/// their own; the caller owns the surrounding transaction.
pub trait EntityStore {
    /// Set `deleted_at` on the given live rows, returning how many changed.
    fn soft_delete(&self, table: Table, ids: &[Uuid], at: DateTime<Utc>) -> Result<usize>;

    // --- Exercises ---

    fn insert_exercise(&self, exercise: &Exercise) -> Result<()>;

    fn exercise(&self, id: &Uuid) -> Result<Option<Exercise>>;

    /// Case-insensitive lookup among live exercises.
    fn exercise_by_name(&self, name: &str) -> Result<Option<Exercise>>;

    fn list_exercises(&self) -> Result<Vec<Exercise>>;

    /// The subset of `ids` that name live exercises. One query per id.
    fn live_exercise_ids(&self, ids: &BTreeSet<Uuid>) -> Result<BTreeSet<Uuid>>;

    // --- Exercise instances ---

    fn insert_instance(&self, instance: &ExerciseInstance) -> Result<()>;

    fn instance(&self, id: &Uuid) -> Result<Option<ExerciseInstance>>;

    /// Fetch an instance whether or not it has been soft-deleted.
    fn instance_including_deleted(&self, id: &Uuid) -> Result<Option<ExerciseInstance>>;

    /// Live instances reachable from `owner`: those referenced by its live
    /// children, plus (for logs) those minted for it.
    fn owned_instance_ids(&self, owner: Owner) -> Result<BTreeSet<Uuid>>;

    /// Whether a live child of a live parent other than `excluding`
    /// references the instance.
    fn instance_referenced(&self, instance_id: &Uuid, excluding: Option<Owner>) -> Result<bool>;

    // --- Workouts ---

    fn insert_workout(&self, workout: &Workout) -> Result<()>;

    fn workout(&self, id: &Uuid) -> Result<Option<Workout>>;

    fn list_workouts(&self, user_id: &Uuid, page: &PageRequest) -> Result<Vec<Workout>>;

    fn count_workouts(&self, user_id: &Uuid) -> Result<u64>;

    fn update_workout(&self, workout: &Workout) -> Result<()>;

    // --- Workout exercises ---

    fn insert_workout_exercise(&self, row: &WorkoutExercise) -> Result<()>;

    /// Live entries of a template in plan order.
    fn workout_exercises(&self, workout_id: &Uuid) -> Result<Vec<WorkoutExercise>>;

    fn update_workout_exercise(&self, row: &WorkoutExercise) -> Result<()>;

    // --- Workout logs ---

    fn insert_log(&self, log: &WorkoutLog) -> Result<()>;

    fn log(&self, id: &Uuid) -> Result<Option<WorkoutLog>>;

    fn list_logs(&self, user_id: &Uuid, page: &PageRequest) -> Result<Vec<WorkoutLog>>;

    fn count_logs(&self, user_id: &Uuid) -> Result<u64>;

    fn update_log(&self, log: &WorkoutLog) -> Result<()>;

    // --- Exercise sets ---

    fn insert_set(&self, set: &ExerciseSet) -> Result<()>;

    fn set(&self, id: &Uuid) -> Result<Option<ExerciseSet>>;

    /// Live sets of a session in creation order.
    fn sets_of_log(&self, log_id: &Uuid) -> Result<Vec<ExerciseSet>>;

    fn update_set(&self, set: &ExerciseSet) -> Result<()>;

    /// Highest live set number of an instance within one session.
    fn max_set_number(&self, log_id: &Uuid, instance_id: &Uuid) -> Result<Option<i32>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_definitions_compile() {
        fn _accepts_workout_store<T: WorkoutStore>(_store: T) {}
        fn _accepts_entity_store<T: EntityStore + ?Sized>(_store: &T) {}
    }

    #[test]
    fn test_table_names_are_distinct() {
        let tables = [
            Table::Exercises,
            Table::ExerciseInstances,
            Table::Workouts,
            Table::WorkoutExercises,
            Table::WorkoutLogs,
            Table::ExerciseSets,
        ];
        let names: BTreeSet<_> = tables.iter().map(Table::name).collect();
        assert_eq!(names.len(), tables.len());
    }
}
