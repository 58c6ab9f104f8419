//! Raw row types for database queries.
//!
//! Ids and timestamps are stored as TEXT; each `*Row` holds the column values
//! as SQLite returns them and converts into the domain type with `TryFrom`.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{LiftbookError, Result};
use crate::storage::types::{
    Exercise, ExerciseInstance, ExerciseSet, Workout, WorkoutExercise, WorkoutLog,
};

pub const EXERCISE_COLUMNS: &str = "id, name, created_at, updated_at, deleted_at";

pub const INSTANCE_COLUMNS: &str =
    "id, exercise_id, workout_log_id, created_at, updated_at, deleted_at";

pub const WORKOUT_COLUMNS: &str = "id, user_id, name, created_at, updated_at, deleted_at";

pub const WORKOUT_EXERCISE_COLUMNS: &str = "id, workout_id, exercise_id, exercise_instance_id, \
     sort_order, sets, weight, reps, created_at, updated_at, deleted_at";

pub const LOG_COLUMNS: &str = "id, user_id, workout_id, started_at, finished_at, status, \
     active_duration_secs, pause_duration_secs, created_at, updated_at, deleted_at";

pub const SET_COLUMNS: &str = "id, workout_log_id, exercise_id, exercise_instance_id, \
     set_number, weight, reps, finished_at, status, created_at, updated_at, deleted_at";

/// Format a timestamp for storage. Fixed width keeps TEXT ordering chronological.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| LiftbookError::Storage(format!("Invalid {} UUID: {}", field, e)))
}

fn parse_opt_uuid(value: Option<String>, field: &str) -> Result<Option<Uuid>> {
    value.as_deref().map(|v| parse_uuid(v, field)).transpose()
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| LiftbookError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

fn parse_opt_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

/// Raw row data from the exercises table.
#[derive(Debug)]
pub struct ExerciseRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl ExerciseRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
            deleted_at: row.get(4)?,
        })
    }
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = LiftbookError;

    fn try_from(row: ExerciseRow) -> Result<Self> {
        Ok(Exercise {
            id: parse_uuid(&row.id, "exercise")?,
            name: row.name,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_opt_timestamp(row.deleted_at)?,
        })
    }
}

/// Raw row data from the exercise_instances table.
#[derive(Debug)]
pub struct InstanceRow {
    pub id: String,
    pub exercise_id: String,
    pub workout_log_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl InstanceRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            exercise_id: row.get(1)?,
            workout_log_id: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
            deleted_at: row.get(5)?,
        })
    }
}

impl TryFrom<InstanceRow> for ExerciseInstance {
    type Error = LiftbookError;

    fn try_from(row: InstanceRow) -> Result<Self> {
        Ok(ExerciseInstance {
            id: parse_uuid(&row.id, "instance")?,
            exercise_id: parse_uuid(&row.exercise_id, "exercise")?,
            workout_log_id: parse_opt_uuid(row.workout_log_id, "workout_log")?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_opt_timestamp(row.deleted_at)?,
        })
    }
}

/// Raw row data from the workouts table.
#[derive(Debug)]
pub struct WorkoutRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl WorkoutRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
            deleted_at: row.get(5)?,
        })
    }
}

impl TryFrom<WorkoutRow> for Workout {
    type Error = LiftbookError;

    fn try_from(row: WorkoutRow) -> Result<Self> {
        Ok(Workout {
            id: parse_uuid(&row.id, "workout")?,
            user_id: parse_uuid(&row.user_id, "user")?,
            name: row.name,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_opt_timestamp(row.deleted_at)?,
        })
    }
}

/// Raw row data from the workout_exercises table.
#[derive(Debug)]
pub struct WorkoutExerciseRow {
    pub id: String,
    pub workout_id: String,
    pub exercise_id: String,
    pub exercise_instance_id: Option<String>,
    pub sort_order: Option<i32>,
    pub sets: Option<i32>,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl WorkoutExerciseRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            workout_id: row.get(1)?,
            exercise_id: row.get(2)?,
            exercise_instance_id: row.get(3)?,
            sort_order: row.get(4)?,
            sets: row.get(5)?,
            weight: row.get(6)?,
            reps: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            deleted_at: row.get(10)?,
        })
    }
}

impl TryFrom<WorkoutExerciseRow> for WorkoutExercise {
    type Error = LiftbookError;

    fn try_from(row: WorkoutExerciseRow) -> Result<Self> {
        Ok(WorkoutExercise {
            id: parse_uuid(&row.id, "workout_exercise")?,
            workout_id: parse_uuid(&row.workout_id, "workout")?,
            exercise_id: parse_uuid(&row.exercise_id, "exercise")?,
            exercise_instance_id: parse_opt_uuid(row.exercise_instance_id, "instance")?,
            order: row.sort_order,
            sets: row.sets,
            weight: row.weight,
            reps: row.reps,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_opt_timestamp(row.deleted_at)?,
        })
    }
}

/// Raw row data from the workout_logs table.
#[derive(Debug)]
pub struct LogRow {
    pub id: String,
    pub user_id: String,
    pub workout_id: Option<String>,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: String,
    pub active_duration_secs: i64,
    pub pause_duration_secs: i64,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl LogRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            workout_id: row.get(2)?,
            started_at: row.get(3)?,
            finished_at: row.get(4)?,
            status: row.get(5)?,
            active_duration_secs: row.get(6)?,
            pause_duration_secs: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            deleted_at: row.get(10)?,
        })
    }
}

impl TryFrom<LogRow> for WorkoutLog {
    type Error = LiftbookError;

    fn try_from(row: LogRow) -> Result<Self> {
        let status = row
            .status
            .parse()
            .map_err(|e| LiftbookError::Storage(format!("Invalid stored status: {}", e)))?;
        Ok(WorkoutLog {
            id: parse_uuid(&row.id, "workout_log")?,
            user_id: parse_uuid(&row.user_id, "user")?,
            workout_id: parse_opt_uuid(row.workout_id, "workout")?,
            started_at: parse_timestamp(&row.started_at)?,
            finished_at: parse_opt_timestamp(row.finished_at)?,
            status,
            active_duration_secs: row.active_duration_secs,
            pause_duration_secs: row.pause_duration_secs,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_opt_timestamp(row.deleted_at)?,
        })
    }
}

/// Raw row data from the exercise_sets table.
#[derive(Debug)]
pub struct SetRow {
    pub id: String,
    pub workout_log_id: String,
    pub exercise_id: String,
    pub exercise_instance_id: String,
    pub set_number: i32,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub finished_at: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl SetRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            workout_log_id: row.get(1)?,
            exercise_id: row.get(2)?,
            exercise_instance_id: row.get(3)?,
            set_number: row.get(4)?,
            weight: row.get(5)?,
            reps: row.get(6)?,
            finished_at: row.get(7)?,
            status: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
            deleted_at: row.get(11)?,
        })
    }
}

impl TryFrom<SetRow> for ExerciseSet {
    type Error = LiftbookError;

    fn try_from(row: SetRow) -> Result<Self> {
        let status = row
            .status
            .parse()
            .map_err(|e| LiftbookError::Storage(format!("Invalid stored status: {}", e)))?;
        Ok(ExerciseSet {
            id: parse_uuid(&row.id, "set")?,
            workout_log_id: parse_uuid(&row.workout_log_id, "workout_log")?,
            exercise_id: parse_uuid(&row.exercise_id, "exercise")?,
            exercise_instance_id: parse_uuid(&row.exercise_instance_id, "instance")?,
            set_number: row.set_number,
            weight: row.weight,
            reps: row.reps,
            finished_at: parse_opt_timestamp(row.finished_at)?,
            status,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_opt_timestamp(row.deleted_at)?,
        })
    }
}
