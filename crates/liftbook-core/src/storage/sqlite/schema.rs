//! Schema creation and versioning.
//!
//! The schema version lives in `PRAGMA user_version`. A fresh database is at
//! version 0 and is brought up to [`SCHEMA_VERSION`] in one transaction.

use rusqlite::Connection;

use crate::error::{LiftbookError, Result};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA_V1: &str = r#"
    CREATE TABLE exercises (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    );

    CREATE TABLE workouts (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    );

    CREATE TABLE workout_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        workout_id TEXT REFERENCES workouts(id),
        started_at TEXT NOT NULL,
        finished_at TEXT,
        status TEXT NOT NULL CHECK (status IN ('in_progress', 'paused', 'completed')),
        active_duration_secs INTEGER NOT NULL DEFAULT 0,
        pause_duration_secs INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    );

    CREATE TABLE exercise_instances (
        id TEXT PRIMARY KEY,
        exercise_id TEXT NOT NULL REFERENCES exercises(id),
        workout_log_id TEXT REFERENCES workout_logs(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    );

    CREATE TABLE workout_exercises (
        id TEXT PRIMARY KEY,
        workout_id TEXT NOT NULL REFERENCES workouts(id),
        exercise_id TEXT NOT NULL REFERENCES exercises(id),
        exercise_instance_id TEXT REFERENCES exercise_instances(id),
        sort_order INTEGER,
        sets INTEGER CHECK (sets IS NULL OR sets >= 1),
        weight REAL CHECK (weight IS NULL OR weight >= 0),
        reps INTEGER CHECK (reps IS NULL OR reps >= 0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    );

    CREATE TABLE exercise_sets (
        id TEXT PRIMARY KEY,
        workout_log_id TEXT NOT NULL REFERENCES workout_logs(id),
        exercise_id TEXT NOT NULL REFERENCES exercises(id),
        exercise_instance_id TEXT NOT NULL REFERENCES exercise_instances(id),
        set_number INTEGER NOT NULL CHECK (set_number >= 1),
        weight REAL CHECK (weight IS NULL OR weight >= 0),
        reps INTEGER CHECK (reps IS NULL OR reps >= 0),
        finished_at TEXT,
        status TEXT NOT NULL CHECK (status IN ('pending', 'completed', 'skipped')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    );

    CREATE INDEX workouts_user ON workouts(user_id, deleted_at);
    CREATE INDEX workout_logs_user ON workout_logs(user_id, deleted_at);
    CREATE INDEX exercise_instances_log ON exercise_instances(workout_log_id);
    CREATE INDEX workout_exercises_workout ON workout_exercises(workout_id, deleted_at);
    CREATE INDEX workout_exercises_instance ON workout_exercises(exercise_instance_id);
    CREATE INDEX exercise_sets_log ON exercise_sets(workout_log_id, deleted_at);
    CREATE INDEX exercise_sets_instance ON exercise_sets(exercise_instance_id);
"#;

/// Read the schema version stamped on the database.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Create or upgrade the schema to [`SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns `LiftbookError::Storage` if the database was written by a newer
/// version of liftbook.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(LiftbookError::Storage(format!(
            "Database schema version {} is newer than supported version {}",
            current, SCHEMA_VERSION
        )));
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    if current < 1 {
        log::info!("Creating liftbook schema v{}", SCHEMA_VERSION);
        tx.execute_batch(SCHEMA_V1)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}
