//! SQLite storage backend.
//!
//! [`SqliteStore`] owns a single connection behind a mutex. Every mutating
//! operation runs in one immediate transaction that is committed only after
//! the engine returns `Ok`; on any error the transaction is dropped and
//! SQLite rolls it back.

mod gateway;
mod row;
pub mod schema;


use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::engine::{cascade, catalog, materialize, reconcile, sessions, templates};
use crate::error::{LiftbookError, Result};
use crate::storage::traits::WorkoutStore;
use crate::storage::types::{
    Exercise, ExerciseSet, FinishSession, NewSet, Page, PageRequest, SessionRequest, SetPatch,
    Workout, WorkoutDetail, WorkoutLog, WorkoutLogDetail, WorkoutRequest,
};

pub use gateway::Gateway;

/// Connection tuning for file-backed stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteOptions {
    /// How long a writer waits for a competing lock before failing
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl SqliteOptions {
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// SQLite-backed workout store.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` with default options.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, SqliteOptions::default())
    }

    /// Open (creating if needed) the database at `path`.
    ///
    /// Missing parent directories are created. The schema is created or
    /// upgraded before the store is returned.
    pub fn open_with(path: &Path, options: SqliteOptions) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(path)?;
        conn.busy_timeout(options.busy_timeout)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("Opened {} (journal_mode={})", path.display(), mode);
        Self::prepare(&mut conn)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        Self::prepare(&mut conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    fn prepare(conn: &mut Connection) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::migrate(conn)
    }

    /// Database file path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LiftbookError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Run a read-only closure against the live connection.
    fn read<T>(&self, f: impl FnOnce(&Gateway<'_>) -> Result<T>) -> Result<T> {
        let conn = self.lock_conn()?;
        f(&Gateway::new(&conn))
    }

    /// Run `f` in one transaction, committing only if it succeeds.
    fn transaction<T>(&self, f: impl FnOnce(&Gateway<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = match f(&Gateway::new(&tx)) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("Rolling back transaction: {}", err);
                return Err(err);
            }
        };
        tx.commit()?;
        Ok(value)
    }

    fn count(conn: &Connection, sql: &str) -> Result<i64> {
        Ok(conn.query_row(sql, [], |row| row.get(0))?)
    }
}

impl WorkoutStore for SqliteStore {
    fn create_exercise(&self, name: &str) -> Result<Exercise> {
        self.transaction(|gw| catalog::create_exercise(gw, name))
    }

    fn get_exercise(&self, id: &Uuid) -> Result<Exercise> {
        self.read(|gw| catalog::get_exercise(gw, id))
    }

    fn list_exercises(&self) -> Result<Vec<Exercise>> {
        self.read(|gw| catalog::list_exercises(gw))
    }

    fn retire_exercise(&self, id: &Uuid) -> Result<()> {
        self.transaction(|gw| catalog::retire_exercise(gw, id))
    }

    fn create_workout(&self, user_id: &Uuid, request: &WorkoutRequest) -> Result<WorkoutDetail> {
        self.transaction(|gw| templates::create_workout(gw, user_id, request))
    }

    fn list_workouts(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<Workout>> {
        self.read(|gw| templates::list_workouts(gw, user_id, page))
    }

    fn get_workout(&self, user_id: &Uuid, id: &Uuid) -> Result<WorkoutDetail> {
        self.read(|gw| templates::get_workout(gw, user_id, id))
    }

    fn update_workout(
        &self,
        user_id: &Uuid,
        id: &Uuid,
        request: &WorkoutRequest,
    ) -> Result<WorkoutDetail> {
        self.transaction(|gw| reconcile::update_workout(gw, user_id, id, request))
    }

    fn delete_workout(&self, user_id: &Uuid, id: &Uuid) -> Result<()> {
        self.transaction(|gw| cascade::delete_workout(gw, user_id, id))
    }

    fn start_session(&self, user_id: &Uuid, workout_id: &Uuid) -> Result<WorkoutLogDetail> {
        self.transaction(|gw| materialize::start_session(gw, user_id, workout_id))
    }

    fn create_session(
        &self,
        user_id: &Uuid,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<WorkoutLogDetail> {
        self.transaction(|gw| materialize::create_session(gw, user_id, started_at))
    }

    fn list_sessions(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<WorkoutLog>> {
        self.read(|gw| sessions::list_sessions(gw, user_id, page))
    }

    fn get_session(&self, user_id: &Uuid, id: &Uuid) -> Result<WorkoutLogDetail> {
        self.read(|gw| sessions::get_session(gw, user_id, id))
    }

    fn update_session(
        &self,
        user_id: &Uuid,
        id: &Uuid,
        request: &SessionRequest,
    ) -> Result<WorkoutLogDetail> {
        self.transaction(|gw| reconcile::update_session(gw, user_id, id, request))
    }

    fn finish_session(
        &self,
        user_id: &Uuid,
        id: &Uuid,
        finish: &FinishSession,
    ) -> Result<WorkoutLog> {
        self.transaction(|gw| sessions::finish_session(gw, user_id, id, finish))
    }

    fn delete_session(&self, user_id: &Uuid, id: &Uuid) -> Result<()> {
        self.transaction(|gw| cascade::delete_session(gw, user_id, id))
    }

    fn log_set(&self, user_id: &Uuid, log_id: &Uuid, set: &NewSet) -> Result<ExerciseSet> {
        self.transaction(|gw| sessions::log_set(gw, user_id, log_id, set))
    }

    fn get_set(&self, user_id: &Uuid, set_id: &Uuid) -> Result<ExerciseSet> {
        self.read(|gw| sessions::get_set(gw, user_id, set_id))
    }

    fn update_set(&self, user_id: &Uuid, set_id: &Uuid, patch: &SetPatch) -> Result<ExerciseSet> {
        self.transaction(|gw| sessions::update_set(gw, user_id, set_id, patch))
    }

    fn delete_set(&self, user_id: &Uuid, set_id: &Uuid) -> Result<()> {
        self.transaction(|gw| sessions::delete_set(gw, user_id, set_id))
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if rows.next()?.is_some() {
            return Err(LiftbookError::Storage(
                "Foreign key integrity check failed".to_string(),
            ));
        }

        let orphaned_entries = Self::count(
            &conn,
            "SELECT COUNT(*) FROM workout_exercises we JOIN workouts w ON w.id = we.workout_id \
             WHERE we.deleted_at IS NULL AND w.deleted_at IS NOT NULL",
        )?;
        if orphaned_entries > 0 {
            return Err(LiftbookError::Storage(format!(
                "{} live workout exercise(s) under deleted workouts",
                orphaned_entries
            )));
        }

        let orphaned_sets = Self::count(
            &conn,
            "SELECT COUNT(*) FROM exercise_sets s JOIN workout_logs l ON l.id = s.workout_log_id \
             WHERE s.deleted_at IS NULL AND l.deleted_at IS NOT NULL",
        )?;
        if orphaned_sets > 0 {
            return Err(LiftbookError::Storage(format!(
                "{} live set(s) under deleted sessions",
                orphaned_sets
            )));
        }

        let dangling = Self::count(
            &conn,
            "SELECT (SELECT COUNT(*) FROM exercise_sets s \
                     JOIN exercise_instances i ON i.id = s.exercise_instance_id \
                     WHERE s.deleted_at IS NULL AND i.deleted_at IS NOT NULL) \
                  + (SELECT COUNT(*) FROM workout_exercises we \
                     JOIN exercise_instances i ON i.id = we.exercise_instance_id \
                     WHERE we.deleted_at IS NULL AND i.deleted_at IS NOT NULL)",
        )?;
        if dangling > 0 {
            return Err(LiftbookError::Storage(format!(
                "{} live row(s) reference deleted exercise instances",
                dangling
            )));
        }

        Ok(())
    }
}
