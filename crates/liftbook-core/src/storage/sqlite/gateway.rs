//! SQLite implementation of the row-level [`EntityStore`] gateway.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use uuid::Uuid;

use super::row::{
    format_timestamp, parse_uuid, ExerciseRow, InstanceRow, LogRow, SetRow, WorkoutExerciseRow,
    WorkoutRow, EXERCISE_COLUMNS, INSTANCE_COLUMNS, LOG_COLUMNS, SET_COLUMNS,
    WORKOUT_COLUMNS, WORKOUT_EXERCISE_COLUMNS,
};
use crate::error::{LiftbookError, Result};
use crate::storage::traits::{EntityStore, Owner, Table};
use crate::storage::types::{
    Exercise, ExerciseInstance, ExerciseSet, PageRequest, Workout, WorkoutExercise, WorkoutLog,
};

/// Gateway bound to one connection or one open transaction.
///
/// A `Transaction` derefs to `Connection`, so the same gateway serves reads
/// and transactional writes.
pub struct Gateway<'c> {
    conn: &'c Connection,
}

impl<'c> Gateway<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn fetch_one<R, T, P>(
        &self,
        sql: &str,
        params: P,
        read: fn(&Row<'_>) -> rusqlite::Result<R>,
    ) -> Result<Option<T>>
    where
        P: Params,
        T: TryFrom<R, Error = LiftbookError>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let row = stmt.query_row(params, read).optional()?;
        row.map(T::try_from).transpose()
    }

    fn fetch_all<R, T, P>(
        &self,
        sql: &str,
        params: P,
        read: fn(&Row<'_>) -> rusqlite::Result<R>,
    ) -> Result<Vec<T>>
    where
        P: Params,
        T: TryFrom<R, Error = LiftbookError>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, read)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(T::try_from(row?)?);
        }
        Ok(items)
    }

    fn fetch_ids<P: Params>(&self, sql: &str, params: P) -> Result<BTreeSet<Uuid>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        let mut ids = BTreeSet::new();
        for row in rows {
            ids.insert(parse_uuid(&row?, "instance")?);
        }
        Ok(ids)
    }

    fn count<P: Params>(&self, sql: &str, params: P) -> Result<u64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        u64::try_from(count).map_err(|_| LiftbookError::Storage("Negative row count".to_string()))
    }

    fn page_bounds(page: &PageRequest) -> Result<(i64, i64)> {
        let offset = i64::try_from(page.offset())
            .map_err(|_| LiftbookError::Validation("Page number too large".to_string()))?;
        Ok((i64::from(page.limit), offset))
    }
}

fn opt_id(id: Option<Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

fn opt_timestamp(at: Option<DateTime<Utc>>) -> Option<String> {
    at.as_ref().map(format_timestamp)
}

impl EntityStore for Gateway<'_> {
    fn soft_delete(&self, table: Table, ids: &[Uuid], at: DateTime<Utc>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "UPDATE {} SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            table.name()
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let stamp = format_timestamp(&at);
        let mut changed = 0;
        for id in ids {
            changed += stmt.execute(params![stamp, id.to_string()])?;
        }
        log::debug!("Soft-deleted {} row(s) in {}", changed, table.name());
        Ok(changed)
    }

    // --- Exercises ---

    fn insert_exercise(&self, exercise: &Exercise) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exercises (id, name, created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                exercise.id.to_string(),
                exercise.name,
                format_timestamp(&exercise.created_at),
                format_timestamp(&exercise.updated_at),
                opt_timestamp(exercise.deleted_at),
            ],
        )?;
        Ok(())
    }

    fn exercise(&self, id: &Uuid) -> Result<Option<Exercise>> {
        self.fetch_one(
            &format!(
                "SELECT {} FROM exercises WHERE id = ?1 AND deleted_at IS NULL",
                EXERCISE_COLUMNS
            ),
            [id.to_string()],
            ExerciseRow::read,
        )
    }

    fn exercise_by_name(&self, name: &str) -> Result<Option<Exercise>> {
        self.fetch_one(
            &format!(
                "SELECT {} FROM exercises \
                 WHERE name = ?1 COLLATE NOCASE AND deleted_at IS NULL LIMIT 1",
                EXERCISE_COLUMNS
            ),
            [name],
            ExerciseRow::read,
        )
    }

    fn list_exercises(&self) -> Result<Vec<Exercise>> {
        self.fetch_all(
            &format!(
                "SELECT {} FROM exercises WHERE deleted_at IS NULL \
                 ORDER BY name COLLATE NOCASE, rowid",
                EXERCISE_COLUMNS
            ),
            [],
            ExerciseRow::read,
        )
    }

    fn live_exercise_ids(&self, ids: &BTreeSet<Uuid>) -> Result<BTreeSet<Uuid>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM exercises WHERE id = ?1 AND deleted_at IS NULL")?;
        let mut live = BTreeSet::new();
        for id in ids {
            if stmt.exists([id.to_string()])? {
                live.insert(*id);
            }
        }
        Ok(live)
    }

    // --- Exercise instances ---

    fn insert_instance(&self, instance: &ExerciseInstance) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exercise_instances \
             (id, exercise_id, workout_log_id, created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                instance.id.to_string(),
                instance.exercise_id.to_string(),
                opt_id(instance.workout_log_id),
                format_timestamp(&instance.created_at),
                format_timestamp(&instance.updated_at),
                opt_timestamp(instance.deleted_at),
            ],
        )?;
        Ok(())
    }

    fn instance(&self, id: &Uuid) -> Result<Option<ExerciseInstance>> {
        self.fetch_one(
            &format!(
                "SELECT {} FROM exercise_instances WHERE id = ?1 AND deleted_at IS NULL",
                INSTANCE_COLUMNS
            ),
            [id.to_string()],
            InstanceRow::read,
        )
    }

    fn instance_including_deleted(&self, id: &Uuid) -> Result<Option<ExerciseInstance>> {
        self.fetch_one(
            &format!(
                "SELECT {} FROM exercise_instances WHERE id = ?1",
                INSTANCE_COLUMNS
            ),
            [id.to_string()],
            InstanceRow::read,
        )
    }

    fn owned_instance_ids(&self, owner: Owner) -> Result<BTreeSet<Uuid>> {
        match owner {
            Owner::Workout(workout_id) => self.fetch_ids(
                "SELECT DISTINCT i.id FROM exercise_instances i \
                 JOIN workout_exercises we ON we.exercise_instance_id = i.id \
                 WHERE we.workout_id = ?1 AND we.deleted_at IS NULL AND i.deleted_at IS NULL",
                [workout_id.to_string()],
            ),
            Owner::Log(log_id) => self.fetch_ids(
                "SELECT i.id FROM exercise_instances i \
                 WHERE i.deleted_at IS NULL AND (i.workout_log_id = ?1 OR EXISTS ( \
                     SELECT 1 FROM exercise_sets s \
                     WHERE s.exercise_instance_id = i.id AND s.workout_log_id = ?1 \
                       AND s.deleted_at IS NULL))",
                [log_id.to_string()],
            ),
        }
    }

    fn instance_referenced(&self, instance_id: &Uuid, excluding: Option<Owner>) -> Result<bool> {
        let (workout, log) = match excluding {
            Some(Owner::Workout(id)) => (Some(id.to_string()), None),
            Some(Owner::Log(id)) => (None, Some(id.to_string())),
            None => (None, None),
        };
        let referenced: bool = self.conn.query_row(
            "SELECT EXISTS ( \
                 SELECT 1 FROM workout_exercises we JOIN workouts w ON w.id = we.workout_id \
                 WHERE we.exercise_instance_id = ?1 \
                   AND we.deleted_at IS NULL AND w.deleted_at IS NULL \
                   AND (?2 IS NULL OR we.workout_id != ?2) \
             ) OR EXISTS ( \
                 SELECT 1 FROM exercise_sets s JOIN workout_logs l ON l.id = s.workout_log_id \
                 WHERE s.exercise_instance_id = ?1 \
                   AND s.deleted_at IS NULL AND l.deleted_at IS NULL \
                   AND (?3 IS NULL OR s.workout_log_id != ?3) \
             )",
            params![instance_id.to_string(), workout, log],
            |row| row.get(0),
        )?;
        Ok(referenced)
    }

    // --- Workouts ---

    fn insert_workout(&self, workout: &Workout) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workouts (id, user_id, name, created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                workout.id.to_string(),
                workout.user_id.to_string(),
                workout.name,
                format_timestamp(&workout.created_at),
                format_timestamp(&workout.updated_at),
                opt_timestamp(workout.deleted_at),
            ],
        )?;
        Ok(())
    }

    fn workout(&self, id: &Uuid) -> Result<Option<Workout>> {
        self.fetch_one(
            &format!(
                "SELECT {} FROM workouts WHERE id = ?1 AND deleted_at IS NULL",
                WORKOUT_COLUMNS
            ),
            [id.to_string()],
            WorkoutRow::read,
        )
    }

    fn list_workouts(&self, user_id: &Uuid, page: &PageRequest) -> Result<Vec<Workout>> {
        let (limit, offset) = Self::page_bounds(page)?;
        self.fetch_all(
            &format!(
                "SELECT {} FROM workouts WHERE user_id = ?1 AND deleted_at IS NULL \
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
                WORKOUT_COLUMNS
            ),
            params![user_id.to_string(), limit, offset],
            WorkoutRow::read,
        )
    }

    fn count_workouts(&self, user_id: &Uuid) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM workouts WHERE user_id = ?1 AND deleted_at IS NULL",
            [user_id.to_string()],
        )
    }

    fn update_workout(&self, workout: &Workout) -> Result<()> {
        self.conn.execute(
            "UPDATE workouts SET name = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                workout.id.to_string(),
                workout.name,
                format_timestamp(&workout.updated_at),
            ],
        )?;
        Ok(())
    }

    // --- Workout exercises ---

    fn insert_workout_exercise(&self, row: &WorkoutExercise) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workout_exercises \
             (id, workout_id, exercise_id, exercise_instance_id, sort_order, sets, weight, reps, \
              created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.id.to_string(),
                row.workout_id.to_string(),
                row.exercise_id.to_string(),
                opt_id(row.exercise_instance_id),
                row.order,
                row.sets,
                row.weight,
                row.reps,
                format_timestamp(&row.created_at),
                format_timestamp(&row.updated_at),
                opt_timestamp(row.deleted_at),
            ],
        )?;
        Ok(())
    }

    fn workout_exercises(&self, workout_id: &Uuid) -> Result<Vec<WorkoutExercise>> {
        self.fetch_all(
            &format!(
                "SELECT {} FROM workout_exercises WHERE workout_id = ?1 AND deleted_at IS NULL \
                 ORDER BY sort_order IS NULL, sort_order, created_at, rowid",
                WORKOUT_EXERCISE_COLUMNS
            ),
            [workout_id.to_string()],
            WorkoutExerciseRow::read,
        )
    }

    fn update_workout_exercise(&self, row: &WorkoutExercise) -> Result<()> {
        self.conn.execute(
            "UPDATE workout_exercises SET exercise_id = ?2, exercise_instance_id = ?3, \
             sort_order = ?4, sets = ?5, weight = ?6, reps = ?7, updated_at = ?8 WHERE id = ?1",
            params![
                row.id.to_string(),
                row.exercise_id.to_string(),
                opt_id(row.exercise_instance_id),
                row.order,
                row.sets,
                row.weight,
                row.reps,
                format_timestamp(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    // --- Workout logs ---

    fn insert_log(&self, log: &WorkoutLog) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workout_logs \
             (id, user_id, workout_id, started_at, finished_at, status, active_duration_secs, \
              pause_duration_secs, created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                log.id.to_string(),
                log.user_id.to_string(),
                opt_id(log.workout_id),
                format_timestamp(&log.started_at),
                opt_timestamp(log.finished_at),
                log.status.as_str(),
                log.active_duration_secs,
                log.pause_duration_secs,
                format_timestamp(&log.created_at),
                format_timestamp(&log.updated_at),
                opt_timestamp(log.deleted_at),
            ],
        )?;
        Ok(())
    }

    fn log(&self, id: &Uuid) -> Result<Option<WorkoutLog>> {
        self.fetch_one(
            &format!(
                "SELECT {} FROM workout_logs WHERE id = ?1 AND deleted_at IS NULL",
                LOG_COLUMNS
            ),
            [id.to_string()],
            LogRow::read,
        )
    }

    fn list_logs(&self, user_id: &Uuid, page: &PageRequest) -> Result<Vec<WorkoutLog>> {
        let (limit, offset) = Self::page_bounds(page)?;
        self.fetch_all(
            &format!(
                "SELECT {} FROM workout_logs WHERE user_id = ?1 AND deleted_at IS NULL \
                 ORDER BY started_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
                LOG_COLUMNS
            ),
            params![user_id.to_string(), limit, offset],
            LogRow::read,
        )
    }

    fn count_logs(&self, user_id: &Uuid) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM workout_logs WHERE user_id = ?1 AND deleted_at IS NULL",
            [user_id.to_string()],
        )
    }

    fn update_log(&self, log: &WorkoutLog) -> Result<()> {
        self.conn.execute(
            "UPDATE workout_logs SET started_at = ?2, finished_at = ?3, status = ?4, \
             active_duration_secs = ?5, pause_duration_secs = ?6, updated_at = ?7 WHERE id = ?1",
            params![
                log.id.to_string(),
                format_timestamp(&log.started_at),
                opt_timestamp(log.finished_at),
                log.status.as_str(),
                log.active_duration_secs,
                log.pause_duration_secs,
                format_timestamp(&log.updated_at),
            ],
        )?;
        Ok(())
    }

    // --- Exercise sets ---

    fn insert_set(&self, set: &ExerciseSet) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exercise_sets \
             (id, workout_log_id, exercise_id, exercise_instance_id, set_number, weight, reps, \
              finished_at, status, created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                set.id.to_string(),
                set.workout_log_id.to_string(),
                set.exercise_id.to_string(),
                set.exercise_instance_id.to_string(),
                set.set_number,
                set.weight,
                set.reps,
                opt_timestamp(set.finished_at),
                set.status.as_str(),
                format_timestamp(&set.created_at),
                format_timestamp(&set.updated_at),
                opt_timestamp(set.deleted_at),
            ],
        )?;
        Ok(())
    }

    fn set(&self, id: &Uuid) -> Result<Option<ExerciseSet>> {
        self.fetch_one(
            &format!(
                "SELECT {} FROM exercise_sets WHERE id = ?1 AND deleted_at IS NULL",
                SET_COLUMNS
            ),
            [id.to_string()],
            SetRow::read,
        )
    }

    fn sets_of_log(&self, log_id: &Uuid) -> Result<Vec<ExerciseSet>> {
        self.fetch_all(
            &format!(
                "SELECT {} FROM exercise_sets WHERE workout_log_id = ?1 AND deleted_at IS NULL \
                 ORDER BY created_at, rowid",
                SET_COLUMNS
            ),
            [log_id.to_string()],
            SetRow::read,
        )
    }

    fn update_set(&self, set: &ExerciseSet) -> Result<()> {
        self.conn.execute(
            "UPDATE exercise_sets SET exercise_id = ?2, exercise_instance_id = ?3, \
             set_number = ?4, weight = ?5, reps = ?6, finished_at = ?7, status = ?8, \
             updated_at = ?9 WHERE id = ?1",
            params![
                set.id.to_string(),
                set.exercise_id.to_string(),
                set.exercise_instance_id.to_string(),
                set.set_number,
                set.weight,
                set.reps,
                opt_timestamp(set.finished_at),
                set.status.as_str(),
                format_timestamp(&set.updated_at),
            ],
        )?;
        Ok(())
    }

    fn max_set_number(&self, log_id: &Uuid, instance_id: &Uuid) -> Result<Option<i32>> {
        let max: Option<i32> = self.conn.query_row(
            "SELECT MAX(set_number) FROM exercise_sets \
             WHERE workout_log_id = ?1 AND exercise_instance_id = ?2 AND deleted_at IS NULL",
            [log_id.to_string(), instance_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::schema;
    use chrono::SubsecRound;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        schema::migrate(&mut conn).unwrap();
        conn
    }

    fn exercise(name: &str) -> Exercise {
        let now = Utc::now().trunc_subsecs(6);
        Exercise {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_exercise_lookup_is_case_insensitive() {
        let conn = setup();
        let gw = Gateway::new(&conn);
        let squat = exercise("Squat");
        gw.insert_exercise(&squat).unwrap();

        assert_eq!(gw.exercise_by_name("SQUAT").unwrap(), Some(squat.clone()));
        assert_eq!(gw.exercise(&squat.id).unwrap(), Some(squat));
        assert!(gw.exercise_by_name("Bench").unwrap().is_none());
    }

    #[test]
    fn test_soft_delete_hides_rows_and_is_idempotent() {
        let conn = setup();
        let gw = Gateway::new(&conn);
        let squat = exercise("Squat");
        gw.insert_exercise(&squat).unwrap();

        let at = Utc::now().trunc_subsecs(6);
        assert_eq!(gw.soft_delete(Table::Exercises, &[squat.id], at).unwrap(), 1);
        assert_eq!(gw.soft_delete(Table::Exercises, &[squat.id], at).unwrap(), 0);
        assert!(gw.exercise(&squat.id).unwrap().is_none());
        assert!(gw.list_exercises().unwrap().is_empty());
    }

    #[test]
    fn test_live_exercise_ids_filters_unknown_and_retired() {
        let conn = setup();
        let gw = Gateway::new(&conn);
        let squat = exercise("Squat");
        let bench = exercise("Bench Press");
        gw.insert_exercise(&squat).unwrap();
        gw.insert_exercise(&bench).unwrap();
        gw.soft_delete(Table::Exercises, &[bench.id], Utc::now())
            .unwrap();

        let unknown = Uuid::new_v4();
        let wanted: BTreeSet<Uuid> = [squat.id, bench.id, unknown].into_iter().collect();
        let live = gw.live_exercise_ids(&wanted).unwrap();
        assert_eq!(live, [squat.id].into_iter().collect());
    }

    #[test]
    fn test_max_set_number_ignores_deleted_sets() {
        let conn = setup();
        let gw = Gateway::new(&conn);
        let now = Utc::now().trunc_subsecs(6);
        let squat = exercise("Squat");
        gw.insert_exercise(&squat).unwrap();

        let log = WorkoutLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            workout_id: None,
            started_at: now,
            finished_at: None,
            status: Default::default(),
            active_duration_secs: 0,
            pause_duration_secs: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        gw.insert_log(&log).unwrap();
        let instance = ExerciseInstance {
            id: Uuid::new_v4(),
            exercise_id: squat.id,
            workout_log_id: Some(log.id),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        gw.insert_instance(&instance).unwrap();
        assert_eq!(gw.max_set_number(&log.id, &instance.id).unwrap(), None);

        let mut ids = Vec::new();
        for number in 1..=2 {
            let set = ExerciseSet {
                id: Uuid::new_v4(),
                workout_log_id: log.id,
                exercise_id: squat.id,
                exercise_instance_id: instance.id,
                set_number: number,
                weight: Some(60.0),
                reps: Some(5),
                finished_at: None,
                status: Default::default(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            };
            gw.insert_set(&set).unwrap();
            ids.push(set.id);
        }
        assert_eq!(gw.max_set_number(&log.id, &instance.id).unwrap(), Some(2));

        gw.soft_delete(Table::ExerciseSets, &ids[1..], now).unwrap();
        assert_eq!(gw.max_set_number(&log.id, &instance.id).unwrap(), Some(1));
        assert!(gw
            .owned_instance_ids(Owner::Log(log.id))
            .unwrap()
            .contains(&instance.id));
        assert!(gw.instance_referenced(&instance.id, None).unwrap());
        assert!(!gw
            .instance_referenced(&instance.id, Some(Owner::Log(log.id)))
            .unwrap());
    }
}
