//! Core data types for the storage layer.
//!
//! Entities mirror the six tables of the store. Children refer to their
//! parents by id only; the `*Detail` types are read-side aggregates that own
//! their children.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LiftbookError, Result};

/// Default page size for list operations.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Lifecycle state of a workout log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Paused,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = LiftbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "paused" => Ok(SessionStatus::Paused),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(LiftbookError::Validation(format!(
                "Unknown session status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single logged set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetStatus {
    #[default]
    Pending,
    Completed,
    Skipped,
}

impl SetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetStatus::Pending => "pending",
            SetStatus::Completed => "completed",
            SetStatus::Skipped => "skipped",
        }
    }
}

impl FromStr for SetStatus {
    type Err = LiftbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SetStatus::Pending),
            "completed" => Ok(SetStatus::Completed),
            "skipped" => Ok(SetStatus::Skipped),
            other => Err(LiftbookError::Validation(format!(
                "Unknown set status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog exercise (e.g. "Squat").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Identity token for one occurrence of an exercise inside a template or log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseInstance {
    pub id: Uuid,
    pub exercise_id: Uuid,

    /// Session this instance was minted for, if it did not come from a template
    pub workout_log_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A workout template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A planned exercise entry inside a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_instance_id: Option<Uuid>,
    pub order: Option<i32>,
    pub sets: Option<i32>,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Template this session was started from; `None` for freestanding sessions
    pub workout_id: Option<Uuid>,

    pub started_at: DateTime<Utc>,

    /// `None` while the session is in progress
    pub finished_at: Option<DateTime<Utc>>,

    pub status: SessionStatus,
    pub active_duration_secs: i64,
    pub pause_duration_secs: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One performed or planned set inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: Uuid,
    pub workout_log_id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_instance_id: Uuid,
    pub set_number: i32,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: SetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A template together with its live exercise entries, in plan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<WorkoutExercise>,
}

/// A session together with its live sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogDetail {
    #[serde(flatten)]
    pub log: WorkoutLog,
    pub sets: Vec<ExerciseSet>,
}

/// One page of a list operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// 1-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(LiftbookError::Validation(
                "Page numbers start at 1".to_string(),
            ));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(LiftbookError::Validation(format!(
                "Page limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One exercise entry of a template create/update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    /// Existing `WorkoutExercise` to update in place; `None` creates a new entry
    #[serde(default)]
    pub id: Option<Uuid>,

    pub exercise_id: Uuid,

    /// Join an instance this template already uses
    #[serde(default)]
    pub exercise_instance_id: Option<Uuid>,

    /// Groups new entries of one request under one freshly minted instance
    #[serde(default)]
    pub correlation: Option<String>,

    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub sets: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<i32>,
}

impl ExerciseEntry {
    pub fn new(exercise_id: Uuid) -> Self {
        Self {
            id: None,
            exercise_id,
            exercise_instance_id: None,
            correlation: None,
            order: None,
            sets: None,
            weight: None,
            reps: None,
        }
    }

    /// Build an entry that resubmits an existing row unchanged.
    pub fn existing(row: &WorkoutExercise) -> Self {
        Self {
            id: Some(row.id),
            exercise_id: row.exercise_id,
            exercise_instance_id: None,
            correlation: None,
            order: row.order,
            sets: row.sets,
            weight: row.weight,
            reps: row.reps,
        }
    }

    pub fn with_correlation(mut self, token: impl Into<String>) -> Self {
        self.correlation = Some(token.into());
        self
    }

    pub fn with_instance(mut self, instance_id: Uuid) -> Self {
        self.exercise_instance_id = Some(instance_id);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_sets(mut self, sets: i32) -> Self {
        self.sets = Some(sets);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_reps(mut self, reps: i32) -> Self {
        self.reps = Some(reps);
        self
    }
}

/// Full desired state of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkoutRequest {
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
}

impl WorkoutRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exercises: Vec::new(),
        }
    }

    pub fn with_exercise(mut self, entry: ExerciseEntry) -> Self {
        self.exercises.push(entry);
        self
    }

    /// Desired state equal to what is currently stored.
    pub fn from_detail(detail: &WorkoutDetail) -> Self {
        Self {
            name: detail.workout.name.clone(),
            exercises: detail.exercises.iter().map(ExerciseEntry::existing).collect(),
        }
    }
}

/// One set of a session update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// Existing `ExerciseSet` to update in place; `None` creates a new set
    #[serde(default)]
    pub id: Option<Uuid>,

    pub exercise_id: Uuid,

    /// Instance the new set belongs to; must already be part of the session
    #[serde(default)]
    pub exercise_instance_id: Option<Uuid>,

    #[serde(default)]
    pub correlation: Option<String>,

    #[serde(default)]
    pub set_number: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<SetStatus>,
}

impl SetEntry {
    pub fn new(exercise_id: Uuid) -> Self {
        Self {
            id: None,
            exercise_id,
            exercise_instance_id: None,
            correlation: None,
            set_number: None,
            weight: None,
            reps: None,
            finished_at: None,
            status: None,
        }
    }

    /// Build an entry that resubmits an existing set unchanged.
    pub fn existing(set: &ExerciseSet) -> Self {
        Self {
            id: Some(set.id),
            exercise_id: set.exercise_id,
            exercise_instance_id: None,
            correlation: None,
            set_number: Some(set.set_number),
            weight: set.weight,
            reps: set.reps,
            finished_at: set.finished_at,
            status: Some(set.status),
        }
    }

    pub fn with_instance(mut self, instance_id: Uuid) -> Self {
        self.exercise_instance_id = Some(instance_id);
        self
    }

    pub fn with_correlation(mut self, token: impl Into<String>) -> Self {
        self.correlation = Some(token.into());
        self
    }

    pub fn with_set_number(mut self, set_number: i32) -> Self {
        self.set_number = Some(set_number);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_reps(mut self, reps: i32) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn with_status(mut self, status: SetStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Full desired state of a session. Absent scalar fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionRequest {
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub active_duration_secs: Option<i64>,
    #[serde(default)]
    pub pause_duration_secs: Option<i64>,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

impl SessionRequest {
    pub fn with_set(mut self, entry: SetEntry) -> Self {
        self.sets.push(entry);
        self
    }

    /// Desired state equal to what is currently stored.
    pub fn from_detail(detail: &WorkoutLogDetail) -> Self {
        Self {
            finished_at: detail.log.finished_at,
            status: Some(detail.log.status),
            active_duration_secs: Some(detail.log.active_duration_secs),
            pause_duration_secs: Some(detail.log.pause_duration_secs),
            sets: detail.sets.iter().map(SetEntry::existing).collect(),
        }
    }
}

/// A single set appended to a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSet {
    pub exercise_id: Uuid,

    /// Instance to append to; `None` mints a fresh instance for the session
    #[serde(default)]
    pub exercise_instance_id: Option<Uuid>,

    /// Explicit set number; defaults to the next number in the instance
    #[serde(default)]
    pub set_number: Option<i32>,

    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub status: Option<SetStatus>,
}

impl NewSet {
    pub fn new(exercise_id: Uuid) -> Self {
        Self {
            exercise_id,
            exercise_instance_id: None,
            set_number: None,
            weight: None,
            reps: None,
            status: None,
        }
    }

    pub fn in_instance(mut self, instance_id: Uuid) -> Self {
        self.exercise_instance_id = Some(instance_id);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_reps(mut self, reps: i32) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn with_set_number(mut self, set_number: i32) -> Self {
        self.set_number = Some(set_number);
        self
    }
}

/// Partial update of one set. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SetPatch {
    #[serde(default)]
    pub set_number: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<SetStatus>,
}

/// Duration counters recorded when a session is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FinishSession {
    #[serde(default)]
    pub active_duration_secs: Option<i64>,
    #[serde(default)]
    pub pause_duration_secs: Option<i64>,
}
