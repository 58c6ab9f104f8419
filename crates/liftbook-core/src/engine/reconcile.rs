//! Desired-state reconciliation for templates and sessions.
//!
//! A client resubmits the full child list of a template or session. Items
//! carrying an id update the matching live child; items without one are
//! created; live children that are not named are soft-deleted.
//!
//! Planning runs every check before the first write. Applying a plan then
//! writes, in order: parent scalars, removals, changed updates, creations,
//! and finally the sweep of instances the removals left unreferenced. Rows
//! whose fields already match the request are not rewritten.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::validation::{
    check_correlation, check_duration, check_exercises, check_reps, check_sets, check_weight,
    normalize_name,
};
use super::{at_storage_precision, cascade, guard, now};
use crate::error::{LiftbookError, Result};
use crate::storage::traits::{EntityStore, Owner, Table};
use crate::storage::types::{
    ExerciseEntry, ExerciseInstance, ExerciseSet, SessionRequest, SetEntry, WorkoutDetail,
    WorkoutExercise, WorkoutLog, WorkoutLogDetail, WorkoutRequest,
};

/// A stored child row.
trait Child: Clone {
    fn id(&self) -> Uuid;
}

impl Child for WorkoutExercise {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Child for ExerciseSet {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// A requested child; `None` asks for a new row.
trait Identified {
    fn id(&self) -> Option<Uuid>;
}

impl Identified for ExerciseEntry {
    fn id(&self) -> Option<Uuid> {
        self.id
    }
}

impl Identified for SetEntry {
    fn id(&self) -> Option<Uuid> {
        self.id
    }
}

#[derive(Debug)]
struct Diff<'a, C, D> {
    remove: Vec<C>,
    matched: Vec<(usize, C, &'a D)>,
    create: Vec<(usize, &'a D)>,
}

/// Match requested items against current children.
///
/// # Errors
///
/// `Validation` if an id is named twice, `Conflict` if an id is not a live
/// child of this parent.
fn diff<'a, C: Child, D: Identified>(
    current: &[C],
    desired: &'a [D],
    field: &str,
    parent: &str,
) -> Result<Diff<'a, C, D>> {
    let by_id: HashMap<Uuid, &C> = current.iter().map(|row| (row.id(), row)).collect();
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut create = Vec::new();

    for (i, item) in desired.iter().enumerate() {
        let Some(id) = item.id() else {
            create.push((i, item));
            continue;
        };
        if !seen.insert(id) {
            return Err(LiftbookError::Validation(format!(
                "{}[{}]: id {} appears more than once",
                field, i, id
            )));
        }
        match by_id.get(&id) {
            Some(row) => matched.push((i, (*row).clone(), item)),
            None => {
                return Err(LiftbookError::Conflict(format!(
                    "{}[{}]: {} is not part of this {}",
                    field, i, id, parent
                )))
            }
        }
    }

    let remove = current
        .iter()
        .filter(|row| !seen.contains(&row.id()))
        .cloned()
        .collect();

    Ok(Diff {
        remove,
        matched,
        create,
    })
}

/// Checks shared by identified items of either kind.
fn check_identified(
    path: &str,
    stored_exercise: Uuid,
    stored_instance: Option<Uuid>,
    exercise_id: Uuid,
    instance_id: Option<Uuid>,
    correlation: Option<&str>,
) -> Result<()> {
    if correlation.is_some() {
        return Err(LiftbookError::Validation(format!(
            "{}: correlation tokens are only allowed on new items",
            path
        )));
    }
    if exercise_id != stored_exercise {
        return Err(LiftbookError::Validation(format!(
            "{}: the exercise of an existing item cannot change",
            path
        )));
    }
    if instance_id.is_some() && instance_id != stored_instance {
        return Err(LiftbookError::Validation(format!(
            "{}: an existing item cannot move to another exercise instance",
            path
        )));
    }
    Ok(())
}

/// Check that explicitly named instances already belong to the parent.
fn check_instances<'a, S: EntityStore + ?Sized>(
    store: &S,
    owner: Owner,
    named: impl Iterator<Item = (String, &'a Uuid)>,
) -> Result<()> {
    let mut owned: Option<BTreeSet<Uuid>> = None;
    for (path, instance_id) in named {
        if owned.is_none() {
            owned = Some(store.owned_instance_ids(owner)?);
        }
        if !owned.as_ref().is_some_and(|ids| ids.contains(instance_id)) {
            return Err(LiftbookError::Conflict(format!(
                "{}: exercise instance {} is not part of this {}",
                path,
                instance_id,
                owner_noun(owner)
            )));
        }
    }
    Ok(())
}

fn owner_noun(owner: Owner) -> &'static str {
    match owner {
        Owner::Workout(_) => "workout",
        Owner::Log(_) => "session",
    }
}

/// Resolves the instance of each newly created child.
///
/// The first occurrence of a correlation token mints an instance and later
/// occurrences reuse it. Items without a token get a fresh instance unless
/// they name one explicitly.
pub(crate) struct InstanceResolver<'s, S: ?Sized> {
    store: &'s S,
    log_id: Option<Uuid>,
    at: DateTime<Utc>,
    by_token: HashMap<String, Uuid>,
}

impl<'s, S: EntityStore + ?Sized> InstanceResolver<'s, S> {
    /// `log_id` is stamped on instances minted for a session.
    pub(crate) fn new(store: &'s S, log_id: Option<Uuid>, at: DateTime<Utc>) -> Self {
        Self {
            store,
            log_id,
            at,
            by_token: HashMap::new(),
        }
    }

    pub(crate) fn resolve(
        &mut self,
        exercise_id: Uuid,
        explicit: Option<Uuid>,
        token: Option<&str>,
    ) -> Result<Uuid> {
        if let Some(id) = explicit {
            return Ok(id);
        }
        if let Some(id) = token.and_then(|t| self.by_token.get(t)) {
            return Ok(*id);
        }
        let id = self.mint(exercise_id)?;
        if let Some(token) = token {
            self.by_token.insert(token.to_string(), id);
        }
        Ok(id)
    }

    pub(crate) fn mint(&self, exercise_id: Uuid) -> Result<Uuid> {
        let instance = ExerciseInstance {
            id: Uuid::new_v4(),
            exercise_id,
            workout_log_id: self.log_id,
            created_at: self.at,
            updated_at: self.at,
            deleted_at: None,
        };
        self.store.insert_instance(&instance)?;
        log::debug!(
            "Minted exercise instance {} for exercise {}",
            instance.id,
            exercise_id
        );
        Ok(instance.id)
    }
}

// --- Templates ---

/// Validated change set for a template's entries.
pub(crate) struct WorkoutPlan<'a> {
    remove: Vec<WorkoutExercise>,
    update: Vec<WorkoutExercise>,
    create: Vec<&'a ExerciseEntry>,
}

impl WorkoutPlan<'_> {
    pub(crate) fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.update.is_empty() && self.create.is_empty()
    }
}

fn merge_entry(row: &WorkoutExercise, entry: &ExerciseEntry) -> WorkoutExercise {
    WorkoutExercise {
        order: entry.order,
        sets: entry.sets,
        weight: entry.weight,
        reps: entry.reps,
        ..row.clone()
    }
}

/// Plan the entries of `workout_id` against the desired list.
///
/// Nothing is written. An empty `current` plans a fresh template.
pub(crate) fn plan_workout<'a, S: EntityStore + ?Sized>(
    store: &S,
    workout_id: &Uuid,
    current: &[WorkoutExercise],
    desired: &'a [ExerciseEntry],
) -> Result<WorkoutPlan<'a>> {
    let diff = diff(current, desired, "exercises", "workout")?;

    for (i, entry) in desired.iter().enumerate() {
        let path = format!("exercises[{}]", i);
        check_sets(&path, entry.sets)?;
        check_reps(&path, entry.reps)?;
        check_weight(&path, entry.weight)?;
    }

    let mut update = Vec::new();
    for (i, row, entry) in &diff.matched {
        check_identified(
            &format!("exercises[{}]", i),
            row.exercise_id,
            row.exercise_instance_id,
            entry.exercise_id,
            entry.exercise_instance_id,
            entry.correlation.as_deref(),
        )?;
        let merged = merge_entry(row, entry);
        if merged != *row {
            update.push(merged);
        }
    }

    let mut groups: HashMap<&str, HashSet<Uuid>> = HashMap::new();
    for (i, entry) in &diff.create {
        let path = format!("exercises[{}]", i);
        check_correlation(
            &path,
            entry.correlation.as_deref(),
            entry.exercise_instance_id,
        )?;
        if let Some(token) = entry.correlation.as_deref() {
            if !groups.entry(token).or_default().insert(entry.exercise_id) {
                return Err(LiftbookError::Validation(format!(
                    "{}: exercise {} already appears under correlation token '{}'",
                    path, entry.exercise_id, token
                )));
            }
        }
    }

    let refs: Vec<(String, Uuid)> = diff
        .create
        .iter()
        .map(|(i, entry)| (format!("exercises[{}]", i), entry.exercise_id))
        .collect();
    check_exercises(store, &refs)?;

    check_instances(
        store,
        Owner::Workout(*workout_id),
        diff.create.iter().filter_map(|(i, entry)| {
            entry
                .exercise_instance_id
                .as_ref()
                .map(|id| (format!("exercises[{}]", i), id))
        }),
    )?;

    // Joining an instance follows the token rule: one occurrence per exercise.
    let mut members: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    for (_, row, _) in &diff.matched {
        if let Some(instance_id) = row.exercise_instance_id {
            members
                .entry(instance_id)
                .or_default()
                .insert(row.exercise_id);
        }
    }
    for (i, entry) in &diff.create {
        let Some(instance_id) = entry.exercise_instance_id else {
            continue;
        };
        if !members
            .entry(instance_id)
            .or_default()
            .insert(entry.exercise_id)
        {
            return Err(LiftbookError::Validation(format!(
                "exercises[{}]: exercise {} already appears in exercise instance {}",
                i, entry.exercise_id, instance_id
            )));
        }
    }

    Ok(WorkoutPlan {
        remove: diff.remove,
        update,
        create: diff.create.into_iter().map(|(_, entry)| entry).collect(),
    })
}

/// Write a planned change set. Returns whether any child row changed.
pub(crate) fn apply_workout<S: EntityStore + ?Sized>(
    store: &S,
    workout_id: &Uuid,
    plan: WorkoutPlan<'_>,
    at: DateTime<Utc>,
) -> Result<bool> {
    let changed = !plan.is_empty();

    let removed: Vec<Uuid> = plan.remove.iter().map(|row| row.id).collect();
    store.soft_delete(Table::WorkoutExercises, &removed, at)?;

    for mut row in plan.update {
        row.updated_at = at;
        store.update_workout_exercise(&row)?;
    }

    let mut resolver = InstanceResolver::new(store, None, at);
    for entry in plan.create {
        let instance_id = resolver.resolve(
            entry.exercise_id,
            entry.exercise_instance_id,
            entry.correlation.as_deref(),
        )?;
        let row = WorkoutExercise {
            id: Uuid::new_v4(),
            workout_id: *workout_id,
            exercise_id: entry.exercise_id,
            exercise_instance_id: Some(instance_id),
            order: entry.order,
            sets: entry.sets,
            weight: entry.weight,
            reps: entry.reps,
            created_at: at,
            updated_at: at,
            deleted_at: None,
        };
        store.insert_workout_exercise(&row)?;
    }

    let candidates: BTreeSet<Uuid> = plan
        .remove
        .iter()
        .filter_map(|row| row.exercise_instance_id)
        .collect();
    cascade::sweep(store, &candidates, at)?;

    Ok(changed)
}

/// Reconcile a template against the desired state.
pub fn update_workout<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
    request: &WorkoutRequest,
) -> Result<WorkoutDetail> {
    let mut workout = guard::owned_workout(store, user_id, id)?;
    let name = normalize_name(&request.name, "Workout name")?;
    let current = store.workout_exercises(&workout.id)?;
    let plan = plan_workout(store, &workout.id, &current, &request.exercises)?;

    let at = now();
    if name != workout.name || !plan.is_empty() {
        workout.name = name;
        workout.updated_at = at;
        store.update_workout(&workout)?;
    }

    let (removed, updated, created) = (plan.remove.len(), plan.update.len(), plan.create.len());
    if apply_workout(store, &workout.id, plan, at)? {
        log::info!(
            "Reconciled workout {}: {} removed, {} updated, {} created",
            workout.id,
            removed,
            updated,
            created
        );
    }

    let exercises = store.workout_exercises(&workout.id)?;
    Ok(WorkoutDetail { workout, exercises })
}

// --- Sessions ---

/// Validated change set for a session's sets.
struct SessionPlan<'a> {
    remove: Vec<ExerciseSet>,
    update: Vec<ExerciseSet>,
    create: Vec<&'a SetEntry>,
}

impl SessionPlan<'_> {
    fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.update.is_empty() && self.create.is_empty()
    }
}

/// Which instance a resulting set will belong to, for the numbering check.
#[derive(Debug, PartialEq, Eq, Hash)]
enum InstanceKey<'a> {
    Existing(Uuid),
    Token(&'a str),
    Fresh(usize),
}

fn positive(number: Option<i32>) -> Option<i32> {
    number.filter(|n| *n > 0)
}

fn merge_set(row: &ExerciseSet, entry: &SetEntry) -> ExerciseSet {
    ExerciseSet {
        set_number: positive(entry.set_number).unwrap_or(row.set_number),
        weight: entry.weight,
        reps: entry.reps,
        finished_at: entry.finished_at.map(at_storage_precision),
        status: entry.status.unwrap_or_default(),
        ..row.clone()
    }
}

fn merge_log(log: &WorkoutLog, request: &SessionRequest) -> WorkoutLog {
    WorkoutLog {
        finished_at: request
            .finished_at
            .map(at_storage_precision)
            .or(log.finished_at),
        status: request.status.unwrap_or(log.status),
        active_duration_secs: request
            .active_duration_secs
            .unwrap_or(log.active_duration_secs),
        pause_duration_secs: request
            .pause_duration_secs
            .unwrap_or(log.pause_duration_secs),
        ..log.clone()
    }
}

/// A resulting set's position; `defaulted` marks a number the request left out.
struct Numbered<'a> {
    path: String,
    key: InstanceKey<'a>,
    number: i32,
    defaulted: bool,
}

fn check_set_numbers(numbers: Vec<Numbered<'_>>) -> Result<()> {
    let mut seen: HashSet<(InstanceKey<'_>, i32)> = HashSet::new();
    for item in numbers {
        let joins_existing = item.defaulted && matches!(item.key, InstanceKey::Existing(_));
        if !seen.insert((item.key, item.number)) {
            let hint = if joins_existing {
                "; new sets default to 1, pass set_number when adding to an existing instance"
            } else {
                ""
            };
            return Err(LiftbookError::Validation(format!(
                "{}: set number {} is already used in its exercise instance{}",
                item.path, item.number, hint
            )));
        }
    }
    Ok(())
}

fn plan_session<'a, S: EntityStore + ?Sized>(
    store: &S,
    log_id: &Uuid,
    current: &[ExerciseSet],
    desired: &'a [SetEntry],
) -> Result<SessionPlan<'a>> {
    let diff = diff(current, desired, "sets", "session")?;

    for (i, entry) in desired.iter().enumerate() {
        let path = format!("sets[{}]", i);
        check_reps(&path, entry.reps)?;
        check_weight(&path, entry.weight)?;
    }

    let mut numbers = Vec::with_capacity(desired.len());
    let mut update = Vec::new();
    for (i, row, entry) in &diff.matched {
        let path = format!("sets[{}]", i);
        check_identified(
            &path,
            row.exercise_id,
            Some(row.exercise_instance_id),
            entry.exercise_id,
            entry.exercise_instance_id,
            entry.correlation.as_deref(),
        )?;
        let merged = merge_set(row, entry);
        numbers.push(Numbered {
            path,
            key: InstanceKey::Existing(merged.exercise_instance_id),
            number: merged.set_number,
            defaulted: false,
        });
        if merged != *row {
            update.push(merged);
        }
    }

    for (i, entry) in &diff.create {
        let path = format!("sets[{}]", i);
        check_correlation(
            &path,
            entry.correlation.as_deref(),
            entry.exercise_instance_id,
        )?;
        let key = match (entry.exercise_instance_id, entry.correlation.as_deref()) {
            (Some(instance_id), _) => InstanceKey::Existing(instance_id),
            (None, Some(token)) => InstanceKey::Token(token),
            (None, None) => InstanceKey::Fresh(*i),
        };
        let number = positive(entry.set_number);
        numbers.push(Numbered {
            path,
            key,
            number: number.unwrap_or(1),
            defaulted: number.is_none(),
        });
    }

    let refs: Vec<(String, Uuid)> = diff
        .create
        .iter()
        .map(|(i, entry)| (format!("sets[{}]", i), entry.exercise_id))
        .collect();
    check_exercises(store, &refs)?;

    check_instances(
        store,
        Owner::Log(*log_id),
        diff.create.iter().filter_map(|(i, entry)| {
            entry
                .exercise_instance_id
                .as_ref()
                .map(|id| (format!("sets[{}]", i), id))
        }),
    )?;

    check_set_numbers(numbers)?;

    Ok(SessionPlan {
        remove: diff.remove,
        update,
        create: diff.create.into_iter().map(|(_, entry)| entry).collect(),
    })
}

fn apply_session<S: EntityStore + ?Sized>(
    store: &S,
    log_id: &Uuid,
    plan: SessionPlan<'_>,
    at: DateTime<Utc>,
) -> Result<()> {
    let removed: Vec<Uuid> = plan.remove.iter().map(|set| set.id).collect();
    store.soft_delete(Table::ExerciseSets, &removed, at)?;

    for mut set in plan.update {
        set.updated_at = at;
        store.update_set(&set)?;
    }

    let mut resolver = InstanceResolver::new(store, Some(*log_id), at);
    for entry in plan.create {
        let instance_id = resolver.resolve(
            entry.exercise_id,
            entry.exercise_instance_id,
            entry.correlation.as_deref(),
        )?;
        let set = ExerciseSet {
            id: Uuid::new_v4(),
            workout_log_id: *log_id,
            exercise_id: entry.exercise_id,
            exercise_instance_id: instance_id,
            set_number: positive(entry.set_number).unwrap_or(1),
            weight: entry.weight,
            reps: entry.reps,
            finished_at: entry.finished_at.map(at_storage_precision),
            status: entry.status.unwrap_or_default(),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        };
        store.insert_set(&set)?;
    }

    let candidates: BTreeSet<Uuid> = plan
        .remove
        .iter()
        .map(|set| set.exercise_instance_id)
        .collect();
    cascade::sweep(store, &candidates, at)?;
    Ok(())
}

/// Reconcile a session against the desired state.
///
/// Absent scalar fields keep their stored values; the set list is always the
/// full desired list.
pub fn update_session<S: EntityStore + ?Sized>(
    store: &S,
    user_id: &Uuid,
    id: &Uuid,
    request: &SessionRequest,
) -> Result<WorkoutLogDetail> {
    let log = guard::owned_log(store, user_id, id)?;
    check_duration("active_duration_secs", request.active_duration_secs)?;
    check_duration("pause_duration_secs", request.pause_duration_secs)?;

    let current = store.sets_of_log(&log.id)?;
    let plan = plan_session(store, &log.id, &current, &request.sets)?;

    let at = now();
    let mut merged = merge_log(&log, request);
    if merged != log || !plan.is_empty() {
        merged.updated_at = at;
        store.update_log(&merged)?;
    }

    if !plan.is_empty() {
        log::info!(
            "Reconciled session {}: {} removed, {} updated, {} created",
            merged.id,
            plan.remove.len(),
            plan.update.len(),
            plan.create.len()
        );
        apply_session(store, &merged.id, plan, at)?;
    }

    let sets = store.sets_of_log(&merged.id)?;
    Ok(WorkoutLogDetail { log: merged, sets })
}
