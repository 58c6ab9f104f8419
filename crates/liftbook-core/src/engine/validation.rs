//! Input validation shared by the template and session engines.
//!
//! Field checks report a path such as `exercises[2].sets` so callers can point
//! at the offending item.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::{LiftbookError, Result};
use crate::storage::traits::EntityStore;

/// Longest accepted name, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Trim a name and check it is non-empty and not too long.
pub fn normalize_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LiftbookError::Validation(format!(
            "{} must not be empty",
            what
        )));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(LiftbookError::Validation(format!(
            "{} too long (max {} characters)",
            what, MAX_NAME_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

pub fn check_sets(path: &str, sets: Option<i32>) -> Result<()> {
    match sets {
        Some(n) if n < 1 => Err(LiftbookError::Validation(format!(
            "{}.sets must be at least 1",
            path
        ))),
        _ => Ok(()),
    }
}

pub fn check_reps(path: &str, reps: Option<i32>) -> Result<()> {
    match reps {
        Some(n) if n < 0 => Err(LiftbookError::Validation(format!(
            "{}.reps must not be negative",
            path
        ))),
        _ => Ok(()),
    }
}

pub fn check_weight(path: &str, weight: Option<f64>) -> Result<()> {
    match weight {
        Some(w) if !w.is_finite() || w < 0.0 => Err(LiftbookError::Validation(format!(
            "{}.weight must be a finite, non-negative number",
            path
        ))),
        _ => Ok(()),
    }
}

pub fn check_duration(field: &str, secs: Option<i64>) -> Result<()> {
    match secs {
        Some(s) if s < 0 => Err(LiftbookError::Validation(format!(
            "{} must not be negative",
            field
        ))),
        _ => Ok(()),
    }
}

/// Rules for the correlation token of a new item.
pub fn check_correlation(
    path: &str,
    token: Option<&str>,
    instance_id: Option<Uuid>,
) -> Result<()> {
    let Some(token) = token else {
        return Ok(());
    };
    if token.trim().is_empty() {
        return Err(LiftbookError::Validation(format!(
            "{}.correlation must not be empty",
            path
        )));
    }
    if instance_id.is_some() {
        return Err(LiftbookError::Validation(format!(
            "{} names both a correlation token and an exercise instance",
            path
        )));
    }
    Ok(())
}

/// Check that every referenced exercise is live.
///
/// Each distinct id is looked up once. The error lists every offending path.
pub fn check_exercises<S: EntityStore + ?Sized>(
    store: &S,
    refs: &[(String, Uuid)],
) -> Result<()> {
    if refs.is_empty() {
        return Ok(());
    }
    let wanted: BTreeSet<Uuid> = refs.iter().map(|(_, id)| *id).collect();
    let live = store.live_exercise_ids(&wanted)?;

    let offenders: Vec<&str> = refs
        .iter()
        .filter(|(_, id)| !live.contains(id))
        .map(|(path, _)| path.as_str())
        .collect();
    if offenders.is_empty() {
        return Ok(());
    }
    Err(LiftbookError::Validation(format!(
        "Unknown or retired exercise at {}",
        offenders.join(", ")
    )))
}
