//! Parsing helpers for ids, datetimes and exercise references.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use liftbook_core::{Exercise, WorkoutStore};

use crate::errors::CliError;

/// Parse a UUID argument, naming the kind of record in the error.
pub fn parse_id(value: &str, what: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|e| {
        CliError::invalid_input(format!("Invalid {} ID '{}': {}", what, value, e)).into()
    })
}

/// Parse a datetime string (ISO-8601 or YYYY-MM-DD).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CliError::invalid_input(format!("Invalid date value: {}", value)))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(CliError::invalid_input(format!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
    .into())
}

/// Find a live catalog exercise by ID, or by case-insensitive name.
pub fn resolve_exercise(store: &dyn WorkoutStore, reference: &str) -> anyhow::Result<Exercise> {
    if let Ok(id) = Uuid::parse_str(reference.trim()) {
        return Ok(store.get_exercise(&id)?);
    }
    let wanted = reference.trim();
    store
        .list_exercises()?
        .into_iter()
        .find(|e| e.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            CliError::not_found(
                format!("Exercise '{}' not found", wanted),
                "Hint: Run `liftbook exercise list` to see the catalog.",
            )
            .into()
        })
}
