//! Text and table output formatting.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use uuid::Uuid;

use liftbook_core::{
    Exercise, Page, Workout, WorkoutDetail, WorkoutLog, WorkoutLogDetail, WorkoutStore,
};

/// Build a map of exercise ID -> name for display.
pub fn exercise_name_map(store: &dyn WorkoutStore) -> anyhow::Result<HashMap<Uuid, String>> {
    Ok(store
        .list_exercises()?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect())
}

pub fn print_exercises(exercises: &[Exercise], quiet: bool) {
    if exercises.is_empty() {
        if !quiet {
            println!("No exercises found.");
        }
        return;
    }
    let rows = exercises
        .iter()
        .map(|e| vec![e.id.to_string(), e.name.clone()])
        .collect::<Vec<_>>();
    println!("{}", simple_table(&["ID", "NAME"], &rows, quiet));
}

pub fn print_workout_list(page: &Page<Workout>, quiet: bool) {
    if page.items.is_empty() {
        if !quiet {
            println!("No workouts found.");
        }
        return;
    }
    let rows = page
        .items
        .iter()
        .map(|w| vec![w.id.to_string(), w.name.clone(), timestamp(&w.created_at)])
        .collect::<Vec<_>>();
    println!("{}", simple_table(&["ID", "NAME", "CREATED"], &rows, quiet));
    if !quiet {
        println!("{}", page_footer(page));
    }
}

pub fn print_workout(detail: &WorkoutDetail, names: &HashMap<Uuid, String>, quiet: bool) {
    let workout = &detail.workout;
    if !quiet {
        println!("Workout: {}", workout.name);
        println!("ID: {}", workout.id);
        println!("Created: {}", timestamp(&workout.created_at));
        println!("Updated: {}", timestamp(&workout.updated_at));
        println!();
    }
    if detail.exercises.is_empty() {
        if !quiet {
            println!("No exercises planned.");
        }
        return;
    }
    let rows = detail
        .exercises
        .iter()
        .map(|e| {
            vec![
                e.order.map(|o| o.to_string()).unwrap_or_default(),
                exercise_label(names, &e.exercise_id),
                optional(e.sets),
                optional(e.reps),
                optional(e.weight),
                e.id.to_string(),
                e.exercise_instance_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    println!(
        "{}",
        simple_table(
            &["#", "EXERCISE", "SETS", "REPS", "WEIGHT", "ENTRY ID", "INSTANCE"],
            &rows,
            quiet
        )
    );
}

pub fn print_session_list(page: &Page<WorkoutLog>, quiet: bool) {
    if page.items.is_empty() {
        if !quiet {
            println!("No sessions found.");
        }
        return;
    }
    let rows = page
        .items
        .iter()
        .map(|log| {
            vec![
                log.id.to_string(),
                log.status.to_string(),
                timestamp(&log.started_at),
                log.finished_at.as_ref().map(timestamp).unwrap_or_default(),
                log.workout_id.map(|id| id.to_string()).unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    println!(
        "{}",
        simple_table(
            &["ID", "STATUS", "STARTED", "FINISHED", "WORKOUT"],
            &rows,
            quiet
        )
    );
    if !quiet {
        println!("{}", page_footer(page));
    }
}

pub fn print_session(detail: &WorkoutLogDetail, names: &HashMap<Uuid, String>, quiet: bool) {
    let log = &detail.log;
    if !quiet {
        println!("Session: {}", log.id);
        println!("Status: {}", log.status);
        if let Some(workout_id) = log.workout_id {
            println!("Workout: {}", workout_id);
        }
        println!("Started: {}", timestamp(&log.started_at));
        if let Some(finished) = &log.finished_at {
            println!("Finished: {}", timestamp(finished));
        }
        if log.active_duration_secs > 0 || log.pause_duration_secs > 0 {
            println!(
                "Active: {}s  Paused: {}s",
                log.active_duration_secs, log.pause_duration_secs
            );
        }
        println!();
    }
    if detail.sets.is_empty() {
        if !quiet {
            println!("No sets logged.");
        }
        return;
    }
    let rows = detail
        .sets
        .iter()
        .map(|s| {
            vec![
                exercise_label(names, &s.exercise_id),
                s.set_number.to_string(),
                optional(s.weight),
                optional(s.reps),
                s.status.to_string(),
                s.id.to_string(),
                s.exercise_instance_id.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    println!(
        "{}",
        simple_table(
            &["EXERCISE", "SET", "WEIGHT", "REPS", "STATUS", "SET ID", "INSTANCE"],
            &rows,
            quiet
        )
    );
}

/// Borderless table; the header row is dropped in quiet mode.
fn simple_table(headers: &[&str], rows: &[Vec<String>], quiet: bool) -> String {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if !quiet {
        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Dim))
            .collect();
        table.set_header(header_cells);
    }
    for row in rows {
        table.add_row(row);
    }
    for i in 0..headers.len() {
        if let Some(column) = table.column_mut(i) {
            column.set_padding((0, 2));
        }
    }
    table.to_string()
}

fn page_footer<T>(page: &Page<T>) -> String {
    let pages = page.total.div_ceil(u64::from(page.limit.max(1))).max(1);
    format!("Page {} of {} ({} total)", page.page, pages, page.total)
}

fn exercise_label(names: &HashMap<Uuid, String>, id: &Uuid) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| format!("(retired {})", &id.to_string()[..8]))
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}
