use liftbook_core::{PageRequest, WorkoutDetail, WorkoutRequest, WorkoutStore};

use crate::app::AppContext;
use crate::cli::{ListArgs, WorkoutCommand};
use crate::helpers::{confirm_delete, parse_id, read_payload};
use crate::output::{exercise_name_map, print_json, print_workout, print_workout_list};

pub fn handle(ctx: &AppContext, command: &WorkoutCommand) -> anyhow::Result<()> {
    match command {
        WorkoutCommand::Create(payload) => {
            let request: WorkoutRequest = read_payload(&payload.file)?;
            let user = ctx.user_id()?;
            let detail = ctx.open_store()?.create_workout(&user, &request)?;
            report_saved(ctx, &detail, payload.json)
        }
        WorkoutCommand::List(args) => handle_list(ctx, args),
        WorkoutCommand::Show(args) => {
            let id = parse_id(&args.id, "workout")?;
            let user = ctx.user_id()?;
            let store = ctx.open_store()?;
            let detail = store.get_workout(&user, &id)?;
            if args.json {
                print_json(&detail)
            } else {
                print_workout(&detail, &exercise_name_map(&store)?, ctx.quiet());
                Ok(())
            }
        }
        WorkoutCommand::Update { id, payload } => {
            let id = parse_id(id, "workout")?;
            let request: WorkoutRequest = read_payload(&payload.file)?;
            let user = ctx.user_id()?;
            let detail = ctx.open_store()?.update_workout(&user, &id, &request)?;
            report_saved(ctx, &detail, payload.json)
        }
        WorkoutCommand::Delete(args) => {
            let id = parse_id(&args.id, "workout")?;
            let user = ctx.user_id()?;
            let store = ctx.open_store()?;
            // Resolve first so a missing workout fails before the prompt.
            let detail = store.get_workout(&user, &id)?;
            if !confirm_delete(&format!("workout '{}'", detail.workout.name), args.force)? {
                if !ctx.quiet() {
                    println!("status=cancelled");
                }
                return Ok(());
            }
            store.delete_workout(&user, &id)?;
            if !ctx.quiet() {
                println!("status=ok");
                println!("deleted={}", id);
            }
            Ok(())
        }
    }
}

fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let user = ctx.user_id()?;
    let limit = match args.limit {
        Some(limit) => limit,
        None => ctx.page_size()?,
    };
    let page = ctx
        .open_store()?
        .list_workouts(&user, PageRequest::new(args.page, limit))?;
    if args.json {
        print_json(&page)
    } else {
        print_workout_list(&page, ctx.quiet());
        Ok(())
    }
}

fn report_saved(ctx: &AppContext, detail: &WorkoutDetail, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(detail);
    }
    if ctx.quiet() {
        println!("{}", detail.workout.id);
    } else {
        println!("status=ok");
        println!("workout_id={}", detail.workout.id);
        println!("name={}", detail.workout.name);
        println!("exercises={}", detail.exercises.len());
    }
    Ok(())
}
