use liftbook_core::{FinishSession, PageRequest, SessionRequest, WorkoutLogDetail, WorkoutStore};

use crate::app::AppContext;
use crate::cli::{ListArgs, SessionCommand};
use crate::helpers::{confirm_delete, parse_datetime, parse_id, read_payload};
use crate::output::{exercise_name_map, print_json, print_session, print_session_list};

pub fn handle(ctx: &AppContext, command: &SessionCommand) -> anyhow::Result<()> {
    match command {
        SessionCommand::Start { workout_id, json } => {
            let workout_id = parse_id(workout_id, "workout")?;
            let user = ctx.user_id()?;
            let detail = ctx.open_store()?.start_session(&user, &workout_id)?;
            report_saved(ctx, &detail, *json)
        }
        SessionCommand::New { started_at, json } => {
            let started_at = started_at.as_deref().map(parse_datetime).transpose()?;
            let user = ctx.user_id()?;
            let detail = ctx.open_store()?.create_session(&user, started_at)?;
            report_saved(ctx, &detail, *json)
        }
        SessionCommand::List(args) => handle_list(ctx, args),
        SessionCommand::Show(args) => {
            let id = parse_id(&args.id, "session")?;
            let user = ctx.user_id()?;
            let store = ctx.open_store()?;
            let detail = store.get_session(&user, &id)?;
            if args.json {
                print_json(&detail)
            } else {
                print_session(&detail, &exercise_name_map(&store)?, ctx.quiet());
                Ok(())
            }
        }
        SessionCommand::Update { id, payload } => {
            let id = parse_id(id, "session")?;
            let request: SessionRequest = read_payload(&payload.file)?;
            let user = ctx.user_id()?;
            let detail = ctx.open_store()?.update_session(&user, &id, &request)?;
            report_saved(ctx, &detail, payload.json)
        }
        SessionCommand::Finish { id, active, paused } => {
            let id = parse_id(id, "session")?;
            let user = ctx.user_id()?;
            let finish = FinishSession {
                active_duration_secs: *active,
                pause_duration_secs: *paused,
            };
            let log = ctx.open_store()?.finish_session(&user, &id, &finish)?;
            if !ctx.quiet() {
                println!("status=ok");
                println!("session_id={}", log.id);
                if let Some(finished) = log.finished_at {
                    println!("finished_at={}", finished.to_rfc3339());
                }
            }
            Ok(())
        }
        SessionCommand::Delete(args) => {
            let id = parse_id(&args.id, "session")?;
            let user = ctx.user_id()?;
            let store = ctx.open_store()?;
            let detail = store.get_session(&user, &id)?;
            let what = format!("session {} ({} sets)", detail.log.id, detail.sets.len());
            if !confirm_delete(&what, args.force)? {
                if !ctx.quiet() {
                    println!("status=cancelled");
                }
                return Ok(());
            }
            store.delete_session(&user, &id)?;
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
        .list_sessions(&user, PageRequest::new(args.page, limit))?;
    if args.json {
        print_json(&page)
    } else {
        print_session_list(&page, ctx.quiet());
        Ok(())
    }
}

fn report_saved(ctx: &AppContext, detail: &WorkoutLogDetail, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(detail);
    }
    if ctx.quiet() {
        println!("{}", detail.log.id);
    } else {
        println!("status=ok");
        println!("session_id={}", detail.log.id);
        println!("state={}", detail.log.status);
        println!("sets={}", detail.sets.len());
    }
    Ok(())
}
