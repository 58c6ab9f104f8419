use liftbook_core::{NewSet, WorkoutStore};

use crate::app::AppContext;
use crate::cli::{SetCommand, SetLogArgs};
use crate::helpers::{parse_id, resolve_exercise};
use crate::output::print_json;

pub fn handle(ctx: &AppContext, command: &SetCommand) -> anyhow::Result<()> {
    match command {
        SetCommand::Log(args) => handle_log(ctx, args),
        SetCommand::Delete { id } => {
            let id = parse_id(id, "set")?;
            let user = ctx.user_id()?;
            ctx.open_store()?.delete_set(&user, &id)?;
            if !ctx.quiet() {
                println!("status=ok");
                println!("deleted={}", id);
            }
            Ok(())
        }
    }
}

fn handle_log(ctx: &AppContext, args: &SetLogArgs) -> anyhow::Result<()> {
    let session_id = parse_id(&args.session_id, "session")?;
    let user = ctx.user_id()?;
    let store = ctx.open_store()?;
    let exercise = resolve_exercise(&store, &args.exercise)?;

    let mut set = NewSet::new(exercise.id);
    if let Some(instance) = &args.instance {
        set = set.in_instance(parse_id(instance, "instance")?);
    }
    if let Some(weight) = args.weight {
        set = set.with_weight(weight);
    }
    if let Some(reps) = args.reps {
        set = set.with_reps(reps);
    }
    if let Some(number) = args.number {
        set = set.with_set_number(number);
    }

    let logged = store.log_set(&user, &session_id, &set)?;
    if args.json {
        return print_json(&logged);
    }
    if ctx.quiet() {
        println!("{}", logged.id);
    } else {
        println!("status=ok");
        println!("set_id={}", logged.id);
        println!("exercise={}", exercise.name);
        println!("instance_id={}", logged.exercise_instance_id);
        println!("set_number={}", logged.set_number);
    }
    Ok(())
}
