use liftbook_core::WorkoutStore;

use crate::app::AppContext;
use crate::cli::ExerciseCommand;
use crate::helpers::resolve_exercise;
use crate::output::{print_exercises, print_json};

pub fn handle(ctx: &AppContext, command: &ExerciseCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    match command {
        ExerciseCommand::Add { name } => {
            let exercise = store.create_exercise(name)?;
            if ctx.quiet() {
                println!("{}", exercise.id);
            } else {
                println!("status=ok");
                println!("exercise_id={}", exercise.id);
                println!("name={}", exercise.name);
            }
        }
        ExerciseCommand::List { json } => {
            let exercises = store.list_exercises()?;
            if *json {
                print_json(&exercises)?;
            } else {
                print_exercises(&exercises, ctx.quiet());
            }
        }
        ExerciseCommand::Retire { exercise } => {
            let exercise = resolve_exercise(&store, exercise)?;
            store.retire_exercise(&exercise.id)?;
            if !ctx.quiet() {
                println!("status=ok");
                println!("retired={}", exercise.name);
            }
        }
    }
    Ok(())
}
