use liftbook_core::WorkoutStore;

use crate::app::AppContext;
use crate::errors::CliError;

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    match store.check_integrity() {
        Ok(()) => {
            if !ctx.quiet() {
                println!("Integrity check: OK");
                println!("- foreign keys: OK");
                println!("- template entries: OK");
                println!("- session sets: OK");
                println!("- exercise instances: OK");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Integrity check: FAILED");
            eprintln!("- error: {}", err);
            Err(CliError::IntegrityFailed(
                "Integrity check failed\nHint: Restore from a backup of the database file.".into(),
            )
            .into())
        }
    }
}
