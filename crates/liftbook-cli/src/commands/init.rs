use uuid::Uuid;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_db_path, write_config, LiftbookConfig};
use crate::errors::CliError;
use crate::helpers::parse_id;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let cli = ctx.cli();
    let db_path = match cli.db.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(path) => path.into(),
        None => default_db_path()?,
    };
    let user_id = match cli.user.as_deref() {
        Some(raw) => parse_id(raw, "user")?,
        None => Uuid::new_v4(),
    };

    let config = LiftbookConfig::new(db_path.clone(), user_id.to_string());
    write_config(&config_path, &config)?;
    liftbook_core::SqliteStore::open(&db_path)?;
    log::info!("initialized config at {}", config_path.display());

    if !ctx.quiet() {
        println!("status=ok");
        println!("config={}", config_path.display());
        println!("database={}", db_path.display());
        println!("user_id={}", user_id);
    }
    Ok(())
}
