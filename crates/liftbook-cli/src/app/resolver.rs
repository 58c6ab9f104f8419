//! Path and identity resolution for config, database and user.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::cli::Cli;
use crate::config::{default_config_path, default_db_path, LiftbookConfig};
use crate::errors::CliError;

/// Resolve the config file path, checking LIFTBOOK_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("LIFTBOOK_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the database path: `--db` / LIFTBOOK_DB, then config, then the XDG default.
pub fn resolve_db_path(cli: &Cli, config: Option<&LiftbookConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.db.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(config) = config {
        return Ok(PathBuf::from(&config.database.path));
    }
    default_db_path()
}

/// Resolve the acting user: `--user` / LIFTBOOK_USER, then config.
pub fn resolve_user_id(
    cli: &Cli,
    config: Option<&LiftbookConfig>,
    config_path: &Path,
) -> anyhow::Result<Uuid> {
    let raw = cli
        .user
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| config.and_then(|c| c.user.id.as_deref()));
    let Some(raw) = raw else {
        return Err(CliError::not_found(
            "No user configured",
            missing_config_message(config_path),
        )
        .into());
    };
    Uuid::parse_str(raw.trim())
        .map_err(|e| CliError::invalid_input(format!("Invalid user ID '{}': {}", raw, e)).into())
}

/// Hint shown when no config file exists yet.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No config found at {}\n\nRun:\n  liftbook init\n\nOr pass a user explicitly:\n  LIFTBOOK_USER=<uuid> liftbook ...",
        config_path.display()
    )
}
