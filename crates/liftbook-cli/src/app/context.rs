//! Application context for the Liftbook CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::path::PathBuf;
use std::time::Duration;

use once_cell::unsync::OnceCell;
use uuid::Uuid;

use liftbook_core::{SqliteOptions, SqliteStore};

use crate::cli::Cli;
use crate::config::{read_config, LiftbookConfig};
use crate::constants::DEFAULT_PAGE_SIZE;

use super::resolver::{resolve_config_path, resolve_db_path, resolve_user_id};

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<LiftbookConfig>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file contents, or `None` when no config file exists.
    pub fn config(&self) -> anyhow::Result<Option<&LiftbookConfig>> {
        let config = self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if path.exists() {
                read_config(&path).map(Some)
            } else {
                Ok(None)
            }
        })?;
        Ok(config.as_ref())
    }

    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        resolve_db_path(self.cli, self.config()?)
    }

    /// The user every operation acts as.
    pub fn user_id(&self) -> anyhow::Result<Uuid> {
        resolve_user_id(self.cli, self.config()?, &resolve_config_path()?)
    }

    /// List page size: config `[output] page_size`, else the built-in default.
    pub fn page_size(&self) -> anyhow::Result<u32> {
        Ok(self
            .config()?
            .map(|c| c.output.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// Open the database, creating it and its parent directory if needed.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.db_path()?;
        let mut options = SqliteOptions::default();
        if let Some(config) = self.config()? {
            options = options
                .with_busy_timeout(Duration::from_millis(config.database.busy_timeout_ms));
        }
        log::debug!("opening database at {}", path.display());
        Ok(SqliteStore::open_with(&path, options)?)
    }
}
