use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize)]
pub struct LiftbookConfig {
    pub database: DatabaseSection,
    #[serde(default)]
    pub user: UserSection,
    #[serde(default)]
    pub log: LogSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UserSection {
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LogSection {
    pub level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl LiftbookConfig {
    pub fn new(db_path: PathBuf, user_id: String) -> Self {
        Self {
            database: DatabaseSection {
                path: db_path.to_string_lossy().to_string(),
                busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            },
            user: UserSection { id: Some(user_id) },
            log: LogSection::default(),
            output: OutputSection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("liftbook.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<LiftbookConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &LiftbookConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("liftbook"));
        }
    }
    Ok(home_dir()?.join(".config").join("liftbook"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("liftbook"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("liftbook"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: LiftbookConfig =
            toml::from_str("[database]\npath = \"/tmp/liftbook.db\"\n").expect("parse");
        assert_eq!(config.database.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert_eq!(config.output.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.user.id.is_none());
        assert!(config.log.level.is_none());
    }

    #[test]
    fn test_config_round_trips_through_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let config = LiftbookConfig::new(PathBuf::from("/data/liftbook.db"), "abc".to_string());

        write_config(&path, &config).expect("write");
        let read = read_config(&path).expect("read");
        assert_eq!(read.database.path, "/data/liftbook.db");
        assert_eq!(read.user.id.as_deref(), Some("abc"));
    }
}
