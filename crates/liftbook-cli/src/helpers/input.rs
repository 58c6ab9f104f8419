//! Reading request payloads and confirming destructive commands.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use dialoguer::Confirm;
use serde::de::DeserializeOwned;

use crate::errors::CliError;

/// Read a JSON payload from a file, or from stdin when `source` is `-`.
pub fn read_payload<T: DeserializeOwned>(source: &str) -> anyhow::Result<T> {
    let contents = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        buffer
    } else {
        let path = Path::new(source);
        std::fs::read_to_string(path).map_err(|e| {
            CliError::invalid_input(format!("Failed to read {}: {}", path.display(), e))
        })?
    };
    if contents.trim().is_empty() {
        return Err(CliError::invalid_input("Payload is empty").into());
    }
    serde_json::from_str(&contents)
        .map_err(|e| CliError::invalid_input(format!("Invalid JSON payload: {}", e)).into())
}

/// Ask before deleting. Returns `Ok(false)` when the user declines.
pub fn confirm_delete(what: &str, force: bool) -> anyhow::Result<bool> {
    if force {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "Refusing to delete {} without confirmation; pass --force",
            what
        ))
        .into());
    }
    Ok(Confirm::new()
        .with_prompt(format!("Delete {}?", what))
        .default(false)
        .interact()?)
}
