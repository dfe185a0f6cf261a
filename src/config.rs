//! Persisted application state.
//!
//! The connected spreadsheet id is the only state that survives between
//! runs. Stored as a plain JSON object on disk:
//! ```json
//! { "sheet_id": "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms" }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STATE_FILE: &str = "edustats.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub sheet_id: String,
}

impl AppConfig {
    /// Loads the config from a JSON file at `path`. A missing file yields
    /// the default (no connected spreadsheet).
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state file '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("state file '{path}' is not valid JSON"))?;
        Ok(config)
    }

    /// Writes the config back to `path`.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write state file '{path}'"))?;
        Ok(())
    }

    /// Removes the persisted state, disconnecting the spreadsheet.
    pub fn clear(path: &str) -> Result<()> {
        if Path::new(path).exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove state file '{path}'"))?;
        }
        Ok(())
    }
}
