use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeylayerConfig {
    /// Where to write logs. The terminal UI owns stdout, so without this
    /// (or KEYLAYER_LOG_FILE) nothing is logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// trace, debug, info, warn or error
    pub log_level: String,

    /// Initial value of the "keep playing after winning" preference
    pub continue_past_win: bool,

    /// Hotkeys shown per row in the info panel
    pub panel_columns: usize,
}

impl Default for KeylayerConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: "info".to_string(),
            continue_past_win: false,
            panel_columns: 2,
        }
    }
}

impl KeylayerConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: KeylayerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }
}
