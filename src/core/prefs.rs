//! Persisted user preferences

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::utils::fs as fs_utils;

/// Mining preferences remembered between runs. A missing file is not an
/// error; defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prefs {
    pub miner_type: String,
    pub bitcoin_pool: String,
}

impl Default for Prefs {
    fn default() -> Self {
        Prefs {
            miner_type: "CPU Mining".to_string(),
            bitcoin_pool: "CKPool".to_string(),
        }
    }
}

impl Prefs {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Prefs::default());
        }
        let content = std::fs::read_to_string(path)?;
        let prefs: Prefs = serde_json::from_str(&content)?;
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_utils::ensure_dir_exists(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Preferences saved to {path:?}");
        Ok(())
    }
}
