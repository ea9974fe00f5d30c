//! Configuration - JSON file under ~/.config/order-notify, CLI overrides
//!
//! Missing file means defaults; a corrupt file is an error at startup
//! (unlike the cursor, config has no safe fallback for a half-read).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Country code prefixed to local phone numbers.
    pub country_code: String,
    /// WhatsApp gateway send endpoint; console output when unset.
    pub gateway_url: Option<String>,
    /// Bearer token for the gateway.
    pub gateway_token: Option<String>,
    /// Cursor file location; defaults next to the config.
    pub cursor_path: Option<PathBuf>,
    /// Upper bound on a single send, seconds.
    pub send_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            country_code: "91".to_string(),
            gateway_url: None,
            gateway_token: None,
            cursor_path: None,
            send_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("order-notify")
            .join("config.json")
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}
