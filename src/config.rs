use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::driver::SpinTiming;

const CONFIG_FILE: &str = "wheel_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub spin_duration_ms: u64,
    pub ad_delay_ms: u64,
    /// Discord rate-limits message edits, so frames are sent well below
    /// display refresh rates.
    pub frame_interval_ms: u64,
    pub ad_url: String,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            spin_duration_ms: 6000,
            ad_delay_ms: 1500,
            frame_interval_ms: 1000,
            ad_url: "https://example.com/sponsor".to_string(),
        }
    }
}

impl WheelConfig {
    /// Path from `WHEEL_CONFIG`, or the default file in the working directory.
    pub fn path() -> PathBuf {
        std::env::var("WHEEL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::path()).await
    }

    /// Reads the config, falling back to defaults when the file is missing.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(WheelConfig::default());
        }
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn timing(&self) -> SpinTiming {
        SpinTiming {
            spin_duration: Duration::from_millis(self.spin_duration_ms),
            ad_delay: Duration::from_millis(self.ad_delay_ms),
            // A zero period would make the frame loop panic.
            frame_interval: Duration::from_millis(self.frame_interval_ms.max(1)),
        }
    }
}
