use crate::player::EngineConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::warn;

/// Every interval and pool size the player runs on. Loaded from an optional
/// toml file; anything absent falls back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Worker pool size for bulk local imports.
    pub bulk_concurrency: usize,
    /// Seconds between queue-health checks while random mode is active.
    pub health_check_secs: u64,
    pub sample_rate: u32,
    pub frames_per_read: usize,
    /// Grace period before a stuck playback worker is abandoned.
    pub stop_grace_secs: u64,
    pub pause_poll_ms: u64,
    /// Where remote modules are materialized. Defaults to a per-user cache
    /// directory.
    pub download_dir: Option<PathBuf>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        PlayerSettings {
            bulk_concurrency: 10,
            health_check_secs: 10,
            sample_rate: 44_100,
            frames_per_read: 4_096,
            stop_grace_secs: 5,
            pause_poll_ms: 100,
            download_dir: None,
        }
    }
}

impl PlayerSettings {
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), "malformed settings file, using defaults: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("modplay").join("settings.toml"))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("modplay")
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sample_rate: self.sample_rate,
            frames_per_read: self.frames_per_read,
            pause_poll: Duration::from_millis(self.pause_poll_ms),
        }
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_secs.max(1))
    }
}
