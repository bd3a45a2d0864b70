use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::EngineError;

/// Board geometry and timing knobs. Defaults match the classic game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Extent of the square play area
    pub board_size: u32,
    /// Footprint of a single target
    pub target_size: u32,
    pub fade_duration_ms: u64,
    pub autoplay_interval_ms: u64,
    pub confirmation_delay_ms: u64,
    pub clock_tick_ms: u64,
    /// Largest count `start` accepts
    pub max_targets: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: 500,
            target_size: 50,
            fade_duration_ms: 3000,
            autoplay_interval_ms: 500,
            confirmation_delay_ms: 3000,
            clock_tick_ms: 100,
            max_targets: 9_999,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.target_size == 0 || self.target_size >= self.board_size {
            return Err(EngineError::InvalidConfig(format!(
                "target_size {} must be in 1..{}",
                self.target_size, self.board_size
            )));
        }
        if self.max_targets == 0 {
            return Err(EngineError::InvalidConfig(
                "max_targets must be non-zero".to_string(),
            ));
        }
        let durations = [
            ("fade_duration_ms", self.fade_duration_ms),
            ("autoplay_interval_ms", self.autoplay_interval_ms),
            ("confirmation_delay_ms", self.confirmation_delay_ms),
            ("clock_tick_ms", self.clock_tick_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(EngineError::InvalidConfig(format!("{name} must be non-zero")));
        }
        Ok(())
    }

    /// Exclusive upper bound for a target's top-left coordinate
    pub fn spawn_extent(&self) -> u32 {
        self.board_size.saturating_sub(self.target_size)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Count pre-filled in the setup prompt
    pub last_count: Option<u32>,
    pub engine: EngineConfig,
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tapseq") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("tapseq_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
