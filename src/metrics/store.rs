//! Persistent player statistics

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_SAVE_FILE: &str = "game_data.json";

/// Statistics carried across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub best_score: u32,
    pub games_played: u32,
    /// Seconds spent in finished rounds
    pub total_time: u64,
}

impl GameStats {
    pub fn record_round(&mut self, score: u32, seconds: u64) {
        self.games_played += 1;
        self.best_score = self.best_score.max(score);
        self.total_time += seconds;
    }
}

/// JSON file holding [`GameStats`]
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stats file. A missing or unreadable file yields defaults.
    pub fn load(&self) -> GameStats {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stats file yet");
                return GameStats::default();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read stats, using defaults"
                );
                return GameStats::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "corrupt stats file, using defaults"
                );
                GameStats::default()
            }
        }
    }

    /// Overwrite the stats file
    pub fn save(&self, stats: &GameStats) -> Result<()> {
        let json = serde_json::to_string_pretty(stats).context("Failed to serialize stats")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write stats to {:?}", self.path))?;
        Ok(())
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_FILE)
    }
}
