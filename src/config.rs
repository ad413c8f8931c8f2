//! Game configuration
//!
//! Where sessions live, how many are retained, and how generous the
//! investigation allowance is.

use crate::game::scenario::Difficulty;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the session directory
pub const SESSIONS_DIR_ENV: &str = "INCIDENTER_SESSIONS_DIR";

/// Runtime configuration for a game process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Directory holding one JSON record per session
    pub sessions_dir: PathBuf,

    /// Retention bound: only this many most recently modified sessions survive
    pub max_sessions: usize,

    /// Phase label new sessions start in
    pub initial_phase: String,

    /// Player name used when none is supplied
    pub default_player_name: String,

    /// Number of players sharing the session
    pub team_size: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sessions_dir: default_sessions_dir(),
            max_sessions: 10,
            initial_phase: "Initial Access".to_string(),
            default_player_name: "Player".to_string(),
            team_size: 1,
        }
    }
}

impl GameConfig {
    /// Config with every default but the session directory
    pub fn with_sessions_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Load a YAML config file; missing keys take their defaults
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, with the session directory taken from the environment if set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(SESSIONS_DIR_ENV) {
            config.sessions_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.max_sessions == 0 {
            bail!("max_sessions must be at least 1");
        }
        if self.team_size == 0 {
            bail!("team_size must be at least 1");
        }
        Ok(())
    }

    /// How many investigation actions a team gets for a scenario
    pub fn max_investigations(&self, difficulty: Difficulty) -> u32 {
        let base = match difficulty {
            Difficulty::Beginner => 30.0,
            Difficulty::Intermediate => 25.0,
            Difficulty::Advanced => 20.0,
            Difficulty::Expert => 10.0,
        };
        let team_multiplier = (1.0 + (self.team_size.max(1) - 1) as f64 * 0.1).min(1.5);
        (base * team_multiplier) as u32
    }
}

fn default_sessions_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".incidenter")
        .join("sessions")
}
