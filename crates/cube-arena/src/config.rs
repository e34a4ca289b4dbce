//! Arena settings loaded from `arena.toml`.
//!
//! Every field is optional. A missing file yields the defaults, and
//! command-line flags override whatever the file says.
//!
//! ```toml
//! engine_path = "./tttt"
//! output_dir = "./tournament_results"
//!
//! [limits]
//! move_timeout_secs = 30
//! help_timeout_secs = 10
//! game_timeout_secs = 300
//! max_half_moves = 100
//!
//! [tournament]
//! iterations = 100
//! randomization = false
//! output_formats = ["json", "csv", "text"]
//! concurrent_matchups = 1
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::engine_client::EngineTimeouts;
use crate::game_runner::GameLimits;
use crate::manager::SchedulingPolicy;
use crate::tournament_config::{OutputFormat, DEFAULT_ITERATIONS};

/// Errors that can occur when loading `arena.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Time and length limits for engine calls and games.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    pub move_timeout_secs: u64,
    pub help_timeout_secs: u64,
    pub game_timeout_secs: u64,
    pub max_half_moves: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            move_timeout_secs: 30,
            help_timeout_secs: 10,
            game_timeout_secs: 300,
            max_half_moves: 100,
        }
    }
}

/// Defaults for tournament parameters not given on the command line.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TournamentDefaults {
    pub iterations: u32,
    pub randomization: bool,
    /// Checked when the tournament is configured.
    pub output_formats: Vec<String>,
    /// Matchups played at once. 1 plays strictly one game at a time.
    pub concurrent_matchups: usize,
}

impl Default for TournamentDefaults {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            randomization: false,
            output_formats: OutputFormat::ALL
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
            concurrent_matchups: 1,
        }
    }
}

/// Settings file read when none is named on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "arena.toml";

/// Main arena configuration structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ArenaConfig {
    /// Engine executable. Defaults to `./tttt`.
    pub engine_path: PathBuf,
    /// Where reports are written. Defaults to `./tournament_results`.
    pub output_dir: PathBuf,
    pub limits: LimitsConfig,
    pub tournament: TournamentDefaults,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("./tttt"),
            output_dir: PathBuf::from("./tournament_results"),
            limits: LimitsConfig::default(),
            tournament: TournamentDefaults::default(),
        }
    }
}

impl ArenaConfig {
    /// Loads the given settings file, or the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn engine_timeouts(&self) -> EngineTimeouts {
        EngineTimeouts {
            help: Duration::from_secs(self.limits.help_timeout_secs),
            per_move: Duration::from_secs(self.limits.move_timeout_secs),
        }
    }

    pub fn game_limits(&self) -> GameLimits {
        GameLimits {
            max_half_moves: self.limits.max_half_moves,
            max_duration: Duration::from_secs(self.limits.game_timeout_secs),
        }
    }

    pub fn scheduling_policy(&self) -> SchedulingPolicy {
        match self.tournament.concurrent_matchups {
            0 | 1 => SchedulingPolicy::Sequential,
            n => SchedulingPolicy::Concurrent { max_matchups: n },
        }
    }

    /// The configured output formats joined as `"json,csv,text"`.
    pub fn output_format_list(&self) -> String {
        self.tournament.output_formats.join(",")
    }
}
