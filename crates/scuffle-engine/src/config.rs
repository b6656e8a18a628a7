//! Driver configuration.
//!
//! Provides the tick rate, run length, player respawn countdown, arena
//! tuning and the starting roster. Configuration can be loaded from and
//! saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

use scuffle_gameplay::{ActorConfig, ActorKind, ArenaConfig};

/// Configuration file name.
pub const CONFIG_FILE: &str = "scuffle.toml";

/// One actor placed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Actor kind
    pub kind: ActorKind,
    /// Spawn anchor (x, y, z)
    pub position: [f32; 3],
    /// Overrides the kind's default configuration
    #[serde(default)]
    pub config: Option<ActorConfig>,
}

impl SpawnEntry {
    /// Creates an entry with the kind's default configuration.
    #[must_use]
    pub const fn new(kind: ActorKind, position: [f32; 3]) -> Self {
        Self {
            kind,
            position,
            config: None,
        }
    }

    /// Effective actor configuration.
    #[must_use]
    pub fn actor_config(&self) -> ActorConfig {
        self.config
            .clone()
            .unwrap_or_else(|| ActorConfig::for_kind(self.kind))
    }
}

/// Driver configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Simulation ===
    /// Ticks per simulated second
    pub tick_rate: u32,
    /// Simulated run length in seconds
    pub duration_secs: f32,

    // === Player ===
    /// Countdown before a dead player is respawned (seconds)
    pub player_respawn_delay: f32,
    /// Let the built-in autopilot fight for the player
    pub autopilot: bool,

    // === Logging ===
    /// Log every notification at debug level
    pub log_notifications: bool,

    // === Arena ===
    /// Physics and knockback tuning
    pub arena: ArenaConfig,
    /// Starting actors
    pub roster: Vec<SpawnEntry>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            duration_secs: 30.0,

            player_respawn_delay: 5.0,
            autopilot: true,

            log_notifications: false,

            arena: ArenaConfig::default(),
            roster: vec![
                SpawnEntry::new(ActorKind::Player, [0.0, 0.0, 0.0]),
                SpawnEntry::new(ActorKind::StationaryEnemy, [3.0, 0.0, 0.0]),
                SpawnEntry::new(ActorKind::ChasingEnemy, [-8.0, 0.0, 4.0]),
            ],
        }
    }
}

impl SimConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(10, 240);
        if !self.duration_secs.is_finite() {
            self.duration_secs = 0.0;
        }
        self.duration_secs = self.duration_secs.clamp(0.0, 3600.0);

        if !self.player_respawn_delay.is_finite() {
            self.player_respawn_delay = 0.0;
        }
        self.player_respawn_delay = self.player_respawn_delay.clamp(0.0, 60.0);

        self.arena.policy.validate();

        let before = self.roster.len();
        self.roster.retain(|entry| {
            if !entry.position.iter().all(|c| c.is_finite()) {
                warn!(kind = ?entry.kind, "Dropped roster entry with non-finite position");
                return false;
            }
            if let Err(e) = entry.actor_config().check() {
                warn!(kind = ?entry.kind, "Dropped roster entry: {e}");
                return false;
            }
            true
        });
        if self.roster.len() != before {
            warn!(dropped = before - self.roster.len(), "Roster entries dropped");
        }
    }

    /// Fixed timestep in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Number of ticks in the run.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        (self.duration_secs * self.tick_rate as f32).round() as u64
    }
}
