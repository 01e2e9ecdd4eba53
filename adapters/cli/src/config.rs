//! Simulation settings loaded from TOML and overridden from the command line.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tile_defence_core::BoardSize;
use tracing::warn;

/// Seed used when neither the file nor the command line provides one.
pub(crate) const DEFAULT_SEED: u64 = 0x7469_6c65_6465_6673;

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("could not read configuration file {path}")]
    Read {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the expected schema.
    #[error("could not parse configuration")]
    Parse(#[from] toml::de::Error),
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    pub(crate) board: BoardSection,
    pub(crate) spawning: SpawningSection,
    pub(crate) movement: MovementSection,
    pub(crate) simulation: RunSection,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BoardSection {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
}

impl Default for BoardSection {
    fn default() -> Self {
        let size = BoardSize::default();
        Self {
            columns: size.columns(),
            rows: size.rows(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpawningSection {
    /// Spawns per second.
    pub(crate) speed: f32,
    pub(crate) seed: u64,
}

impl Default for SpawningSection {
    fn default() -> Self {
        Self {
            speed: 1.0,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MovementSection {
    /// Cells per second.
    pub(crate) agent_speed: f32,
}

impl Default for MovementSection {
    fn default() -> Self {
        Self { agent_speed: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunSection {
    pub(crate) ticks: u32,
    pub(crate) tick_millis: u64,
    pub(crate) show_paths: bool,
    pub(crate) show_grid: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            ticks: 60,
            tick_millis: 100,
            show_paths: true,
            show_grid: true,
        }
    }
}

impl SimulationConfig {
    /// Longest simulated step accepted for a single tick.
    pub(crate) const MAX_TICK_MILLIS: u64 = 60_000;

    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Brings out-of-range values back into their accepted ranges.
    #[must_use]
    pub(crate) fn validated(mut self) -> Self {
        let size = self.board_size();
        let clamped = size.clamped();
        if clamped != size {
            warn!(
                columns = clamped.columns(),
                rows = clamped.rows(),
                "board dimensions raised to the minimum"
            );
            self.board.columns = clamped.columns();
            self.board.rows = clamped.rows();
        }

        if self.simulation.tick_millis == 0 {
            warn!("tick_millis must be positive; using 1");
            self.simulation.tick_millis = 1;
        } else if self.simulation.tick_millis > Self::MAX_TICK_MILLIS {
            warn!(
                requested = self.simulation.tick_millis,
                tick_millis = Self::MAX_TICK_MILLIS,
                "tick_millis lowered to the maximum"
            );
            self.simulation.tick_millis = Self::MAX_TICK_MILLIS;
        }

        if !(self.movement.agent_speed.is_finite() && self.movement.agent_speed >= 0.0) {
            warn!(
                agent_speed = self.movement.agent_speed,
                "agent speed must be a non-negative number; using 0"
            );
            self.movement.agent_speed = 0.0;
        }

        // Spawn speed limits are owned by the spawning system, which clamps
        // and reports on construction.
        self
    }

    pub(crate) fn board_size(&self) -> BoardSize {
        BoardSize::new(self.board.columns, self.board.rows)
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_millis)
    }
}
