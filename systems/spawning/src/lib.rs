#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting agent spawn commands.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_defence_core::{CellCoord, Command, Event};
use tracing::{debug, warn};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_speed: f32,
    rng_seed: u64,
}

impl Config {
    /// Fewest spawns per second the system accepts.
    pub const MIN_SPAWN_SPEED: f32 = 0.1;
    /// Most spawns per second the system accepts.
    pub const MAX_SPAWN_SPEED: f32 = 10.0;

    /// Creates a configuration with a spawn rate in spawns per second.
    ///
    /// Rates outside [`Self::MIN_SPAWN_SPEED`]..=[`Self::MAX_SPAWN_SPEED`] are
    /// clamped into range.
    #[must_use]
    pub fn new(spawn_speed: f32, rng_seed: u64) -> Self {
        let clamped = if spawn_speed.is_nan() {
            Self::MIN_SPAWN_SPEED
        } else {
            spawn_speed.clamp(Self::MIN_SPAWN_SPEED, Self::MAX_SPAWN_SPEED)
        };
        if clamped != spawn_speed {
            warn!(requested = spawn_speed, spawn_speed = clamped, "spawn speed clamped");
        }

        Self {
            spawn_speed: clamped,
            rng_seed,
        }
    }

    /// Spawns per second.
    #[must_use]
    pub fn spawn_speed(&self) -> f32 {
        self.spawn_speed
    }

    /// Time between two consecutive spawns, rounded to whole nanoseconds.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        let nanos = (1e9 / f64::from(self.spawn_speed)).round();
        Duration::from_nanos(nanos as u64)
    }

    /// Seed of the spawner selection stream.
    #[must_use]
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Pure system that deterministically emits spawn commands as time passes.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval(),
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the current spawn points to emit spawn commands.
    ///
    /// Every whole spawn interval of accumulated time produces one
    /// [`Command::SpawnAgent`] naming a spawn point picked uniformly at random.
    /// Intervals that elapse while no spawn point exists are dropped.
    pub fn handle(&mut self, events: &[Event], spawners: &[CellCoord], out: &mut Vec<Command>) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let due = self.drain_whole_intervals();
        if due == 0 {
            return;
        }
        if spawners.is_empty() {
            debug!(skipped = due, "spawns skipped: no spawn points");
            return;
        }

        for _ in 0..due {
            let spawner = spawners[self.rng.gen_range(0..spawners.len())];
            out.push(Command::SpawnAgent { spawner });
        }
    }

    /// Removes every whole interval from the accumulator in one step.
    fn drain_whole_intervals(&mut self) -> u128 {
        let interval = self.spawn_interval.as_nanos().max(1);
        let accumulated = self.accumulator.as_nanos();
        let remainder = u64::try_from(accumulated % interval).unwrap_or(u64::MAX);
        self.accumulator = Duration::from_nanos(remainder);
        accumulated / interval
    }

    /// Time accumulated towards the next spawn.
    #[must_use]
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }
}
