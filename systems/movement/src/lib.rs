#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks agents toward destinations.
//!
//! Agents follow the chain of next hops captured when they spawned. The
//! system never mutates the world; it only proposes reclamation commands for
//! agents that reached the end of their route.

mod motion;

use std::collections::BTreeMap;

use glam::Vec2;
use tile_defence_core::{AgentId, Command, Event};
use tile_defence_world::query::FlowFieldView;
use tracing::trace;

pub use crate::motion::{AgentMotion, MotionStatus};

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    agent_speed: f32,
}

impl Config {
    /// Creates a configuration with the provided speed in cells per second.
    ///
    /// Negative or non-finite speeds are treated as zero.
    #[must_use]
    pub fn new(agent_speed: f32) -> Self {
        let agent_speed = if agent_speed.is_finite() {
            agent_speed.max(0.0)
        } else {
            0.0
        };
        Self { agent_speed }
    }

    /// Speed in cells per second.
    #[must_use]
    pub fn agent_speed(&self) -> f32 {
        self.agent_speed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { agent_speed: 1.0 }
    }
}

/// Pure system that reacts to world events and emits reclamation commands.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
    motions: BTreeMap<AgentId, AgentMotion>,
}

impl Movement {
    /// Creates a movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            motions: BTreeMap::new(),
        }
    }

    /// Consumes world events and the current flow field to emit commands.
    ///
    /// Spawned agents snapshot their route from `field`. Each
    /// [`Event::TimeAdvanced`] moves every agent in ascending identifier
    /// order, and every arrival yields exactly one [`Command::ReclaimAgent`].
    pub fn handle(&mut self, events: &[Event], field: FlowFieldView<'_>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::AgentSpawned { agent, cell } => {
                    let motion = AgentMotion::spawn(&field, *cell);
                    trace!(%agent, %cell, "agent started moving");
                    let previous = self.motions.insert(*agent, motion);
                    debug_assert!(previous.is_none(), "agent {agent} spawned twice");
                }
                Event::TimeAdvanced { dt } => {
                    let delta = dt.as_secs_f32() * self.config.agent_speed;
                    self.advance(delta, out);
                }
                _ => {}
            }
        }
    }

    fn advance(&mut self, delta: f32, out: &mut Vec<Command>) {
        let mut arrived = Vec::new();
        for (agent, motion) in &mut self.motions {
            match motion.advance(delta) {
                MotionStatus::Traveling => trace!(
                    %agent,
                    from = %motion.from(),
                    to = %motion.to(),
                    progress = motion.progress(),
                    "agent moved"
                ),
                MotionStatus::Arrived => arrived.push(*agent),
            }
        }

        for agent in arrived {
            let _ = self.motions.remove(&agent);
            trace!(%agent, "agent reached its destination");
            out.push(Command::ReclaimAgent { agent });
        }
    }

    /// Motion state of an agent that is still walking.
    #[must_use]
    pub fn motion(&self, agent: AgentId) -> Option<&AgentMotion> {
        self.motions.get(&agent)
    }

    /// Positions of every walking agent in ascending identifier order.
    #[must_use]
    pub fn agent_positions(&self) -> Vec<(AgentId, Vec2)> {
        self.motions
            .iter()
            .map(|(agent, motion)| (*agent, motion.position()))
            .collect()
    }

    /// Number of agents still walking.
    #[must_use]
    pub fn active_agents(&self) -> usize {
        self.motions.len()
    }
}
