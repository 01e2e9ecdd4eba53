//! Headless game loop wiring the world to its systems.

use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec3;
use tile_defence_core::{BoardLayout, CellCoord, Command, Event};
use tile_defence_rendering::{AgentPresentation, RenderingBackend, Scene};
use tile_defence_system_movement::{self as movement, Movement};
use tile_defence_system_spawning::{self as spawning, Spawning};
use tile_defence_world::{self as world, query, World};
use tracing::{debug, info, warn};

use crate::{
    config::SimulationConfig,
    script::ScriptStep,
};

/// Height of the virtual camera used to resolve `pick` steps.
const PICK_HEIGHT: f32 = 10.0;

/// Totals reported when a session finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionStats {
    pub(crate) ticks: u64,
    pub(crate) spawned: usize,
    pub(crate) arrived: usize,
    pub(crate) rejected_edits: usize,
}

/// World plus the systems reacting to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    movement: Movement,
    spawning: Spawning,
    tick: Duration,
    stats: SessionStats,
}

impl Session {
    /// Builds a session on a fresh board, or on `layout` when one is given.
    pub(crate) fn new(config: &SimulationConfig, layout: Option<&BoardLayout>) -> Result<Self> {
        let world = match layout {
            Some(layout) => World::from_layout(layout).context("layout cannot be loaded")?,
            None => World::new(config.board_size()),
        };

        let mut session = Self {
            world,
            movement: Movement::new(movement::Config::new(config.movement.agent_speed)),
            spawning: Spawning::new(spawning::Config::new(
                config.spawning.speed,
                config.spawning.seed,
            )),
            tick: config.tick(),
            stats: SessionStats::default(),
        };
        session.submit(Command::SetPathVisibility {
            visible: config.simulation.show_paths,
        });
        session.submit(Command::SetGridVisibility {
            visible: config.simulation.show_grid,
        });
        Ok(session)
    }

    /// Runs `ticks` simulation steps.
    pub(crate) fn run(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.submit(Command::Tick { dt: self.tick });
        }
    }

    /// Executes one script step, presenting a frame for `show`.
    pub(crate) fn execute(
        &mut self,
        step: ScriptStep,
        backend: &mut dyn RenderingBackend,
    ) -> Result<()> {
        match step {
            ScriptStep::ToggleDestination(cell) => self.submit(Command::ToggleDestination { cell }),
            ScriptStep::ToggleWall(cell) => self.submit(Command::ToggleWall { cell }),
            ScriptStep::ToggleSpawnPoint(cell) => self.submit(Command::ToggleSpawnPoint { cell }),
            ScriptStep::Pick { x, z } => {
                let origin = Vec3::new(x, PICK_HEIGHT, z);
                match query::cell_on_ray(&self.world, origin, Vec3::NEG_Y) {
                    Some(cell) => self.submit(Command::ToggleDestination { cell }),
                    None => warn!(x, z, "pick missed the board"),
                }
            }
            ScriptStep::ShowPaths(visible) => self.submit(Command::SetPathVisibility { visible }),
            ScriptStep::ShowGrid(visible) => self.submit(Command::SetGridVisibility { visible }),
            ScriptStep::Run { ticks } => self.run(ticks),
            ScriptStep::Show => self.present(backend)?,
        }
        Ok(())
    }

    /// Presents the current board through `backend`.
    pub(crate) fn present(&self, backend: &mut dyn RenderingBackend) -> Result<()> {
        backend.present(&self.scene()?)
    }

    /// Snapshot of the board for rendering.
    pub(crate) fn scene(&self) -> Result<Scene> {
        let agents = self
            .movement
            .agent_positions()
            .into_iter()
            .map(|(agent, position)| AgentPresentation::new(agent, position))
            .collect();
        Scene::new(
            query::board_size(&self.world),
            query::occupants(&self.world),
            query::path_arrows(&self.world),
            agents,
            query::show_grid(&self.world),
        )
        .context("world produced an inconsistent scene")
    }

    pub(crate) fn layout(&self) -> BoardLayout {
        query::layout(&self.world)
    }

    pub(crate) fn stats(&self) -> SessionStats {
        self.stats
    }

    pub(crate) fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Applies a command and dispatches the resulting events to the systems
    /// until they stop proposing commands.
    fn submit(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.record(&events);

            let spawners: Vec<CellCoord> = query::spawn_points(&self.world);
            self.spawning.handle(&events, &spawners, &mut pending);
            self.movement
                .handle(&events, query::flow_field(&self.world), &mut pending);
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.stats.ticks += 1,
                Event::AgentSpawned { agent, cell } => {
                    self.stats.spawned += 1;
                    debug!(%agent, %cell, "agent spawned");
                }
                Event::AgentReclaimed { agent } => {
                    self.stats.arrived += 1;
                    debug!(%agent, "agent arrived");
                }
                Event::EditRejected { cell, reason } => {
                    self.stats.rejected_edits += 1;
                    info!(%cell, ?reason, "edit rejected");
                }
                Event::OccupantChanged { cell, from, to } => {
                    info!(%cell, ?from, ?to, "cell changed");
                }
                Event::SpawnRejected { cell } => warn!(%cell, "spawn request rejected"),
                Event::FlowFieldRebuilt
                | Event::PathVisibilityChanged { .. }
                | Event::GridVisibilityChanged { .. } => {}
            }
        }
    }
}
