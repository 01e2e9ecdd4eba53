//! Per-agent travel along a snapshot of the flow field.

use glam::Vec2;
use tile_defence_core::CellCoord;
use tile_defence_world::query::FlowFieldView;

/// Outcome of advancing an agent along its route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionStatus {
    /// The agent is between two cells of its route.
    Traveling,
    /// The agent stepped onto the final cell of its route.
    Arrived,
}

/// Motion state of a single agent.
///
/// The route is captured when the agent spawns and is never re-read from the
/// live flow field, so later edits do not reroute agents already walking.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentMotion {
    waypoints: Vec<(CellCoord, Vec2)>,
    leg: usize,
    progress: f32,
    position: Vec2,
}

impl AgentMotion {
    /// Starts an agent on `cell`, heading toward the cell's next hop.
    ///
    /// # Panics
    ///
    /// Panics when the cell has no next hop.
    #[must_use]
    pub fn spawn(field: &FlowFieldView<'_>, cell: CellCoord) -> Self {
        let route = field.path_from(cell);
        assert!(
            !route.is_empty(),
            "agent spawned on cell {cell} without a next hop"
        );

        let waypoints: Vec<_> = std::iter::once(cell)
            .chain(route)
            .map(|coord| (coord, field.center(coord)))
            .collect();
        let position = waypoints[0].1;

        Self {
            waypoints,
            leg: 0,
            progress: 0.0,
            position,
        }
    }

    /// Moves the agent `delta` cells further along its route.
    pub fn advance(&mut self, delta: f32) -> MotionStatus {
        self.progress += delta;
        while self.progress >= 1.0 {
            self.progress -= 1.0;
            self.leg += 1;
            if self.leg + 1 >= self.waypoints.len() {
                self.position = self.waypoints[self.waypoints.len() - 1].1;
                return MotionStatus::Arrived;
            }
        }

        let start = self.waypoints[self.leg].1;
        let end = self.waypoints[self.leg + 1].1;
        self.position = start.lerp(end, self.progress);
        MotionStatus::Traveling
    }

    /// Ground-plane position of the agent.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Cell the agent is leaving.
    #[must_use]
    pub fn from(&self) -> CellCoord {
        self.waypoints[self.leg].0
    }

    /// Cell the agent is heading toward.
    #[must_use]
    pub fn to(&self) -> CellCoord {
        let next = (self.leg + 1).min(self.waypoints.len() - 1);
        self.waypoints[next].0
    }

    /// Fraction of the current leg already travelled.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Cells still ahead of the agent, ending at its destination.
    #[must_use]
    pub fn remaining_route(&self) -> Vec<CellCoord> {
        self.waypoints
            .iter()
            .skip(self.leg + 1)
            .map(|(coord, _)| *coord)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{BoardLayout, BoardSize};
    use tile_defence_world::{query, World};

    fn corridor() -> World {
        let layout = BoardLayout::new(
            BoardSize::new(4, 2),
            Vec::new(),
            vec![CellCoord::new(3, 0)],
            vec![CellCoord::new(0, 0)],
        );
        World::from_layout(&layout).expect("corridor is connected")
    }

    #[test]
    fn spawn_heads_toward_next_hop() {
        let world = corridor();
        let motion = AgentMotion::spawn(&query::flow_field(&world), CellCoord::new(0, 0));

        assert_eq!(motion.from(), CellCoord::new(0, 0));
        assert_eq!(motion.to(), CellCoord::new(1, 0));
        assert_eq!(motion.progress(), 0.0);
        assert_eq!(motion.position(), Vec2::new(-1.5, -0.5));
    }

    #[test]
    fn advance_interpolates_between_centres() {
        let world = corridor();
        let mut motion = AgentMotion::spawn(&query::flow_field(&world), CellCoord::new(0, 0));

        assert_eq!(motion.advance(0.25), MotionStatus::Traveling);
        assert_eq!(motion.position(), Vec2::new(-1.25, -0.5));

        assert_eq!(motion.advance(1.5), MotionStatus::Traveling);
        assert_eq!(motion.from(), CellCoord::new(1, 0));
        assert_eq!(motion.to(), CellCoord::new(2, 0));
        assert_eq!(motion.progress(), 0.75);
    }

    #[test]
    fn large_steps_cross_several_cells() {
        let world = corridor();
        let mut motion = AgentMotion::spawn(&query::flow_field(&world), CellCoord::new(0, 0));

        assert_eq!(motion.advance(2.5), MotionStatus::Traveling);
        assert_eq!(motion.from(), CellCoord::new(2, 0));
        assert_eq!(motion.remaining_route(), vec![CellCoord::new(3, 0)]);

        assert_eq!(motion.advance(0.5), MotionStatus::Arrived);
        assert_eq!(motion.position(), Vec2::new(1.5, -0.5));
    }

    #[test]
    #[should_panic(expected = "without a next hop")]
    fn spawning_on_destination_panics() {
        let world = corridor();
        let _ = AgentMotion::spawn(&query::flow_field(&world), CellCoord::new(3, 0));
    }
}
