#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tile Defence adapters.

mod text;

use anyhow::Result as AnyResult;
use glam::Vec2;
use thiserror::Error;
use tile_defence_core::{AgentId, BoardSize, CellCoord, Direction, OccupantKind};

pub use crate::text::{render_text, TextBackend};

/// Agent drawn at a ground-plane position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentPresentation {
    /// Identifier of the agent.
    pub agent: AgentId,
    /// Ground-plane position, in the world's cell-centred coordinates.
    pub position: Vec2,
}

impl AgentPresentation {
    /// Creates a new agent presentation.
    #[must_use]
    pub const fn new(agent: AgentId, position: Vec2) -> Self {
        Self { agent, position }
    }
}

/// Scene description combining the board, its flow arrows and agents.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    size: BoardSize,
    cells: Vec<OccupantKind>,
    /// Arrow shown on each cell that has a next hop while paths are visible.
    pub arrows: Vec<(CellCoord, Direction)>,
    /// Agents currently walking the board.
    pub agents: Vec<AgentPresentation>,
    /// Whether the grid frame should be drawn.
    pub show_grid: bool,
}

impl Scene {
    /// Creates a scene from row-major occupants.
    ///
    /// Fails when `cells` does not hold exactly one entry per board cell.
    pub fn new(
        size: BoardSize,
        cells: Vec<OccupantKind>,
        arrows: Vec<(CellCoord, Direction)>,
        agents: Vec<AgentPresentation>,
        show_grid: bool,
    ) -> Result<Self, RenderingError> {
        if cells.len() != size.cell_count() {
            return Err(RenderingError::CellCountMismatch {
                expected: size.cell_count(),
                actual: cells.len(),
            });
        }

        Ok(Self {
            size,
            cells,
            arrows,
            agents,
            show_grid,
        })
    }

    /// Dimensions of the presented board.
    #[must_use]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Occupant presented on the cell.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<OccupantKind> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index))
            .copied()
    }

    /// Cell under a ground-plane position, if it lies on the board.
    #[must_use]
    pub fn cell_under(&self, position: Vec2) -> Option<CellCoord> {
        let column = axis_index(position.x, self.size.columns())?;
        let row = axis_index(position.y, self.size.rows())?;
        Some(CellCoord::new(column, row))
    }
}

fn axis_index(coordinate: f32, cells: u32) -> Option<u32> {
    let index = (coordinate + cells as f32 * 0.5).floor();
    (0.0..cells as f32).contains(&index).then(|| index as u32)
}

/// Rendering backend capable of presenting Tile Defence scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// The occupant list does not cover the board.
    #[error("scene expects {expected} cells but received {actual}")]
    CellCountMismatch {
        /// Number of cells on the board.
        expected: usize,
        /// Number of occupants supplied.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_cells(size: BoardSize) -> Vec<OccupantKind> {
        vec![OccupantKind::Empty; size.cell_count()]
    }

    #[test]
    fn scene_creation_rejects_partial_boards() {
        let size = BoardSize::new(3, 2);
        let error = Scene::new(size, vec![OccupantKind::Empty; 5], Vec::new(), Vec::new(), false)
            .expect_err("five cells cannot cover a 3x2 board");

        assert_eq!(
            error,
            RenderingError::CellCountMismatch {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn scene_reports_occupants_by_coordinate() {
        let size = BoardSize::new(3, 2);
        let mut cells = empty_cells(size);
        cells[4] = OccupantKind::Wall;
        let scene = Scene::new(size, cells, Vec::new(), Vec::new(), true).expect("valid scene");

        assert_eq!(scene.occupant(CellCoord::new(1, 1)), Some(OccupantKind::Wall));
        assert_eq!(scene.occupant(CellCoord::new(3, 0)), None);
    }

    #[test]
    fn cell_under_uses_centred_coordinates() {
        let size = BoardSize::new(4, 2);
        let scene =
            Scene::new(size, empty_cells(size), Vec::new(), Vec::new(), false).expect("valid scene");

        assert_eq!(scene.cell_under(Vec2::new(-1.5, -0.5)), Some(CellCoord::new(0, 0)));
        assert_eq!(scene.cell_under(Vec2::new(1.49, 0.99)), Some(CellCoord::new(3, 1)));
        assert_eq!(scene.cell_under(Vec2::new(2.0, 0.0)), None);
    }
}
