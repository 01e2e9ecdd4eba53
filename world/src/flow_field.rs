//! Multi-source breadth-first search that builds the board's flow field.

use std::collections::VecDeque;

use thiserror::Error;
use tile_defence_core::{CellCoord, Direction, OccupantKind};

use crate::cell::{self, Cell, CellIndex};

/// Expansion order used by cells whose checkerboard flag is set.
const ALTERNATIVE_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// Expansion order used by every other cell.
const REGULAR_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Reasons the search may fail to produce a complete flow field.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// No destination exists to seed the search from.
    #[error("no destination cell to seed the search from")]
    NoDestination,
    /// At least one cell was left without a path after the search drained.
    #[error("cell {cell} cannot reach any destination")]
    Unreachable {
        /// First cell, in row-major order, left without a path.
        cell: CellCoord,
    },
}

/// Reusable frontier for the reverse breadth-first search.
#[derive(Debug, Default)]
pub(crate) struct FlowFieldSearch {
    frontier: VecDeque<CellIndex>,
}

impl FlowFieldSearch {
    /// Recomputes distance and next hop for every cell from scratch.
    ///
    /// Every destination seeds the frontier at distance zero, so each cell
    /// ends up pointing at its nearest destination. Succeeds only when every
    /// cell, walls included, received a path.
    pub(crate) fn run(&mut self, cells: &mut [Cell]) -> Result<(), SearchError> {
        self.frontier.clear();

        for (index, cell) in cells.iter_mut().enumerate() {
            if cell.kind() == OccupantKind::Destination {
                cell.become_destination();
                self.frontier.push_back(index);
            } else {
                cell.clear_path();
            }
        }

        if self.frontier.is_empty() {
            return Err(SearchError::NoDestination);
        }

        while let Some(index) = self.frontier.pop_front() {
            for &direction in expansion_order(cells[index].is_alternative()) {
                if let Some(grown) = cell::grow_path(cells, index, direction) {
                    self.frontier.push_back(grown);
                }
            }
        }

        match cells.iter().find(|cell| !cell.has_path()) {
            Some(stranded) => Err(SearchError::Unreachable {
                cell: stranded.coord(),
            }),
            None => Ok(()),
        }
    }
}

fn expansion_order(alternative: bool) -> &'static [Direction; 4] {
    if alternative {
        &ALTERNATIVE_ORDER
    } else {
        &REGULAR_ORDER
    }
}
