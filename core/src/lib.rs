#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative board, and pure systems. Adapters submit [`Command`] values
//! describing desired edits, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views of the flow field, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tile Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Flips a cell between empty floor and destination.
    ToggleDestination {
        /// Cell targeted by the edit.
        cell: CellCoord,
    },
    /// Flips a cell between empty floor and wall.
    ToggleWall {
        /// Cell targeted by the edit.
        cell: CellCoord,
    },
    /// Flips a cell between empty floor and spawn point.
    ToggleSpawnPoint {
        /// Cell targeted by the edit.
        cell: CellCoord,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new agent be created on the provided spawn point.
    SpawnAgent {
        /// Spawn point the agent starts from.
        spawner: CellCoord,
    },
    /// Hands an agent that finished its walk back to the world for reclamation.
    ReclaimAgent {
        /// Identifier of the agent that arrived at a destination.
        agent: AgentId,
    },
    /// Shows or hides the per-cell flow direction overlay.
    SetPathVisibility {
        /// Whether path arrows should be presented.
        visible: bool,
    },
    /// Shows or hides the grid line overlay.
    SetGridVisibility {
        /// Whether grid lines should be presented.
        visible: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an edit changed the occupant of a cell.
    OccupantChanged {
        /// Cell whose occupant changed.
        cell: CellCoord,
        /// Occupant held before the edit.
        from: OccupantKind,
        /// Occupant held after the edit.
        to: OccupantKind,
    },
    /// Reports that an edit was refused and the board left untouched.
    EditRejected {
        /// Cell targeted by the rejected edit.
        cell: CellCoord,
        /// Specific reason the edit was refused.
        reason: EditError,
    },
    /// Announces that the flow field was recomputed for a new layout.
    FlowFieldRebuilt,
    /// Confirms that an agent was created on a spawn point.
    AgentSpawned {
        /// Identifier allocated to the agent.
        agent: AgentId,
        /// Spawn point the agent starts from.
        cell: CellCoord,
    },
    /// Reports that a spawn request named a cell that cannot host agents.
    SpawnRejected {
        /// Cell provided in the spawn request.
        cell: CellCoord,
    },
    /// Confirms that an agent was reclaimed after reaching a destination.
    AgentReclaimed {
        /// Identifier of the reclaimed agent.
        agent: AgentId,
    },
    /// Announces a change to the path overlay flag.
    PathVisibilityChanged {
        /// Whether path arrows are now presented.
        visible: bool,
    },
    /// Announces a change to the grid overlay flag.
    GridVisibilityChanged {
        /// Whether grid lines are now presented.
        visible: bool,
    },
}

/// Cardinal directions linking orthogonally adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward decreasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

/// Occupant types a board cell can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantKind {
    /// Open floor that agents may cross.
    Empty,
    /// Obstacle that terminates path growth.
    Wall,
    /// Floor cell that agents are spawned on.
    SpawnPoint,
    /// Cell agents walk toward; seeds the flow field.
    Destination,
}

/// Reasons an edit may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditError {
    /// The targeted cell lies outside the board.
    OutOfBounds,
    /// The targeted cell holds an occupant the edit cannot replace.
    Incompatible {
        /// Occupant currently held by the cell.
        occupant: OccupantKind,
    },
    /// The edit would leave a cell without any route to a destination.
    WouldDisconnect {
        /// First cell, in row-major order, that lost its route.
        stranded: CellCoord,
    },
    /// The edit would remove the only destination on the board.
    LastDestination,
    /// The edit would remove the only spawn point on the board.
    LastSpawnPoint,
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Direction leading from this cell to an orthogonally adjacent one.
    ///
    /// Returns `None` when `other` is not a direct neighbour.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(other.column);
        let row_diff = self.row.abs_diff(other.row);
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if other.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if other.row > self.row {
            Some(Direction::North)
        } else {
            Some(Direction::South)
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Dimensions of the rectangular board measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    columns: u32,
    rows: u32,
}

impl BoardSize {
    /// Smallest accepted length of either board edge.
    pub const MIN_EDGE: u32 = 2;

    /// Board used when no explicit configuration is supplied.
    pub const DEFAULT: Self = Self::new(11, 11);

    /// Creates a new board size descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns a copy with both edges raised to at least [`Self::MIN_EDGE`].
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            columns: self.columns.max(Self::MIN_EDGE),
            rows: self.rows.max(Self::MIN_EDGE),
        }
    }

    /// Total number of cells on the board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Row-major index of the cell, if it lies on the board.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Coordinate of the cell stored at the provided row-major index.
    #[must_use]
    pub fn coord(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() || self.columns == 0 {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Occupant layout of a board, detached from any search state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    size: BoardSize,
    walls: Vec<CellCoord>,
    destinations: Vec<CellCoord>,
    spawn_points: Vec<CellCoord>,
}

impl BoardLayout {
    /// Creates a layout from explicit occupant lists.
    ///
    /// Walls and destinations are sorted so equal layouts compare equal;
    /// spawn points keep their order because spawners are selected by index.
    #[must_use]
    pub fn new(
        size: BoardSize,
        mut walls: Vec<CellCoord>,
        mut destinations: Vec<CellCoord>,
        spawn_points: Vec<CellCoord>,
    ) -> Self {
        walls.sort_by_key(|cell| (cell.row(), cell.column()));
        destinations.sort_by_key(|cell| (cell.row(), cell.column()));
        Self {
            size,
            walls,
            destinations,
            spawn_points,
        }
    }

    /// Dimensions of the board the layout was captured from.
    #[must_use]
    pub const fn size(&self) -> BoardSize {
        self.size
    }

    /// Cells holding walls, in row-major order.
    #[must_use]
    pub fn walls(&self) -> &[CellCoord] {
        &self.walls
    }

    /// Cells holding destinations, in row-major order.
    #[must_use]
    pub fn destinations(&self) -> &[CellCoord] {
        &self.destinations
    }

    /// Cells holding spawn points, in spawner selection order.
    #[must_use]
    pub fn spawn_points(&self) -> &[CellCoord] {
        &self.spawn_points
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardLayout, BoardSize, CellCoord, Direction, EditError, OccupantKind};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn direction_to_neighbours() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(
            origin.direction_to(CellCoord::new(3, 4)),
            Some(Direction::North)
        );
        assert_eq!(
            origin.direction_to(CellCoord::new(4, 3)),
            Some(Direction::East)
        );
        assert_eq!(
            origin.direction_to(CellCoord::new(3, 2)),
            Some(Direction::South)
        );
        assert_eq!(
            origin.direction_to(CellCoord::new(2, 3)),
            Some(Direction::West)
        );
        assert_eq!(origin.direction_to(origin), None);
        assert_eq!(origin.direction_to(CellCoord::new(4, 4)), None);
    }

    #[test]
    fn board_size_clamps_short_edges() {
        assert_eq!(BoardSize::new(0, 7).clamped(), BoardSize::new(2, 7));
        assert_eq!(BoardSize::new(5, 1).clamped(), BoardSize::new(5, 2));
        assert_eq!(BoardSize::new(4, 4).clamped(), BoardSize::new(4, 4));
    }

    #[test]
    fn board_size_indexes_row_major() {
        let size = BoardSize::new(4, 3);
        assert_eq!(size.cell_count(), 12);
        assert_eq!(size.index(CellCoord::new(0, 0)), Some(0));
        assert_eq!(size.index(CellCoord::new(3, 0)), Some(3));
        assert_eq!(size.index(CellCoord::new(1, 2)), Some(9));
        assert_eq!(size.index(CellCoord::new(4, 0)), None);
        assert_eq!(size.index(CellCoord::new(0, 3)), None);
        assert_eq!(size.coord(9), Some(CellCoord::new(1, 2)));
        assert_eq!(size.coord(12), None);
    }

    #[test]
    fn layout_sorts_walls_but_keeps_spawner_order() {
        let layout = BoardLayout::new(
            BoardSize::new(4, 4),
            vec![
                CellCoord::new(2, 2),
                CellCoord::new(0, 3),
                CellCoord::new(1, 0),
            ],
            vec![CellCoord::new(3, 3)],
            vec![CellCoord::new(3, 0), CellCoord::new(0, 0)],
        );

        assert_eq!(
            layout.walls(),
            &[
                CellCoord::new(1, 0),
                CellCoord::new(2, 2),
                CellCoord::new(0, 3)
            ]
        );
        assert_eq!(
            layout.spawn_points(),
            &[CellCoord::new(3, 0), CellCoord::new(0, 0)]
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn edit_error_round_trips_through_bincode() {
        assert_round_trip(&EditError::WouldDisconnect {
            stranded: CellCoord::new(0, 2),
        });
        assert_round_trip(&EditError::Incompatible {
            occupant: OccupantKind::SpawnPoint,
        });
    }

    #[test]
    fn board_layout_round_trips_through_bincode() {
        let layout = BoardLayout::new(
            BoardSize::new(6, 5),
            vec![CellCoord::new(1, 1), CellCoord::new(1, 2)],
            vec![CellCoord::new(5, 4)],
            vec![CellCoord::new(0, 0)],
        );
        assert_round_trip(&layout);
    }
}
