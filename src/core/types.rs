//! Core value types shared by the robot model, the grid and the protocol.
//!
//! - [`Heading`]: facing direction with cyclic turn arithmetic
//! - [`Position`]: 0-indexed (column, row), y grows downward
//! - [`Cell`]: semantic state of one grid square
//! - [`SensorFrame`]: transient obstruction snapshot
//! - [`Command`]: movement command decoded from the controller reply

use serde::{Deserialize, Serialize};

/// Robot facing direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    #[default]
    North,
    East,
    South,
    West,
}

impl Heading {
    /// All headings in clockwise order
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// Heading after a 90° counter-clockwise turn
    #[inline]
    pub fn left(self) -> Self {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    /// Heading after a 90° clockwise turn
    #[inline]
    pub fn right(self) -> Self {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    /// Grid step (dx, dy) for one move forward, y increasing downward
    #[inline]
    pub fn forward_offset(self) -> (isize, isize) {
        match self {
            Heading::North => (0, -1),
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
        }
    }

    /// Probe offsets (front, front-left, front-right) relative to this heading
    pub fn probe_offsets(self) -> [(isize, isize); 3] {
        match self {
            Heading::North => [(0, -1), (-1, -1), (1, -1)],
            Heading::East => [(1, 0), (1, -1), (1, 1)],
            Heading::South => [(0, 1), (1, 1), (-1, 1)],
            Heading::West => [(-1, 0), (-1, 1), (-1, -1)],
        }
    }
}

/// Grid coordinate (column, row)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    #[inline]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Offset this position, `None` if either coordinate would go negative.
    ///
    /// Upper bounds are the grid's business, see [`Grid::contains`](super::grid::Grid::contains).
    #[inline]
    pub fn offset(self, dx: isize, dy: isize) -> Option<Self> {
        Some(Self {
            col: self.col.checked_add_signed(dx)?,
            row: self.row.checked_add_signed(dy)?,
        })
    }

    /// As a (col, row) tuple
    #[inline]
    pub fn as_tuple(self) -> (usize, usize) {
        (self.col, self.row)
    }
}

impl From<(usize, usize)> for Position {
    fn from((col, row): (usize, usize)) -> Self {
        Self { col, row }
    }
}

/// Semantic cell state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    /// Not yet cleaned
    #[default]
    Unvisited = 0,
    /// Robot has passed over this cell
    Visited = 1,
    /// Obstacle the robot has not identified; blocks movement
    ObstacleUnidentified = 2,
    /// Obstacle already identified; seen by sensors only
    ObstacleIdentified = 3,
    /// Current robot cell
    RobotOccupied = 4,
}

impl Cell {
    /// Does this cell obstruct a proximity sensor?
    #[inline]
    pub fn is_obstacle(self) -> bool {
        matches!(self, Cell::ObstacleUnidentified | Cell::ObstacleIdentified)
    }

    /// Does this cell stop a forward move?
    #[inline]
    pub fn blocks_movement(self) -> bool {
        matches!(self, Cell::ObstacleUnidentified)
    }
}

/// Snapshot of the robot's proximity and collision flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SensorFrame {
    pub front: bool,
    pub left: bool,
    pub right: bool,
    pub collision: bool,
}

/// Movement command from the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    MoveForward,
    TurnLeft,
    TurnRight,
    /// Hold position (firmware answers this on collision)
    Stop,
}
