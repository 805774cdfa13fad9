//! Robot kinematics and simulated proximity sensors.
//!
//! The robot owns only its pose. The grid is borrowed for every query so that
//! cell updates stay with the caller ([`World`](super::world::World)).
//!
//! # Sensor probes
//!
//! Three cells are probed relative to the heading: straight ahead, front-left
//! diagonal and front-right diagonal. A probe is obstructed when the cell is
//! an obstacle (identified or not) or lies outside the grid.
//!
//! ```text
//!   heading North        heading East
//!   L  F  R               .  L
//!   .  ^  .               >  F
//!                         .  R
//! ```

use super::grid::Grid;
use super::types::{Heading, Position, SensorFrame};

/// Robot pose on the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobotModel {
    position: Position,
    heading: Heading,
}

impl RobotModel {
    pub fn new(position: Position, heading: Heading) -> Self {
        Self { position, heading }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    #[inline]
    pub fn set_heading(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn turn_left(&mut self) {
        self.heading = self.heading.left();
    }

    pub fn turn_right(&mut self) {
        self.heading = self.heading.right();
    }

    /// Cell one step ahead, if it exists
    pub fn position_ahead(&self, grid: &Grid) -> Option<Position> {
        let (dx, dy) = self.heading.forward_offset();
        self.position
            .offset(dx, dy)
            .filter(|&pos| grid.contains(pos))
    }

    /// Step one cell forward.
    ///
    /// Returns `false` and leaves the pose untouched when the target is outside
    /// the grid or an unidentified obstacle. Cell states are not modified.
    pub fn move_forward(&mut self, grid: &Grid) -> bool {
        let Some(target) = self.position_ahead(grid) else {
            return false;
        };
        match grid.get(target) {
            Some(cell) if !cell.blocks_movement() => {
                self.position = target;
                true
            }
            _ => false,
        }
    }

    /// Probe front, front-left and front-right cells.
    ///
    /// `collision` is always false: no bumper is simulated.
    pub fn read_sensors(&self, grid: &Grid) -> SensorFrame {
        let [front, left, right] = self.heading.probe_offsets().map(|(dx, dy)| {
            self.position
                .offset(dx, dy)
                .and_then(|pos| grid.get(pos))
                .is_none_or(|cell| cell.is_obstacle())
        });

        SensorFrame {
            front,
            left,
            right,
            collision: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Cell;

    fn at(col: usize, row: usize, heading: Heading) -> RobotModel {
        RobotModel::new(Position::new(col, row), heading)
    }

    #[test]
    fn test_turns_cycle() {
        let mut robot = at(0, 0, Heading::East);
        for _ in 0..4 {
            robot.turn_left();
        }
        assert_eq!(robot.heading(), Heading::East);
        robot.turn_right();
        assert_eq!(robot.heading(), Heading::South);
    }

    #[test]
    fn test_move_forward_each_heading() {
        let grid = Grid::new(5, 5);
        let cases = [
            (Heading::North, Position::new(2, 1)),
            (Heading::East, Position::new(3, 2)),
            (Heading::South, Position::new(2, 3)),
            (Heading::West, Position::new(1, 2)),
        ];
        for (heading, expected) in cases {
            let mut robot = at(2, 2, heading);
            assert!(robot.move_forward(&grid));
            assert_eq!(robot.position(), expected);
        }
    }

    #[test]
    fn test_move_forward_never_leaves_grid() {
        let grid = Grid::new(3, 3);
        for row in 0..3 {
            for col in 0..3 {
                for heading in Heading::ALL {
                    let mut robot = at(col, row, heading);
                    robot.move_forward(&grid);
                    assert!(grid.contains(robot.position()));
                }
            }
        }
    }

    #[test]
    fn test_move_forward_blocked_by_unidentified_obstacle() {
        let mut grid = Grid::new(5, 5);
        grid.set((2, 1).into(), Cell::ObstacleUnidentified).unwrap();
        let mut robot = at(2, 2, Heading::North);
        assert!(!robot.move_forward(&grid));
        assert_eq!(robot.position(), Position::new(2, 2));
    }

    #[test]
    fn test_move_forward_through_identified_obstacle() {
        let mut grid = Grid::new(5, 5);
        grid.set((2, 1).into(), Cell::ObstacleIdentified).unwrap();
        let mut robot = at(2, 2, Heading::North);
        assert!(robot.move_forward(&grid));
        assert_eq!(robot.position(), Position::new(2, 1));
    }

    #[test]
    fn test_sensors_clear_in_open_space() {
        let grid = Grid::new(5, 5);
        let frame = at(2, 2, Heading::North).read_sensors(&grid);
        assert_eq!(frame, SensorFrame::default());
    }

    #[test]
    fn test_sensors_front_obstacle() {
        let mut grid = Grid::new(5, 5);
        grid.set((2, 1).into(), Cell::ObstacleUnidentified).unwrap();
        let frame = at(2, 2, Heading::North).read_sensors(&grid);
        assert!(frame.front);
        assert!(!frame.left);
        assert!(!frame.right);
    }

    #[test]
    fn test_sensor_diagonals_rotate_with_heading() {
        let mut grid = Grid::new(5, 5);
        // North-east diagonal of (2, 2)
        grid.set((3, 1).into(), Cell::ObstacleIdentified).unwrap();

        let north = at(2, 2, Heading::North).read_sensors(&grid);
        assert!(north.right && !north.left && !north.front);

        let east = at(2, 2, Heading::East).read_sensors(&grid);
        assert!(east.left && !east.right && !east.front);

        let south = at(2, 2, Heading::South).read_sensors(&grid);
        assert_eq!(south, SensorFrame::default());
    }

    #[test]
    fn test_edge_counts_as_obstructed() {
        let grid = Grid::new(5, 5);
        let frame = at(0, 0, Heading::West).read_sensors(&grid);
        assert!(frame.front);
        assert!(frame.left);
        assert!(frame.right);

        let frame = at(4, 2, Heading::North).read_sensors(&grid);
        assert!(!frame.front);
        assert!(!frame.left);
        assert!(frame.right);
    }

    #[test]
    fn test_collision_never_reported() {
        let mut grid = Grid::new(2, 2);
        grid.set((1, 0).into(), Cell::ObstacleUnidentified).unwrap();
        for heading in Heading::ALL {
            assert!(!at(0, 0, heading).read_sensors(&grid).collision);
        }
    }
}
