//! Simulation world: the grid plus the (optional) robot on it.
//!
//! Every operation that relocates the robot goes through here so that exactly
//! one cell is `RobotOccupied` while a robot exists and none otherwise.

use super::grid::Grid;
use super::robot::RobotModel;
use super::types::{Cell, Command, Heading, Position, SensorFrame};
use crate::error::{Error, Result};

/// Effect of applying a command to the world
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// Robot stepped from `from` to `to`
    Moved { from: Position, to: Position },
    /// Forward step rejected by bounds or obstacle
    Blocked,
    /// Heading changed
    Turned(Heading),
    /// Stop: nothing changes
    Held,
    /// No robot placed; command dropped
    NoRobot,
}

#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    robot: Option<RobotModel>,
}

impl World {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            robot: None,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn robot(&self) -> Option<&RobotModel> {
        self.robot.as_ref()
    }

    /// Paint a cell.
    ///
    /// Painting `RobotOccupied` places the robot there. Painting any other
    /// state over the robot's cell removes the robot.
    pub fn set_cell(&mut self, pos: Position, cell: Cell) -> Result<()> {
        if cell == Cell::RobotOccupied {
            return self.place_robot(pos);
        }
        self.grid.set(pos, cell)?;
        if self.robot.is_some_and(|r| r.position() == pos) {
            log::debug!("Robot cell ({}, {}) overwritten, robot removed", pos.col, pos.row);
            self.robot = None;
        }
        Ok(())
    }

    /// Place (or move) the robot, keeping its heading if it already exists.
    ///
    /// The previous robot cell goes back to `Unvisited`.
    pub fn place_robot(&mut self, pos: Position) -> Result<()> {
        if !self.grid.contains(pos) {
            return Err(Error::OutOfBounds {
                col: pos.col,
                row: pos.row,
            });
        }
        let heading = match self.robot {
            Some(robot) => {
                self.grid.set(robot.position(), Cell::Unvisited)?;
                robot.heading()
            }
            None => Heading::North,
        };
        self.grid.set(pos, Cell::RobotOccupied)?;
        self.robot = Some(RobotModel::new(pos, heading));
        Ok(())
    }

    /// Set heading directly; ignored when no robot is placed
    pub fn set_heading(&mut self, heading: Heading) {
        if let Some(robot) = self.robot.as_mut() {
            robot.set_heading(heading);
        }
    }

    /// Take the robot off the grid, resetting its cell to `Unvisited`
    pub fn remove_robot(&mut self) {
        if let Some(robot) = self.robot.take() {
            // Position came from the grid, cannot be out of bounds
            let _ = self.grid.set(robot.position(), Cell::Unvisited);
        }
    }

    /// Clear every cell and remove the robot
    pub fn reset(&mut self) {
        self.robot = None;
        self.grid.clear();
    }

    /// Current sensor frame, `None` without a robot
    pub fn read_sensors(&self) -> Option<SensorFrame> {
        self.robot.map(|robot| robot.read_sensors(&self.grid))
    }

    /// Apply a controller command with matching cell updates
    pub fn apply(&mut self, command: Command) -> Applied {
        let Some(robot) = self.robot.as_mut() else {
            return Applied::NoRobot;
        };

        match command {
            Command::MoveForward => {
                let from = robot.position();
                if !robot.move_forward(&self.grid) {
                    return Applied::Blocked;
                }
                let to = robot.position();
                // Both positions were validated by the move
                let _ = self.grid.set(from, Cell::Visited);
                let _ = self.grid.set(to, Cell::RobotOccupied);
                Applied::Moved { from, to }
            }
            Command::TurnLeft => {
                robot.turn_left();
                Applied::Turned(robot.heading())
            }
            Command::TurnRight => {
                robot.turn_right();
                Applied::Turned(robot.heading())
            }
            Command::Stop => Applied::Held,
        }
    }
}
