//! Simulation model.
//!
//! - [`types`]: headings, positions, cells, sensor frames, commands
//! - [`grid::Grid`]: the cell store
//! - [`robot::RobotModel`]: kinematics and sensor probes
//! - [`world::World`]: grid + robot with the single-robot-cell invariant

pub mod grid;
pub mod robot;
pub mod types;
pub mod world;

pub use grid::Grid;
pub use robot::RobotModel;
pub use types::{Cell, Command, Heading, Position, SensorFrame};
pub use world::{Applied, World};
