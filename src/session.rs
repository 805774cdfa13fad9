//! Simulation session: the one object the presentation layer talks to.
//!
//! Owns the world and the protocol loop. Input handling and rendering take
//! `&mut Session` / `&Session`; nothing lives in process-wide state.
//!
//! # Example
//!
//! ```no_run
//! use setu::core::types::Position;
//! use setu::session::Session;
//!
//! let mut session = Session::new(10, 10);
//! session.place_robot(Position::new(0, 0))?;
//! session.start_session("/dev/ttyUSB0", 9600)?;
//! loop {
//!     if let Some(outcome) = session.tick() {
//!         println!("{:?}", outcome);
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! # Ok::<(), setu::Error>(())
//! ```

use crate::core::types::{Cell, Heading, Position, SensorFrame};
use crate::core::world::World;
use crate::devices::serial_factory;
use crate::error::Result;
use crate::protocol::session_loop::{CycleOutcome, LinkState, LinkTiming, ProtocolLoop};
use crate::transport::TransportFactory;
use std::time::{Duration, Instant};

pub struct Session {
    world: World,
    link: ProtocolLoop,
    timing: LinkTiming,
    started_at: Option<Instant>,
}

impl Session {
    /// Empty `width` x `height` grid, default link timing
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_world(World::new(width, height), LinkTiming::default())
    }

    pub fn with_world(world: World, timing: LinkTiming) -> Self {
        Self {
            world,
            link: ProtocolLoop::new(),
            timing,
            started_at: None,
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn get_position(&self) -> Option<(usize, usize)> {
        self.world.robot().map(|r| r.position().as_tuple())
    }

    pub fn get_heading(&self) -> Option<Heading> {
        self.world.robot().map(|r| r.heading())
    }

    /// Cell state, `None` outside the grid
    pub fn get_cell(&self, pos: Position) -> Option<Cell> {
        self.world.grid().get(pos)
    }

    pub fn place_robot(&mut self, pos: Position) -> Result<()> {
        self.world.place_robot(pos)
    }

    pub fn set_cell(&mut self, pos: Position, cell: Cell) -> Result<()> {
        self.world.set_cell(pos, cell)
    }

    /// Point the robot; no-op when none is placed
    pub fn set_heading(&mut self, heading: Heading) {
        self.world.set_heading(heading);
    }

    /// Sensor frame the next cycle would send
    pub fn sensors(&self) -> Option<SensorFrame> {
        self.world.read_sensors()
    }

    /// Open the serial link and begin cycling once it has settled
    pub fn start_session(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        log::info!("Starting session on {} @ {} baud", port, baud_rate);
        self.start_with(serial_factory(port.to_string(), baud_rate))
    }

    /// Start against any transport (emulator, mock)
    pub fn start_with(&mut self, factory: TransportFactory) -> Result<()> {
        self.link.start(factory, self.timing)?;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Close the link, interrupting any in-flight wait
    pub fn stop_session(&mut self) -> Result<()> {
        self.link.stop()
    }

    /// Advance the protocol loop once; call every frame
    pub fn tick(&mut self) -> Option<CycleOutcome> {
        self.link.tick(&mut self.world)
    }

    #[inline]
    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Why the link closed, if it failed
    pub fn link_error(&self) -> Option<&str> {
        self.link.last_error()
    }

    /// Time since the session started, `None` before that
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }
}

/// Reports a sensor frame only when it differs from the previous one
#[derive(Debug, Default)]
pub struct SensorWatch {
    last: Option<SensorFrame>,
}

impl SensorWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, frame: SensorFrame) -> Option<SensorFrame> {
        if self.last == Some(frame) {
            return None;
        }
        self.last = Some(frame);
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_queries() {
        let mut session = Session::new(5, 5);
        assert_eq!(session.get_position(), None);
        assert_eq!(session.get_heading(), None);
        assert_eq!(session.get_cell(Position::new(9, 9)), None);

        session.place_robot(Position::new(1, 3)).unwrap();
        session.set_heading(Heading::South);
        assert_eq!(session.get_position(), Some((1, 3)));
        assert_eq!(session.get_heading(), Some(Heading::South));
        assert_eq!(
            session.get_cell(Position::new(1, 3)),
            Some(Cell::RobotOccupied)
        );
    }

    #[test]
    fn test_place_robot_resets_previous_cell() {
        let mut session = Session::new(5, 5);
        session.place_robot(Position::new(0, 0)).unwrap();
        session.place_robot(Position::new(4, 4)).unwrap();
        assert_eq!(session.get_cell(Position::new(0, 0)), Some(Cell::Unvisited));
        assert_eq!(session.world().grid().count(Cell::RobotOccupied), 1);
        assert!(session.place_robot(Position::new(5, 0)).is_err());
    }

    #[test]
    fn test_set_heading_without_robot_is_noop() {
        let mut session = Session::new(3, 3);
        session.set_heading(Heading::West);
        assert_eq!(session.get_heading(), None);
    }

    #[test]
    fn test_elapsed_before_start() {
        let session = Session::new(3, 3);
        assert_eq!(session.elapsed(), None);
        assert_eq!(session.link_state(), LinkState::Idle);
    }

    #[test]
    fn test_sensor_watch_reports_changes_only() {
        let mut watch = SensorWatch::new();
        let clear = SensorFrame::default();
        let blocked = SensorFrame {
            front: true,
            ..Default::default()
        };

        assert_eq!(watch.observe(clear), Some(clear));
        assert_eq!(watch.observe(clear), None);
        assert_eq!(watch.observe(blocked), Some(blocked));
        assert_eq!(watch.observe(blocked), None);
        assert_eq!(watch.observe(clear), Some(clear));
    }
}
