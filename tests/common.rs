//! Test utilities for Setu protocol scenarios.

#![allow(dead_code)]

use setu::core::types::{Heading, Position};
use setu::core::world::World;
use setu::protocol::{CycleOutcome, LinkState, LinkTiming, ProtocolLoop};
use setu::session::Session;
use setu::transport::{MockTransport, Transport, TransportFactory};
use std::thread;
use std::time::{Duration, Instant};

/// Give up waiting for a cycle after this long
pub const DEADLINE: Duration = Duration::from_secs(10);

/// No settle delay, millisecond polling, standard 10-attempt budget
pub fn fast_timing() -> LinkTiming {
    LinkTiming {
        settle: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
        max_poll_attempts: 10,
    }
}

/// Factory handing the link a clone of `mock` (shared state)
pub fn mock_factory(mock: &MockTransport) -> TransportFactory {
    let mock = mock.clone();
    Box::new(move || Ok(Box::new(mock) as Box<dyn Transport>))
}

/// 5x5 world, robot at (2,2) facing north
pub fn centered_world() -> World {
    let mut world = World::new(5, 5);
    world
        .place_robot(Position::new(2, 2))
        .expect("center is inside the grid");
    world.set_heading(Heading::North);
    world
}

/// Tick until a cycle completes (ignoring skipped ticks), or the link closes
pub fn next_outcome(link: &mut ProtocolLoop, world: &mut World) -> Option<CycleOutcome> {
    let deadline = Instant::now() + DEADLINE;
    while Instant::now() < deadline {
        match link.tick(world) {
            None | Some(CycleOutcome::Skipped) => {}
            Some(outcome) => return Some(outcome),
        }
        if link.state() == LinkState::Closed {
            return None;
        }
        thread::sleep(Duration::from_millis(1));
    }
    None
}

/// Session flavour of [`next_outcome`]
pub fn next_session_outcome(session: &mut Session) -> Option<CycleOutcome> {
    let deadline = Instant::now() + DEADLINE;
    while Instant::now() < deadline {
        match session.tick() {
            None | Some(CycleOutcome::Skipped) => {}
            Some(outcome) => return Some(outcome),
        }
        if session.link_state() == LinkState::Closed {
            return None;
        }
        thread::sleep(Duration::from_millis(1));
    }
    None
}
