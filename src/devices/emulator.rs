//! In-process stand-in for the controller board.
//!
//! Reproduces the firmware's decision rules on each received sensor byte:
//!
//! | Frame | Reply |
//! |-------|-------|
//! | collision set | `'4'` (stop) |
//! | front blocked | `'2'` or `'3'`, chosen at random |
//! | otherwise | `'1'` (forward) |
//!
//! Replies are buffered and returned by the next read, so the link sees the
//! same byte stream a real board produces.

use crate::core::types::{Command, SensorFrame};
use crate::error::{Error, Result};
use crate::protocol::frame::decode_sensors;
use crate::transport::Transport;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::VecDeque;

pub struct ControllerEmulator {
    rng: StdRng,
    outbox: VecDeque<u8>,
    open: bool,
    frames: usize,
}

impl ControllerEmulator {
    /// Create an emulator; seed 0 draws from OS entropy
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(seed)
        };
        Self {
            rng,
            outbox: VecDeque::new(),
            open: true,
            frames: 0,
        }
    }

    /// Firmware decision for one sensor frame
    pub fn decide(&mut self, frame: SensorFrame) -> Command {
        if frame.collision {
            Command::Stop
        } else if frame.front {
            if self.rng.gen_bool(0.5) {
                Command::TurnLeft
            } else {
                Command::TurnRight
            }
        } else {
            Command::MoveForward
        }
    }

    /// Frames received so far
    pub fn frames_handled(&self) -> usize {
        self.frames
    }
}

impl Transport for ControllerEmulator {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        let n = self.outbox.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(self.outbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        for &byte in data {
            let command = self.decide(decode_sensors(byte));
            log::trace!("Emulator: {:04b} -> {:?}", byte, command);
            self.outbox.push_back(command.to_byte());
            self.frames += 1;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn reopen(&mut self) -> Result<()> {
        self.outbox.clear();
        self.open = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.outbox.clear();
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }
}
