//! Wire format of the controller link
//!
//! # Outbound (1 byte)
//!
//! ```text
//! bit  7 6 5 4 | 3     2    1     0
//!      0 0 0 0 | FRONT LEFT RIGHT COLLISION
//! ```
//!
//! # Inbound (1+ bytes, ASCII)
//!
//! Only the first non-whitespace byte is significant:
//!
//! | Byte | Command |
//! |------|---------|
//! | `'1'` | MoveForward |
//! | `'2'` | TurnLeft |
//! | `'3'` | TurnRight |
//! | `'4'` | Stop |
//!
//! Anything else is ignored.

use crate::core::types::{Command, SensorFrame};

pub const BIT_FRONT: u8 = 1 << 3;
pub const BIT_LEFT: u8 = 1 << 2;
pub const BIT_RIGHT: u8 = 1 << 1;
pub const BIT_COLLISION: u8 = 1;

pub const REPLY_FORWARD: u8 = b'1';
pub const REPLY_TURN_LEFT: u8 = b'2';
pub const REPLY_TURN_RIGHT: u8 = b'3';
pub const REPLY_STOP: u8 = b'4';

/// Pack a sensor frame into the outbound byte
pub fn encode_sensors(frame: &SensorFrame) -> u8 {
    let mut byte = 0;
    if frame.front {
        byte |= BIT_FRONT;
    }
    if frame.left {
        byte |= BIT_LEFT;
    }
    if frame.right {
        byte |= BIT_RIGHT;
    }
    if frame.collision {
        byte |= BIT_COLLISION;
    }
    byte
}

/// Unpack an outbound byte (controller side; upper bits ignored)
pub fn decode_sensors(byte: u8) -> SensorFrame {
    SensorFrame {
        front: byte & BIT_FRONT != 0,
        left: byte & BIT_LEFT != 0,
        right: byte & BIT_RIGHT != 0,
        collision: byte & BIT_COLLISION != 0,
    }
}

/// Decoded reply
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    Command(Command),
    /// Significant byte with no command meaning
    Unknown(u8),
    /// Only whitespace received
    Empty,
}

impl Command {
    /// Command for a single significant reply byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            REPLY_FORWARD => Some(Command::MoveForward),
            REPLY_TURN_LEFT => Some(Command::TurnLeft),
            REPLY_TURN_RIGHT => Some(Command::TurnRight),
            REPLY_STOP => Some(Command::Stop),
            _ => None,
        }
    }

    /// Reply byte the controller sends for this command
    pub fn to_byte(self) -> u8 {
        match self {
            Command::MoveForward => REPLY_FORWARD,
            Command::TurnLeft => REPLY_TURN_LEFT,
            Command::TurnRight => REPLY_TURN_RIGHT,
            Command::Stop => REPLY_STOP,
        }
    }
}

/// Decode a raw reply
pub fn decode_reply(data: &[u8]) -> Reply {
    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(&byte) => Command::from_byte(byte).map_or(Reply::Unknown(byte), Reply::Command),
        None => Reply::Empty,
    }
}
