//! Setu - Grid simulator bridge for a cleaning-robot controller
//!
//! A simulated robot moves on a fixed grid. Each protocol cycle encodes what
//! its proximity probes see into one byte, sends it to the controller over a
//! serial link and applies the command the controller answers with.
//!
//! ## Layout
//!
//! - [`core`]: grid, robot kinematics, sensor probes
//! - [`protocol`]: wire codec, reply polling, the link worker and loop
//! - [`transport`]: byte-level channel (serial port, test mock)
//! - [`devices`]: controller emulator and transport factories
//! - [`session`]: the context object a UI drives

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod protocol;
pub mod render;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use session::Session;
