//! Transport layer for the controller link
//!
//! The protocol only depends on this byte-level contract; the serial port,
//! the in-process emulator and the test mock all implement it.

use crate::error::Result;

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Opens a transport on the link worker thread
pub type TransportFactory = Box<dyn FnOnce() -> Result<Box<dyn Transport>> + Send>;

/// Transport trait for device communication
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 = nothing yet)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Is the underlying channel open?
    fn is_open(&self) -> bool;

    /// Reopen with the same parameters
    fn reopen(&mut self) -> Result<()>;

    /// Discard stale input and output
    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the channel
    fn close(&mut self);
}
