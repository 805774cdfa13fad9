//! Mock transport for testing
//!
//! Clones share state, so a test keeps one handle for inspection and hands the
//! other to the link.

use super::Transport;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Mock transport for protocol tests
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct ScriptedReply {
    data: Vec<u8>,
    /// Empty reads to serve before the reply becomes readable
    delay_reads: usize,
}

#[derive(Default)]
struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    /// Replies released one per write
    scripted: VecDeque<ScriptedReply>,
    /// Reply released by the last write, waiting out its delay
    pending: Option<ScriptedReply>,
    open: bool,
    fail_reopen: bool,
    read_error: Option<std::io::ErrorKind>,
    /// Writes still to be refused with "not open" while the port looks open
    rejected_writes: usize,
    /// Port goes away right after the next write
    drop_after_write: bool,
    reads: usize,
    reopens: usize,
    closed: bool,
}

impl MockTransport {
    /// Create a new, open mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                open: true,
                ..Default::default()
            })),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Queue a reply delivered after the next write
    pub fn script_reply(&self, data: &[u8]) {
        self.script_delayed_reply(data, 0);
    }

    /// Queue a reply delivered after the next write and `delay_reads` empty reads
    pub fn script_delayed_reply(&self, data: &[u8], delay_reads: usize) {
        self.inner.lock().scripted.push_back(ScriptedReply {
            data: data.to_vec(),
            delay_reads,
        });
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        self.inner.lock().write_buffer.clone()
    }

    /// Simulate the port dropping (or coming back)
    pub fn set_open(&self, open: bool) {
        self.inner.lock().open = open;
    }

    /// Make every reopen attempt fail
    pub fn fail_reopen(&self, fail: bool) {
        self.inner.lock().fail_reopen = fail;
    }

    /// Refuse the next `count` writes with "not open" even though the port
    /// reports itself open
    pub fn reject_writes(&self, count: usize) {
        self.inner.lock().rejected_writes = count;
    }

    /// Lose the port right after the next write, while the reply is awaited
    pub fn drop_after_write(&self) {
        self.inner.lock().drop_after_write = true;
    }

    /// Make every read fail with the given I/O error
    pub fn fail_reads(&self, kind: std::io::ErrorKind) {
        self.inner.lock().read_error = Some(kind);
    }

    /// Number of read calls served
    pub fn read_count(&self) -> usize {
        self.inner.lock().reads
    }

    /// Number of successful reopens
    pub fn reopen_count(&self) -> usize {
        self.inner.lock().reopens
    }

    /// Has `close` been called?
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(Error::NotOpen);
        }
        if let Some(kind) = inner.read_error {
            return Err(Error::Io(std::io::Error::new(kind, "mock read failure")));
        }
        inner.reads += 1;

        if let Some(mut pending) = inner.pending.take() {
            if pending.delay_reads == 0 {
                inner.read_buffer.extend(pending.data);
            } else {
                pending.delay_reads -= 1;
                inner.pending = Some(pending);
            }
        }

        let available = inner.read_buffer.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..available)) {
            *slot = byte;
        }

        Ok(available)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(Error::NotOpen);
        }
        if inner.rejected_writes > 0 {
            inner.rejected_writes -= 1;
            return Err(Error::NotOpen);
        }
        inner.write_buffer.extend_from_slice(data);
        if let Some(reply) = inner.scripted.pop_front() {
            inner.pending = Some(reply);
        }
        if inner.drop_after_write {
            inner.drop_after_write = false;
            inner.open = false;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    fn reopen(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_reopen {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "mock device unplugged",
            )));
        }
        inner.open = true;
        inner.closed = false;
        inner.reopens += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.read_buffer.clear();
        inner.pending = None;
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock();
        inner.open = false;
        inner.closed = true;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
