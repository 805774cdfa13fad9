//! Cancellable poll-with-timeout for controller replies.
//!
//! The poller checks the transport, and between checks waits on a
//! [`CancelToken`] instead of sleeping, so a stop request ends the wait at once
//! rather than after the remaining retry budget.

use crate::error::Result;
use crate::transport::Transport;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Reply buffer size; the controller answers a handful of ASCII bytes
const REPLY_BUFFER_SIZE: usize = 64;

/// Cancellation source. Dropping it (or calling [`cancel`](Self::cancel)) cancels
/// every token cloned from it.
pub struct CancelHandle {
    sender: Option<Sender<()>>,
}

/// Cancellation observer
#[derive(Clone)]
pub struct CancelToken {
    receiver: Receiver<()>,
}

/// Create a linked handle/token pair
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (sender, receiver) = crossbeam_channel::bounded(0);
    (
        CancelHandle {
            sender: Some(sender),
        },
        CancelToken { receiver },
    )
}

impl CancelHandle {
    pub fn cancel(&mut self) {
        self.sender = None;
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Wait up to `timeout`; returns `true` if cancelled meanwhile
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            // Nothing is ever sent; any wake-up is the sender going away
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

/// Result of waiting for a reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Reply(Vec<u8>),
    TimedOut { attempts: u32 },
    Cancelled,
}

/// Bounded reply poller
#[derive(Clone, Copy, Debug)]
pub struct ReplyPoller {
    interval: Duration,
    max_attempts: u32,
}

impl ReplyPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Poll `transport` up to `max_attempts` times, `interval` apart.
    ///
    /// Whatever bytes the first successful read returns are the reply.
    /// Transport errors are returned as-is; the caller decides whether they are
    /// recoverable.
    pub fn wait<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        cancel: &CancelToken,
    ) -> Result<PollOutcome> {
        let mut buffer = [0u8; REPLY_BUFFER_SIZE];

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                return Ok(PollOutcome::Cancelled);
            }

            let n = transport.read(&mut buffer)?;
            if n > 0 {
                log::trace!("Reply after {} poll(s)", attempt);
                return Ok(PollOutcome::Reply(buffer[..n].to_vec()));
            }

            if cancel.wait(self.interval) {
                return Ok(PollOutcome::Cancelled);
            }
        }

        Ok(PollOutcome::TimedOut {
            attempts: self.max_attempts,
        })
    }
}
