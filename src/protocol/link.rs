//! Synchronous request/response exchange with the controller.
//!
//! One exchange = write one sensor byte, then poll for the reply. The link owns
//! the transport exclusively.
//!
//! # Reconnection
//!
//! A transport that reports "not open" (before the write, on the write, or
//! while polling) gets exactly one reopen attempt. If that fails the error is
//! fatal and returned as [`Error::TransportClosed`]. Every other transport
//! error is fatal as well.

use super::poller::{CancelToken, PollOutcome, ReplyPoller};
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Outcome of one exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exchange {
    /// Raw reply bytes
    Reply(Vec<u8>),
    /// Poll budget exhausted
    NoData { attempts: u32 },
    /// Port dropped while waiting and was reopened; the reply is lost
    Reconnected,
    /// Stop requested while waiting
    Cancelled,
}

pub struct Link {
    transport: Box<dyn Transport>,
    poller: ReplyPoller,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>, poller: ReplyPoller) -> Self {
        Self { transport, poller }
    }

    /// Send one sensor frame and wait for the reply.
    ///
    /// Input left over from an earlier cycle is dropped before the write, so
    /// only a reply to this frame is ever returned.
    pub fn exchange(&mut self, frame: u8, cancel: &CancelToken) -> Result<Exchange> {
        let mut reopened = false;
        if !self.transport.is_open() {
            self.reopen_once(&mut reopened)?;
        }

        if let Err(e) = self.transport.clear() {
            log::warn!("Failed to drop stale input: {}", e);
        }

        match self.send(frame) {
            Err(Error::NotOpen) => {
                self.reopen_once(&mut reopened)?;
                self.send(frame)?;
            }
            other => other?,
        }
        log::debug!("Sent data: {:04b}", frame);

        match self.poller.wait(&mut *self.transport, cancel) {
            Ok(PollOutcome::Reply(data)) => {
                log::debug!("Received data: {:?}", String::from_utf8_lossy(&data));
                Ok(Exchange::Reply(data))
            }
            Ok(PollOutcome::TimedOut { attempts }) => {
                log::warn!("No data received after {} polls", attempts);
                Ok(Exchange::NoData { attempts })
            }
            Ok(PollOutcome::Cancelled) => Ok(Exchange::Cancelled),
            Err(Error::NotOpen) => {
                self.reopen_once(&mut reopened)?;
                Ok(Exchange::Reconnected)
            }
            Err(e) => Err(e),
        }
    }

    fn send(&mut self, frame: u8) -> Result<()> {
        let written = self.transport.write(&[frame])?;
        if written != 1 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "sensor frame not written",
            )));
        }
        self.transport.flush()
    }

    /// At most one reopen per exchange; a second "not open" is fatal
    fn reopen_once(&mut self, reopened: &mut bool) -> Result<()> {
        if *reopened {
            return Err(Error::TransportClosed("port closed again after reopen".to_string()));
        }
        *reopened = true;

        log::warn!("Serial port is not open, attempting reopen");
        match self.transport.reopen() {
            Ok(()) => {
                log::info!("Serial port reopened");
                Ok(())
            }
            Err(e) => Err(Error::TransportClosed(format!("reopen failed: {}", e))),
        }
    }

    /// Release the transport
    pub fn close(&mut self) {
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::poller::cancel_pair;
    use crate::transport::MockTransport;
    use std::time::Duration;

    fn link(mock: &MockTransport) -> Link {
        Link::new(
            Box::new(mock.clone()),
            ReplyPoller::new(Duration::from_millis(1), 10),
        )
    }

    #[test]
    fn test_exchange_reply() {
        let mock = MockTransport::new();
        mock.script_reply(b"1");
        let (_handle, token) = cancel_pair();

        let exchange = link(&mock).exchange(0b1010, &token).unwrap();
        assert_eq!(exchange, Exchange::Reply(b"1".to_vec()));
        assert_eq!(mock.get_written(), vec![0b1010]);
    }

    #[test]
    fn test_exchange_no_data() {
        let mock = MockTransport::new();
        let (_handle, token) = cancel_pair();

        let exchange = link(&mock).exchange(0, &token).unwrap();
        assert_eq!(exchange, Exchange::NoData { attempts: 10 });
        assert_eq!(mock.read_count(), 10);
    }

    #[test]
    fn test_reopens_closed_port_once() {
        let mock = MockTransport::new();
        mock.set_open(false);
        mock.script_reply(b"2");
        let (_handle, token) = cancel_pair();

        let exchange = link(&mock).exchange(0, &token).unwrap();
        assert_eq!(exchange, Exchange::Reply(b"2".to_vec()));
        assert_eq!(mock.reopen_count(), 1);
    }

    #[test]
    fn test_failed_reopen_is_fatal() {
        let mock = MockTransport::new();
        mock.set_open(false);
        mock.fail_reopen(true);
        let (_handle, token) = cancel_pair();

        let err = link(&mock).exchange(0, &token).unwrap_err();
        assert!(matches!(err, Error::TransportClosed(_)));
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let mock = MockTransport::new();
        mock.fail_reads(std::io::ErrorKind::PermissionDenied);
        let (_handle, token) = cancel_pair();

        let err = link(&mock).exchange(0, &token).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_second_not_open_is_fatal() {
        let mock = MockTransport::new();
        mock.set_open(false);
        mock.reject_writes(usize::MAX);
        let (_handle, token) = cancel_pair();

        let err = link(&mock).exchange(0, &token).unwrap_err();
        assert!(matches!(err, Error::TransportClosed(_)));
        assert_eq!(mock.reopen_count(), 1);
    }

    #[test]
    fn test_rejected_write_reopens_and_resends() {
        let mock = MockTransport::new();
        mock.reject_writes(1);
        mock.script_reply(b"3");
        let (_handle, token) = cancel_pair();

        let exchange = link(&mock).exchange(0b0100, &token).unwrap();
        assert_eq!(exchange, Exchange::Reply(b"3".to_vec()));
        assert_eq!(mock.reopen_count(), 1);
        assert_eq!(mock.get_written(), vec![0b0100]);
    }

    #[test]
    fn test_port_lost_while_waiting_reconnects() {
        let mock = MockTransport::new();
        mock.drop_after_write();
        mock.script_reply(b"1");
        let (_handle, token) = cancel_pair();

        let exchange = link(&mock).exchange(0, &token).unwrap();
        assert_eq!(exchange, Exchange::Reconnected);
        assert_eq!(mock.reopen_count(), 1);
        assert!(mock.is_open());
    }

    #[test]
    fn test_stale_reply_is_not_carried_over() {
        let mock = MockTransport::new();
        // Arrives two polls after the first cycle has given up
        mock.script_delayed_reply(b"1", 12);
        let (_handle, token) = cancel_pair();
        let mut link = link(&mock);

        assert_eq!(
            link.exchange(0, &token).unwrap(),
            Exchange::NoData { attempts: 10 }
        );
        assert_eq!(
            link.exchange(0, &token).unwrap(),
            Exchange::NoData { attempts: 10 }
        );
        assert_eq!(mock.get_written(), vec![0, 0]);
    }

    #[test]
    fn test_cancelled_exchange() {
        let mock = MockTransport::new();
        let (mut handle, token) = cancel_pair();
        handle.cancel();

        let exchange = link(&mock).exchange(0, &token).unwrap();
        assert_eq!(exchange, Exchange::Cancelled);
    }
}
