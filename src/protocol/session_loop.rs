//! Protocol loop driving the controller link from the control thread.
//!
//! # Thread Model
//!
//! ```text
//! ┌──────────────────┐  sensor byte   ┌──────────────────┐
//! │ Control thread   │ ─────────────▶ │ setu-link worker │
//! │ tick() per frame │                │ owns Transport   │
//! │ owns World       │ ◀───────────── │ write + poll     │
//! └──────────────────┘  WorkerEvent   └──────────────────┘
//! ```
//!
//! The worker owns the transport and is the only place that blocks (settle
//! delay, reply polling). All world mutation happens in [`ProtocolLoop::tick`] on
//! the control thread, which never blocks. At most one cycle is in flight.
//!
//! # State Machine
//!
//! ```text
//! Idle ──start()──▶ Connecting ──settled──▶ Cycling
//!   ▲                   │                      │
//!   └──── (restart) ─── Closed ◀── stop() / fatal error
//! ```
//!
//! A timed-out cycle does not leave `Cycling`; the next tick starts a new one.

use super::frame::{Reply, decode_reply, encode_sensors};
use super::link::{Exchange, Link};
use super::poller::{CancelHandle, CancelToken, ReplyPoller, cancel_pair};
use crate::config::ProtocolConfig;
use crate::core::types::Command;
use crate::core::world::{Applied, World};
use crate::error::{Error, Result};
use crate::transport::TransportFactory;
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Link timing parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkTiming {
    /// Pause after opening before the first frame
    pub settle: Duration,
    /// Spacing between reply polls
    pub poll_interval: Duration,
    /// Polls before a cycle gives up
    pub max_poll_attempts: u32,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            poll_interval: Duration::from_millis(800),
            max_poll_attempts: 10,
        }
    }
}

impl From<&ProtocolConfig> for LinkTiming {
    fn from(config: &ProtocolConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.settle_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// No transport attached
    Idle,
    /// Transport opening / settling
    Connecting,
    /// Steady-state request/response
    Cycling,
    /// Stopped or failed
    Closed,
}

/// Result of one completed (or skipped) cycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No robot placed; nothing sent
    Skipped,
    /// Reply decoded and applied
    Command { command: Command, applied: Applied },
    /// Reply without a known command
    Ignored(Vec<u8>),
    /// No reply within the poll budget
    NoData { attempts: u32 },
    /// Port dropped mid-cycle and was reopened
    Reconnected,
    /// Wait interrupted by stop
    Cancelled,
}

enum WorkerEvent {
    Connected,
    Exchanged(Exchange),
    Closed(String),
}

struct Worker {
    requests: Sender<u8>,
    events: Receiver<WorkerEvent>,
    cancel: CancelHandle,
    handle: JoinHandle<()>,
}

pub struct ProtocolLoop {
    state: LinkState,
    worker: Option<Worker>,
    in_flight: bool,
    last_error: Option<String>,
}

impl ProtocolLoop {
    pub fn new() -> Self {
        Self {
            state: LinkState::Idle,
            worker: None,
            in_flight: false,
            last_error: None,
        }
    }

    #[inline]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Is a frame awaiting its reply?
    #[inline]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Reason the link last closed on its own
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Idle/Closed → Connecting: spawn the link worker
    pub fn start(&mut self, factory: TransportFactory, timing: LinkTiming) -> Result<()> {
        if matches!(self.state, LinkState::Connecting | LinkState::Cycling) {
            return Err(Error::InvalidState("link already started"));
        }

        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let (cancel, token) = cancel_pair();

        let handle = thread::Builder::new()
            .name("setu-link".to_string())
            .spawn(move || worker_loop(factory, timing, request_rx, event_tx, token))
            .map_err(|e| Error::Other(format!("Failed to spawn link worker: {}", e)))?;

        self.worker = Some(Worker {
            requests: request_tx,
            events: event_rx,
            cancel,
            handle,
        });
        self.state = LinkState::Connecting;
        self.in_flight = false;
        self.last_error = None;
        log::info!("Link starting (settle {:?})", timing.settle);
        Ok(())
    }

    /// Advance the loop once; never blocks.
    ///
    /// Returns the outcome of the cycle that completed during this tick, or
    /// `Skipped` when a cycle was due but no robot is placed.
    pub fn tick(&mut self, world: &mut World) -> Option<CycleOutcome> {
        let Some(worker) = &self.worker else {
            return None;
        };
        // Checked first: once finished, all of the worker's events are queued
        let finished = worker.handle.is_finished();
        let events: Vec<WorkerEvent> = worker.events.try_iter().collect();

        let mut outcome = None;
        for event in events {
            match event {
                WorkerEvent::Connected => {
                    log::info!("Controller link ready");
                    self.state = LinkState::Cycling;
                }
                WorkerEvent::Exchanged(exchange) => {
                    self.in_flight = false;
                    outcome = Some(resolve(exchange, world));
                }
                WorkerEvent::Closed(reason) => {
                    log::error!("Controller link closed: {}", reason);
                    self.last_error = Some(reason);
                    self.shutdown_worker();
                    return outcome;
                }
            }
        }

        if finished && self.state != LinkState::Closed {
            log::error!("Link worker exited unexpectedly");
            self.last_error = Some("link worker exited".to_string());
            self.shutdown_worker();
            return outcome;
        }

        if self.state == LinkState::Cycling && !self.in_flight {
            match world.read_sensors() {
                Some(frame) => self.submit(encode_sensors(&frame)),
                None if outcome.is_none() => outcome = Some(CycleOutcome::Skipped),
                None => {}
            }
        }

        outcome
    }

    fn submit(&mut self, frame: u8) {
        let Some(worker) = &self.worker else {
            return;
        };
        if worker.requests.send(frame).is_ok() {
            self.in_flight = true;
        } else {
            log::error!("Link worker gone, closing");
            self.last_error = Some("link worker gone".to_string());
            self.shutdown_worker();
        }
    }

    /// Any → Closed. Interrupts an in-flight wait and joins the worker.
    pub fn stop(&mut self) -> Result<()> {
        let joined = self.join_worker();
        if self.state != LinkState::Idle || joined.is_err() {
            self.state = LinkState::Closed;
        }
        joined
    }

    fn shutdown_worker(&mut self) {
        if let Err(e) = self.join_worker() {
            log::error!("Link worker shutdown: {}", e);
        }
        self.state = LinkState::Closed;
    }

    fn join_worker(&mut self) -> Result<()> {
        self.in_flight = false;
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let Worker {
            requests,
            events,
            mut cancel,
            handle,
        } = worker;

        cancel.cancel();
        drop(requests);
        drop(events);
        handle.join().map_err(|_| Error::ThreadPanic)?;
        log::info!("Link stopped");
        Ok(())
    }
}

impl Default for ProtocolLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProtocolLoop {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Turn a finished exchange into world changes
fn resolve(exchange: Exchange, world: &mut World) -> CycleOutcome {
    match exchange {
        Exchange::Reply(data) => match decode_reply(&data) {
            Reply::Command(command) => {
                let applied = world.apply(command);
                match applied {
                    Applied::NoRobot => {
                        log::debug!("Command {:?} dropped: no robot placed", command)
                    }
                    _ => log::debug!("Command {:?}: {:?}", command, applied),
                }
                CycleOutcome::Command { command, applied }
            }
            Reply::Unknown(byte) => {
                log::debug!("Ignoring unrecognized reply byte {:#04x}", byte);
                CycleOutcome::Ignored(data)
            }
            Reply::Empty => {
                log::debug!("Ignoring blank reply");
                CycleOutcome::Ignored(data)
            }
        },
        Exchange::NoData { attempts } => CycleOutcome::NoData { attempts },
        Exchange::Reconnected => CycleOutcome::Reconnected,
        Exchange::Cancelled => CycleOutcome::Cancelled,
    }
}

fn worker_loop(
    factory: TransportFactory,
    timing: LinkTiming,
    requests: Receiver<u8>,
    events: Sender<WorkerEvent>,
    cancel: CancelToken,
) {
    let transport = match factory() {
        Ok(transport) => transport,
        Err(e) => {
            let _ = events.send(WorkerEvent::Closed(format!("open failed: {}", e)));
            return;
        }
    };
    let mut link = Link::new(
        transport,
        ReplyPoller::new(timing.poll_interval, timing.max_poll_attempts),
    );

    // Many USB-serial controllers reset when the port opens
    if cancel.wait(timing.settle) {
        link.close();
        log::info!("Link cancelled while settling");
        return;
    }
    if events.send(WorkerEvent::Connected).is_err() {
        link.close();
        return;
    }

    while let Ok(frame) = requests.recv() {
        match link.exchange(frame, &cancel) {
            Ok(Exchange::Cancelled) => break,
            Ok(exchange) => {
                if events.send(WorkerEvent::Exchanged(exchange)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = events.send(WorkerEvent::Closed(e.to_string()));
                break;
            }
        }
    }

    link.close();
    log::info!("Link worker exiting");
}
