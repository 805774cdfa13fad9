//! Controller protocol
//!
//! Half-duplex, one byte out, one reply in:
//!
//! ```text
//! host                         controller
//!  │ ── sensor byte (4 bits) ──▶ │
//!  │ ◀── ASCII command digit ─── │
//! ```
//!
//! - [`frame`]: byte encoding both ways
//! - [`poller`]: cancellable reply polling
//! - [`link`]: one synchronous exchange over an owned transport
//! - [`session_loop`]: worker thread + per-frame state machine

pub mod frame;
pub mod link;
pub mod poller;
pub mod session_loop;

pub use frame::{Reply, decode_reply, decode_sensors, encode_sensors};
pub use link::{Exchange, Link};
pub use poller::{CancelHandle, CancelToken, PollOutcome, ReplyPoller, cancel_pair};
pub use session_loop::{CycleOutcome, LinkState, LinkTiming, ProtocolLoop};
