//! tandem-services — the rendezvous engine.
//!
//! Connection registry, FIFO waiting queue, session table and the relay that
//! carries negotiation payloads between the two members of a session. The
//! [`Switchboard`] ties them together behind one owned handle.

pub mod matchmaker;
pub mod queue;
pub mod registry;
pub mod relay;
pub mod session;
pub mod stats;
pub mod switchboard;

pub use matchmaker::{LeaveOutcome, Matchmaker, PairingOutcome};
pub use queue::WaitingQueue;
pub use registry::{ConnState, Connection, ConnectionRegistry};
pub use relay::{MessageRelay, RelayOutcome};
pub use session::{Session, SessionManager};
pub use stats::{Stats, StatsSnapshot};
pub use switchboard::Switchboard;
