//! Session layer between a real-time simulator and an external control agent.
//!
//! - [`protocol`]: message sum types, channel routing table, [`ProtocolError`]
//! - [`codec`]: [`MessageCodec`] trait and the default [`JsonCodec`]
//! - [`transport`]: non-blocking [`Transport`] contract and the in-process
//!   [`MemoryTransport`] pair
//! - [`tcp`]: [`TcpTransport`], one listener and worker thread per channel
//! - [`framing`]: length-prefixed wire format (4-byte LE `u32` + payload)
//! - [`state_machine`]: [`PhaseTracker`] following the negotiation cycle
//! - [`server`]: [`SessionController`], the only type a tick loop talks to
//! - [`client`]: [`SimClient`], a blocking agent-side TCP client
//!
//! A session negotiates a mode and scene on the world-info channel, then
//! episode bounds, then exchanges control commands and rewards every tick.

pub mod client;
pub mod codec;
pub mod framing;
pub mod protocol;
pub mod server;
pub mod state_machine;
pub mod tcp;
pub mod transport;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use client::SimClient;
pub use codec::{JsonCodec, MessageCodec};
pub use protocol::{Channel, Inbound, InboundKind, MAX_MESSAGE_SIZE, Outbound, ProtocolError};
pub use server::{Polled, SessionController, SessionStats};
pub use state_machine::{PhaseTracker, SessionPhase};
pub use tcp::TcpTransport;
pub use transport::{MemoryClient, MemoryTransport, Transport, memory_pair};

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Channel, Inbound, JsonCodec, MemoryClient, MemoryTransport, MessageCodec, Outbound,
        Polled, ProtocolError, SessionController, SessionPhase, SessionStats, SimClient,
        TcpTransport, Transport, memory_pair,
    };
}
