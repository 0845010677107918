//! Channel transport contract and the in-process loopback implementation.
//!
//! A [`Transport`] moves opaque payloads over the three logical channels.
//! Both operations return immediately: `send` queues the payload and gives no
//! delivery confirmation, `try_read` yields `None` when no complete payload is
//! buffered. Payloads sent on one channel arrive in send order; there is no
//! ordering across channels.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, warn};

use crate::codec::{JsonCodec, MessageCodec};
use crate::protocol::{Channel, Inbound, Outbound, ProtocolError};

/// Non-blocking message transport over the world-info, write and read channels.
pub trait Transport {
    /// Queue `payload` for delivery on `channel`. Never blocks.
    fn send(&mut self, channel: Channel, payload: Vec<u8>);

    /// Take the next complete payload buffered on `channel`, if any. Never blocks.
    fn try_read(&mut self, channel: Channel) -> Option<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, channel: Channel, payload: Vec<u8>) {
        (**self).send(channel, payload);
    }

    fn try_read(&mut self, channel: Channel) -> Option<Vec<u8>> {
        (**self).try_read(channel)
    }
}

// ---------------------------------------------------------------------------
// MemoryTransport
// ---------------------------------------------------------------------------

/// Simulator end of an in-process channel pair. See [`memory_pair`].
#[derive(Debug)]
pub struct MemoryTransport {
    world_in: Receiver<Vec<u8>>,
    read_in: Receiver<Vec<u8>>,
    world_out: Sender<Vec<u8>>,
    write_out: Sender<Vec<u8>>,
}

/// Agent end of an in-process channel pair. See [`memory_pair`].
#[derive(Debug)]
pub struct MemoryClient {
    world_in: Sender<Vec<u8>>,
    read_in: Sender<Vec<u8>>,
    world_out: Receiver<Vec<u8>>,
    write_out: Receiver<Vec<u8>>,
    codec: JsonCodec,
}

/// Create a connected simulator/agent pair backed by in-process queues.
///
/// # Example
///
/// ```
/// use simlink_server::protocol::Channel;
/// use simlink_server::transport::{Transport, memory_pair};
///
/// let (mut transport, client) = memory_pair();
/// assert!(transport.try_read(Channel::Read).is_none());
///
/// client.inject(Channel::Read, b"payload".to_vec());
/// assert_eq!(transport.try_read(Channel::Read), Some(b"payload".to_vec()));
/// ```
pub fn memory_pair() -> (MemoryTransport, MemoryClient) {
    let (world_in_tx, world_in_rx) = mpsc::channel();
    let (read_in_tx, read_in_rx) = mpsc::channel();
    let (world_out_tx, world_out_rx) = mpsc::channel();
    let (write_out_tx, write_out_rx) = mpsc::channel();

    (
        MemoryTransport {
            world_in: world_in_rx,
            read_in: read_in_rx,
            world_out: world_out_tx,
            write_out: write_out_tx,
        },
        MemoryClient {
            world_in: world_in_tx,
            read_in: read_in_tx,
            world_out: world_out_rx,
            write_out: write_out_rx,
            codec: JsonCodec::new(),
        },
    )
}

impl Transport for MemoryTransport {
    fn send(&mut self, channel: Channel, payload: Vec<u8>) {
        let tx = match channel {
            Channel::WorldInfo => &self.world_out,
            Channel::Write => &self.write_out,
            Channel::Read => {
                warn!(%channel, "send on inbound-only channel ignored");
                return;
            }
        };
        if tx.send(payload).is_err() {
            debug!(%channel, "peer gone, payload dropped");
        }
    }

    fn try_read(&mut self, channel: Channel) -> Option<Vec<u8>> {
        let rx = match channel {
            Channel::WorldInfo => &self.world_in,
            Channel::Read => &self.read_in,
            Channel::Write => {
                warn!(%channel, "read on outbound-only channel ignored");
                return None;
            }
        };
        rx.try_recv().ok()
    }
}

impl MemoryClient {
    /// Push raw bytes as if the agent had sent them. Returns `false` if
    /// `channel` is not inbound or the simulator end is gone.
    pub fn inject(&self, channel: Channel, payload: Vec<u8>) -> bool {
        let tx = match channel {
            Channel::WorldInfo => &self.world_in,
            Channel::Read => &self.read_in,
            Channel::Write => return false,
        };
        tx.send(payload).is_ok()
    }

    /// Encode `msg` and push it on its channel.
    pub fn send(&self, msg: &Inbound) -> Result<bool, ProtocolError> {
        let payload = self.codec.encode_inbound(msg)?;
        Ok(self.inject(msg.channel(), payload))
    }

    /// Take the next raw payload the simulator sent on `channel`.
    pub fn take_raw(&self, channel: Channel) -> Option<Vec<u8>> {
        let rx = match channel {
            Channel::WorldInfo => &self.world_out,
            Channel::Write => &self.write_out,
            Channel::Read => return None,
        };
        rx.try_recv().ok()
    }

    /// Take and decode the next message the simulator sent on `channel`.
    pub fn recv(&self, channel: Channel) -> Option<Result<Outbound, ProtocolError>> {
        self.take_raw(channel)
            .map(|payload| self.codec.decode_outbound(channel, &payload))
    }

    /// Take every message currently buffered on `channel`, in send order.
    pub fn drain(&self, channel: Channel) -> Vec<Result<Outbound, ProtocolError>> {
        std::iter::from_fn(|| self.recv(channel)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
