//! Stateless mapping between message values and payload bytes.
//!
//! [`MessageCodec`] is the seam between the session controller and the wire
//! format. [`JsonCodec`] is the default: one JSON object per payload, tagged
//! with its message type. Decoding never panics; every malformed payload is
//! reported as a [`ProtocolError`].

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::protocol::{Channel, Inbound, InboundKind, MAX_MESSAGE_SIZE, Outbound, ProtocolError};

/// Encodes and decodes message payloads.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait MessageCodec {
    /// Encode a simulator-to-agent message.
    fn encode_outbound(&self, msg: &Outbound) -> Result<Vec<u8>, ProtocolError>;

    /// Decode an agent-to-simulator message received on `channel`.
    ///
    /// Fails if the payload is malformed or its kind does not travel on
    /// `channel`.
    fn decode_inbound(&self, channel: Channel, bytes: &[u8]) -> Result<Inbound, ProtocolError>;

    /// Encode an agent-to-simulator message (agent side).
    fn encode_inbound(&self, msg: &Inbound) -> Result<Vec<u8>, ProtocolError>;

    /// Decode a simulator-to-agent message received on `channel` (agent side).
    fn decode_outbound(&self, channel: Channel, bytes: &[u8]) -> Result<Outbound, ProtocolError>;

    /// Decode a payload that must be of one specific inbound kind.
    fn decode_expected(&self, kind: InboundKind, bytes: &[u8]) -> Result<Inbound, ProtocolError> {
        let msg = self.decode_inbound(kind.channel(), bytes)?;
        if msg.kind() == kind {
            Ok(msg)
        } else {
            Err(ProtocolError::UnexpectedKind {
                expected: kind.name(),
                got: msg.kind().name(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// Tagged-JSON codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub const fn new() -> Self {
        Self
    }
}

impl MessageCodec for JsonCodec {
    fn encode_outbound(&self, msg: &Outbound) -> Result<Vec<u8>, ProtocolError> {
        encode(msg)
    }

    fn decode_inbound(&self, channel: Channel, bytes: &[u8]) -> Result<Inbound, ProtocolError> {
        let msg: Inbound = decode(bytes)?;
        if msg.channel() != channel {
            return Err(ProtocolError::WrongChannel {
                channel,
                got: msg.kind().name(),
            });
        }
        Ok(msg)
    }

    fn encode_inbound(&self, msg: &Inbound) -> Result<Vec<u8>, ProtocolError> {
        encode(msg)
    }

    fn decode_outbound(&self, channel: Channel, bytes: &[u8]) -> Result<Outbound, ProtocolError> {
        let msg: Outbound = decode(bytes)?;
        if msg.channel() != channel {
            return Err(ProtocolError::WrongChannel {
                channel,
                got: msg.type_name(),
            });
        }
        Ok(msg)
    }
}

fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(msg)?;
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(payload)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    if bytes.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: bytes.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(serde_json::from_slice(bytes)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
