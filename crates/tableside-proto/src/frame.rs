//! Event frame encoding.
//!
//! A frame is a 1-byte opcode followed by a CBOR payload. The opcode is
//! enough to route and log an event without touching the payload; the
//! payload shape is fixed per opcode.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{
    errors::{ProtocolError, Result},
    events::ChannelEvent,
};

/// Maximum payload size accepted by the decoder.
///
/// A payment batch for one table is at most a few kilobytes; 1 MB leaves
/// generous headroom while bounding what a misbehaving push source can
/// make us buffer.
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Event opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Opcode {
    /// Channel established.
    Connect = 0x01,
    /// Channel lost.
    Disconnect = 0x02,
    /// Single order line updated.
    OrderUpdated = 0x03,
    /// Payment batch settled.
    PaymentCompleted = 0x04,
}

impl Opcode {
    /// Parse an opcode byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Connect),
            0x02 => Some(Self::Disconnect),
            0x03 => Some(Self::OrderUpdated),
            0x04 => Some(Self::PaymentCompleted),
            _ => None,
        }
    }

    /// Wire value of this opcode.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Encoder/decoder for channel events.
///
/// Stateless; both directions live here so the wire layout has a single
/// owner.
#[derive(Debug, Clone, Copy)]
pub struct EventFrame;

impl EventFrame {
    /// Encode an event into opcode + CBOR payload.
    pub fn encode(event: &ChannelEvent) -> Result<Bytes> {
        let mut buf = vec![event.opcode().to_u8()];

        match event {
            ChannelEvent::Connect => {},
            ChannelEvent::Disconnect { reason } => write_cbor(reason, &mut buf)?,
            ChannelEvent::OrderUpdated(line) => write_cbor(line, &mut buf)?,
            ChannelEvent::PaymentCompleted(payload) => write_cbor(payload, &mut buf)?,
        }

        Ok(Bytes::from(buf))
    }

    /// Decode a frame back into an event.
    pub fn decode(frame: &[u8]) -> Result<ChannelEvent> {
        let (&opcode_byte, body) = frame
            .split_first()
            .ok_or(ProtocolError::Truncated { len: frame.len() })?;

        let opcode =
            Opcode::from_u8(opcode_byte).ok_or(ProtocolError::UnknownOpcode(opcode_byte))?;

        if body.len() > MAX_PAYLOAD_BYTES {
            return Err(ProtocolError::PayloadTooLarge {
                len: body.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }

        match opcode {
            Opcode::Connect => {
                if body.is_empty() {
                    Ok(ChannelEvent::Connect)
                } else {
                    Err(ProtocolError::Malformed("connect carries no payload".into()))
                }
            },
            Opcode::Disconnect => Ok(ChannelEvent::Disconnect { reason: read_cbor(body)? }),
            Opcode::OrderUpdated => Ok(ChannelEvent::OrderUpdated(read_cbor(body)?)),
            Opcode::PaymentCompleted => Ok(ChannelEvent::PaymentCompleted(read_cbor(body)?)),
        }
    }
}

fn write_cbor<T: serde::Serialize>(value: &T, buf: &mut Vec<u8>) -> Result<()> {
    ciborium::ser::into_writer(value, buf)
        .map_err(|e| ProtocolError::Malformed(e.to_string()))
}

fn read_cbor<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    ciborium::de::from_reader(body).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
