//! Wire format for the tableside guest ordering protocol.
//!
//! Push events consist of a 1-byte opcode followed by a variable-length
//! CBOR payload. The opcode lets the channel route and log events without
//! deserializing payloads; the payload carries the actual order data.
//!
//! Everything here is plain data: the types are shared verbatim between
//! the event channel, the order ledger, and the simulation harness, so
//! they carry no behavior beyond encoding and a few status predicates.
//!
//! # Security
//!
//! We enforce a 1 MB payload limit to prevent memory exhaustion from a
//! misbehaving push source. Decode failures are typed errors, never
//! panics.
#![forbid(unsafe_code)]

pub mod errors;
pub mod events;
pub mod frame;
pub mod order;
pub mod role;

pub use errors::{ProtocolError, Result};
pub use events::{ChannelEvent, EventTopic};
pub use frame::{EventFrame, Opcode};
pub use order::{DishSnapshot, OrderId, OrderLine, OrderStatus, PayerInfo, PaymentPayload};
pub use role::Role;
