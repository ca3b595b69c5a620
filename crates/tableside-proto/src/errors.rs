//! Protocol error types.

use thiserror::Error;

/// Errors produced while encoding or decoding event frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame was empty or shorter than the opcode byte.
    #[error("frame truncated: {len} bytes")]
    Truncated {
        /// Number of bytes actually present.
        len: usize,
    },

    /// Opcode byte does not name a known event.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),

    /// Payload exceeds the size cap.
    #[error("payload of {len} bytes exceeds cap of {max}")]
    PayloadTooLarge {
        /// Actual payload length.
        len: usize,
        /// Maximum allowed payload length.
        max: usize,
    },

    /// CBOR payload could not be decoded into the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;
