//! Error taxonomy for the client core.
//!
//! Every failure here is terminal at the point of detection: it produces
//! at most one user-visible notification and leaves the system in a
//! well-defined pre-authenticated or pre-sync state. Nothing crosses the
//! bootstrap/ledger boundary as a panic or a double-fired effect.

use thiserror::Error;

use crate::{bootstrap::BootstrapState, connection::ChannelState};

/// Access token could not be parsed into its claim structure.
///
/// Not retried: the token is unusable and bootstrap takes the failure
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// Token is not a dot-separated claim structure.
    #[error("access token is not a dot-separated claim structure")]
    Structure,

    /// Claims segment is not valid unpadded base64url.
    #[error("claims segment is not valid base64url: {0}")]
    Encoding(String),

    /// Claims payload is not JSON carrying a known role.
    #[error("claims payload is malformed: {0}")]
    Claims(String),
}

/// The external credential exchange failed.
///
/// Carries the human-readable message from the exchange service, if it
/// provided one. Never retried automatically; the user re-triggers the
/// whole flow by re-initiating login.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("credential exchange failed: {}", message.as_deref().unwrap_or("no detail"))]
pub struct ExchangeError {
    /// Message supplied by the exchange service.
    pub message: Option<String>,
}

/// Errors from the bootstrap state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// A continuation was invoked in a state that does not accept it.
    #[error("operation {operation} is invalid in state {state:?}")]
    InvalidState {
        /// State the machine was in.
        state: BootstrapState,
        /// Operation that was attempted.
        operation: &'static str,
    },
}

/// Errors from the channel connection machinery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// A lifecycle transition was invoked in a state that does not accept
    /// it.
    #[error("operation {operation} is invalid in state {state:?}")]
    InvalidState {
        /// State the connection was in.
        state: ChannelState,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// Transport-level failure reported by the channel implementation.
    #[error("transport: {0}")]
    Transport(String),
}
