//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific
//! I/O implementations. A production frontend implements it with real
//! network calls; the simulation harness implements it with scripted
//! outcomes, and the generic [`crate::Runtime`] handles all orchestration
//! either way.

use std::future::Future;

use tableside_core::error::ExchangeError;
use tableside_proto::{ChannelEvent, OrderLine};

use crate::state::Route;

/// Abstracts I/O operations for the application runtime.
///
/// Only [`Driver::persist_session`] and [`Driver::list_orders`] suspend
/// the control thread; events arriving while either is in flight are
/// queued by the channel and surface through [`Driver::next_event`]
/// afterwards, never dropped.
pub trait Driver: Send {
    /// Platform-specific error type for the fetch and channel calls.
    type Error: std::error::Error + Send + 'static;

    /// Exchange the credential pair for a persisted session.
    ///
    /// Must be safe to call at most once per bootstrap guard trip; the
    /// exchange may rotate refresh tokens server-side, so the caller
    /// guarantees it is not re-invoked.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError`] with a human-readable message on
    /// network/auth failure.
    fn persist_session(
        &mut self,
        access_token: &str,
        refresh_token: &str,
    ) -> impl Future<Output = Result<(), ExchangeError>> + Send;

    /// Fetch the guest's full order set. Idempotent and re-invocable.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; the runtime surfaces it as a
    /// single notification and leaves the ledger in its pre-sync state.
    fn list_orders(&mut self)
    -> impl Future<Output = Result<Vec<OrderLine>, Self::Error>> + Send;

    /// Open the live event channel, authenticating with the access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be established.
    fn open_channel(
        &mut self,
        access_token: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Await the next channel event.
    ///
    /// Returns `None` once the channel is permanently closed.
    fn next_event(&mut self) -> impl Future<Output = Option<ChannelEvent>> + Send;

    /// Display a message to the user. Fire-and-forget.
    fn notify(&mut self, message: &str);

    /// Move the frontend to `route`.
    fn navigate(&mut self, route: Route);

    /// Stop the channel and clean up resources.
    fn stop(&mut self);
}
