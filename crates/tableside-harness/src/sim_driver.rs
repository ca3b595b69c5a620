//! Scripted driver.
//!
//! Implements [`Driver`] with programmable outcomes and records every
//! boundary call, so scenario oracles can assert exactly-once properties
//! instead of eyeballing side effects.

use std::collections::VecDeque;

use tableside_app::{Driver, Route};
use tableside_core::{channel::EventChannel, error::ExchangeError};
use tableside_proto::{ChannelEvent, OrderLine};
use thiserror::Error;

use crate::sim_channel::SimChannel;

/// Error type for the scripted fetch and channel calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimDriverError {
    /// The script said this fetch fails.
    #[error("scripted fetch failure")]
    FetchFailed,

    /// The script said the channel cannot be opened.
    #[error("scripted channel failure")]
    ChannelFailed,
}

/// Outcome the scripted exchange returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Exchange succeeds.
    Succeed,
    /// Exchange fails with this message (None = service gave no detail).
    Fail(Option<String>),
}

/// Scripted [`Driver`] over a [`SimChannel`].
#[derive(Debug)]
pub struct SimDriver {
    channel: SimChannel,
    exchange_outcome: ExchangeOutcome,
    /// Successive `list_orders` results; the last entry repeats once the
    /// script runs out.
    fetch_script: VecDeque<Vec<OrderLine>>,
    fetch_fails: bool,

    persist_calls: Vec<(String, String)>,
    fetch_calls: usize,
    notifications: Vec<String>,
    navigations: Vec<Route>,
    stopped: bool,
}

impl SimDriver {
    /// Driver whose exchange succeeds, with an empty order set and no
    /// events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_channel(SimChannel::new(Vec::new()))
    }

    /// Driver over a specific channel script.
    #[must_use]
    pub fn with_channel(channel: SimChannel) -> Self {
        Self {
            channel,
            exchange_outcome: ExchangeOutcome::Succeed,
            fetch_script: VecDeque::new(),
            fetch_fails: false,
            persist_calls: Vec::new(),
            fetch_calls: 0,
            notifications: Vec::new(),
            navigations: Vec::new(),
            stopped: false,
        }
    }

    /// Script the exchange outcome.
    pub fn set_exchange_outcome(&mut self, outcome: ExchangeOutcome) {
        self.exchange_outcome = outcome;
    }

    /// Append one `list_orders` result to the fetch script.
    pub fn push_orders(&mut self, orders: Vec<OrderLine>) {
        self.fetch_script.push_back(orders);
    }

    /// Make every `list_orders` call fail.
    pub fn fail_fetches(&mut self) {
        self.fetch_fails = true;
    }

    // ---- oracle accessors ----

    /// Every `(access_token, refresh_token)` pair the exchange saw.
    #[must_use]
    pub fn persist_calls(&self) -> &[(String, String)] {
        &self.persist_calls
    }

    /// Number of `list_orders` calls.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls
    }

    /// Every message shown to the user, in order.
    #[must_use]
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    /// Every navigation, in order.
    #[must_use]
    pub fn navigations(&self) -> &[Route] {
        &self.navigations
    }

    /// Token the channel was opened with, if any.
    #[must_use]
    pub fn channel_opened_with(&self) -> Option<&str> {
        self.channel.opened_with()
    }

    /// Whether the runtime stopped the driver.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn persist_session(
        &mut self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), ExchangeError> {
        self.persist_calls.push((access_token.to_string(), refresh_token.to_string()));
        match &self.exchange_outcome {
            ExchangeOutcome::Succeed => Ok(()),
            ExchangeOutcome::Fail(message) => Err(ExchangeError { message: message.clone() }),
        }
    }

    async fn list_orders(&mut self) -> Result<Vec<OrderLine>, Self::Error> {
        self.fetch_calls += 1;
        if self.fetch_fails {
            return Err(SimDriverError::FetchFailed);
        }
        // Last snapshot repeats: the fetch is idempotent.
        let orders = if self.fetch_script.len() > 1 {
            self.fetch_script.pop_front().unwrap_or_default()
        } else {
            self.fetch_script.front().cloned().unwrap_or_default()
        };
        Ok(orders)
    }

    async fn open_channel(&mut self, access_token: &str) -> Result<(), Self::Error> {
        self.channel
            .open(access_token)
            .await
            .map_err(|_| SimDriverError::ChannelFailed)
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.channel.next_event().await
    }

    fn notify(&mut self, message: &str) {
        tracing::debug!(message, "notification");
        self.notifications.push(message.to_string());
    }

    fn navigate(&mut self, route: Route) {
        self.navigations.push(route);
    }

    fn stop(&mut self) {
        self.channel.close();
        self.stopped = true;
    }
}
