//! Scenario builder API.
//!
//! Declarative construction of scenario tests that enforce the Oracle
//! Pattern: `.oracle(..)` is the only way to obtain something runnable.

use tableside_app::{App, Runtime};
use tableside_core::bootstrap::CredentialRedirect;
use tableside_proto::{ChannelEvent, OrderLine};

use crate::{
    scenario::{OracleFn, World, access_token_for},
    sim_channel::SimChannel,
    sim_driver::{ExchangeOutcome, SimDriver},
};

/// Scenario builder.
///
/// Scripts one guest's interaction end to end. Defaults: a valid guest
/// redirect fired once, a succeeding exchange, an empty order set, no
/// channel events, in-order delivery.
pub struct Scenario {
    name: String,
    redirect: CredentialRedirect,
    redirect_fires: usize,
    exchange: ExchangeOutcome,
    fetches: Vec<Vec<OrderLine>>,
    fetch_fails: bool,
    events: Vec<ChannelEvent>,
    delivery_seed: Option<u64>,
}

impl Scenario {
    /// Create a scenario with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            redirect: CredentialRedirect {
                access_token: Some(access_token_for("Guest")),
                refresh_token: Some("refresh-token".to_string()),
                message: None,
            },
            redirect_fires: 1,
            exchange: ExchangeOutcome::Succeed,
            fetches: Vec::new(),
            fetch_fails: false,
            events: Vec::new(),
            delivery_seed: None,
        }
    }

    /// Replace the scripted redirect.
    #[must_use]
    pub fn redirect(mut self, redirect: CredentialRedirect) -> Self {
        self.redirect = redirect;
        self
    }

    /// Fire the redirect `count` times (re-entrant scheduling replay).
    #[must_use]
    pub fn redirect_fires(mut self, count: usize) -> Self {
        self.redirect_fires = count;
        self
    }

    /// Script the exchange to fail with this message.
    #[must_use]
    pub fn exchange_fails(mut self, message: Option<&str>) -> Self {
        self.exchange = ExchangeOutcome::Fail(message.map(str::to_string));
        self
    }

    /// Append one order-fetch snapshot (the last one repeats).
    #[must_use]
    pub fn serves(mut self, orders: Vec<OrderLine>) -> Self {
        self.fetches.push(orders);
        self
    }

    /// Make every order fetch fail.
    #[must_use]
    pub fn fetch_fails(mut self) -> Self {
        self.fetch_fails = true;
        self
    }

    /// Append one channel event to the delivery script.
    #[must_use]
    pub fn event(mut self, event: ChannelEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Append several channel events.
    #[must_use]
    pub fn events(mut self, events: impl IntoIterator<Item = ChannelEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Degrade delivery with seeded duplication and shuffling.
    #[must_use]
    pub fn unreliable_delivery(mut self, seed: u64) -> Self {
        self.delivery_seed = Some(seed);
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory: you cannot run a scenario without
    /// verification.
    #[must_use]
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Fires the redirect the scripted number of times, pumps the channel
    /// to exhaustion, then runs the oracle over the final world.
    ///
    /// # Errors
    ///
    /// Returns the runtime or oracle failure, prefixed with the scenario
    /// name.
    pub async fn run(self) -> Result<(), String> {
        let Self { scenario, oracle } = self;

        let channel = match scenario.delivery_seed {
            Some(seed) => SimChannel::unreliable(scenario.events, seed),
            None => SimChannel::new(scenario.events),
        };

        let mut driver = SimDriver::with_channel(channel);
        driver.set_exchange_outcome(scenario.exchange);
        for snapshot in scenario.fetches {
            driver.push_orders(snapshot);
        }
        if scenario.fetch_fails {
            driver.fail_fetches();
        }

        let mut runtime = Runtime::new(App::new(), driver);

        for _ in 0..scenario.redirect_fires {
            runtime
                .handle_redirect(&scenario.redirect)
                .await
                .map_err(|e| format!("Scenario '{}': redirect handling failed: {e}", scenario.name))?;
        }

        runtime
            .pump_events()
            .await
            .map_err(|e| format!("Scenario '{}': event pump failed: {e}", scenario.name))?;

        let (app, driver) = runtime.into_parts();
        let world = World::new(app, driver);

        oracle(&world).map_err(|e| format!("Scenario '{}': oracle failed: {e}", scenario.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_requires_oracle() {
        // This compiles, oracle provided.
        let _scenario = Scenario::new("test").oracle(Box::new(|_world| Ok(())));

        // This would NOT compile (no oracle):
        // Scenario::new("test").run();
    }
}
