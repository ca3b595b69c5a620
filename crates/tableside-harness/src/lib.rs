//! Deterministic simulation harness for the tableside client.
//!
//! Scripted implementations of the [`tableside_app::Driver`] and
//! [`tableside_core::channel::EventChannel`] contracts for deterministic,
//! reproducible testing of bootstrap and ledger behavior under duplicate
//! triggers, failures, and unreliable event delivery.

pub mod scenario;
pub mod sim_channel;
pub mod sim_driver;

pub use scenario::{OracleFn, RunnableScenario, Scenario, World, access_token_for};
pub use sim_channel::SimChannel;
pub use sim_driver::{ExchangeOutcome, SimDriver, SimDriverError};
