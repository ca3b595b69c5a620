//! Scripted event channel.

use std::collections::VecDeque;

use async_trait::async_trait;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use tableside_core::{channel::EventChannel, error::ChannelError};
use tableside_proto::ChannelEvent;

/// In-memory [`EventChannel`] that replays a fixed script.
///
/// With [`SimChannel::unreliable`] the script is deterministically
/// degraded to what the contract actually promises: at-least-once-ish
/// delivery with duplicates and reordering. Consumers are tested
/// against the contract, not against a polite transport.
#[derive(Debug)]
pub struct SimChannel {
    script: VecDeque<ChannelEvent>,
    opened_with: Option<String>,
    closed: bool,
}

impl SimChannel {
    /// Channel that delivers `events` in order.
    #[must_use]
    pub fn new(events: Vec<ChannelEvent>) -> Self {
        Self { script: events.into(), opened_with: None, closed: false }
    }

    /// Channel that delivers `events` with seeded duplication and
    /// shuffling. Same seed, same degradation.
    #[must_use]
    pub fn unreliable(events: Vec<ChannelEvent>, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut degraded = Vec::with_capacity(events.len() * 2);
        for event in events {
            let duplicate = rng.gen_ratio(1, 3);
            degraded.push(event.clone());
            if duplicate {
                degraded.push(event);
            }
        }
        degraded.shuffle(&mut rng);

        Self { script: degraded.into(), opened_with: None, closed: false }
    }

    /// The (possibly degraded) delivery script, as it will be delivered.
    ///
    /// Model-based tests replay this into a reference model so both sides
    /// see the exact same delivery order.
    #[must_use]
    pub fn script(&self) -> Vec<ChannelEvent> {
        self.script.iter().cloned().collect()
    }

    /// Token the channel was opened with, if it was opened.
    #[must_use]
    pub fn opened_with(&self) -> Option<&str> {
        self.opened_with.as_deref()
    }

    /// Whether the channel was deliberately closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl EventChannel for SimChannel {
    async fn open(&mut self, access_token: &str) -> Result<(), ChannelError> {
        if self.opened_with.is_some() {
            // At most one live channel per session; a second open is a
            // caller bug the harness should make loud.
            return Err(ChannelError::Transport("channel already open".to_string()));
        }
        self.opened_with = Some(access_token.to_string());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        // No events before open or after close: a channel that was never
        // established delivers nothing.
        if self.opened_with.is_none() || self.closed {
            return None;
        }
        self.script.pop_front()
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
