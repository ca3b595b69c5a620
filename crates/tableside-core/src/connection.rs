//! Channel connection lifecycle state machine.
//!
//! Manages the live channel's connect/disconnect lifecycle: heartbeats
//! while open, idle-timeout detection, and automatic reconnection with a
//! fixed backoff. Subscribers never see any of this beyond the
//! `connect`/`disconnect` lifecycle events the machine emits.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods accept time as a parameter (no stored clock)
//! - Methods return `Vec<ConnectionAction>` (or `Result` where the call
//!   can be invalid for the current state)
//! - Driver code executes actions (send a ping, re-dial, publish a
//!   lifecycle event)
//!
//! # State Machine
//!
//! ```text
//! ┌────────────┐ established ┌──────┐ lost / idle ┌─────────┐
//! │ Connecting │────────────>│ Open │────────────>│ Backoff │
//! └────────────┘             └──────┘             └─────────┘
//!        ▲                       │                     │
//!        │              close()  ↓      backoff over   │
//!        │                  ┌────────┐                 │
//!        │                  │ Closed │                 │
//!        │                  └────────┘                 │
//!        └─────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use tableside_proto::ChannelEvent;

use crate::error::ChannelError;

/// Actions returned by the connection state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Send a heartbeat ping to keep the transport alive.
    SendPing,

    /// Publish a lifecycle event to subscribers.
    Emit(ChannelEvent),

    /// Re-dial the transport with the same access token.
    Reconnect,
}

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Dialing, or re-dialing after backoff.
    Connecting,
    /// Live and heartbeating.
    Open,
    /// Lost; waiting out the backoff before re-dialing.
    Backoff,
    /// Deliberately closed. Terminal.
    Closed,
}

/// Timing configuration for the channel lifecycle.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Interval between heartbeat pings while open.
    pub heartbeat_interval: Duration,
    /// Silence on an open channel longer than this counts as lost.
    pub idle_timeout: Duration,
    /// Wait between losing the channel and re-dialing.
    pub reconnect_backoff: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(20),
            idle_timeout: Duration::from_secs(60),
            reconnect_backoff: Duration::from_secs(5),
        }
    }
}

/// Connection lifecycle for one live channel.
///
/// Pure state machine; time is passed into every method that needs it.
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    state: ChannelState,
    config: ChannelConfig,
    last_activity: Instant,
    last_ping: Option<Instant>,
    lost_at: Option<Instant>,
}

impl ChannelConnection {
    /// Create a connection in `Connecting`.
    pub fn new(now: Instant, config: ChannelConfig) -> Self {
        Self { state: ChannelState::Connecting, config, last_activity: now, last_ping: None, lost_at: None }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// The transport finished dialing.
    ///
    /// Transitions `Connecting -> Open` and emits the `connect` lifecycle
    /// event, on first establishment and after every transparent
    /// reconnect alike, so subscribers can re-sync if they choose to.
    ///
    /// # Errors
    ///
    /// [`ChannelError::InvalidState`] outside `Connecting`.
    pub fn established(&mut self, now: Instant) -> Result<Vec<ConnectionAction>, ChannelError> {
        if self.state != ChannelState::Connecting {
            return Err(ChannelError::InvalidState {
                state: self.state,
                operation: "established",
            });
        }

        self.state = ChannelState::Open;
        self.last_activity = now;
        self.last_ping = None;
        self.lost_at = None;

        Ok(vec![ConnectionAction::Emit(ChannelEvent::Connect)])
    }

    /// The transport reported the connection gone.
    ///
    /// From `Open` this emits the `disconnect` lifecycle event and enters
    /// `Backoff`; from `Connecting` (a failed dial) it enters `Backoff`
    /// silently: nothing was ever announced to subscribers.
    ///
    /// # Errors
    ///
    /// [`ChannelError::InvalidState`] in `Backoff` or `Closed`.
    pub fn connection_lost(
        &mut self,
        now: Instant,
        reason: &str,
    ) -> Result<Vec<ConnectionAction>, ChannelError> {
        match self.state {
            ChannelState::Open => {
                tracing::debug!(reason, "channel lost; backing off");
                self.state = ChannelState::Backoff;
                self.lost_at = Some(now);
                Ok(vec![ConnectionAction::Emit(ChannelEvent::Disconnect {
                    reason: reason.to_string(),
                })])
            },
            ChannelState::Connecting => {
                tracing::debug!(reason, "dial failed; backing off");
                self.state = ChannelState::Backoff;
                self.lost_at = Some(now);
                Ok(Vec::new())
            },
            state => Err(ChannelError::InvalidState { state, operation: "connection_lost" }),
        }
    }

    /// Note traffic from the peer. Call on every received frame.
    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Idle duration beyond the timeout, if the open channel has gone
    /// silent.
    #[must_use]
    pub fn check_idle(&self, now: Instant) -> Option<Duration> {
        if self.state != ChannelState::Open {
            return None;
        }
        let elapsed = now.duration_since(self.last_activity);
        (elapsed > self.config.idle_timeout).then_some(elapsed)
    }

    /// Drive timeouts, heartbeats, and reconnects.
    ///
    /// Call periodically. While `Open` this detects idle timeout (emit
    /// `disconnect`, enter `Backoff`) and otherwise keeps the heartbeat
    /// going; while `Backoff` it re-dials once the backoff has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<ConnectionAction> {
        match self.state {
            ChannelState::Open => {
                if let Some(elapsed) = self.check_idle(now) {
                    tracing::debug!(?elapsed, "idle timeout; treating channel as lost");
                    self.state = ChannelState::Backoff;
                    self.lost_at = Some(now);
                    return vec![ConnectionAction::Emit(ChannelEvent::Disconnect {
                        reason: format!("idle timeout after {elapsed:?}"),
                    })];
                }

                let due = match self.last_ping {
                    None => true,
                    Some(last) => now.duration_since(last) >= self.config.heartbeat_interval,
                };
                if due {
                    self.last_ping = Some(now);
                    return vec![ConnectionAction::SendPing];
                }
                Vec::new()
            },
            ChannelState::Backoff => {
                let waited = self
                    .lost_at
                    .map_or(Duration::ZERO, |lost_at| now.duration_since(lost_at));
                if waited >= self.config.reconnect_backoff {
                    self.state = ChannelState::Connecting;
                    self.last_activity = now;
                    return vec![ConnectionAction::Reconnect];
                }
                Vec::new()
            },
            ChannelState::Connecting | ChannelState::Closed => Vec::new(),
        }
    }

    /// Deliberate teardown. Terminal; no reconnection follows.
    pub fn close(&mut self) {
        self.state = ChannelState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_connection(t0: Instant, config: ChannelConfig) -> ChannelConnection {
        let mut conn = ChannelConnection::new(t0, config);
        conn.established(t0).unwrap();
        conn
    }

    #[test]
    fn establishment_emits_connect() {
        let t0 = Instant::now();
        let mut conn = ChannelConnection::new(t0, ChannelConfig::default());
        assert_eq!(conn.state(), ChannelState::Connecting);

        let actions = conn.established(t0).unwrap();
        assert_eq!(actions, vec![ConnectionAction::Emit(ChannelEvent::Connect)]);
        assert_eq!(conn.state(), ChannelState::Open);
    }

    #[test]
    fn heartbeat_timing() {
        let t0 = Instant::now();
        let config = ChannelConfig {
            heartbeat_interval: Duration::from_secs(20),
            ..ChannelConfig::default()
        };
        let mut conn = open_connection(t0, config);

        // First tick sends the first ping.
        assert_eq!(conn.tick(t0), vec![ConnectionAction::SendPing]);

        // Too soon for another.
        assert!(conn.tick(t0 + Duration::from_secs(1)).is_empty());

        // Past the interval.
        assert_eq!(
            conn.tick(t0 + Duration::from_secs(21)),
            vec![ConnectionAction::SendPing]
        );
    }

    #[test]
    fn idle_timeout_disconnects_then_backoff_reconnects() {
        let t0 = Instant::now();
        let config = ChannelConfig {
            heartbeat_interval: Duration::from_secs(3600),
            idle_timeout: Duration::from_secs(60),
            reconnect_backoff: Duration::from_secs(5),
        };
        let mut conn = open_connection(t0, config);
        conn.tick(t0); // absorb first ping

        let t1 = t0 + Duration::from_secs(61);
        let actions = conn.tick(t1);
        assert!(
            matches!(actions.as_slice(), [ConnectionAction::Emit(ChannelEvent::Disconnect { .. })])
        );
        assert_eq!(conn.state(), ChannelState::Backoff);

        // Backoff not yet over.
        assert!(conn.tick(t1 + Duration::from_secs(2)).is_empty());

        // Backoff elapsed: re-dial.
        let actions = conn.tick(t1 + Duration::from_secs(5));
        assert_eq!(actions, vec![ConnectionAction::Reconnect]);
        assert_eq!(conn.state(), ChannelState::Connecting);

        // Re-establishment announces connect again.
        let actions = conn.established(t1 + Duration::from_secs(6)).unwrap();
        assert_eq!(actions, vec![ConnectionAction::Emit(ChannelEvent::Connect)]);
    }

    #[test]
    fn activity_defers_idle_timeout() {
        let t0 = Instant::now();
        let config = ChannelConfig {
            heartbeat_interval: Duration::from_secs(3600),
            idle_timeout: Duration::from_secs(60),
            ..ChannelConfig::default()
        };
        let mut conn = open_connection(t0, config);
        conn.tick(t0);

        let t1 = t0 + Duration::from_secs(50);
        conn.record_activity(t1);

        // 40s after the activity, only 40s idle: still fine.
        assert!(conn.check_idle(t1 + Duration::from_secs(40)).is_none());
        assert_eq!(conn.state(), ChannelState::Open);
    }

    #[test]
    fn transport_loss_emits_disconnect_once() {
        let t0 = Instant::now();
        let mut conn = open_connection(t0, ChannelConfig::default());

        let actions = conn.connection_lost(t0, "reset by peer").unwrap();
        assert_eq!(
            actions,
            vec![ConnectionAction::Emit(ChannelEvent::Disconnect {
                reason: "reset by peer".to_string(),
            })]
        );

        // Already backing off: a second report is invalid, not a second event.
        assert!(matches!(
            conn.connection_lost(t0, "again"),
            Err(ChannelError::InvalidState { .. })
        ));
    }

    #[test]
    fn failed_dial_backs_off_silently() {
        let t0 = Instant::now();
        let mut conn = ChannelConnection::new(t0, ChannelConfig::default());

        let actions = conn.connection_lost(t0, "connection refused").unwrap();
        assert!(actions.is_empty());
        assert_eq!(conn.state(), ChannelState::Backoff);
    }

    #[test]
    fn closed_is_terminal() {
        let t0 = Instant::now();
        let mut conn = open_connection(t0, ChannelConfig::default());

        conn.close();
        assert_eq!(conn.state(), ChannelState::Closed);
        assert!(conn.tick(t0 + Duration::from_secs(3600)).is_empty());
        assert!(conn.established(t0).is_err());
    }
}
