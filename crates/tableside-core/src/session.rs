//! Session state owned by the application root.
//!
//! The session is process-wide state, but not an ambient global: a single
//! [`SessionCell`] lives at the application root and is passed by
//! reference into whatever needs authorization context.

use tableside_proto::Role;

/// An authenticated application session.
///
/// Created exactly once by a successful credential exchange. Destruction
/// (logout, token invalidation) is driven from outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Access token the session was exchanged for.
    pub access_token: String,
    /// Refresh token paired with it.
    pub refresh_token: String,
    /// Role decoded from the access token at bootstrap time.
    pub role: Role,
}

/// Holder for the at-most-one live session.
#[derive(Debug, Default)]
pub struct SessionCell {
    session: Option<Session>,
}

impl SessionCell {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a session established by the exchange.
    ///
    /// The bootstrap guard makes a second commit unreachable in normal
    /// operation; if one happens anyway it replaces the session and is
    /// logged loudly.
    pub fn commit(&mut self, session: Session) {
        if self.session.is_some() {
            tracing::warn!("replacing an already-committed session");
        }
        self.session = Some(session);
    }

    /// The live session, if one has been committed.
    #[must_use]
    pub fn get(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a session has been committed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the session (logout / token invalidation).
    pub fn clear(&mut self) {
        self.session = None;
    }
}
