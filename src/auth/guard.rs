//! Client-side session lifecycle: login, expiry, inactivity, logout.
//!
//! The guard is the single owner of session state. It persists three
//! scalar fields (`token`, `role`, `exp`) through a [`StateStore`] and
//! keeps the inactivity deadline as an owned field, so there is exactly
//! one timer per session and resetting it is a plain overwrite.
//!
//! All time-dependent operations take `now_ms` (milliseconds since the
//! Unix epoch) so the whole lifecycle is testable without sleeping.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::role::Role;
use super::store::StateStore;
use super::token;

/// Storage keys. Contractual layout, shared with nothing else.
pub const KEY_TOKEN: &str = "token";
pub const KEY_ROLE: &str = "role";
pub const KEY_EXP: &str = "exp";

/// Inactivity window after which the session is force-ended (10 minutes).
pub const INACTIVITY_THRESHOLD_MS: i64 = 600_000;

/// Delay between surfacing an expiry notice and switching to the login
/// view, so the user sees why they were logged out.
pub const REDIRECT_DELAY_MS: i64 = 1_000;

/// Session lifecycle states.
///
/// `Expired` is transient: it exists only between detecting a dead
/// session and the scheduled redirect, and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    Valid,
    Expired,
}

/// Result of a protected-view entry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Expired,
}

/// User-visible notice categories for terminal session transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    Expired,
    InactivityTimeout,
}

impl SessionNotice {
    pub fn message(&self) -> &'static str {
        match self {
            SessionNotice::Expired => "Session expired. Redirecting to login...",
            SessionNotice::InactivityTimeout => {
                "You were inactive for too long. Logging out..."
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid username or password")]
    AuthRejected,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Credential is malformed: {0}")]
    TokenMalformed(#[from] token::TokenError),

    #[error("Session expired")]
    SessionExpired,

    #[error("Logged out due to inactivity")]
    InactivityTimeout,
}

/// Snapshot of the persisted session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub expires_at_ms: i64,
}

pub struct SessionGuard {
    store: Box<dyn StateStore>,
    state: SessionState,
    /// Absolute deadline for the inactivity timeout. Overwriting this
    /// field is the atomic cancel-and-reschedule of the single timer.
    inactivity_deadline_ms: Option<i64>,
}

impl SessionGuard {
    pub fn new(store: Box<dyn StateStore>) -> Self {
        Self {
            store,
            state: SessionState::LoggedOut,
            inactivity_deadline_ms: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Read the persisted session, if all three fields are present and
    /// the expiry parses. Always re-reads the store so a concurrent
    /// clear is never papered over by a stale snapshot.
    pub fn session(&self) -> Option<Session> {
        let token = self.store.get(KEY_TOKEN)?;
        let role = Role::from_label(&self.store.get(KEY_ROLE)?);
        let expires_at_ms = self.store.get(KEY_EXP)?.parse().ok()?;
        Some(Session {
            token,
            role,
            expires_at_ms,
        })
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(KEY_TOKEN)
    }

    /// Role of the current session; least privilege when logged out.
    pub fn role(&self) -> Role {
        self.store
            .get(KEY_ROLE)
            .map(|label| Role::from_label(&label))
            .unwrap_or(Role::Viewer)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// `LoggedOut -> Authenticating`. The login call itself is the API
    /// client's job; the guard only tracks the transition.
    pub fn begin_login(&mut self) {
        self.state = SessionState::Authenticating;
    }

    /// Login failure edge: back to `LoggedOut`, nothing persisted.
    pub fn cancel_login(&mut self) {
        self.state = SessionState::LoggedOut;
    }

    /// Install a freshly issued credential. Decodes the expiry claim,
    /// failing closed on a malformed or already-past claim, then replaces
    /// any prior session in full and arms the inactivity timer.
    pub fn install(
        &mut self,
        token: &str,
        role_label: &str,
        now_ms: i64,
    ) -> Result<Session, SessionError> {
        let expires_at_ms = match token::expiry_millis(token) {
            Ok(ms) => ms,
            Err(e) => {
                warn!(error = %e, "Rejecting credential with undecodable expiry");
                self.state = SessionState::LoggedOut;
                return Err(e.into());
            }
        };

        if expires_at_ms <= now_ms {
            warn!("Rejecting credential that is already expired");
            self.state = SessionState::LoggedOut;
            return Err(SessionError::SessionExpired);
        }

        // Replace, never merge
        self.store.clear();
        self.store.set(KEY_TOKEN, token);
        self.store.set(KEY_ROLE, role_label);
        self.store.set(KEY_EXP, &expires_at_ms.to_string());

        self.inactivity_deadline_ms = Some(now_ms + INACTIVITY_THRESHOLD_MS);
        self.state = SessionState::Valid;

        let session = Session {
            token: token.to_string(),
            role: Role::from_label(role_label),
            expires_at_ms,
        };
        info!(role = %session.role, "Session established");
        Ok(session)
    }

    // =========================================================================
    // Validity
    // =========================================================================

    /// Protected-view entry check. Reads the persisted session; an absent
    /// token or a past expiry clears everything and reports `Expired`.
    pub fn check_validity(&mut self, now_ms: i64) -> Validity {
        let had_token = self.store.get(KEY_TOKEN).is_some();

        match self.session() {
            Some(session) if now_ms < session.expires_at_ms => {
                self.state = SessionState::Valid;
                if self.inactivity_deadline_ms.is_none() {
                    self.inactivity_deadline_ms = Some(now_ms + INACTIVITY_THRESHOLD_MS);
                }
                Validity::Valid
            }
            _ => {
                self.clear();
                // A fresh start with nothing stored goes straight to the
                // login view; only a session that actually died passes
                // through the transient Expired state.
                self.state = if had_token {
                    SessionState::Expired
                } else {
                    SessionState::LoggedOut
                };
                Validity::Expired
            }
        }
    }

    /// Reset the inactivity deadline. Called on every qualifying input
    /// event while the session is valid; cheap enough for that because it
    /// is a single field write.
    pub fn record_activity(&mut self, now_ms: i64) {
        if self.state == SessionState::Valid {
            self.inactivity_deadline_ms = Some(now_ms + INACTIVITY_THRESHOLD_MS);
        }
    }

    /// Event-loop tick. Detects credential expiry and inactivity timeout;
    /// both funnel into the same idempotent clear, and the notice is
    /// emitted exactly once per terminal transition.
    pub fn poll(&mut self, now_ms: i64) -> Option<SessionNotice> {
        if self.state != SessionState::Valid {
            return None;
        }

        let expired = match self.session() {
            Some(session) => now_ms >= session.expires_at_ms,
            // Cleared out from under us (e.g. an explicit logout raced
            // a pending check); nothing left to announce.
            None => {
                self.clear();
                self.state = SessionState::LoggedOut;
                return None;
            }
        };

        if expired {
            debug!("Credential expiry reached");
            self.clear();
            self.state = SessionState::Expired;
            return Some(SessionNotice::Expired);
        }

        if let Some(deadline) = self.inactivity_deadline_ms {
            if now_ms >= deadline {
                debug!("Inactivity deadline reached");
                self.clear();
                self.state = SessionState::Expired;
                return Some(SessionNotice::InactivityTimeout);
            }
        }

        None
    }

    /// Resolve the transient `Expired` state once the scheduled redirect
    /// to the login view has fired.
    pub fn resolve_expired(&mut self) {
        if self.state == SessionState::Expired {
            self.state = SessionState::LoggedOut;
        }
    }

    /// Explicit user logout: clear unconditionally, no notice.
    pub fn logout(&mut self) {
        info!("Logging out");
        self.clear();
        self.state = SessionState::LoggedOut;
    }

    /// Idempotent teardown of all session state.
    fn clear(&mut self) {
        self.store.clear();
        self.inactivity_deadline_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;
    use crate::auth::token::make_token;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn guard() -> SessionGuard {
        SessionGuard::new(Box::new(MemoryStore::new()))
    }

    fn guard_with_session(exp_offset_secs: i64) -> SessionGuard {
        let mut g = guard();
        let token = make_token(NOW_MS / 1000 + exp_offset_secs);
        g.install(&token, "Admin", NOW_MS).expect("install");
        g
    }

    #[test]
    fn login_success_establishes_valid_session() {
        let mut g = guard();
        g.begin_login();
        assert_eq!(g.state(), SessionState::Authenticating);

        let token = make_token(NOW_MS / 1000 + 3600);
        let session = g.install(&token, "Admin", NOW_MS).expect("install");

        assert_eq!(g.state(), SessionState::Valid);
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.expires_at_ms, NOW_MS + 3_600_000);
        assert_eq!(g.token().as_deref(), Some(token.as_str()));
        assert_eq!(g.role(), Role::Admin);
    }

    #[test]
    fn login_failure_leaves_no_state() {
        let mut g = guard();
        g.begin_login();
        g.cancel_login();

        assert_eq!(g.state(), SessionState::LoggedOut);
        assert_eq!(g.token(), None);
        assert_eq!(g.session(), None);
    }

    #[test]
    fn malformed_token_fails_closed() {
        let mut g = guard();
        g.begin_login();

        let err = g.install("not-a-token", "Admin", NOW_MS).unwrap_err();
        assert!(matches!(err, SessionError::TokenMalformed(_)));
        assert_eq!(g.state(), SessionState::LoggedOut);
        assert_eq!(g.token(), None);
    }

    #[test]
    fn already_expired_token_is_rejected() {
        let mut g = guard();
        let token = make_token(NOW_MS / 1000 - 1);
        let err = g.install(&token, "Admin", NOW_MS).unwrap_err();
        assert!(matches!(err, SessionError::SessionExpired));
        assert_eq!(g.token(), None);
    }

    #[test]
    fn new_login_replaces_prior_session_in_full() {
        let mut g = guard_with_session(3600);
        let token = make_token(NOW_MS / 1000 + 60);
        g.install(&token, "Manager", NOW_MS).expect("install");

        let session = g.session().expect("session");
        assert_eq!(session.role, Role::Manager);
        assert_eq!(session.expires_at_ms, NOW_MS + 60_000);
    }

    #[test]
    fn check_validity_accepts_live_session() {
        let mut g = guard_with_session(3600);
        assert_eq!(g.check_validity(NOW_MS + 1), Validity::Valid);
        assert_eq!(g.state(), SessionState::Valid);
    }

    #[test]
    fn check_validity_clears_expired_session() {
        let mut g = guard_with_session(3600);
        let after_expiry = NOW_MS + 3_600_000;

        assert_eq!(g.check_validity(after_expiry), Validity::Expired);
        assert_eq!(g.state(), SessionState::Expired);
        assert_eq!(g.token(), None);
        assert_eq!(g.session(), None);
    }

    #[test]
    fn check_validity_with_nothing_stored_stays_logged_out() {
        // Direct navigation with no stored token: straight to login,
        // no transient Expired notice.
        let mut g = guard();
        assert_eq!(g.check_validity(NOW_MS), Validity::Expired);
        assert_eq!(g.state(), SessionState::LoggedOut);
    }

    #[test]
    fn missing_exp_field_fails_closed() {
        let mut g = guard_with_session(3600);
        // Simulate a damaged store: token present, exp gone
        g.store.set(KEY_EXP, "not-a-number");
        assert_eq!(g.check_validity(NOW_MS), Validity::Expired);
        assert_eq!(g.token(), None);
    }

    #[test]
    fn activity_strictly_extends_the_deadline() {
        let mut g = guard_with_session(7200);

        // Activity just before the original deadline defers the timeout
        // by a full threshold, not to the original deadline.
        let last_activity = NOW_MS + INACTIVITY_THRESHOLD_MS - 1;
        g.record_activity(last_activity);

        assert_eq!(g.poll(NOW_MS + INACTIVITY_THRESHOLD_MS), None);
        assert_eq!(
            g.poll(last_activity + INACTIVITY_THRESHOLD_MS - 1),
            None
        );
        assert_eq!(
            g.poll(last_activity + INACTIVITY_THRESHOLD_MS),
            Some(SessionNotice::InactivityTimeout)
        );
    }

    #[test]
    fn inactivity_timeout_clears_and_notifies_once() {
        let mut g = guard_with_session(7200);
        let timeout_at = NOW_MS + INACTIVITY_THRESHOLD_MS + 1;

        assert_eq!(g.poll(timeout_at), Some(SessionNotice::InactivityTimeout));
        assert_eq!(g.state(), SessionState::Expired);
        assert_eq!(g.token(), None);

        // Second poll after the transition is silent
        assert_eq!(g.poll(timeout_at + 1), None);
    }

    #[test]
    fn credential_expiry_wins_over_inactivity() {
        let mut g = guard_with_session(60);
        // Keep activity fresh, but let the credential lapse
        g.record_activity(NOW_MS + 59_000);
        assert_eq!(g.poll(NOW_MS + 60_000), Some(SessionNotice::Expired));
        assert_eq!(g.token(), None);
    }

    #[test]
    fn clear_and_redirect_is_idempotent() {
        let mut g = guard_with_session(3600);

        g.logout();
        let state_after_one = (g.state(), g.token(), g.session());

        g.logout();
        assert_eq!((g.state(), g.token(), g.session()), state_after_one);
        assert_eq!(g.state(), SessionState::LoggedOut);
    }

    #[test]
    fn poll_does_not_resurrect_a_logged_out_session() {
        let mut g = guard_with_session(3600);
        // Logout races a pending expiry check: the check must re-read
        // the store and stay silent.
        g.logout();
        assert_eq!(g.poll(NOW_MS + 10_000_000), None);
        assert_eq!(g.state(), SessionState::LoggedOut);
    }

    #[test]
    fn expired_resolves_to_logged_out() {
        let mut g = guard_with_session(60);
        assert_eq!(g.poll(NOW_MS + 60_000), Some(SessionNotice::Expired));
        assert_eq!(g.state(), SessionState::Expired);

        g.resolve_expired();
        assert_eq!(g.state(), SessionState::LoggedOut);
    }

    #[test]
    fn record_activity_when_logged_out_is_a_no_op() {
        let mut g = guard();
        g.record_activity(NOW_MS);
        assert_eq!(g.poll(NOW_MS + INACTIVITY_THRESHOLD_MS + 1), None);
    }
}
