//! Session gate.
//!
//! The session flag gates every catalog and cart operation. Each transition
//! bumps a [`SessionEpoch`]; asynchronous results are tagged with the epoch
//! they were requested under and are only applied while that epoch is still
//! current, so a response that lands after a logout cannot bring the store
//! view back.

use thiserror::Error;

/// Message shown when the server rejects a login without a detail.
pub const LOGIN_FAILED: &str = "Login failed";

/// Errors surfaced inline by the login form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// The server answered with a non-success status.
    #[error("{0}")]
    Rejected(String),

    /// The request could not be completed.
    #[error("Error connecting to server")]
    Connection,
}

impl LoginError {
    /// Build a rejection from the server-provided detail, falling back to a
    /// generic message.
    #[must_use]
    pub fn rejected(detail: Option<String>) -> Self {
        Self::Rejected(
            detail
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| LOGIN_FAILED.to_string()),
        )
    }
}

/// Generation counter for the session flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionEpoch(u64);

/// Authentication state of the view-model.
#[derive(Debug, Default)]
pub struct Session {
    authenticated: bool,
    epoch: SessionEpoch,
}

impl Session {
    /// Whether the user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The current epoch.
    #[must_use]
    pub const fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    /// Whether a result requested under `epoch` may still be applied.
    #[must_use]
    pub fn is_current(&self, epoch: SessionEpoch) -> bool {
        self.authenticated && self.epoch == epoch
    }

    /// Mark the session authenticated. Returns `true` on a transition.
    pub const fn sign_in(&mut self) -> bool {
        self.transition(true)
    }

    /// Mark the session logged out. Returns `true` on a transition.
    pub const fn sign_out(&mut self) -> bool {
        self.transition(false)
    }

    const fn transition(&mut self, authenticated: bool) -> bool {
        if self.authenticated == authenticated {
            return false;
        }
        self.authenticated = authenticated;
        self.epoch = SessionEpoch(self.epoch.0.wrapping_add(1));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(
            LoginError::rejected(Some("Invalid credentials".to_string())).to_string(),
            "Invalid credentials"
        );
        assert_eq!(LoginError::rejected(None).to_string(), "Login failed");
        assert_eq!(
            LoginError::rejected(Some("  ".to_string())).to_string(),
            "Login failed"
        );
        assert_eq!(
            LoginError::Connection.to_string(),
            "Error connecting to server"
        );
    }

    #[test]
    fn test_transitions_bump_epoch() {
        let mut session = Session::default();
        let initial = session.epoch();
        assert!(!session.is_authenticated());

        assert!(session.sign_in());
        let signed_in = session.epoch();
        assert_ne!(initial, signed_in);

        // Repeated sign-in is not a transition
        assert!(!session.sign_in());
        assert_eq!(session.epoch(), signed_in);

        assert!(session.sign_out());
        assert_ne!(session.epoch(), signed_in);
    }

    #[test]
    fn test_is_current() {
        let mut session = Session::default();
        let logged_out = session.epoch();
        assert!(!session.is_current(logged_out));

        session.sign_in();
        let epoch = session.epoch();
        assert!(session.is_current(epoch));

        session.sign_out();
        assert!(!session.is_current(epoch));

        // A new login does not revive results from the previous session
        session.sign_in();
        assert!(!session.is_current(epoch));
        assert!(session.is_current(session.epoch()));
    }
}
