//! Transient notifications.
//!
//! A notice is a message with a deadline. Showing a new notice replaces the
//! previous one together with its deadline, so the last checkout wins.
//! Deadlines use `tokio::time::Instant`, which follows the paused test clock.

use std::time::Duration;

use tokio::time::Instant;

/// How long the checkout confirmation stays visible.
pub const CHECKOUT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Checkout confirmation text.
pub const CHECKOUT_SUCCESS: &str = "Purchase completed successfully!";

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    expires_at: Instant,
}

/// Holder for at most one visible notice.
#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Notice>,
}

impl Notifier {
    /// Show `message` for `ttl`, replacing any current notice.
    pub fn show(&mut self, message: impl Into<String>, ttl: Duration) {
        self.current = Some(Notice {
            message: message.into(),
            expires_at: Instant::now() + ttl,
        });
    }

    /// The visible message, if it has not expired yet.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|notice| Instant::now() < notice.expires_at)
            .map(|notice| notice.message.as_str())
    }

    /// When the visible notice clears itself.
    #[must_use]
    pub fn expires_at(&self) -> Option<Instant> {
        self.current
            .as_ref()
            .filter(|notice| Instant::now() < notice.expires_at)
            .map(|notice| notice.expires_at)
    }

    /// Drop an expired notice. Returns `true` if one was dropped.
    pub fn prune(&mut self) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|notice| Instant::now() >= notice.expires_at);
        if expired {
            self.current = None;
        }
        expired
    }

    /// Remove the current notice immediately.
    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
