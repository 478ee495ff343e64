//! Per-process session identity.

use std::time::Instant;

use codex_config::Config;
use codex_protocol::SessionIdentity;

/// Immutable identity of the session served by this process.
///
/// Built once before the request loop starts and passed by reference to
/// every handler; nothing reads identity from the environment afterwards.
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: SessionIdentity,
    started_at: Instant,
}

impl SessionContext {
    /// Creates a session context starting now.
    #[must_use]
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            identity: SessionIdentity::new(session_id, user_id),
            started_at: Instant::now(),
        }
    }

    /// Creates a session context from resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_id(), config.user_id())
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.identity.session_id
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    /// Returns the identity pair attached to replies.
    #[must_use]
    pub const fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// Seconds elapsed since the session started, from a monotonic clock.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
