//! Signal-driven shutdown.
//!
//! SIGINT and SIGTERM are handled in two ways at once. While the server is
//! idle the process exits straight away with `128 + signal`. While a request
//! is in flight the signal only raises a [`ShutdownFlag`], and the request
//! loop stops once the current response has been flushed.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;
use thiserror::Error;
use tracing::debug;

const SHUTDOWN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::shutdown");

/// Signals that stop the server.
pub const SHUTDOWN_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// Errors reported while installing signal handlers.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing a handler failed.
    #[error("failed to install handler for signal {signal}: {source}")]
    Install {
        /// Signal number.
        signal: i32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shared record of a pending shutdown request.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Creates a flag with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a shutdown request.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Installs SIGINT and SIGTERM handlers.
///
/// `idle` must be `true` exactly while the server holds no request; see
/// [`FlightSlot::idle_flag`](crate::server::FlightSlot::idle_flag).
///
/// # Errors
///
/// Returns [`ShutdownError::Install`] when a handler cannot be registered.
pub fn install_signal_handlers(
    shutdown: &ShutdownFlag,
    idle: &Arc<AtomicBool>,
) -> Result<(), ShutdownError> {
    for signal in SHUTDOWN_SIGNALS {
        let exit_status = 128_i32.saturating_add(signal);
        flag::register_conditional_shutdown(signal, exit_status, Arc::clone(idle))
            .and_then(|_| flag::register(signal, Arc::clone(&shutdown.requested)))
            .map_err(|source| ShutdownError::Install { signal, source })?;
        debug!(target: SHUTDOWN_TARGET, signal, exit_status, "signal handler installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_clear_and_latches() {
        let shutdown = ShutdownFlag::new();
        assert!(!shutdown.is_requested());

        shutdown.request();
        assert!(shutdown.is_requested());
    }

    #[test]
    fn clones_share_state() {
        let shutdown = ShutdownFlag::new();
        let observer = shutdown.clone();

        shutdown.request();

        assert!(observer.is_requested());
    }

    #[test]
    fn handlers_install_for_both_signals() {
        let shutdown = ShutdownFlag::new();
        let idle = Arc::new(AtomicBool::new(false));

        install_signal_handlers(&shutdown, &idle).expect("install handlers");

        assert!(!shutdown.is_requested());
    }
}
