//! Line-delimited JSON command server.
//!
//! `codexd` reads one JSON request per line from standard input and writes
//! one JSON response per line to standard output. Three methods are served:
//!
//! - `chat` assembles a prompt from bounded conversation history and context
//!   items and delegates to a [`TextGenerator`].
//! - `suggest` assembles a platform-specific prompt and delegates to a
//!   [`SuggestionGenerator`].
//! - `execute` passes submitted code through the [`ExecutionGate`], which
//!   normalises the language, screens the code against a [`Denylist`] and
//!   only then forwards it to the family's [`CodeExecutor`].
//!
//! The process serves exactly one session. Its identity is resolved from
//! [`codex_config::Config`] at startup and stamped onto every reply.
//!
//! Diagnostics go to standard error; standard output carries protocol
//! traffic only.

pub mod collaborators;
pub mod dispatch;
pub mod gate;
pub mod handlers;
pub mod server;
pub mod session;
pub mod shutdown;
pub mod telemetry;
pub mod transport;

use std::io;

use codex_config::Config;
use tracing::info;

pub use collaborators::{
    CodeExecutor, CollaboratorError, Collaborators, Executors, SuggestionGenerator, TextGenerator,
};
pub use dispatch::{DispatchError, Dispatcher, HandlerError, TransportError};
pub use gate::{Denylist, ExecutionGate, GateDecision, LanguageFamily};
pub use server::{FlightSlot, LoopState, ServeSummary, Server, ServerError, StopReason};
pub use session::SessionContext;
pub use shutdown::{ShutdownError, ShutdownFlag};
pub use telemetry::{TelemetryError, TelemetryHandle};

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Serves standard input and output with the placeholder collaborators.
///
/// Telemetry and signal handlers are installed before the first line is
/// read.
///
/// # Errors
///
/// Returns [`ServerError`] when telemetry or signal handlers cannot be
/// installed, or when standard input or output fails.
pub fn run(config: &Config) -> Result<ServeSummary, ServerError> {
    let diagnostics = telemetry::initialise(config)?;

    let session = SessionContext::from_config(config);
    let server = Server::new(Dispatcher::new(session, Collaborators::placeholder()));
    shutdown::install_signal_handlers(server.shutdown_flag(), &server.flight_slot().idle_flag())?;

    let identity = server.dispatcher().session();
    info!(
        target: LIFECYCLE_TARGET,
        session_id = identity.session_id(),
        user_id = identity.user_id(),
        log_format = %diagnostics.format(),
        log_filter = diagnostics.directive(),
        "server ready"
    );

    server.serve(io::stdin().lock(), io::stdout().lock())
}

#[cfg(test)]
mod tests;
