//! Structured diagnostics on standard error.
//!
//! Standard output carries protocol traffic only, so every event is written
//! to standard error.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, fmt};

use codex_config::{Config, LogFormat};

static ACTIVE: OnceCell<TelemetryHandle> = OnceCell::new();

/// Diagnostic settings in force for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
    directive: String,
}

impl TelemetryHandle {
    /// Returns the output format of diagnostic lines.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }

    /// Returns the filter directive the subscriber was built from.
    #[must_use]
    pub fn directive(&self) -> &str {
        &self.directive
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        /// Directive as configured.
        directive: String,
        /// Parser failure.
        #[source]
        source: ParseError,
    },
    /// Another global subscriber is already installed.
    #[error("failed to install telemetry subscriber: {source}")]
    Subscriber {
        /// Installation failure.
        #[source]
        source: SetGlobalDefaultError,
    },
}

/// Parses a filter directive such as `info` or `codexd::gate=debug`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the directive is malformed.
pub fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::Filter {
        directive: directive.to_owned(),
        source,
    })
}

/// Installs the stderr subscriber on first use.
///
/// The subscriber is global, so only the first configuration takes effect.
/// Every call returns the settings that are actually in force.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a foreign
/// subscriber already owns the global slot.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    ACTIVE.get_or_try_init(|| install(config)).cloned()
}

fn install(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let subscriber = stderr_subscriber(filter, config.log_format());
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|source| TelemetryError::Subscriber { source })?;
    Ok(TelemetryHandle {
        format: config.log_format(),
        directive: config.log_filter().to_owned(),
    })
}

fn stderr_subscriber(filter: EnvFilter, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());
    match format {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    }
}
