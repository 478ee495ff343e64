//! Runtime configuration for the Codex stdio server.
//!
//! Configuration is resolved once at process start from command-line flags,
//! then environment variables, then the documented defaults. The resulting
//! [`Config`] is immutable: the server derives its session identity from it
//! and never consults the environment again.
//!
//! | setting | flag | environment | default |
//! |---|---|---|---|
//! | session id | `--session-id` | `CODEX_SESSION_ID` | `default` |
//! | user id | `--user-id` | `CODEX_USER_ID` | `anonymous` |
//! | log filter | `--log-filter` | `CODEX_LOG_FILTER` | `info` |
//! | log format | `--log-format` | `CODEX_LOG_FORMAT` | `json` |

mod defaults;
mod logging;

use std::ffi::OsString;

use clap::Parser;
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SESSION_ID, DEFAULT_USER_ID, LOG_FILTER_ENV, LOG_FORMAT_ENV,
    SESSION_ID_ENV, USER_ID_ENV, default_log_format,
};
pub use logging::LogFormat;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line or environment values could not be parsed.
    ///
    /// This variant also carries `--help` and `--version` requests, which
    /// callers should hand back to clap via [`clap::Error::exit`].
    #[error(transparent)]
    Arguments {
        /// Underlying clap error.
        #[from]
        source: clap::Error,
    },
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "codexd",
    version,
    about = "Line-delimited JSON command server for chat, code suggestion and gated code execution"
)]
pub struct Config {
    /// Identifier of the session this process serves.
    #[arg(long, env = SESSION_ID_ENV, default_value = DEFAULT_SESSION_ID)]
    session_id: String,
    /// Identifier of the user this process acts for.
    #[arg(long, env = USER_ID_ENV, default_value = DEFAULT_USER_ID)]
    user_id: String,
    /// Tracing filter directive (for example `info` or `codexd=debug`).
    #[arg(long, env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
    /// Diagnostic output format written to standard error.
    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = default_log_format())]
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_id: DEFAULT_SESSION_ID.to_owned(),
            user_id: DEFAULT_USER_ID.to_owned(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when arguments fail to parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is treated as the binary name, matching
    /// [`std::env::args_os`]. Environment variables are still consulted for
    /// settings the arguments leave unset. A blank identity counts as unset
    /// and resolves to its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when arguments fail to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?.with_blank_identity_defaulted())
    }

    /// Overrides the identity values, keeping logging settings intact.
    #[must_use]
    pub fn with_identity(
        mut self,
        session_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        self.session_id = session_id.into();
        self.user_id = user_id.into();
        self
    }

    /// Returns the configured session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the configured user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the diagnostic output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    fn with_blank_identity_defaulted(mut self) -> Self {
        if self.session_id.trim().is_empty() {
            DEFAULT_SESSION_ID.clone_into(&mut self.session_id);
        }
        if self.user_id.trim().is_empty() {
            DEFAULT_USER_ID.clone_into(&mut self.user_id);
        }
        self
    }
}
