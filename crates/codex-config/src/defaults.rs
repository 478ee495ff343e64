use crate::logging::LogFormat;

/// Environment variable carrying the session identifier.
pub const SESSION_ID_ENV: &str = "CODEX_SESSION_ID";

/// Environment variable carrying the user identifier.
pub const USER_ID_ENV: &str = "CODEX_USER_ID";

/// Environment variable overriding the log filter expression.
pub const LOG_FILTER_ENV: &str = "CODEX_LOG_FILTER";

/// Environment variable overriding the log output format.
pub const LOG_FORMAT_ENV: &str = "CODEX_LOG_FORMAT";

/// Session identifier used when none is configured.
pub const DEFAULT_SESSION_ID: &str = "default";

/// User identifier used when none is configured.
pub const DEFAULT_USER_ID: &str = "anonymous";

/// Tracing filter applied when neither flag nor environment sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default logging format for the server.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
