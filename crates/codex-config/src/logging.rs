use strum::{Display, EnumString};

/// Shape of the diagnostic lines written to standard error.
///
/// Parsed from `--log-format` or `CODEX_LOG_FORMAT`, ignoring ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with span fields flattened.
    Json,
    /// Single-line text with ANSI colour when attached to a terminal.
    Compact,
}
