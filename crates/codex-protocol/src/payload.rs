//! Result payloads carried inside success envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;

/// Identity of the session that produced a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Session identifier configured at startup.
    pub session_id: String,
    /// User identifier configured at startup.
    pub user_id: String,
}

impl SessionIdentity {
    /// Creates an identity pair.
    #[must_use]
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Reply to a `chat` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated text.
    pub content: String,
    /// Session that produced the reply.
    #[serde(flatten)]
    pub identity: SessionIdentity,
    /// Seconds elapsed on the server's monotonic clock since session start.
    pub timestamp: f64,
}

/// Outcome reported by an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExecutionStatus {
    /// The code ran to completion.
    Success,
    /// The code ran and reported a failure.
    Error,
}

/// Output of a single execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured program output.
    pub output: String,
    /// Completion status.
    pub status: ExecutionStatus,
    /// Canonical language family that ran the code.
    pub language: String,
}

impl ExecutionResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(output: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            status: ExecutionStatus::Success,
            language: language.into(),
        }
    }
}

/// Reply to an `execute` request.
///
/// A refusal is a policy outcome rather than a failure, so it travels in a
/// success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionReply {
    /// The gate passed the code and an executor ran it.
    Completed {
        /// Executor output.
        result: ExecutionResult,
        /// Language tag as declared by the caller.
        language: String,
        /// Session that ran the code.
        #[serde(flatten)]
        identity: SessionIdentity,
    },
    /// The gate refused the code.
    Refused {
        /// Reason for the refusal.
        error: String,
        /// Session that refused the code.
        session_id: String,
    },
}

impl ExecutionReply {
    /// Returns the executor result when the code ran.
    #[must_use]
    pub const fn result(&self) -> Option<&ExecutionResult> {
        match self {
            Self::Completed { result, .. } => Some(result),
            Self::Refused { .. } => None,
        }
    }
}

/// A single code suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    /// Short name of the suggestion.
    pub title: String,
    /// What the suggestion does.
    pub description: String,
    /// Suggested source code.
    pub code: String,
    /// Language of `code`.
    pub language: String,
}

/// Reply to a `suggest` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionReply {
    /// Suggestions as returned by the generator.
    pub suggestions: Vec<SuggestionItem>,
    /// Prompt echoed from the request.
    pub prompt: String,
    /// Context echoed from the request (`null` when absent).
    pub context: Option<Map<String, Value>>,
    /// Session that produced the suggestions.
    #[serde(flatten)]
    pub identity: SessionIdentity,
}
