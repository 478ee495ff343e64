//! Method-specific request parameters.
//!
//! Every member is optional on the wire and falls back to a documented
//! default, so `{"method":"execute"}` is a valid (if unproductive) request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Language assumed when an `execute` request omits one.
pub const DEFAULT_EXECUTION_LANGUAGE: &str = "typescript";

/// Context type assumed when a context item omits one.
pub const DEFAULT_CONTEXT_TYPE: &str = "unknown";

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human caller.
    User,
    /// A previous model reply.
    Assistant,
    /// Platform-injected instructions or notices.
    System,
    /// A turn that did not name its speaker.
    #[default]
    Unknown,
}

impl Role {
    /// Returns the upper-case label used when rendering prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
            Self::System => "SYSTEM",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// One entry of caller-supplied conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced the turn; [`Role::Unknown`] when omitted.
    #[serde(default)]
    pub role: Role,
    /// Text of the turn.
    #[serde(default)]
    pub content: String,
}

impl ConversationTurn {
    /// Creates a turn.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Structured platform context attached to a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    /// Kind of context (for example `code` or `project`).
    #[serde(default = "default_context_type")]
    pub context_type: String,
    /// Arbitrary context payload.
    #[serde(default)]
    pub context_data: Map<String, Value>,
}

impl ContextItem {
    /// Creates a context item.
    #[must_use]
    pub fn new(context_type: impl Into<String>, context_data: Map<String, Value>) -> Self {
        Self {
            context_type: context_type.into(),
            context_data,
        }
    }
}

/// Parameters of the `chat` method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatParams {
    /// Conversation history, oldest first.
    #[serde(default)]
    pub messages: Vec<ConversationTurn>,
    /// Context items, in no particular order.
    #[serde(default)]
    pub contexts: Vec<ContextItem>,
}

/// Parameters of the `execute` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteParams {
    /// Source code to run.
    #[serde(default)]
    pub code: String,
    /// Free-form language tag, normalised by the execution gate.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ExecuteParams {
    fn default() -> Self {
        Self {
            code: String::new(),
            language: default_language(),
        }
    }
}

/// Parameters of the `suggest` method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestParams {
    /// Free-text description of the wanted code.
    #[serde(default)]
    pub prompt: String,
    /// Optional structured context, echoed back in the reply.
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

fn default_language() -> String {
    DEFAULT_EXECUTION_LANGUAGE.to_owned()
}

fn default_context_type() -> String {
    DEFAULT_CONTEXT_TYPE.to_owned()
}
