//! Request and response envelopes.
//!
//! A [`MessageEnvelope`] is decoded leniently: every member is optional so
//! that a request with an unrecognised method still yields its `id` for the
//! error reply. Method names are resolved into the closed [`Method`] set only
//! at dispatch time.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Methods understood by the server.
///
/// Names match exactly; `Chat` is `chat`, never `Chat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Method {
    /// Conversational reply built from history and context items.
    Chat,
    /// Gated code execution.
    Execute,
    /// Code suggestions for a free-text prompt.
    Suggest,
}

impl Method {
    /// Every supported method, in routing-table order.
    pub const ALL: [Self; 3] = [Self::Chat, Self::Execute, Self::Suggest];

    /// Returns the wire name of the method.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A single decoded request line.
///
/// # Example
///
/// ```
/// use codex_protocol::{MessageEnvelope, Method};
///
/// let envelope: MessageEnvelope =
///     serde_json::from_str(r#"{"id":"a","method":"chat"}"#).expect("decode");
/// assert_eq!(envelope.method(), Ok(Method::Chat));
/// assert_eq!(envelope.id(), &serde_json::json!("a"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    method: Value,
    #[serde(default)]
    params: Value,
}

impl MessageEnvelope {
    /// Builds an envelope for the given method and params.
    #[must_use]
    pub fn new(id: Value, method: Method, params: Value) -> Self {
        Self {
            id,
            method: Value::String(method.as_str().to_owned()),
            params,
        }
    }

    /// Returns the correlation token, `null` when the request had none.
    #[must_use]
    pub const fn id(&self) -> &Value {
        &self.id
    }

    /// Resolves the requested method.
    ///
    /// # Errors
    ///
    /// Returns the method as rendered text when it is missing, not a string,
    /// or not one of the supported names.
    pub fn method(&self) -> Result<Method, String> {
        match &self.method {
            Value::String(name) => name.parse().map_err(|_| name.clone()),
            other => Err(other.to_string()),
        }
    }

    /// Returns the raw `params` value.
    #[must_use]
    pub const fn raw_params(&self) -> &Value {
        &self.params
    }

    /// Decodes `params` into a method-specific type.
    ///
    /// A missing or `null` `params` member is treated as an empty object so
    /// that every field falls back to its default.
    ///
    /// # Errors
    ///
    /// Returns the serde error when `params` is not an object or a member
    /// has the wrong type.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.params {
            Value::Null => serde_json::from_value(Value::Object(Map::new())),
            params => T::deserialize(params),
        }
    }
}

/// A single response line.
///
/// Successful replies always carry `id` (possibly `null`). Failures carry
/// `id` only when it could be recovered from the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultEnvelope {
    /// The request was processed and produced a result payload.
    Success {
        /// Correlation token echoed from the request.
        id: Value,
        /// Method-specific result payload.
        result: Value,
    },
    /// The request could not be processed.
    Failure {
        /// Correlation token echoed from the request, when recoverable.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        /// Human-readable failure description.
        error: String,
        /// Session that handled the request, for handler failures.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
}

impl ResultEnvelope {
    /// Creates a success envelope.
    #[must_use]
    pub const fn success(id: Value, result: Value) -> Self {
        Self::Success { id, result }
    }

    /// Creates a failure envelope without an id.
    #[must_use]
    pub fn anonymous_failure(error: impl Into<String>) -> Self {
        Self::Failure {
            id: None,
            error: error.into(),
            session_id: None,
        }
    }

    /// Creates a failure envelope that echoes the request id.
    #[must_use]
    pub fn failure(id: Value, error: impl Into<String>) -> Self {
        Self::Failure {
            id: Some(id),
            error: error.into(),
            session_id: None,
        }
    }

    /// Attaches the handling session to a failure envelope.
    ///
    /// Success envelopes are returned unchanged.
    #[must_use]
    pub fn with_session(self, session: impl Into<String>) -> Self {
        match self {
            Self::Failure { id, error, .. } => Self::Failure {
                id,
                error,
                session_id: Some(session.into()),
            },
            success @ Self::Success { .. } => success,
        }
    }

    /// Returns the echoed correlation token, if any.
    #[must_use]
    pub const fn id(&self) -> Option<&Value> {
        match self {
            Self::Success { id, .. } => Some(id),
            Self::Failure { id, .. } => id.as_ref(),
        }
    }

    /// Returns the failure description for failure envelopes.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error, .. } => Some(error.as_str()),
            Self::Success { .. } => None,
        }
    }

    /// Returns `true` for success envelopes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
