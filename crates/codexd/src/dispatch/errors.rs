//! Error types for decoding and dispatch failures.
//!
//! Each family renders to a distinct response shape: transport errors carry
//! no `id`, dispatch errors echo the `id`, and handler errors additionally
//! name the session that handled the request.

use codex_protocol::{Method, ResultEnvelope};
use serde_json::Value;
use thiserror::Error;

use crate::collaborators::CollaboratorError;

/// A request line could not be turned into a message envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The line is not JSON, or not UTF-8.
    #[error("Invalid JSON message")]
    InvalidJson {
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
    /// The line is JSON but not an object.
    #[error("Invalid message envelope: expected a JSON object")]
    NotAnObject,
    /// The line exceeded the frame limit and was discarded.
    #[error("Request too large: {size} bytes exceeds {max} byte limit")]
    TooLarge {
        /// Bytes consumed before the terminator.
        size: usize,
        /// Configured limit.
        max: usize,
    },
}

impl TransportError {
    /// Renders the error as an anonymous failure envelope.
    #[must_use]
    pub fn into_envelope(self) -> ResultEnvelope {
        ResultEnvelope::anonymous_failure(self.to_string())
    }
}

/// A routed handler failed.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// `params` did not match the method's parameter shape.
    #[error("Invalid params for {method}: {source}")]
    InvalidParams {
        /// Method whose params were rejected.
        method: Method,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// A collaborator failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    /// The handler's reply could not be encoded.
    #[error("Failed to encode {method} result: {source}")]
    Encode {
        /// Method whose reply failed to encode.
        method: Method,
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },
}

/// A decoded envelope could not be answered with a result.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The method is not in the routing table.
    #[error("Unknown method: {method}")]
    UnknownMethod {
        /// Method as sent, or its JSON text when not a string.
        method: String,
    },
    /// The routed handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// Creates an unknown method error.
    #[must_use]
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Renders the error as a failure envelope echoing `id`.
    ///
    /// Handler failures also carry `session_id`.
    #[must_use]
    pub fn into_envelope(self, id: Value, session_id: &str) -> ResultEnvelope {
        let envelope = ResultEnvelope::failure(id, self.to_string());
        match self {
            Self::UnknownMethod { .. } => envelope,
            Self::Handler(_) => envelope.with_session(session_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn transport_errors_have_no_id() {
        let envelope = TransportError::TooLarge {
            size: 2_000_000,
            max: 1_048_576,
        }
        .into_envelope();

        assert_eq!(
            serde_json::to_value(&envelope).expect("encode"),
            json!({"error": "Request too large: 2000000 bytes exceeds 1048576 byte limit"})
        );
    }

    #[test]
    fn unknown_method_echoes_id_without_session() {
        let envelope = DispatchError::unknown_method("foo").into_envelope(json!(7), "s-1");

        assert_eq!(
            serde_json::to_value(&envelope).expect("encode"),
            json!({"id": 7, "error": "Unknown method: foo"})
        );
    }

    #[test]
    fn handler_errors_carry_session() {
        let error = DispatchError::from(HandlerError::from(CollaboratorError::failed(
            "python executor",
            "crashed",
        )));

        let envelope = error.into_envelope(json!("a"), "s-1");

        assert_eq!(
            serde_json::to_value(&envelope).expect("encode"),
            json!({"id": "a", "error": "python executor failed: crashed", "session_id": "s-1"})
        );
    }
}
