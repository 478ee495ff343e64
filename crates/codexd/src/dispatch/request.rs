//! Request line decoding.

use codex_protocol::MessageEnvelope;
use serde_json::Value;

use super::errors::TransportError;

/// Decodes one request line into a [`MessageEnvelope`].
///
/// The line may still carry its `\n` or `\r\n` terminator; JSON whitespace
/// around the object is ignored. Blank lines are malformed.
///
/// # Errors
///
/// Returns [`TransportError::InvalidJson`] when the bytes are not a JSON
/// document, and [`TransportError::NotAnObject`] when the document is not an
/// object.
pub fn decode_line(line: &[u8]) -> Result<MessageEnvelope, TransportError> {
    let value: Value =
        serde_json::from_slice(line).map_err(|source| TransportError::InvalidJson { source })?;
    if !value.is_object() {
        return Err(TransportError::NotAnObject);
    }
    serde_json::from_value(value).map_err(|source| TransportError::InvalidJson { source })
}
