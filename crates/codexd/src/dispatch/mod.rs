//! Line-delimited JSON request dispatch.
//!
//! Each request line is decoded into a
//! [`MessageEnvelope`](codex_protocol::MessageEnvelope), routed by exact
//! method name to its handler, and answered with exactly one
//! [`ResultEnvelope`](codex_protocol::ResultEnvelope):
//!
//! ```json
//! {"id":7,"method":"suggest","params":{"prompt":"list users"}}
//! ```
//!
//! ```json
//! {"id":7,"result":{"suggestions":[],"prompt":"list users","context":null,"session_id":"default","user_id":"anonymous"}}
//! ```
//!
//! Failures are answered in one of three shapes:
//!
//! - undecodable lines: `{"error":"Invalid JSON message"}`
//! - unknown methods: `{"id":7,"error":"Unknown method: foo"}`
//! - handler failures: `{"id":7,"error":"...","session_id":"default"}`

mod errors;
mod request;
mod router;

pub use self::errors::{DispatchError, HandlerError, TransportError};
pub use self::request::decode_line;
pub use self::router::Dispatcher;
