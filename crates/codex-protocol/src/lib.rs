//! Wire types for the Codex line-delimited JSON protocol.
//!
//! Each request is a single JSON object on its own line carrying an opaque
//! correlation `id`, a `method` name and a `params` object. The server answers
//! every line with exactly one [`ResultEnvelope`] line.
//!
//! ```json
//! {"id":1,"method":"execute","params":{"code":"print(1)","language":"python"}}
//! ```
//!
//! ```json
//! {"id":1,"result":{"result":{"output":"...","status":"success","language":"python"},"language":"python","session_id":"default","user_id":"anonymous"}}
//! ```
//!
//! Method parameters live in [`params`]; result payloads in [`payload`].

pub mod envelope;
pub mod params;
pub mod payload;

pub use self::envelope::{MessageEnvelope, Method, ResultEnvelope};
pub use self::params::{
    ChatParams, ContextItem, ConversationTurn, ExecuteParams, Role, SuggestParams,
};
pub use self::payload::{
    ChatReply, ExecutionReply, ExecutionResult, ExecutionStatus, SessionIdentity, SuggestionItem,
    SuggestionReply,
};
