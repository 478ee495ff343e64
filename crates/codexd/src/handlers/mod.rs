//! Method handlers.
//!
//! Each handler receives decoded params and the read-only
//! [`SessionContext`](crate::session::SessionContext), delegates to its
//! collaborator and returns a typed reply. Handlers never write to the
//! transport; the dispatcher owns framing and error conversion.

mod chat;
mod execute;
mod render;
mod suggest;

pub use self::chat::{ChatHandler, HISTORY_WINDOW, build_chat_prompt};
pub use self::execute::ExecuteHandler;
pub use self::suggest::{SuggestionHandler, build_suggestion_prompt};
