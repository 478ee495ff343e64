//! Method routing.
//!
//! The [`Dispatcher`] owns the session context and one handler per method.
//! Routing is an exhaustive match over [`Method`], so the table cannot drift
//! from the wire enum.

use codex_protocol::{
    ChatParams, ExecuteParams, MessageEnvelope, Method, ResultEnvelope, SuggestParams,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::errors::{DispatchError, HandlerError};
use super::request::decode_line;
use crate::collaborators::Collaborators;
use crate::gate::{Denylist, ExecutionGate};
use crate::handlers::{ChatHandler, ExecuteHandler, SuggestionHandler};
use crate::session::SessionContext;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes decoded requests to method handlers and renders every outcome as
/// a [`ResultEnvelope`].
///
/// Dispatch never fails: each error becomes a failure envelope, so one bad
/// request cannot affect the next.
pub struct Dispatcher {
    session: SessionContext,
    chat: ChatHandler,
    execute: ExecuteHandler,
    suggest: SuggestionHandler,
}

impl Dispatcher {
    /// Wires handlers for a session from the given collaborators, screening
    /// execution with the default denylist.
    #[must_use]
    pub fn new(session: SessionContext, collaborators: Collaborators) -> Self {
        let Collaborators {
            text,
            suggestions,
            executors,
        } = collaborators;
        Self {
            session,
            chat: ChatHandler::new(text),
            execute: ExecuteHandler::new(ExecutionGate::new(Denylist::default(), executors)),
            suggest: SuggestionHandler::new(suggestions),
        }
    }

    /// Replaces the execution denylist.
    #[must_use]
    pub fn with_denylist(self, denylist: Denylist) -> Self {
        let Self {
            session,
            chat,
            execute,
            suggest,
        } = self;
        Self {
            session,
            chat,
            execute: ExecuteHandler::new(execute.into_gate().with_denylist(denylist)),
            suggest,
        }
    }

    /// Returns the session requests are handled for.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Returns the denylist screening `execute` requests.
    #[must_use]
    pub const fn denylist(&self) -> &Denylist {
        self.execute.gate().denylist()
    }

    /// Decodes and dispatches one raw request line.
    #[must_use]
    pub fn dispatch_line(&self, line: &[u8]) -> ResultEnvelope {
        match decode_line(line) {
            Ok(envelope) => self.dispatch(&envelope),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, line_bytes = line.len(), "malformed line");
                error.into_envelope()
            }
        }
    }

    /// Dispatches a decoded envelope.
    #[must_use]
    pub fn dispatch(&self, envelope: &MessageEnvelope) -> ResultEnvelope {
        let id = envelope.id().clone();
        match self.route(envelope) {
            Ok(result) => ResultEnvelope::success(id, result),
            Err(error) => {
                if let DispatchError::Handler(_) = error {
                    warn!(target: DISPATCH_TARGET, %error, %id, "handler failed");
                }
                error.into_envelope(id, self.session.session_id())
            }
        }
    }

    fn route(&self, envelope: &MessageEnvelope) -> Result<Value, DispatchError> {
        let method = envelope.method().map_err(|requested| {
            warn!(
                target: DISPATCH_TARGET,
                method = %requested,
                id = %envelope.id(),
                "unknown method"
            );
            DispatchError::unknown_method(requested)
        })?;
        info!(
            target: DISPATCH_TARGET,
            method = method.as_str(),
            id = %envelope.id(),
            "message received"
        );

        let result = match method {
            Method::Chat => {
                let params: ChatParams = decode_params(envelope, method)?;
                let reply = self
                    .chat
                    .handle(&params, &self.session)
                    .map_err(HandlerError::from)?;
                encode_result(method, &reply)?
            }
            Method::Execute => {
                let params: ExecuteParams = decode_params(envelope, method)?;
                let reply = self
                    .execute
                    .handle(&params, &self.session)
                    .map_err(HandlerError::from)?;
                encode_result(method, &reply)?
            }
            Method::Suggest => {
                let params: SuggestParams = decode_params(envelope, method)?;
                let reply = self
                    .suggest
                    .handle(&params, &self.session)
                    .map_err(HandlerError::from)?;
                encode_result(method, &reply)?
            }
        };
        Ok(result)
    }
}

fn decode_params<T: DeserializeOwned>(
    envelope: &MessageEnvelope,
    method: Method,
) -> Result<T, HandlerError> {
    envelope
        .params()
        .map_err(|source| HandlerError::InvalidParams { method, source })
}

fn encode_result<T: Serialize>(method: Method, reply: &T) -> Result<Value, HandlerError> {
    serde_json::to_value(reply).map_err(|source| HandlerError::Encode { method, source })
}
