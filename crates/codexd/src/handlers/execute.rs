//! Execute handler.

use codex_protocol::{ExecuteParams, ExecutionReply};

use crate::collaborators::CollaboratorError;
use crate::gate::{ExecutionGate, GateDecision};
use crate::session::SessionContext;

/// Handles `execute` requests by running them through the [`ExecutionGate`].
pub struct ExecuteHandler {
    gate: ExecutionGate,
}

impl ExecuteHandler {
    /// Creates a handler over a gate.
    #[must_use]
    pub const fn new(gate: ExecutionGate) -> Self {
        Self { gate }
    }

    /// Returns the gate requests pass through.
    #[must_use]
    pub const fn gate(&self) -> &ExecutionGate {
        &self.gate
    }

    /// Consumes the handler, returning its gate.
    #[must_use]
    pub fn into_gate(self) -> ExecutionGate {
        self.gate
    }

    /// Screens and, when permitted, runs the submitted code.
    ///
    /// Refusals become [`ExecutionReply::Refused`]. The `language` on a
    /// completed reply is the tag the caller declared; the nested result
    /// carries the canonical family name.
    ///
    /// # Errors
    ///
    /// Returns the executor's [`CollaboratorError`] when execution fails.
    pub fn handle(
        &self,
        params: &ExecuteParams,
        session: &SessionContext,
    ) -> Result<ExecutionReply, CollaboratorError> {
        let decision = self.gate.evaluate(&params.code, &params.language)?;
        let reply = match decision {
            GateDecision::Executed { result, .. } => ExecutionReply::Completed {
                result,
                language: params.language.clone(),
                identity: session.identity().clone(),
            },
            refused @ (GateDecision::Unsupported { .. } | GateDecision::Denied { .. }) => {
                ExecutionReply::Refused {
                    error: refused.refusal_message().unwrap_or_default(),
                    session_id: session.session_id().to_owned(),
                }
            }
        };
        Ok(reply)
    }
}
