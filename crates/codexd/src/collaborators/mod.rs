//! External collaborators consumed by the handlers.
//!
//! Text generation, suggestion generation and code execution are delegated
//! to services outside this crate. Each is modelled as a trait so that the
//! server can be wired to a real backend, to the placeholders in
//! [`placeholder`], or to test doubles.
//!
//! Calls are synchronous and carry no timeout: a stalled collaborator stalls
//! the request loop.

pub mod placeholder;

use codex_protocol::{ExecutionResult, SuggestionItem};
use thiserror::Error;

use crate::gate::LanguageFamily;
use crate::session::SessionContext;

use self::placeholder::{
    PlaceholderSuggestionGenerator, PlaceholderTextGenerator, SimulatedExecutor,
};

/// Errors reported by external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached.
    #[error("{collaborator} is unavailable: {message}")]
    Unavailable {
        /// Name of the collaborator.
        collaborator: &'static str,
        /// Failure details.
        message: String,
    },
    /// The collaborator was reached but failed to produce a result.
    #[error("{collaborator} failed: {message}")]
    Failed {
        /// Name of the collaborator.
        collaborator: &'static str,
        /// Failure details.
        message: String,
    },
}

impl CollaboratorError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator,
            message: message.into(),
        }
    }

    /// Creates a failed error.
    #[must_use]
    pub fn failed(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            collaborator,
            message: message.into(),
        }
    }
}

/// Text-completion service used by the chat handler.
pub trait TextGenerator {
    /// Produces a reply for an assembled prompt.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] when no reply can be produced.
    fn generate(&self, prompt: &str, session: &SessionContext) -> Result<String, CollaboratorError>;
}

/// Code-suggestion service used by the suggestion handler.
pub trait SuggestionGenerator {
    /// Produces suggestions for an assembled prompt.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] when no suggestions can be produced.
    fn suggest(&self, prompt: &str) -> Result<Vec<SuggestionItem>, CollaboratorError>;
}

/// Per-language execution backend reached through the execution gate.
///
/// Implementations are responsible for isolation; the gate only filters.
pub trait CodeExecutor {
    /// Runs code that has already passed the gate.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] when the backend cannot run the code.
    fn execute(&self, code: &str) -> Result<ExecutionResult, CollaboratorError>;
}

/// One executor per supported language family.
pub struct Executors {
    typescript: Box<dyn CodeExecutor>,
    python: Box<dyn CodeExecutor>,
}

impl Executors {
    /// Creates a table from explicit executors.
    #[must_use]
    pub fn new(
        typescript: impl CodeExecutor + 'static,
        python: impl CodeExecutor + 'static,
    ) -> Self {
        Self {
            typescript: Box::new(typescript),
            python: Box::new(python),
        }
    }

    /// Creates a table of simulated executors.
    #[must_use]
    pub fn simulated() -> Self {
        Self::new(
            SimulatedExecutor::new(LanguageFamily::TypeScript),
            SimulatedExecutor::new(LanguageFamily::Python),
        )
    }

    /// Replaces the executor for one family.
    #[must_use]
    pub fn with(mut self, family: LanguageFamily, executor: impl CodeExecutor + 'static) -> Self {
        match family {
            LanguageFamily::TypeScript => self.typescript = Box::new(executor),
            LanguageFamily::Python => self.python = Box::new(executor),
        }
        self
    }

    /// Returns the executor for a family.
    #[must_use]
    pub fn get(&self, family: LanguageFamily) -> &dyn CodeExecutor {
        match family {
            LanguageFamily::TypeScript => self.typescript.as_ref(),
            LanguageFamily::Python => self.python.as_ref(),
        }
    }
}

/// The full set of collaborators a dispatcher is wired with.
pub struct Collaborators {
    pub(crate) text: Box<dyn TextGenerator>,
    pub(crate) suggestions: Box<dyn SuggestionGenerator>,
    pub(crate) executors: Executors,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl Collaborators {
    /// Wires the built-in placeholders for every collaborator.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            text: Box::new(PlaceholderTextGenerator),
            suggestions: Box::new(PlaceholderSuggestionGenerator),
            executors: Executors::simulated(),
        }
    }

    /// Replaces the text generator.
    #[must_use]
    pub fn with_text_generator(mut self, generator: impl TextGenerator + 'static) -> Self {
        self.text = Box::new(generator);
        self
    }

    /// Replaces the suggestion generator.
    #[must_use]
    pub fn with_suggestion_generator(
        mut self,
        generator: impl SuggestionGenerator + 'static,
    ) -> Self {
        self.suggestions = Box::new(generator);
        self
    }

    /// Replaces the executor for one language family.
    #[must_use]
    pub fn with_executor(
        mut self,
        family: LanguageFamily,
        executor: impl CodeExecutor + 'static,
    ) -> Self {
        self.executors = self.executors.with(family, executor);
        self
    }

    /// Replaces the whole executor table.
    #[must_use]
    pub fn with_executors(mut self, executors: Executors) -> Self {
        self.executors = executors;
        self
    }
}
