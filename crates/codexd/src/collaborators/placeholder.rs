//! Placeholder collaborators used until real backends are wired in.
//!
//! None of these reach an external service. The executors do not run
//! anything: they echo the submitted code annotated as a successful run.

use codex_protocol::{ExecutionResult, SuggestionItem};

use super::{CodeExecutor, CollaboratorError, SuggestionGenerator, TextGenerator};
use crate::gate::LanguageFamily;
use crate::session::SessionContext;

const COLLABORATOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::collaborators::placeholder");

/// Text generator returning a canned overview of platform capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderTextGenerator;

impl TextGenerator for PlaceholderTextGenerator {
    fn generate(
        &self,
        prompt: &str,
        session: &SessionContext,
    ) -> Result<String, CollaboratorError> {
        tracing::debug!(
            target: COLLABORATOR_TARGET,
            prompt_bytes = prompt.len(),
            "text generation requested from placeholder"
        );
        Ok(format!(
            concat!(
                "Based on the CortexBuild platform context, I can help you with:\n",
                "\n",
                "1. TypeScript/Node.js backend development\n",
                "2. React 19 frontend components\n",
                "3. better-sqlite3 database operations\n",
                "4. MCP context management\n",
                "5. Base44Clone feature implementation\n",
                "\n",
                "Please provide more specific details about what you'd like to accomplish.\n",
                "\n",
                "Session: {session}\n",
                "User: {user}",
            ),
            session = session.session_id(),
            user = session.user_id(),
        ))
    }
}

/// Suggestion generator returning two fixed TypeScript snippets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSuggestionGenerator;

impl SuggestionGenerator for PlaceholderSuggestionGenerator {
    fn suggest(&self, prompt: &str) -> Result<Vec<SuggestionItem>, CollaboratorError> {
        tracing::debug!(
            target: COLLABORATOR_TARGET,
            prompt_bytes = prompt.len(),
            "suggestions requested from placeholder"
        );
        Ok(vec![
            SuggestionItem {
                title: String::from("TypeScript Component"),
                description: String::from("React component with TypeScript"),
                code: String::from(
                    "const MyComponent: React.FC = () => {\n  return <div>Hello CortexBuild!</div>;\n};",
                ),
                language: String::from("typescript"),
            },
            SuggestionItem {
                title: String::from("Database Query"),
                description: String::from("better-sqlite3 query example"),
                code: String::from(
                    "const result = db.prepare('SELECT * FROM users WHERE role = ?').all('developer');",
                ),
                language: String::from("typescript"),
            },
        ])
    }
}

/// Executor stand-in that echoes the code as a successful run.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedExecutor {
    family: LanguageFamily,
}

impl SimulatedExecutor {
    /// Creates a simulated executor for one language family.
    #[must_use]
    pub const fn new(family: LanguageFamily) -> Self {
        Self { family }
    }
}

impl CodeExecutor for SimulatedExecutor {
    fn execute(&self, code: &str) -> Result<ExecutionResult, CollaboratorError> {
        Ok(ExecutionResult::success(
            format!("{} code execution simulated:\n{code}", self.family.display_name()),
            self.family.canonical_name(),
        ))
    }
}
