//! Chat handler and prompt assembly.

use codex_protocol::{ChatParams, ChatReply, ContextItem, ConversationTurn};

use super::render::render_context;
use crate::collaborators::{CollaboratorError, TextGenerator};
use crate::session::SessionContext;

/// Number of most recent conversation turns included in a prompt.
pub const HISTORY_WINDOW: usize = 10;

const PLATFORM_PREAMBLE: [&str; 9] = [
    "You are Codex, an advanced AI coding assistant integrated with the CortexBuild platform.",
    "",
    "CortexBuild Platform Details:",
    "- TypeScript/Node.js backend with better-sqlite3 database",
    "- React 19 frontend with Vite and Tailwind CSS",
    "- MCP (Model Context Protocol) for enhanced AI context",
    "- Base44Clone construction management features",
    "- Developer SDK and marketplace functionality",
    "",
];

/// Assembles the chat prompt.
///
/// The prompt is the platform preamble, then one `- [type]: data` line per
/// context item, then the last [`HISTORY_WINDOW`] turns as `ROLE: content`
/// in their original order. Earlier turns are dropped.
#[must_use]
pub fn build_chat_prompt(turns: &[ConversationTurn], contexts: &[ContextItem]) -> String {
    let mut lines: Vec<String> = PLATFORM_PREAMBLE.iter().map(|line| (*line).to_owned()).collect();

    lines.push(String::from("Relevant Context:"));
    lines.extend(contexts.iter().map(|item| {
        format!(
            "- [{}]: {}",
            item.context_type,
            render_context(&item.context_data)
        )
    }));

    lines.push(String::new());
    lines.push(String::from("Conversation History:"));
    let skipped = turns.len().saturating_sub(HISTORY_WINDOW);
    lines.extend(
        turns
            .iter()
            .skip(skipped)
            .map(|turn| format!("{}: {}", turn.role.label(), turn.content)),
    );

    lines.join("\n")
}

/// Handles `chat` requests.
pub struct ChatHandler {
    generator: Box<dyn TextGenerator>,
}

impl ChatHandler {
    /// Creates a handler over a text generator.
    #[must_use]
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Builds the prompt, delegates to the generator and stamps the reply.
    ///
    /// # Errors
    ///
    /// Returns the generator's [`CollaboratorError`] unchanged.
    pub fn handle(
        &self,
        params: &ChatParams,
        session: &SessionContext,
    ) -> Result<ChatReply, CollaboratorError> {
        let prompt = build_chat_prompt(&params.messages, &params.contexts);
        let content = self.generator.generate(&prompt, session)?;
        Ok(ChatReply {
            content,
            identity: session.identity().clone(),
            timestamp: session.elapsed_seconds(),
        })
    }
}
