//! Suggestion handler and prompt assembly.

use codex_protocol::{SuggestParams, SuggestionReply};
use serde_json::{Map, Value};

use super::render::render_context;
use crate::collaborators::{CollaboratorError, SuggestionGenerator};
use crate::session::SessionContext;

const SUGGESTION_CONSTRAINTS: [&str; 5] = [
    "1. Follow TypeScript best practices",
    "2. Are compatible with the CortexBuild platform",
    "3. Use modern React patterns",
    "4. Include proper error handling",
    "5. Are production-ready",
];

/// Assembles the suggestion prompt from the request and optional context.
///
/// Absent or empty context is rendered as `None`.
#[must_use]
pub fn build_suggestion_prompt(prompt: &str, context: Option<&Map<String, Value>>) -> String {
    let rendered_context = context
        .filter(|data| !data.is_empty())
        .map_or_else(|| String::from("None"), render_context);

    let mut lines = vec![
        String::from("CortexBuild Platform Code Suggestion Request:"),
        String::new(),
        format!("User Request: {prompt}"),
        String::new(),
        format!("Context: {rendered_context}"),
        String::new(),
        String::from("Platform: TypeScript/Node.js with better-sqlite3"),
        String::from("Framework: React 19, Vite, Tailwind CSS"),
        String::new(),
        String::from("Please provide code suggestions that:"),
    ];
    lines.extend(SUGGESTION_CONSTRAINTS.iter().map(|line| (*line).to_owned()));
    lines.push(String::new());
    lines.push(String::from("Provide multiple suggestions if applicable."));

    lines.join("\n")
}

/// Handles `suggest` requests.
pub struct SuggestionHandler {
    generator: Box<dyn SuggestionGenerator>,
}

impl SuggestionHandler {
    /// Creates a handler over a suggestion generator.
    #[must_use]
    pub fn new(generator: Box<dyn SuggestionGenerator>) -> Self {
        Self { generator }
    }

    /// Builds the prompt and returns the generator's suggestions verbatim,
    /// echoing the request prompt and context.
    ///
    /// # Errors
    ///
    /// Returns the generator's [`CollaboratorError`] unchanged.
    pub fn handle(
        &self,
        params: &SuggestParams,
        session: &SessionContext,
    ) -> Result<SuggestionReply, CollaboratorError> {
        let prompt = build_suggestion_prompt(&params.prompt, params.context.as_ref());
        let suggestions = self.generator.suggest(&prompt)?;
        Ok(SuggestionReply {
            suggestions,
            prompt: params.prompt.clone(),
            context: params.context.clone(),
            identity: session.identity().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use codex_protocol::SuggestionItem;
    use mockall::mock;
    use mockall::predicate::function;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    mock! {
        Suggester {}
        impl SuggestionGenerator for Suggester {
            fn suggest(&self, prompt: &str) -> Result<Vec<SuggestionItem>, CollaboratorError>;
        }
    }

    fn item(title: &str) -> SuggestionItem {
        SuggestionItem {
            title: title.to_owned(),
            description: String::from("desc"),
            code: String::from("let x = 1;"),
            language: String::from("typescript"),
        }
    }

    #[test]
    fn prompt_embeds_request_and_context() {
        let mut context = Map::new();
        context.insert(String::from("file"), json!("db.ts"));

        let prompt = build_suggestion_prompt("add a users query", Some(&context));

        assert!(prompt.contains("User Request: add a users query"));
        assert!(prompt.contains(r#"Context: {"file": "db.ts"}"#));
        assert!(prompt.contains("Platform: TypeScript/Node.js with better-sqlite3"));
        assert!(prompt.contains("5. Are production-ready"));
    }

    #[rstest]
    #[case::missing(None)]
    #[case::empty(Some(Map::new()))]
    fn missing_or_empty_context_renders_as_none(#[case] context: Option<Map<String, Value>>) {
        let prompt = build_suggestion_prompt("anything", context.as_ref());
        assert!(prompt.contains("Context: None"));
    }

    #[test]
    fn suggestions_are_returned_verbatim_with_echoed_fields() {
        let mut generator = MockSuggester::new();
        generator
            .expect_suggest()
            .with(function(|prompt: &str| prompt.contains("User Request: sort users")))
            .once()
            .returning(|_| Ok(vec![item("first"), item("second")]));
        let handler = SuggestionHandler::new(Box::new(generator));
        let mut context = Map::new();
        context.insert(String::from("table"), json!("users"));
        let params = SuggestParams {
            prompt: String::from("sort users"),
            context: Some(context.clone()),
        };

        let reply = handler
            .handle(&params, &SessionContext::new("s-2", "u-2"))
            .expect("suggest reply");

        assert_eq!(reply.suggestions, vec![item("first"), item("second")]);
        assert_eq!(reply.prompt, "sort users");
        assert_eq!(reply.context, Some(context));
        assert_eq!(reply.identity.session_id, "s-2");
        assert_eq!(reply.identity.user_id, "u-2");
    }

    #[test]
    fn generator_failure_is_returned() {
        let mut generator = MockSuggester::new();
        generator
            .expect_suggest()
            .returning(|_| Err(CollaboratorError::unavailable("suggestion generator", "offline")));
        let handler = SuggestionHandler::new(Box::new(generator));

        let error = handler
            .handle(&SuggestParams::default(), &SessionContext::new("s", "u"))
            .expect_err("generator failure");

        assert!(matches!(error, CollaboratorError::Unavailable { .. }));
    }
}
