//! Execution gate: language normalisation and denylist screening.
//!
//! Every `execute` request passes through [`ExecutionGate::evaluate`] before
//! any executor sees it:
//!
//! 1. The declared language is normalised into a [`LanguageFamily`].
//!    Unsupported languages are refused without screening.
//! 2. The code is screened against a [`Denylist`]. A match refuses the
//!    request and no executor is invoked.
//! 3. Code that passes is forwarded to the family's executor.
//!
//! The denylist is a best-effort deterrent based on substring matching. It
//! is trivially bypassed by obfuscated code and is **not** an isolation
//! boundary: real isolation belongs to the execution backend, which must run
//! code under process- or container-level separation.

use codex_protocol::ExecutionResult;
use tracing::{debug, warn};

use crate::collaborators::{CollaboratorError, Executors};

/// Tracing target for gate decisions.
const GATE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::gate");

/// Refusal message for denylisted code.
pub const DENIED_MESSAGE: &str = "Code execution denied for security reasons";

/// Substrings treated as signalling unsafe intent.
///
/// Covers dynamic evaluation, shell and process access, URL schemes and
/// destructive data statements.
pub const DEFAULT_DENYLIST: [&str; 12] = [
    "eval(",
    "exec(",
    "import os",
    "subprocess",
    "file://",
    "http://",
    "https://",
    "__import__",
    "rm -rf",
    "del ",
    "drop table",
    "delete from",
];

/// Canonical language families with an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// TypeScript and JavaScript.
    TypeScript,
    /// Python.
    Python,
}

impl LanguageFamily {
    /// Normalises a free-form language tag, ignoring ASCII case and
    /// surrounding whitespace.
    ///
    /// Returns `None` for unsupported languages.
    #[must_use]
    pub fn normalise(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "typescript" | "javascript" | "ts" | "js" => Some(Self::TypeScript),
            "python" | "py" => Some(Self::Python),
            _ => None,
        }
    }

    /// Returns the canonical lower-case family name.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Python => "python",
        }
    }

    /// Returns the human-facing family name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::Python => "Python",
        }
    }
}

/// Case-insensitive substring denylist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    patterns: Vec<String>,
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST)
    }
}

impl Denylist {
    /// Builds a denylist; patterns are stored lower-cased.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|pattern| pattern.as_ref().to_lowercase())
                .filter(|pattern| !pattern.is_empty())
                .collect(),
        }
    }

    /// Returns the first pattern found in `code`, if any.
    #[must_use]
    pub fn find_match(&self, code: &str) -> Option<&str> {
        let lowered = code.to_lowercase();
        self.patterns
            .iter()
            .find(|pattern| lowered.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Returns the stored patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Outcome of running a request through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The declared language maps to no family.
    Unsupported {
        /// Language as declared by the caller.
        language: String,
    },
    /// The code matched the denylist.
    Denied {
        /// The matching pattern.
        pattern: String,
    },
    /// The code passed and was executed.
    Executed {
        /// Family that ran the code.
        family: LanguageFamily,
        /// Executor output.
        result: ExecutionResult,
    },
}

impl GateDecision {
    /// Returns the caller-facing refusal message, or `None` when executed.
    #[must_use]
    pub fn refusal_message(&self) -> Option<String> {
        match self {
            Self::Unsupported { language } => Some(format!("Unsupported language: {language}")),
            Self::Denied { .. } => Some(DENIED_MESSAGE.to_owned()),
            Self::Executed { .. } => None,
        }
    }
}

/// Gate deciding whether submitted code may reach an executor.
pub struct ExecutionGate {
    denylist: Denylist,
    executors: Executors,
}

impl ExecutionGate {
    /// Creates a gate over the given denylist and executors.
    #[must_use]
    pub const fn new(denylist: Denylist, executors: Executors) -> Self {
        Self {
            denylist,
            executors,
        }
    }

    /// Replaces the denylist.
    #[must_use]
    pub fn with_denylist(mut self, denylist: Denylist) -> Self {
        self.denylist = denylist;
        self
    }

    /// Returns the active denylist.
    #[must_use]
    pub const fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// Normalises, screens and, when permitted, executes `code`.
    ///
    /// Refusals are returned as [`GateDecision`] values; they are policy
    /// outcomes, not errors. The gate keeps no state between calls.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] only when the selected executor fails.
    pub fn evaluate(&self, code: &str, language: &str) -> Result<GateDecision, CollaboratorError> {
        let Some(family) = LanguageFamily::normalise(language) else {
            warn!(target: GATE_TARGET, language, "unsupported language");
            return Ok(GateDecision::Unsupported {
                language: language.to_owned(),
            });
        };

        if let Some(pattern) = self.denylist.find_match(code) {
            warn!(
                target: GATE_TARGET,
                family = family.canonical_name(),
                pattern,
                "code execution denied"
            );
            return Ok(GateDecision::Denied {
                pattern: pattern.to_owned(),
            });
        }

        debug!(
            target: GATE_TARGET,
            family = family.canonical_name(),
            code_bytes = code.len(),
            "forwarding code to executor"
        );
        let result = self.executors.get(family).execute(code)?;
        Ok(GateDecision::Executed { family, result })
    }
}

#[cfg(test)]
mod tests;
