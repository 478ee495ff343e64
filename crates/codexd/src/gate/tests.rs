//! Unit tests for the execution gate.

use codex_protocol::{ExecutionResult, ExecutionStatus};
use mockall::mock;
use rstest::{fixture, rstest};

use super::*;
use crate::collaborators::CodeExecutor;

mock! {
    Executor {}
    impl CodeExecutor for Executor {
        fn execute(&self, code: &str) -> Result<ExecutionResult, CollaboratorError>;
    }
}

fn never_called() -> MockExecutor {
    let mut executor = MockExecutor::new();
    executor.expect_execute().never();
    executor
}

fn echoing(language: &'static str) -> MockExecutor {
    let mut executor = MockExecutor::new();
    executor
        .expect_execute()
        .returning(move |code| Ok(ExecutionResult::success(code, language)));
    executor
}

#[fixture]
fn gate() -> ExecutionGate {
    ExecutionGate::new(Denylist::default(), Executors::simulated())
}

#[rstest]
#[case::typescript("typescript", LanguageFamily::TypeScript)]
#[case::javascript("JavaScript", LanguageFamily::TypeScript)]
#[case::ts("TS", LanguageFamily::TypeScript)]
#[case::js(" js ", LanguageFamily::TypeScript)]
#[case::python("Python", LanguageFamily::Python)]
#[case::py("py", LanguageFamily::Python)]
fn normalises_supported_languages(#[case] tag: &str, #[case] expected: LanguageFamily) {
    assert_eq!(LanguageFamily::normalise(tag), Some(expected));
}

#[rstest]
#[case::rust("rust")]
#[case::empty("")]
#[case::partial("pyth")]
fn rejects_unsupported_languages(#[case] tag: &str) {
    assert_eq!(LanguageFamily::normalise(tag), None);
}

#[rstest]
#[case::eval("eval(x)")]
#[case::eval_upper("EVAL(x)")]
#[case::exec("exec('1')")]
#[case::import_os("import os\nos.listdir()")]
#[case::subprocess("import subprocess")]
#[case::file_scheme("open('file:///etc/passwd')")]
#[case::http("fetch('http://example.com')")]
#[case::https("fetch('HTTPS://example.com')")]
#[case::dunder_import("__import__('sys')")]
#[case::rm("rm -rf /")]
#[case::del("del items[0]")]
#[case::drop_table("DROP TABLE users;")]
#[case::delete_from("Delete From users")]
fn default_denylist_matches_unsafe_code(#[case] code: &str) {
    assert!(Denylist::default().find_match(code).is_some(), "{code}");
}

#[rstest]
#[case::console("console.log(1)")]
#[case::print("print(1)")]
#[case::arithmetic("const x = 1 + 2;")]
fn default_denylist_passes_benign_code(#[case] code: &str) {
    assert_eq!(Denylist::default().find_match(code), None);
}

#[test]
fn custom_denylist_patterns_are_case_insensitive() {
    let denylist = Denylist::new(["Process.Exit", ""]);
    assert_eq!(denylist.patterns(), &[String::from("process.exit")]);
    assert_eq!(denylist.find_match("PROCESS.EXIT(1)"), Some("process.exit"));
}

#[rstest]
#[case::typescript("typescript")]
#[case::python("python")]
#[case::unsupported("cobol")]
fn denied_code_never_reaches_an_executor(#[case] language: &str) {
    let gate = ExecutionGate::new(
        Denylist::default(),
        Executors::new(never_called(), never_called()),
    );

    let decision = gate.evaluate("EVAL('1 + 1')", language).expect("gate decision");

    assert!(matches!(
        decision,
        GateDecision::Denied { .. } | GateDecision::Unsupported { .. }
    ));
    assert!(decision.refusal_message().is_some());
}

#[test]
fn denial_reports_matched_pattern_and_fixed_message() {
    let gate = ExecutionGate::new(
        Denylist::default(),
        Executors::new(never_called(), never_called()),
    );

    let decision = gate.evaluate("eval(1)", "python").expect("gate decision");

    assert_eq!(
        decision,
        GateDecision::Denied {
            pattern: String::from("eval(")
        }
    );
    assert_eq!(decision.refusal_message().as_deref(), Some(DENIED_MESSAGE));
}

#[test]
fn unsupported_language_short_circuits_before_screening() {
    let gate = ExecutionGate::new(
        Denylist::default(),
        Executors::new(never_called(), never_called()),
    );

    let decision = gate.evaluate("eval(1)", "Haskell").expect("gate decision");

    assert_eq!(
        decision,
        GateDecision::Unsupported {
            language: String::from("Haskell")
        }
    );
    assert_eq!(
        decision.refusal_message().as_deref(),
        Some("Unsupported language: Haskell")
    );
}

#[test]
fn typescript_code_routes_to_typescript_executor() {
    let gate = ExecutionGate::new(
        Denylist::default(),
        Executors::new(echoing("typescript"), never_called()),
    );

    let decision = gate
        .evaluate("console.log(1)", "typescript")
        .expect("gate decision");

    match decision {
        GateDecision::Executed { family, result } => {
            assert_eq!(family, LanguageFamily::TypeScript);
            assert_eq!(result.status, ExecutionStatus::Success);
            assert_eq!(result.output, "console.log(1)");
        }
        other => panic!("expected execution, got {other:?}"),
    }
}

#[test]
fn python_code_routes_to_python_executor() {
    let gate = ExecutionGate::new(
        Denylist::default(),
        Executors::new(never_called(), echoing("python")),
    );

    let decision = gate.evaluate("print(1)", "py").expect("gate decision");

    assert!(matches!(
        decision,
        GateDecision::Executed {
            family: LanguageFamily::Python,
            ..
        }
    ));
}

#[test]
fn executor_failure_propagates() {
    let mut failing = MockExecutor::new();
    failing
        .expect_execute()
        .returning(|_| Err(CollaboratorError::unavailable("python executor", "offline")));
    let gate = ExecutionGate::new(
        Denylist::default(),
        Executors::new(never_called(), failing),
    );

    let error = gate
        .evaluate("print(1)", "python")
        .expect_err("executor failure");

    assert_eq!(error.to_string(), "python executor is unavailable: offline");
}

#[rstest]
fn repeated_requests_yield_identical_decisions(gate: ExecutionGate) {
    let first = gate.evaluate("print(1)", "python").expect("first");
    let second = gate.evaluate("print(1)", "python").expect("second");

    assert_eq!(first, second);
}

#[rstest]
fn custom_denylist_replaces_default(gate: ExecutionGate) {
    let restricted = gate.with_denylist(Denylist::new(["console"]));

    let denied = restricted
        .evaluate("console.log(1)", "js")
        .expect("gate decision");
    assert!(matches!(denied, GateDecision::Denied { .. }));

    let allowed = restricted.evaluate("eval(1)", "js").expect("gate decision");
    assert!(matches!(allowed, GateDecision::Executed { .. }));
}
