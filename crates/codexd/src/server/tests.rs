//! Unit tests for the request loop.

use std::cell::RefCell;
use std::io::{self, Cursor};
use std::rc::Rc;

use mockall::mock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::collaborators::{CollaboratorError, Collaborators, TextGenerator};
use crate::session::SessionContext;

mock! {
    Generator {}
    impl TextGenerator for Generator {
        fn generate(
            &self,
            prompt: &str,
            session: &SessionContext,
        ) -> Result<String, CollaboratorError>;
    }
}

#[fixture]
fn server() -> Server {
    Server::new(Dispatcher::new(
        SessionContext::new("s-1", "u-1"),
        Collaborators::placeholder(),
    ))
}

fn run(server: &Server, input: &str) -> (ServeSummary, Vec<Value>) {
    let mut output = Vec::new();
    let summary = server
        .serve(Cursor::new(input.as_bytes().to_vec()), &mut output)
        .expect("serve");
    let text = String::from_utf8(output).expect("utf8 output");
    let replies = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply is JSON"))
        .collect();
    (summary, replies)
}

/// Records the loop state observed on every write.
struct StateRecorder {
    slot: FlightSlot,
    states: Rc<RefCell<Vec<LoopState>>>,
}

impl Write for StateRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.states.borrow_mut().push(self.slot.state());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.states.borrow_mut().push(self.slot.state());
        Ok(())
    }
}

/// Records the loop state observed whenever input bytes are consumed.
struct ConsumeRecorder {
    inner: Cursor<Vec<u8>>,
    slot: FlightSlot,
    states: Rc<RefCell<Vec<LoopState>>>,
}

impl io::Read for ConsumeRecorder {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.inner, buf)
    }
}

impl BufRead for ConsumeRecorder {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amount: usize) {
        self.states.borrow_mut().push(self.slot.state());
        self.inner.consume(amount);
    }
}

#[test]
fn slot_admits_one_permit_at_a_time() {
    let slot = FlightSlot::new();
    assert_eq!(slot.state(), LoopState::Listening);

    let permit = slot.try_acquire().expect("first permit");
    assert_eq!(slot.state(), LoopState::Processing);
    assert!(slot.try_acquire().is_none());
    assert!(!slot.idle_flag().load(Ordering::SeqCst));

    drop(permit);
    assert_eq!(slot.state(), LoopState::Listening);
    assert!(slot.try_acquire().is_some());
}

#[test]
fn cloned_slots_share_the_permit() {
    let slot = FlightSlot::new();
    let observer = slot.clone();

    let _permit = slot.try_acquire().expect("permit");

    assert_eq!(observer.state(), LoopState::Processing);
    assert!(observer.try_acquire().is_none());
}

#[rstest]
fn answers_every_line_in_order(server: Server) {
    let input = concat!(
        r#"{"id":1,"method":"execute","params":{"code":"print(1)","language":"python"}}"#,
        "\n",
        r#"{"id":2,"method":"suggest"}"#,
        "\n",
        r#"{"id":3,"method":"foo"}"#,
        "\n",
    );

    let (summary, replies) = run(&server, input);

    assert_eq!(
        summary,
        ServeSummary {
            processed: 3,
            stop: StopReason::EndOfInput
        }
    );
    let ids: Vec<_> = replies.iter().map(|reply| reply.get("id").cloned()).collect();
    assert_eq!(ids, vec![Some(json!(1)), Some(json!(2)), Some(json!(3))]);
    assert_eq!(
        replies.last().and_then(|reply| reply.get("error")),
        Some(&json!("Unknown method: foo"))
    );
}

#[rstest]
fn malformed_lines_do_not_stop_the_loop(server: Server) {
    let input = "not json\n\n{\"id\":9,\"method\":\"suggest\"}\n";

    let (summary, replies) = run(&server, input);

    assert_eq!(summary.processed, 3);
    assert_eq!(replies.first(), Some(&json!({"error": "Invalid JSON message"})));
    assert_eq!(replies.get(1), Some(&json!({"error": "Invalid JSON message"})));
    assert_eq!(replies.get(2).and_then(|reply| reply.get("id")), Some(&json!(9)));
}

#[test]
fn oversized_lines_are_answered_and_skipped() {
    let server = Server::new(Dispatcher::new(
        SessionContext::new("s-1", "u-1"),
        Collaborators::placeholder(),
    ))
    .with_line_limit(32);
    let oversized = format!("{{\"id\":1,\"method\":\"chat\",\"pad\":\"{}\"}}", "x".repeat(64));
    let input = format!("{oversized}\n{{\"id\":2,\"method\":\"suggest\"}}\n");

    let (summary, replies) = run(&server, &input);

    assert_eq!(summary.processed, 2);
    assert_eq!(
        replies.first(),
        Some(&json!({
            "error": format!(
                "Request too large: {} bytes exceeds 32 byte limit",
                oversized.len()
            )
        }))
    );
    assert_eq!(replies.get(1).and_then(|reply| reply.get("id")), Some(&json!(2)));
}

#[rstest]
fn empty_input_ends_immediately(server: Server) {
    let (summary, replies) = run(&server, "");

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.stop, StopReason::EndOfInput);
    assert!(replies.is_empty());
}

#[rstest]
fn responses_are_written_while_processing(server: Server) {
    let states = Rc::new(RefCell::new(Vec::new()));
    let recorder = StateRecorder {
        slot: server.flight_slot().clone(),
        states: Rc::clone(&states),
    };

    server
        .serve(Cursor::new(b"{\"method\":\"suggest\"}\n".to_vec()), recorder)
        .expect("serve");

    let observed = states.borrow();
    assert!(!observed.is_empty());
    assert!(observed.iter().all(|state| *state == LoopState::Processing));
    assert_eq!(server.flight_slot().state(), LoopState::Listening);
}

#[rstest]
fn lines_are_consumed_while_processing(server: Server) {
    let states = Rc::new(RefCell::new(Vec::new()));
    let input = ConsumeRecorder {
        inner: Cursor::new(b"{\"id\":1,\"method\":\"suggest\"}\n{\"id\":2}\n".to_vec()),
        slot: server.flight_slot().clone(),
        states: Rc::clone(&states),
    };

    let summary = server.serve(input, Vec::new()).expect("serve");

    assert_eq!(summary.processed, 2);
    let observed = states.borrow();
    assert!(!observed.is_empty());
    assert!(observed.iter().all(|state| *state == LoopState::Processing));
}

#[rstest]
fn pending_shutdown_stops_before_reading(server: Server) {
    server.shutdown_flag().request();

    let (summary, replies) = run(&server, "{\"method\":\"suggest\"}\n");

    assert_eq!(
        summary,
        ServeSummary {
            processed: 0,
            stop: StopReason::ShutdownRequested
        }
    );
    assert!(replies.is_empty());
}

#[test]
fn shutdown_during_processing_finishes_current_response() {
    let shutdown = ShutdownFlag::new();
    let trigger = shutdown.clone();
    let mut generator = MockGenerator::new();
    generator.expect_generate().once().returning(move |_, _| {
        trigger.request();
        Ok(String::from("done"))
    });
    let server = Server::new(Dispatcher::new(
        SessionContext::new("s-1", "u-1"),
        Collaborators::placeholder().with_text_generator(generator),
    ))
    .with_shutdown(shutdown);
    let input = "{\"id\":1,\"method\":\"chat\"}\n{\"id\":2,\"method\":\"chat\"}\n";

    let (summary, replies) = run(&server, input);

    assert_eq!(summary.stop, StopReason::ShutdownRequested);
    assert_eq!(summary.processed, 1);
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies.first().and_then(|reply| reply.pointer("/result/content")),
        Some(&json!("done"))
    );
}

#[rstest]
fn held_slot_is_reported(server: Server) {
    let _permit = server.flight_slot().try_acquire().expect("permit");

    let error = server
        .serve(Cursor::new(b"{}\n".to_vec()), Vec::new())
        .expect_err("slot already held");

    assert!(matches!(error, ServerError::RequestInFlight));
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[rstest]
fn write_failures_are_fatal(server: Server) {
    let error = server
        .serve(
            Cursor::new(b"{\"method\":\"suggest\"}\n".to_vec()),
            FailingWriter,
        )
        .expect_err("write failure");

    assert!(matches!(
        error,
        ServerError::Stream(StreamError::Write { .. })
    ));
    assert_eq!(server.flight_slot().state(), LoopState::Listening);
}
