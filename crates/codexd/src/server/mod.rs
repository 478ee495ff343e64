//! The request loop.
//!
//! The loop alternates between two states. It is *Listening* while blocked
//! on the next line with nothing in flight, and *Processing* from the moment
//! a line arrives until its response has been flushed. Exactly one request
//! is processed at a time; the [`FlightSlot`] enforces this and publishes the
//! current state to the signal handlers.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use codex_protocol::ResultEnvelope;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::{Dispatcher, TransportError};
use crate::shutdown::{ShutdownError, ShutdownFlag};
use crate::telemetry::TelemetryError;
use crate::transport::{Frame, LineReader, MAX_LINE_BYTES, ResponseWriter, StreamError};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Standard input or output failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// The flight slot was already held when a line arrived.
    #[error("a request is already in flight")]
    RequestInFlight,
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// Signal handlers could not be installed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

/// Observable state of the request loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the next line with no request in flight.
    Listening,
    /// Handling a request; ends once its response is flushed.
    Processing,
}

/// Single permit guarding request processing.
///
/// The loop takes the permit once input is pending and before any of it is
/// consumed. A line that has started to arrive therefore counts as in
/// flight: a signal received while its remaining bytes are awaited is
/// deferred until the line is answered. Clones share the same permit.
#[derive(Debug, Clone)]
pub struct FlightSlot {
    idle: Arc<AtomicBool>,
}

impl Default for FlightSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightSlot {
    /// Creates an idle slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            idle: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns the shared flag that is `true` exactly while the slot is idle.
    #[must_use]
    pub fn idle_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.idle)
    }

    /// Returns the current loop state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        if self.idle.load(Ordering::SeqCst) {
            LoopState::Listening
        } else {
            LoopState::Processing
        }
    }

    /// Takes the permit, or returns `None` while it is held.
    #[must_use]
    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.idle
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlightPermit { idle: &self.idle })
    }
}

/// Held while a request is processed; releases the slot on drop.
#[derive(Debug)]
pub struct FlightPermit<'slot> {
    idle: &'slot AtomicBool,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.idle.store(true, Ordering::SeqCst);
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The input stream closed.
    EndOfInput,
    /// A shutdown signal arrived while a request was in flight.
    ShutdownRequested,
}

/// Outcome of a completed [`Server::serve`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    /// Number of lines answered.
    pub processed: u64,
    /// Why the loop stopped.
    pub stop: StopReason,
}

/// Line-delimited JSON server over a pair of byte streams.
pub struct Server {
    dispatcher: Dispatcher,
    slot: FlightSlot,
    shutdown: ShutdownFlag,
    line_limit: usize,
}

impl Server {
    /// Creates a server around a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            slot: FlightSlot::new(),
            shutdown: ShutdownFlag::new(),
            line_limit: MAX_LINE_BYTES,
        }
    }

    /// Replaces the shutdown flag observed between requests.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownFlag) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Replaces the request line limit.
    #[must_use]
    pub const fn with_line_limit(mut self, limit: usize) -> Self {
        self.line_limit = limit;
        self
    }

    /// Returns the slot guarding request processing.
    #[must_use]
    pub const fn flight_slot(&self) -> &FlightSlot {
        &self.slot
    }

    /// Returns the shutdown flag observed between requests.
    #[must_use]
    pub const fn shutdown_flag(&self) -> &ShutdownFlag {
        &self.shutdown
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Answers each line of `input` on `output` until input ends or a
    /// shutdown is requested.
    ///
    /// Malformed and failing requests are answered and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Stream`] when reading or writing fails and
    /// [`ServerError::RequestInFlight`] when the slot is already held.
    pub fn serve<R, W>(&self, input: R, output: W) -> Result<ServeSummary, ServerError>
    where
        R: BufRead,
        W: Write,
    {
        let mut reader = LineReader::with_limit(input, self.line_limit);
        let mut writer = ResponseWriter::new(output);
        let mut processed = 0_u64;

        loop {
            if self.shutdown.is_requested() {
                info!(target: SERVER_TARGET, processed, "shutdown requested");
                return Ok(ServeSummary {
                    processed,
                    stop: StopReason::ShutdownRequested,
                });
            }

            if !reader.wait_for_input()? {
                return Ok(Self::end_of_input(processed));
            }

            // Held before the line is consumed, so an idle-exit signal can
            // never drop a request whose bytes were already read.
            let permit = self
                .slot
                .try_acquire()
                .ok_or(ServerError::RequestInFlight)?;
            debug!(target: SERVER_TARGET, "request pending");
            let Some(frame) = reader.next_frame()? else {
                return Ok(Self::end_of_input(processed));
            };
            let envelope = self.respond(&frame);
            writer.write_envelope(&envelope)?;
            drop(permit);
            processed = processed.saturating_add(1);
        }
    }

    fn end_of_input(processed: u64) -> ServeSummary {
        info!(target: SERVER_TARGET, processed, "end of input");
        ServeSummary {
            processed,
            stop: StopReason::EndOfInput,
        }
    }

    fn respond(&self, frame: &Frame) -> ResultEnvelope {
        match frame {
            Frame::Line(line) => self.dispatcher.dispatch_line(line),
            Frame::Oversized { size } => {
                let error = TransportError::TooLarge {
                    size: *size,
                    max: self.line_limit,
                };
                warn!(target: SERVER_TARGET, %error, "malformed line");
                error.into_envelope()
            }
        }
    }
}

#[cfg(test)]
mod tests;
