//! Newline-delimited framing over byte streams.
//!
//! [`LineReader`] yields one [`Frame`] per `\n`-terminated line, bounding
//! the bytes buffered for any single line. Oversized lines are consumed up
//! to their terminator without being kept, so the stream stays aligned on
//! line boundaries. [`ResponseWriter`] emits one envelope per line and
//! flushes after each.

use std::io::{self, BufRead, Read, Write};

use codex_protocol::ResultEnvelope;
use thiserror::Error;

/// Maximum size of a single request line in bytes, excluding the terminator.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Errors raised by the stream endpoints.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading from the input stream failed.
    #[error("failed to read request: {source}")]
    Read {
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// Writing or flushing the output stream failed.
    #[error("failed to write response: {source}")]
    Write {
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// A response envelope could not be encoded.
    #[error("failed to encode response: {source}")]
    Encode {
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },
}

/// One unit read from the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete line without its `\n` terminator.
    Line(Vec<u8>),
    /// A line longer than the limit; its bytes were discarded.
    Oversized {
        /// Length of the discarded line, excluding the terminator.
        size: usize,
    },
}

/// Bounded line reader.
pub struct LineReader<R> {
    reader: R,
    limit: usize,
}

impl<R: BufRead> LineReader<R> {
    /// Creates a reader enforcing [`MAX_LINE_BYTES`].
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self::with_limit(reader, MAX_LINE_BYTES)
    }

    /// Creates a reader with a custom line limit.
    #[must_use]
    pub const fn with_limit(reader: R, limit: usize) -> Self {
        Self { reader, limit }
    }

    /// Returns the line limit in bytes.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Blocks until input is available without consuming any of it.
    ///
    /// Returns `false` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Read`] when the underlying reader fails.
    pub fn wait_for_input(&mut self) -> Result<bool, StreamError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buffer) => return Ok(!buffer.is_empty()),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => return Err(StreamError::Read { source }),
            }
        }
    }

    /// Reads the next frame, returning `None` at end of input.
    ///
    /// A final line without a terminator is still returned as a frame.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Read`] when the underlying reader fails.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, StreamError> {
        let mut line = Vec::new();
        let budget = u64::try_from(self.limit)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let read = (&mut self.reader)
            .take(budget)
            .read_until(b'\n', &mut line)
            .map_err(|source| StreamError::Read { source })?;
        if read == 0 {
            return Ok(None);
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            return Ok(Some(Frame::Line(line)));
        }
        if line.len() > self.limit {
            let discarded = self.discard_rest_of_line()?;
            return Ok(Some(Frame::Oversized {
                size: line.len().saturating_add(discarded),
            }));
        }
        Ok(Some(Frame::Line(line)))
    }

    /// Consumes input up to and including the next `\n`, returning the
    /// number of bytes skipped before it.
    fn discard_rest_of_line(&mut self) -> Result<usize, StreamError> {
        let mut discarded = 0_usize;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(buffer) => buffer,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(StreamError::Read { source }),
            };
            if available.is_empty() {
                return Ok(discarded);
            }
            let length = available.len();
            let terminator = available.iter().position(|byte| *byte == b'\n');
            match terminator {
                Some(newline) => {
                    self.reader.consume(newline.saturating_add(1));
                    return Ok(discarded.saturating_add(newline));
                }
                None => {
                    self.reader.consume(length);
                    discarded = discarded.saturating_add(length);
                }
            }
        }
    }
}

/// Writer emitting one response envelope per line.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a writer over the given output stream.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes an envelope followed by `\n` and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Encode`] if the envelope cannot be encoded, or
    /// [`StreamError::Write`] if writing or flushing fails.
    pub fn write_envelope(&mut self, envelope: &ResultEnvelope) -> Result<(), StreamError> {
        let mut line =
            serde_json::to_vec(envelope).map_err(|source| StreamError::Encode { source })?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .and_then(|()| self.writer.flush())
            .map_err(|source| StreamError::Write { source })
    }

    /// Returns the wrapped output stream.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
