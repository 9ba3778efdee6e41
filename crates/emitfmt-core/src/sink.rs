//! Character output boundary.
//!
//! The engine only ever talks to a [`Sink`]. A sink may report itself
//! [`SinkState::Closed`], after which the engine stops emitting characters
//! but keeps parsing directives and consuming arguments, so the reported
//! length always matches what an unbounded sink would have received.

use std::io::Write;

use crate::error::{FormatError, SinkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Open,
    Closed,
}

/// Destination for formatted output.
///
/// Once a sink is closed its mutating operations must be no-ops that never
/// fail; the engine checks [`Sink::state`] before calling them anyway.
pub trait Sink {
    fn state(&self) -> SinkState;

    fn put_char(&mut self, ch: u8) -> Result<(), SinkError>;

    /// Emit a converted string.
    fn put_str(&mut self, s: &[u8]) -> Result<(), SinkError> {
        self.put_raw(s)
    }

    /// Emit a literal run copied from the format string.
    fn put_raw(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        for &b in bytes {
            if self.state() == SinkState::Closed {
                break;
            }
            self.put_char(b)?;
        }
        Ok(())
    }
}

/// Growable in-memory sink; never closes.
#[derive(Debug, Default, Clone)]
pub struct StringSink {
    buf: Vec<u8>,
}

impl StringSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Lossy UTF-8 view, mostly for tests and diagnostics.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

impl Sink for StringSink {
    fn state(&self) -> SinkState {
        SinkState::Open
    }

    fn put_char(&mut self, ch: u8) -> Result<(), SinkError> {
        self.buf.push(ch);
        Ok(())
    }

    fn put_raw(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// Fixed-capacity sink over a caller buffer.
///
/// Closes as soon as a byte does not fit; that byte and everything after it
/// are dropped silently.
#[derive(Debug)]
pub struct BufferSink<'b> {
    buf: &'b mut [u8],
    len: usize,
    state: SinkState,
}

impl<'b> BufferSink<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            state: SinkState::Open,
        }
    }

    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Close the sink early; subsequent output is discarded.
    pub fn close(&mut self) {
        self.state = SinkState::Closed;
    }
}

impl Sink for BufferSink<'_> {
    fn state(&self) -> SinkState {
        self.state
    }

    fn put_char(&mut self, ch: u8) -> Result<(), SinkError> {
        if self.state == SinkState::Closed {
            return Ok(());
        }
        match self.buf.get_mut(self.len) {
            Some(slot) => {
                *slot = ch;
                self.len += 1;
            }
            None => self.state = SinkState::Closed,
        }
        Ok(())
    }
}

/// Sink over any [`std::io::Write`] (file, socket, stdout).
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for WriteSink<W> {
    fn state(&self) -> SinkState {
        SinkState::Open
    }

    fn put_char(&mut self, ch: u8) -> Result<(), SinkError> {
        self.inner.write_all(&[ch])?;
        Ok(())
    }

    fn put_raw(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.inner.write_all(bytes)?;
        Ok(())
    }
}

/// Permanently closed sink, for length-only calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn state(&self) -> SinkState {
        SinkState::Closed
    }

    fn put_char(&mut self, _ch: u8) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Engine-side wrapper that gates every emission on the sink state.
pub(crate) struct Output<'s> {
    sink: &'s mut dyn Sink,
}

impl<'s> Output<'s> {
    pub(crate) fn new(sink: &'s mut dyn Sink) -> Self {
        Self { sink }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.sink.state() == SinkState::Open
    }

    pub(crate) fn char(&mut self, ch: u8) -> Result<(), FormatError> {
        if self.is_open() {
            self.sink.put_char(ch)?;
        }
        Ok(())
    }

    /// Emit `ch` `count` times, stopping early once the sink closes.
    pub(crate) fn repeat(&mut self, ch: u8, count: usize) -> Result<(), FormatError> {
        for _ in 0..count {
            if !self.is_open() {
                break;
            }
            self.sink.put_char(ch)?;
        }
        Ok(())
    }

    pub(crate) fn string(&mut self, s: &[u8]) -> Result<(), FormatError> {
        if self.is_open() && !s.is_empty() {
            self.sink.put_str(s)?;
        }
        Ok(())
    }

    pub(crate) fn raw(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        if self.is_open() && !bytes.is_empty() {
            self.sink.put_raw(bytes)?;
        }
        Ok(())
    }
}
