//! Line-buffered post-filter over the rendered markup.
//!
//! The decorator knows nothing about tags. It sees the engine's output as
//! bytes, one line at a time, marks line breaks and turns the escaped
//! non-breaking-space placeholder back into plain spaces.

use std::io::{self, Write};

use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Length of `&amp;nbsp;`, the longest tail that may still become a match.
const PLACEHOLDER_LEN: usize = 10;

/// The non-breaking-space placeholder, as it appears once escaped.
static NBSP_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&amp;nbsp;").expect("Invalid nbsp placeholder regex"));

/// Wraps a sink, normalizing every line written through it.
///
/// Call [`finish`](Self::finish) once done: the tail of the current line
/// that could still start a placeholder stays buffered until then. Long
/// lines are otherwise passed on as they arrive.
pub struct OutputDecorator<W: Write> {
    inner: W,
    line: Vec<u8>,
    break_marker: Vec<u8>,
}

impl<W: Write> OutputDecorator<W> {
    pub fn new(inner: W, break_marker: &str) -> Self {
        Self {
            inner,
            line: Vec::new(),
            break_marker: break_marker.as_bytes().to_vec(),
        }
    }

    /// Writes out the trailing partial line and returns the inner sink.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.line.is_empty() {
            self.emit_line()?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn emit_line(&mut self) -> io::Result<()> {
        {
            let normalized = NBSP_PLACEHOLDER.replace_all(&self.line, &b" "[..]);
            self.inner.write_all(&normalized)?;
        }
        self.line.clear();
        Ok(())
    }

    /// Passes on the part of the current line no placeholder can span.
    fn emit_settled(&mut self) -> io::Result<()> {
        let keep_from = match self.line.iter().rposition(|&b| b == b'&') {
            Some(pos) if self.line.len() - pos < PLACEHOLDER_LEN => pos,
            _ => self.line.len(),
        };
        if keep_from == 0 {
            return Ok(());
        }
        let tail = self.line.split_off(keep_from);
        self.emit_line()?;
        self.line = tail;
        Ok(())
    }
}

impl<W: Write> Write for OutputDecorator<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.line.extend_from_slice(&rest[..=pos]);
            self.line.extend_from_slice(&self.break_marker);
            self.emit_line()?;
            rest = &rest[pos + 1..];
        }
        self.line.extend_from_slice(rest);
        self.emit_settled()?;
        Ok(buf.len())
    }

    /// Flushes the inner sink. A partial line stays buffered.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
