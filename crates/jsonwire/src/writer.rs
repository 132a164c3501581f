//! Streaming token sink.
//!
//! [`StreamingWriter`] serializes structural and value events into a
//! [`PoolBuffer`], enforcing the same well-formedness invariants the reader
//! checks, in the outbound direction. Bytes are emitted eagerly, so
//! [`flush`](StreamingWriter::flush) is a validation point rather than a
//! drain: a caller that wants to spill the buffer mid-document flushes
//! non-final, captures the [`WriterState`], drains and clears the buffer,
//! and resumes a new writer with the captured state to continue the same
//! logical document.

use core::fmt::Write as _;

use crate::bitstack::BitStack;
use crate::buffer::PoolBuffer;
use crate::error::{Error, ErrorKind, Incomplete, Result};
use crate::options::WriterOptions;

/// Opaque continuation state for [`StreamingWriter`], mirroring the
/// reader's structural invariants for the outbound direction.
#[derive(Debug, Clone)]
pub struct WriterState {
    options: WriterOptions,
    stack: BitStack,
    /// A property name was written and its value has not been.
    pending_name: bool,
    /// The next sibling in the current container needs a leading comma.
    needs_comma: bool,
    /// At least one byte of the document has been emitted.
    started: bool,
    /// The root value is complete; no further writes are legal.
    done: bool,
}

impl WriterState {
    /// Creates the state for a new document.
    #[must_use]
    pub fn new(options: WriterOptions) -> Self {
        Self {
            options,
            stack: BitStack::new(),
            pending_name: false,
            needs_comma: false,
            started: false,
            done: false,
        }
    }
}

impl Default for WriterState {
    fn default() -> Self {
        Self::new(WriterOptions::default())
    }
}

/// A forward-only JSON writer over a pooled output buffer.
///
/// ```
/// use jsonwire::{PoolBuffer, StreamingWriter, WriterOptions};
///
/// let mut buf = PoolBuffer::new();
/// let mut writer = StreamingWriter::new(&mut buf, WriterOptions::default());
/// writer.write_start_object()?;
/// writer.write_property_name("x")?;
/// writer.write_u64(1)?;
/// writer.write_end_object()?;
/// writer.flush(true)?;
/// assert_eq!(buf.written(), br#"{"x":1}"#);
/// # Ok::<(), jsonwire::Error>(())
/// ```
pub struct StreamingWriter<'buf> {
    output: &'buf mut PoolBuffer,
    state: WriterState,
}

impl<'buf> StreamingWriter<'buf> {
    /// Creates a writer for a new document.
    pub fn new(output: &'buf mut PoolBuffer, options: WriterOptions) -> Self {
        Self::resume(output, WriterState::new(options))
    }

    /// Continues a document from state captured off an earlier writer,
    /// typically after draining and clearing the shared buffer.
    pub fn resume(output: &'buf mut PoolBuffer, state: WriterState) -> Self {
        Self { output, state }
    }

    /// Opens an object value.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] in an illegal value position,
    /// [`ErrorKind::DepthExceeded`] past the configured maximum.
    pub fn write_start_object(&mut self) -> Result<()> {
        self.begin_container(true)
    }

    /// Closes the innermost object.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] if the innermost open container is not an
    /// object, or a property name is awaiting its value.
    pub fn write_end_object(&mut self) -> Result<()> {
        self.end_container(true)
    }

    /// Opens an array value.
    ///
    /// # Errors
    ///
    /// As for [`write_start_object`](StreamingWriter::write_start_object).
    pub fn write_start_array(&mut self) -> Result<()> {
        self.begin_container(false)
    }

    /// Closes the innermost array.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] if the innermost open container is not an
    /// array.
    pub fn write_end_array(&mut self) -> Result<()> {
        self.end_container(false)
    }

    /// Writes a property name, escaping as needed.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] outside an object or directly after
    /// another property name.
    pub fn write_property_name(&mut self, name: &str) -> Result<()> {
        self.begin_property_name()?;
        self.output.push_byte(b'"');
        escape_into(self.output, name.as_bytes());
        self.output.push_byte(b'"');
        self.finish_property_name();
        Ok(())
    }

    /// Writes a property name from bytes the caller guarantees are already
    /// escape-safe (raw pass-through transcoding). Feeding unsafe bytes
    /// here produces invalid JSON; the writer does not detect it.
    ///
    /// # Errors
    ///
    /// As for [`write_property_name`](StreamingWriter::write_property_name).
    pub fn write_property_name_raw(&mut self, name: &[u8]) -> Result<()> {
        self.begin_property_name()?;
        self.output.push_byte(b'"');
        self.output.push_slice(name);
        self.output.push_byte(b'"');
        self.finish_property_name();
        Ok(())
    }

    /// Writes a string value, escaping as needed.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] in an illegal value position.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.begin_value()?;
        self.output.push_byte(b'"');
        escape_into(self.output, value.as_bytes());
        self.output.push_byte(b'"');
        self.end_value();
        Ok(())
    }

    /// Writes a string value from caller-guaranteed escape-safe bytes; see
    /// [`write_property_name_raw`](StreamingWriter::write_property_name_raw).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] in an illegal value position.
    pub fn write_string_raw(&mut self, value: &[u8]) -> Result<()> {
        self.begin_value()?;
        self.output.push_byte(b'"');
        self.output.push_slice(value);
        self.output.push_byte(b'"');
        self.end_value();
        Ok(())
    }

    /// Writes a number from its textual form, validated against the JSON
    /// numeric grammar (the shape the reader's `Number` tokens carry).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedLiteral`] if `text` is not a JSON number;
    /// [`ErrorKind::Structural`] in an illegal value position.
    pub fn write_number_raw(&mut self, text: &[u8]) -> Result<()> {
        if !is_valid_number(text) {
            return Err(self.err(ErrorKind::MalformedLiteral("not a JSON number")));
        }
        self.begin_value()?;
        self.output.push_slice(text);
        self.end_value();
        Ok(())
    }

    /// Writes a floating-point value.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedLiteral`] for NaN or infinities, which JSON
    /// cannot represent; [`ErrorKind::Structural`] in an illegal position.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(self.err(ErrorKind::MalformedLiteral("non-finite number")));
        }
        self.begin_value()?;
        let _ = write!(self.output, "{value}");
        self.end_value();
        Ok(())
    }

    /// Writes an unsigned integer value.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] in an illegal value position.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.begin_value()?;
        let _ = write!(self.output, "{value}");
        self.end_value();
        Ok(())
    }

    /// Writes a signed integer value.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] in an illegal value position.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.begin_value()?;
        let _ = write!(self.output, "{value}");
        self.end_value();
        Ok(())
    }

    /// Writes `true` or `false`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] in an illegal value position.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.begin_value()?;
        self.output
            .push_slice(if value { b"true" } else { b"false" });
        self.end_value();
        Ok(())
    }

    /// Writes `null`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Structural`] in an illegal value position.
    pub fn write_null(&mut self) -> Result<()> {
        self.begin_value()?;
        self.output.push_slice(b"null");
        self.end_value();
        Ok(())
    }

    /// Completes a write segment. Emitted bytes already live in the buffer,
    /// so this only validates: a final flush requires the document to be
    /// complete. Flushing twice with no intervening writes emits nothing.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Unterminated`] on a final flush with open containers, a
    /// pending property name, or no document at all.
    pub fn flush(&mut self, is_final_block: bool) -> Result<()> {
        if !is_final_block {
            return Ok(());
        }
        if self.state.pending_name || !self.state.stack.is_empty() {
            return Err(self.err(ErrorKind::Unterminated(Incomplete::Container)));
        }
        if !self.state.done {
            return Err(self.err(ErrorKind::Unterminated(Incomplete::Document)));
        }
        Ok(())
    }

    /// Bytes committed to the underlying buffer.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.output.written_len()
    }

    /// Current container nesting depth.
    #[must_use]
    pub fn current_depth(&self) -> usize {
        self.state.stack.depth()
    }

    /// Snapshots the continuation state without consuming the writer; the
    /// flush-then-capture step of a drain loop.
    #[must_use]
    pub fn state(&self) -> WriterState {
        self.state.clone()
    }

    /// Extracts the continuation state, releasing the buffer borrow.
    #[must_use]
    pub fn into_state(self) -> WriterState {
        self.state
    }

    fn begin_container(&mut self, object: bool) -> Result<()> {
        let max_depth = self.state.options.max_depth;
        if self.state.stack.depth() >= max_depth {
            return Err(self.err(ErrorKind::DepthExceeded(max_depth)));
        }
        self.begin_value()?;
        self.output.push_byte(if object { b'{' } else { b'[' });
        self.state.stack.push(object);
        self.state.needs_comma = false;
        self.state.started = true;
        Ok(())
    }

    fn end_container(&mut self, object: bool) -> Result<()> {
        if self.state.pending_name {
            return Err(self.err(ErrorKind::Structural("property name has no value")));
        }
        match self.state.stack.peek() {
            Some(top) if top == object => {}
            Some(_) => return Err(self.err(ErrorKind::Structural("mismatched closing bracket"))),
            None => {
                return Err(self.err(ErrorKind::Structural("no open container to close")));
            }
        }
        let non_empty = self.state.needs_comma;
        self.state.stack.pop();
        if self.state.options.indented && non_empty {
            self.newline_indent(self.state.stack.depth());
        }
        self.output.push_byte(if object { b'}' } else { b']' });
        self.end_value();
        Ok(())
    }

    /// Validates the position for a value and emits any separator bytes.
    fn begin_value(&mut self) -> Result<()> {
        if self.state.done {
            return Err(self.err(ErrorKind::Structural("root value already complete")));
        }
        if self.state.pending_name {
            // The value attaches directly after the colon.
            self.state.pending_name = false;
            return Ok(());
        }
        match self.state.stack.peek() {
            Some(true) => Err(self.err(ErrorKind::Structural(
                "value inside an object requires a property name",
            ))),
            Some(false) => {
                self.separate();
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn end_value(&mut self) {
        self.state.started = true;
        if self.state.stack.is_empty() {
            self.state.done = true;
        } else {
            self.state.needs_comma = true;
        }
    }

    fn begin_property_name(&mut self) -> Result<()> {
        if self.state.done {
            return Err(self.err(ErrorKind::Structural("root value already complete")));
        }
        if self.state.pending_name {
            return Err(self.err(ErrorKind::Structural(
                "property name directly after a property name",
            )));
        }
        if self.state.stack.peek() != Some(true) {
            return Err(self.err(ErrorKind::Structural("property name outside an object")));
        }
        self.separate();
        Ok(())
    }

    fn finish_property_name(&mut self) {
        self.output.push_byte(b':');
        if self.state.options.indented {
            self.output.push_byte(b' ');
        }
        self.state.pending_name = true;
        self.state.started = true;
    }

    /// Comma before the next sibling, plus the indentation prefix.
    fn separate(&mut self) {
        if self.state.needs_comma {
            self.output.push_byte(b',');
        }
        if self.state.options.indented {
            self.newline_indent(self.state.stack.depth());
        }
    }

    fn newline_indent(&mut self, depth: usize) {
        if !self.state.started {
            return;
        }
        self.output.push_byte(b'\n');
        for _ in 0..depth {
            self.output.push_slice(self.state.options.indent.as_bytes());
        }
    }

    fn err(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.output.written_len())
    }
}

/// Appends `bytes` with required JSON escaping: quote, backslash, and
/// control characters; short forms where they exist, `\u00XX` otherwise.
/// Non-ASCII bytes pass through, keeping the output UTF-8.
fn escape_into(out: &mut PoolBuffer, bytes: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b >= 0x20 && b != b'"' && b != b'\\' {
            continue;
        }
        out.push_slice(&bytes[start..i]);
        match b {
            b'"' => out.push_slice(b"\\\""),
            b'\\' => out.push_slice(b"\\\\"),
            0x08 => out.push_slice(b"\\b"),
            0x0C => out.push_slice(b"\\f"),
            b'\n' => out.push_slice(b"\\n"),
            b'\r' => out.push_slice(b"\\r"),
            b'\t' => out.push_slice(b"\\t"),
            other => out.push_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[usize::from(other >> 4)],
                HEX[usize::from(other & 0xF)],
            ]),
        }
        start = i + 1;
    }
    out.push_slice(&bytes[start..]);
}

/// Validates `bytes` against the JSON numeric grammar.
fn is_valid_number(bytes: &[u8]) -> bool {
    let mut i = 0;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if i == int_start || (i - int_start > 1 && bytes[int_start] == b'0') {
        return false;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let frac_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::is_valid_number;

    #[test]
    fn number_grammar() {
        for good in ["0", "-0", "1", "42", "-9", "0.5", "-0.5", "1e3", "1E+3", "2.5e-10"] {
            assert!(is_valid_number(good.as_bytes()), "{good}");
        }
        for bad in ["", "-", "01", "1.", ".5", "1e", "1e+", "+1", "1x", "0x1", "1 "] {
            assert!(!is_valid_number(bad.as_bytes()), "{bad}");
        }
    }
}
