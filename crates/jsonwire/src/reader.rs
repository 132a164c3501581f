//! Streaming pull tokenizer.
//!
//! [`StreamingReader`] scans one byte slice forward-only and yields
//! [`Token`]s that borrow that slice. Resumption across chunk boundaries is
//! explicit: when a token is cut off at the end of a non-final slice, `read`
//! returns `Ok(None)` and [`bytes_consumed`](StreamingReader::bytes_consumed)
//! rolls back to the start of the incomplete token. The caller retains the
//! unconsumed tail, prepends the next chunk to it, and constructs a new
//! reader over the combined slice with the state captured from the old one.
//! The reader itself never buffers token bytes and never looks past the
//! slice it was given.

use bstr::ByteSlice;

use crate::bitstack::BitStack;
use crate::error::{Error, ErrorKind, Incomplete, Result};
use crate::options::{CommentHandling, ReaderOptions};
use crate::token::{RawStr, Token};

/// Structural expectation between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing read yet; expecting the root value.
    RootStart,
    /// Directly after `{`: a property name or `}`.
    PropertyFirst,
    /// After `,` inside an object: a property name only.
    PropertyNext,
    /// After a property name: `:`.
    PropertyColon,
    /// After `:`: the member value.
    PropertyValue,
    /// Directly after `[`: a value or `]`.
    ElementFirst,
    /// After `,` inside an array: a value only.
    ElementNext,
    /// A value just completed inside a container: `,` or the matching close.
    AfterValue,
    /// The root value is complete.
    RootEnd,
}

/// Opaque resumption state for [`StreamingReader`].
///
/// Created once at stream start, then carried by the caller from each
/// reader to the next. Callers must not rely on its contents, only store
/// and forward it.
#[derive(Debug, Clone)]
pub struct ReaderState {
    options: ReaderOptions,
    stack: BitStack,
    phase: Phase,
    /// Set while a read is suspended mid-token, recording what was rolled
    /// back; informational, since resumption rescans from the token start.
    pending: Option<Incomplete>,
}

impl ReaderState {
    /// Creates the state for a new stream.
    #[must_use]
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            options,
            stack: BitStack::new(),
            phase: Phase::RootStart,
            pending: None,
        }
    }

    /// What was in flight when the last read suspended, if anything.
    #[must_use]
    pub fn pending(&self) -> Option<Incomplete> {
        self.pending
    }
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new(ReaderOptions::default())
    }
}

/// A forward-only, resumable JSON tokenizer over a single byte slice.
///
/// ```
/// use jsonwire::{ReaderState, StreamingReader, Token};
///
/// let mut reader = StreamingReader::new(b"[1,2]", true, ReaderState::default());
/// assert!(matches!(reader.read()?, Some(Token::StartArray)));
/// assert!(matches!(reader.read()?, Some(Token::Number(n)) if n == b"1"));
/// assert!(matches!(reader.read()?, Some(Token::Number(n)) if n == b"2"));
/// assert!(matches!(reader.read()?, Some(Token::EndArray)));
/// assert!(reader.read()?.is_none());
/// # Ok::<(), jsonwire::Error>(())
/// ```
pub struct StreamingReader<'src> {
    data: &'src [u8],
    pos: usize,
    is_final_block: bool,
    state: ReaderState,
}

/// Bytes that stop the fast scan inside a string: the two significant bytes
/// plus every raw control byte, which must be rejected.
const STRING_SCAN_STOPS: [u8; 34] = {
    let mut stops = [0u8; 34];
    let mut i = 0;
    while i < 32 {
        stops[i] = i as u8;
        i += 1;
    }
    stops[32] = b'"';
    stops[33] = b'\\';
    stops
};

impl<'src> StreamingReader<'src> {
    /// Creates a reader over `data`, resuming from `state`.
    ///
    /// `is_final_block` marks the last chunk of the stream; only then are
    /// incomplete tokens and unclosed containers reported as errors rather
    /// than suspension.
    #[must_use]
    pub fn new(data: &'src [u8], is_final_block: bool, state: ReaderState) -> Self {
        Self {
            data,
            pos: 0,
            is_final_block,
            state,
        }
    }

    /// Bytes of the current slice consumed so far. After a suspended read
    /// this excludes the partial token, so `data[bytes_consumed..]` is
    /// exactly the prefix to retain for the next chunk. A token larger than
    /// the slice the caller can assemble is the caller's responsibility:
    /// the reader never buffers, it only rolls back.
    #[must_use]
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    /// Current container nesting depth.
    #[must_use]
    pub fn current_depth(&self) -> usize {
        self.state.stack.depth()
    }

    /// Extracts the resumption state for the next chunk's reader.
    #[must_use]
    pub fn into_state(self) -> ReaderState {
        self.state
    }

    /// Returns the next token, or `Ok(None)` when the slice has no more
    /// complete tokens: either the document is finished, or the reader
    /// suspended mid-token and more input is needed.
    ///
    /// # Errors
    ///
    /// Structural violations, malformed tokens, depth overflow, and — on the
    /// final block only — unterminated constructs. Errors are terminal for
    /// the stream.
    pub fn read(&mut self) -> Result<Option<Token<'src>>> {
        self.state.pending = None;
        loop {
            self.skip_whitespace();

            if self.peek() == Some(b'/')
                && self.state.options.comment_handling != CommentHandling::Disallow
            {
                let mark = self.pos;
                let Some(text) = self.scan_comment(mark)? else {
                    return Ok(None);
                };
                if self.state.options.comment_handling == CommentHandling::Emit {
                    return Ok(Some(Token::Comment(text)));
                }
                continue;
            }

            let Some(byte) = self.peek() else {
                return self.end_of_data();
            };
            let mark = self.pos;

            match self.state.phase {
                Phase::PropertyColon => {
                    if byte == b':' {
                        self.pos += 1;
                        self.state.phase = Phase::PropertyValue;
                        continue;
                    }
                    return Err(self.err(
                        ErrorKind::Structural("expected ':' after a property name"),
                        mark,
                    ));
                }
                Phase::AfterValue => match byte {
                    b',' => {
                        self.pos += 1;
                        self.state.phase = if self.state.stack.peek() == Some(true) {
                            Phase::PropertyNext
                        } else {
                            Phase::ElementNext
                        };
                        continue;
                    }
                    b'}' => return self.close_container(true, mark),
                    b']' => return self.close_container(false, mark),
                    _ => {
                        return Err(self.err(
                            ErrorKind::Structural("expected ',' or a closing bracket after a value"),
                            mark,
                        ));
                    }
                },
                Phase::RootEnd => {
                    if self.state.options.allow_multiple_values {
                        self.state.phase = Phase::RootStart;
                        continue;
                    }
                    return Err(self.err(ErrorKind::Structural("data after the root value"), mark));
                }
                Phase::PropertyFirst | Phase::PropertyNext => match byte {
                    b'"' => {
                        let Some((bytes, escaped)) = self.scan_string(mark)? else {
                            return Ok(None);
                        };
                        self.state.phase = Phase::PropertyColon;
                        return Ok(Some(Token::PropertyName(RawStr::new(bytes, escaped))));
                    }
                    b'}' if self.state.phase == Phase::PropertyFirst => {
                        return self.close_container(true, mark);
                    }
                    _ => {
                        return Err(
                            self.err(ErrorKind::Structural("expected a property name"), mark)
                        );
                    }
                },
                Phase::RootStart
                | Phase::PropertyValue
                | Phase::ElementFirst
                | Phase::ElementNext => return self.read_value(byte, mark),
            }
        }
    }

    fn read_value(&mut self, byte: u8, mark: usize) -> Result<Option<Token<'src>>> {
        match byte {
            b'{' | b'[' => {
                let object = byte == b'{';
                let max_depth = self.state.options.max_depth;
                if self.state.stack.depth() >= max_depth {
                    return Err(self.err(ErrorKind::DepthExceeded(max_depth), mark));
                }
                self.state.stack.push(object);
                self.pos = mark + 1;
                self.state.phase = if object {
                    Phase::PropertyFirst
                } else {
                    Phase::ElementFirst
                };
                Ok(Some(if object {
                    Token::StartObject
                } else {
                    Token::StartArray
                }))
            }
            b']' if self.state.phase == Phase::ElementFirst => self.close_container(false, mark),
            b'"' => {
                let Some((bytes, escaped)) = self.scan_string(mark)? else {
                    return Ok(None);
                };
                self.after_value();
                Ok(Some(Token::String(RawStr::new(bytes, escaped))))
            }
            b'-' | b'0'..=b'9' => {
                let Some(text) = self.scan_number(mark)? else {
                    return Ok(None);
                };
                self.after_value();
                Ok(Some(Token::Number(text)))
            }
            b't' => self.read_keyword(mark, b"true", Token::True),
            b'f' => self.read_keyword(mark, b"false", Token::False),
            b'n' => self.read_keyword(mark, b"null", Token::Null),
            _ => Err(self.err(ErrorKind::Structural("expected a value"), mark)),
        }
    }

    fn close_container(&mut self, object: bool, mark: usize) -> Result<Option<Token<'src>>> {
        match self.state.stack.pop() {
            Some(top) if top == object => {}
            Some(_) => {
                return Err(self.err(ErrorKind::Structural("mismatched closing bracket"), mark));
            }
            None => {
                return Err(self.err(
                    ErrorKind::Structural("closing bracket with no open container"),
                    mark,
                ));
            }
        }
        self.pos = mark + 1;
        self.after_value();
        Ok(Some(if object {
            Token::EndObject
        } else {
            Token::EndArray
        }))
    }

    fn after_value(&mut self) {
        self.state.phase = if self.state.stack.is_empty() {
            Phase::RootEnd
        } else {
            Phase::AfterValue
        };
    }

    fn end_of_data(&mut self) -> Result<Option<Token<'src>>> {
        if !self.is_final_block || self.state.phase == Phase::RootEnd {
            return Ok(None);
        }
        if self.state.stack.is_empty() {
            // Blank document, or nothing after a root that never started.
            return Err(self.err(ErrorKind::Unterminated(Incomplete::Document), self.pos));
        }
        Err(self.err(ErrorKind::Unterminated(Incomplete::Container), self.pos))
    }

    /// Scans the string whose opening quote is at `mark`. Returns the bytes
    /// between the quotes and whether any escape was seen.
    fn scan_string(&mut self, mark: usize) -> Result<Option<(&'src [u8], bool)>> {
        let mut escaped = false;
        let mut i = mark + 1;
        loop {
            let Some(rel) = self.data[i..].find_byteset(STRING_SCAN_STOPS) else {
                return self.defer(mark, Incomplete::Str);
            };
            let j = i + rel;
            match self.data[j] {
                b'"' => {
                    self.pos = j + 1;
                    return Ok(Some((&self.data[mark + 1..j], escaped)));
                }
                b'\\' => {
                    escaped = true;
                    let Some(&esc) = self.data.get(j + 1) else {
                        return self.defer(mark, Incomplete::Str);
                    };
                    match esc {
                        b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => i = j + 2,
                        b'u' => {
                            if self.data.len() < j + 6 {
                                return self.defer(mark, Incomplete::Str);
                            }
                            if !self.data[j + 2..j + 6]
                                .iter()
                                .all(u8::is_ascii_hexdigit)
                            {
                                return Err(self.err(
                                    ErrorKind::MalformedLiteral(
                                        "invalid unicode escape sequence",
                                    ),
                                    j,
                                ));
                            }
                            i = j + 6;
                        }
                        _ => {
                            return Err(
                                self.err(ErrorKind::MalformedLiteral("invalid escape sequence"), j)
                            );
                        }
                    }
                }
                _ => {
                    return Err(self.err(
                        ErrorKind::MalformedLiteral("raw control character in string"),
                        j,
                    ));
                }
            }
        }
    }

    /// Scans the number starting at `mark` per the JSON numeric grammar.
    fn scan_number(&mut self, mark: usize) -> Result<Option<&'src [u8]>> {
        let data = self.data;
        let mut i = mark;
        if data.get(i) == Some(&b'-') {
            i += 1;
        }

        let int_start = i;
        while data.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == int_start {
            return self.digits_missing(mark, i, "expected a digit in number");
        }
        if i - int_start > 1 && data[int_start] == b'0' {
            return Err(self.err(ErrorKind::MalformedLiteral("leading zero in number"), mark));
        }

        if data.get(i) == Some(&b'.') {
            i += 1;
            let frac_start = i;
            while data.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
            }
            if i == frac_start {
                return self.digits_missing(mark, i, "expected a digit after the decimal point");
            }
        }

        if matches!(data.get(i), Some(b'e' | b'E')) {
            i += 1;
            if matches!(data.get(i), Some(b'+' | b'-')) {
                i += 1;
            }
            let exp_start = i;
            while data.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
            }
            if i == exp_start {
                return self.digits_missing(mark, i, "expected a digit in exponent");
            }
        }

        if i == data.len() && !self.is_final_block {
            // The next chunk may extend this number.
            return self.defer(mark, Incomplete::Num);
        }
        if let Some(&next) = data.get(i) {
            if !self.is_delimiter(next) {
                return Err(self.err(ErrorKind::MalformedLiteral("invalid character in number"), i));
            }
        }
        self.pos = i;
        Ok(Some(&data[mark..i]))
    }

    /// A digit was required at `at` and is absent: suspend at a chunk edge,
    /// otherwise report the malformed number.
    fn digits_missing<T>(
        &mut self,
        mark: usize,
        at: usize,
        message: &'static str,
    ) -> Result<Option<T>> {
        if at == self.data.len() && !self.is_final_block {
            self.defer(mark, Incomplete::Num)
        } else {
            Err(self.err(ErrorKind::MalformedLiteral(message), at))
        }
    }

    fn read_keyword(
        &mut self,
        mark: usize,
        expected: &'static [u8],
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>> {
        let available = &self.data[mark..];
        if available.len() < expected.len() {
            return if expected.starts_with(available) {
                self.defer(mark, Incomplete::Lit)
            } else {
                Err(self.err(ErrorKind::MalformedLiteral("invalid literal"), mark))
            };
        }
        if &available[..expected.len()] != expected {
            return Err(self.err(ErrorKind::MalformedLiteral("invalid literal"), mark));
        }
        let end = mark + expected.len();
        match self.data.get(end) {
            Some(&next) if !self.is_delimiter(next) => {
                Err(self.err(ErrorKind::MalformedLiteral("invalid literal"), mark))
            }
            // A keyword flush against a non-final edge may be a prefix of
            // something longer.
            None if !self.is_final_block => self.defer(mark, Incomplete::Lit),
            _ => {
                self.pos = end;
                self.after_value();
                Ok(Some(token))
            }
        }
    }

    /// Scans the comment whose first `/` is at `mark`, returning its text
    /// without delimiters.
    fn scan_comment(&mut self, mark: usize) -> Result<Option<&'src [u8]>> {
        let Some(&second) = self.data.get(mark + 1) else {
            return self.defer(mark, Incomplete::Comment);
        };
        let body_start = mark + 2;
        match second {
            b'/' => match self.data[body_start..].find_byteset(b"\r\n") {
                Some(rel) => {
                    let end = body_start + rel;
                    self.pos = end;
                    Ok(Some(&self.data[body_start..end]))
                }
                None if self.is_final_block => {
                    self.pos = self.data.len();
                    Ok(Some(&self.data[body_start..]))
                }
                None => self.defer(mark, Incomplete::Comment),
            },
            b'*' => {
                let mut i = body_start;
                loop {
                    let Some(rel) = self.data[i..].find_byte(b'*') else {
                        return self.defer(mark, Incomplete::Comment);
                    };
                    let star = i + rel;
                    match self.data.get(star + 1) {
                        Some(b'/') => {
                            self.pos = star + 2;
                            return Ok(Some(&self.data[body_start..star]));
                        }
                        Some(_) => i = star + 1,
                        None => return self.defer(mark, Incomplete::Comment),
                    }
                }
            }
            _ => Err(self.err(
                ErrorKind::Structural("expected '/' or '*' to begin a comment"),
                mark,
            )),
        }
    }

    /// Suspends at a non-final chunk edge (rolling consumption back to
    /// `mark`), or reports the construct as unterminated on the final block.
    fn defer<T>(&mut self, mark: usize, what: Incomplete) -> Result<Option<T>> {
        if self.is_final_block {
            return Err(self.err(ErrorKind::Unterminated(what), mark));
        }
        self.pos = mark;
        self.state.pending = Some(what);
        Ok(None)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn is_delimiter(&self, byte: u8) -> bool {
        matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b',' | b'}' | b']')
            || (byte == b'/' && self.state.options.comment_handling != CommentHandling::Disallow)
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn err(&self, kind: ErrorKind, offset: usize) -> Error {
        Error::new(kind, offset)
    }
}
