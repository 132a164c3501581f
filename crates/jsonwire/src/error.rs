use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

/// An error raised by the reader, the writer, or the pooled buffer.
///
/// Every error carries the byte offset at which it was detected: for the
/// reader this is an offset into the current input slice, for the writer and
/// buffer it is the number of bytes committed so far. Errors are terminal —
/// the component that produced one will not make further progress.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte offset {offset}")]
pub struct Error {
    pub(crate) kind: ErrorKind,
    pub(crate) offset: usize,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// The category of failure.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Byte offset at which the error was detected.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Failure categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A token was seen in a position the grammar does not allow: an
    /// unmatched or mismatched close bracket, a comma or colon out of
    /// position, a value where a property name is required, or data after
    /// the root value.
    #[error("structural error: {0}")]
    Structural(&'static str),

    /// A token's own bytes are invalid: bad number syntax, a misspelled
    /// keyword, an invalid escape sequence, or a raw control character
    /// inside a string.
    #[error("malformed literal: {0}")]
    MalformedLiteral(&'static str),

    /// The input ended on the final block while a construct was still open.
    #[error("unterminated {0}")]
    Unterminated(Incomplete),

    /// Nesting exceeded the configured maximum depth (the payload).
    #[error("maximum depth of {0} exceeded")]
    DepthExceeded(usize),

    /// A pooled-buffer protocol violation: committing more than the last
    /// reserved span, or a zero-sized reservation request.
    #[error("buffer state error: {0}")]
    BufferState(&'static str),
}

/// The construct that was in flight when input ran out.
///
/// Also recorded inside [`ReaderState`](crate::ReaderState) while a read is
/// suspended mid-token, so a resumed reader knows what it rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incomplete {
    /// A string was opened but its closing quote was not reached.
    Str,
    /// A number might still be extended by further digits.
    Num,
    /// A `true`/`false`/`null` keyword was only partially matched.
    Lit,
    /// A `/* */` comment was not closed.
    Comment,
    /// An object or array was left open.
    Container,
    /// No complete root value was found in the document.
    Document,
}

impl core::fmt::Display for Incomplete {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Incomplete::Str => "string",
            Incomplete::Num => "number",
            Incomplete::Lit => "literal",
            Incomplete::Comment => "comment",
            Incomplete::Container => "container",
            Incomplete::Document => "document",
        })
    }
}
