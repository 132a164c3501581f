/// How the reader treats `//` and `/* */` comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentHandling {
    /// A `/` outside a string is a structural error. This is the default.
    #[default]
    Disallow,
    /// Comments are consumed like whitespace and never surfaced.
    Skip,
    /// Comments are surfaced as [`Token::Comment`](crate::Token::Comment)
    /// with the text between the delimiters.
    Emit,
}

/// Configuration for [`StreamingReader`](crate::StreamingReader).
///
/// Captured inside [`ReaderState`](crate::ReaderState) at stream start so
/// that every resumed reader of the same logical stream sees the same
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Maximum nesting depth of objects and arrays. Opening a container
    /// beyond this depth raises
    /// [`ErrorKind::DepthExceeded`](crate::ErrorKind::DepthExceeded).
    ///
    /// # Default
    ///
    /// `64`
    pub max_depth: usize,

    /// Whether comments are rejected, skipped, or emitted.
    ///
    /// # Default
    ///
    /// [`CommentHandling::Disallow`]
    pub comment_handling: CommentHandling,

    /// Whether to accept multiple whitespace-delimited JSON values in one
    /// stream (JSON Lines and arbitrary concatenation). When `false`, any
    /// non-whitespace byte after the root value is a structural error.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_multiple_values: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            comment_handling: CommentHandling::default(),
            allow_multiple_values: false,
        }
    }
}

/// Configuration for [`StreamingWriter`](crate::StreamingWriter).
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// When `true`, emit a newline and per-depth indentation before every
    /// structural token and property name, and a space after each colon.
    /// When `false`, emit the minimal compact form.
    ///
    /// # Default
    ///
    /// `false`
    pub indented: bool,

    /// The per-depth indent unit used when `indented` is `true`.
    ///
    /// # Default
    ///
    /// Two spaces.
    pub indent: &'static str,

    /// Maximum nesting depth, mirroring [`ReaderOptions::max_depth`].
    ///
    /// # Default
    ///
    /// `64`
    pub max_depth: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            indented: false,
            indent: "  ",
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub(crate) const DEFAULT_MAX_DEPTH: usize = 64;
