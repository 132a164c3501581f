//! A resumable, allocation-minimal streaming JSON reader and writer
//! operating directly on byte buffers.
//!
//! Three pieces, leaves first:
//!
//! - [`PoolBuffer`] — a single-owner output buffer over pooled storage with
//!   a reserve/commit protocol and geometric growth.
//! - [`StreamingReader`] — a forward-only pull tokenizer that can suspend at
//!   any chunk boundary and resume once more bytes arrive, carrying an
//!   opaque [`ReaderState`] between invocations. Tokens borrow the input
//!   slice; nothing is decoded or copied up front.
//! - [`StreamingWriter`] — a forward-only token sink that serializes into a
//!   [`PoolBuffer`], enforcing structural well-formedness and supporting
//!   mid-stream drains via [`WriterState`] continuation.
//!
//! String tokens carry a may-contain-escapes flag set during scanning, so
//! callers can compare raw bytes against known constants on the common
//! escape-free path and fall back to decoding only when needed:
//!
//! ```
//! use jsonwire::{ReaderState, StreamingReader, Token};
//!
//! let doc = br#"{"name":"University of Testing","other":1}"#;
//! let mut reader = StreamingReader::new(doc, true, ReaderState::default());
//! let mut found = false;
//! while let Some(token) = reader.read()? {
//!     if let Token::PropertyName(name) = token {
//!         if name.eq_text(b"name") {
//!             if let Some(Token::String(value)) = reader.read()? {
//!                 found = value.starts_with_text(b"University of");
//!             }
//!         }
//!     }
//! }
//! assert!(found);
//! # Ok::<(), jsonwire::Error>(())
//! ```
//!
//! Feeding input that arrives in pieces smaller than a token is the point
//! of the reader's contract: `read` returns `Ok(None)` when it runs out of
//! complete tokens, [`bytes_consumed`](StreamingReader::bytes_consumed)
//! excludes any partial token, and the caller re-presents the retained tail
//! plus the next chunk with the carried state:
//!
//! ```
//! use jsonwire::{ReaderState, StreamingReader, Token};
//!
//! let mut state = ReaderState::default();
//! let mut tokens = 0;
//! let mut carry: Vec<u8> = Vec::new();
//! let chunks: [&[u8]; 2] = [br#"{"a":"#, b"1}"];
//! for (i, chunk) in chunks.iter().enumerate() {
//!     carry.extend_from_slice(chunk);
//!     let mut reader = StreamingReader::new(&carry, i == chunks.len() - 1, state);
//!     while reader.read()?.is_some() {
//!         tokens += 1;
//!     }
//!     let consumed = reader.bytes_consumed();
//!     state = reader.into_state();
//!     carry.drain(..consumed);
//! }
//! assert_eq!(tokens, 4); // {, "a", 1, }
//! # Ok::<(), jsonwire::Error>(())
//! ```

mod bitstack;
mod buffer;
mod error;
mod options;
mod reader;
mod token;
mod writer;

#[cfg(test)]
mod tests;

pub use buffer::PoolBuffer;
pub use error::{Error, ErrorKind, Incomplete, Result};
pub use options::{CommentHandling, ReaderOptions, WriterOptions};
pub use reader::{ReaderState, StreamingReader};
pub use token::{RawStr, Token};
pub use writer::{StreamingWriter, WriterState};
