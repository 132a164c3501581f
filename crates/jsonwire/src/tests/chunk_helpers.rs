use crate::{ReaderOptions, ReaderState, Result, StreamingReader, Token};

/// Owned mirror of [`Token`] so streams can be compared after their backing
/// slices are gone. String payloads are stored decoded, which makes the
/// comparison logical: two streams agree when every token matches in kind
/// and decoded content, regardless of how the source spelled its escapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OwnedToken {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Name(String),
    Str(String),
    Num(String),
    Bool(bool),
    Null,
    Comment(String),
}

pub(crate) fn nm(name: &str) -> OwnedToken {
    OwnedToken::Name(name.into())
}

pub(crate) fn st(value: &str) -> OwnedToken {
    OwnedToken::Str(value.into())
}

pub(crate) fn num(text: &str) -> OwnedToken {
    OwnedToken::Num(text.into())
}

pub(crate) fn own(token: &Token<'_>) -> OwnedToken {
    match token {
        Token::StartObject => OwnedToken::StartObject,
        Token::EndObject => OwnedToken::EndObject,
        Token::StartArray => OwnedToken::StartArray,
        Token::EndArray => OwnedToken::EndArray,
        Token::PropertyName(s) => OwnedToken::Name(s.decode().into_owned()),
        Token::String(s) => OwnedToken::Str(s.decode().into_owned()),
        Token::Number(n) => OwnedToken::Num(String::from_utf8(n.to_vec()).unwrap()),
        Token::True => OwnedToken::Bool(true),
        Token::False => OwnedToken::Bool(false),
        Token::Null => OwnedToken::Null,
        Token::Comment(c) => OwnedToken::Comment(String::from_utf8_lossy(c).into_owned()),
    }
}

pub(crate) fn read_all_with(doc: &[u8], options: ReaderOptions) -> Result<Vec<OwnedToken>> {
    let mut reader = StreamingReader::new(doc, true, ReaderState::new(options));
    let mut out = Vec::new();
    while let Some(token) = reader.read()? {
        out.push(own(&token));
    }
    Ok(out)
}

pub(crate) fn read_all(doc: &[u8]) -> Result<Vec<OwnedToken>> {
    read_all_with(doc, ReaderOptions::default())
}

/// Drives the retained-carry resumption protocol: tokens from each chunk
/// are collected, unconsumed bytes are kept as the prefix of the next
/// chunk, and the state is handed from reader to reader.
pub(crate) fn read_chunked_with(
    chunks: &[&[u8]],
    options: ReaderOptions,
) -> Result<Vec<OwnedToken>> {
    let mut state = ReaderState::new(options);
    let mut carry: Vec<u8> = Vec::new();
    let mut out = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        carry.extend_from_slice(chunk);
        let mut reader = StreamingReader::new(&carry, i == chunks.len() - 1, state);
        while let Some(token) = reader.read()? {
            out.push(own(&token));
        }
        let consumed = reader.bytes_consumed();
        state = reader.into_state();
        carry.drain(..consumed);
    }
    Ok(out)
}

pub(crate) fn read_chunked(chunks: &[&[u8]]) -> Result<Vec<OwnedToken>> {
    read_chunked_with(chunks, ReaderOptions::default())
}

/// Splits `doc` into `parts` nearly equal byte chunks. Chunks may cut
/// through tokens and multi-byte sequences; the reader's rollback contract
/// is expected to absorb that.
pub(crate) fn byte_chunks(doc: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = doc.len().div_ceil(parts).max(1);
    let mut chunks: Vec<&[u8]> = doc.chunks(chunk_size).collect();
    if chunks.is_empty() {
        chunks.push(doc);
    }
    chunks
}
