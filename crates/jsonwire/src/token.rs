use std::borrow::Cow;

use bstr::{BStr, ByteSlice, ByteVec};

/// One lexical unit produced by [`StreamingReader`](crate::StreamingReader).
///
/// Every payload borrows the input slice the reader was constructed over and
/// is valid only until the caller moves on to the next input chunk; callers
/// needing persistence must copy. "No token available yet" is expressed as
/// `Ok(None)` from [`read`](crate::StreamingReader::read), not as a variant.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// An object member name, distinguished from [`Token::String`] purely by
    /// structural position.
    PropertyName(RawStr<'src>),
    /// A string value.
    String(RawStr<'src>),
    /// A number in its textual form, exactly as it appeared in the input.
    Number(&'src [u8]),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// Comment text between the delimiters, only produced under
    /// [`CommentHandling::Emit`](crate::CommentHandling::Emit).
    Comment(&'src [u8]),
}

impl core::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Token::StartObject => f.write_str("StartObject"),
            Token::EndObject => f.write_str("EndObject"),
            Token::StartArray => f.write_str("StartArray"),
            Token::EndArray => f.write_str("EndArray"),
            Token::PropertyName(s) => f.debug_tuple("PropertyName").field(s).finish(),
            Token::String(s) => f.debug_tuple("String").field(s).finish(),
            Token::Number(n) => f.debug_tuple("Number").field(&BStr::new(n)).finish(),
            Token::True => f.write_str("True"),
            Token::False => f.write_str("False"),
            Token::Null => f.write_str("Null"),
            Token::Comment(c) => f.debug_tuple("Comment").field(&BStr::new(c)).finish(),
        }
    }
}

/// The raw bytes of a string token: everything between the quotes, escape
/// sequences left intact, plus a flag recording whether any escape was seen.
///
/// The flag is set by the scanner the moment it observes a backslash and is
/// never recomputed. It selects between two comparison paths that agree on
/// logical content: plain byte equality when no escapes are present, and
/// decode-then-compare when they are. Callers matching tokens against known
/// constants should go through [`eq_text`](RawStr::eq_text) /
/// [`starts_with_text`](RawStr::starts_with_text) rather than comparing
/// [`raw`](RawStr::raw) directly, unless they have checked the flag.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawStr<'src> {
    bytes: &'src [u8],
    escaped: bool,
}

impl<'src> RawStr<'src> {
    pub(crate) fn new(bytes: &'src [u8], escaped: bool) -> Self {
        Self { bytes, escaped }
    }

    /// The undecoded bytes between the quotes.
    #[must_use]
    pub fn raw(&self) -> &'src [u8] {
        self.bytes
    }

    /// `true` if the bytes may contain escape sequences.
    #[must_use]
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// Tests logical equality against UTF-8 `text` without allocating on the
    /// escape-free path.
    #[must_use]
    pub fn eq_text(&self, text: &[u8]) -> bool {
        if self.escaped {
            self.decode().as_bytes() == text
        } else {
            self.bytes == text
        }
    }

    /// Tests whether the logical content starts with UTF-8 `prefix` without
    /// allocating on the escape-free path.
    #[must_use]
    pub fn starts_with_text(&self, prefix: &[u8]) -> bool {
        if self.escaped {
            self.decode().as_bytes().starts_with(prefix)
        } else {
            self.bytes.starts_with(prefix)
        }
    }

    /// Decodes escape sequences, borrowing when none are present.
    ///
    /// Invalid UTF-8 and unpaired surrogate escapes decode to U+FFFD; escape
    /// sequence syntax itself was already validated during scanning.
    #[must_use]
    pub fn decode(&self) -> Cow<'src, str> {
        if !self.escaped {
            return self.bytes.to_str_lossy();
        }
        Cow::Owned(decode_escaped(self.bytes))
    }
}

impl core::fmt::Debug for RawStr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(BStr::new(self.bytes), f)
    }
}

fn decode_escaped(bytes: &[u8]) -> String {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        debug_assert!(i + 1 < bytes.len(), "scanner left a dangling backslash");
        let Some(&esc) = bytes.get(i + 1) else { break };
        i += 2;
        match esc {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let (ch, consumed) = decode_unicode_escape(&bytes[i..]);
                i += consumed;
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            // The scanner rejects any other escape letter.
            other => {
                debug_assert!(false, "scanner admitted escape letter {other:#x}");
                out.push(other);
            }
        }
    }
    out.into_string_lossy()
}

/// Decodes the four hex digits after `\u` (already validated), combining a
/// surrogate pair when one follows. Returns the scalar and how many bytes
/// past the first four digits were consumed.
fn decode_unicode_escape(rest: &[u8]) -> (char, usize) {
    let high = hex4(rest);
    if !(0xD800..=0xDFFF).contains(&high) {
        return (char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER), 4);
    }
    if (0xDC00..=0xDFFF).contains(&high) {
        // Low surrogate with no preceding high half.
        return (char::REPLACEMENT_CHARACTER, 4);
    }
    if rest.len() >= 10 && rest[4] == b'\\' && rest[5] == b'u' {
        let low = hex4(&rest[6..]);
        if (0xDC00..=0xDFFF).contains(&low) {
            let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return (
                char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER),
                10,
            );
        }
    }
    (char::REPLACEMENT_CHARACTER, 4)
}

fn hex4(digits: &[u8]) -> u32 {
    debug_assert!(digits.len() >= 4, "scanner validated four hex digits");
    digits.iter().take(4).fold(0, |acc, &d| {
        let v = match d {
            b'0'..=b'9' => u32::from(d - b'0'),
            b'a'..=b'f' => u32::from(d - b'a' + 10),
            b'A'..=b'F' => u32::from(d - b'A' + 10),
            _ => 0,
        };
        (acc << 4) | v
    })
}

#[cfg(test)]
mod tests {
    use super::RawStr;

    #[test]
    fn unescaped_comparisons_are_raw_byte_comparisons() {
        let s = RawStr::new(b"University of Testing", false);
        assert!(s.eq_text(b"University of Testing"));
        assert!(s.starts_with_text(b"University of"));
        assert!(!s.eq_text(b"University"));
        assert_eq!(s.decode(), "University of Testing");
    }

    #[test]
    fn escaped_comparisons_decode_first() {
        let s = RawStr::new(br"Univ\u0065rsity", true);
        assert!(s.eq_text(b"University"));
        assert!(s.starts_with_text(b"Univ"));
        assert!(!s.eq_text(br"Univ\u0065rsity"));
        assert_eq!(s.decode(), "University");
    }

    #[test]
    fn decodes_short_escapes() {
        let s = RawStr::new(br#"a\"b\\c\/d\be\ff\ng\rh\ti"#, true);
        assert_eq!(s.decode(), "a\"b\\c/d\u{8}e\u{c}f\ng\rh\ti");
    }

    #[test]
    fn decodes_surrogate_pairs() {
        let s = RawStr::new(br"\uD83D\uDC4D", true);
        assert_eq!(s.decode(), "\u{1F44D}");
    }

    #[test]
    fn lone_surrogate_decodes_to_replacement() {
        let s = RawStr::new(br"x\uD800y", true);
        assert_eq!(s.decode(), "x\u{FFFD}y");
        let s = RawStr::new(br"x\uDC00y", true);
        assert_eq!(s.decode(), "x\u{FFFD}y");
    }
}
