use rstest::rstest;

use super::chunk_helpers::{read_all, read_all_with, read_chunked};
use crate::error::Error;
use crate::{CommentHandling, ErrorKind, Incomplete, ReaderOptions};

#[rstest]
#[case::blank(b"", ErrorKind::Unterminated(Incomplete::Document), 0)]
#[case::only_whitespace(b"   ", ErrorKind::Unterminated(Incomplete::Document), 3)]
#[case::open_object(b"{", ErrorKind::Unterminated(Incomplete::Container), 1)]
#[case::dangling_comma(b"[1,", ErrorKind::Unterminated(Incomplete::Container), 3)]
#[case::keyword_cut(b"tru", ErrorKind::Unterminated(Incomplete::Lit), 0)]
#[case::unterminated_string(br#""abc"#, ErrorKind::Unterminated(Incomplete::Str), 0)]
#[case::keyword_typo(b"trux", ErrorKind::MalformedLiteral("invalid literal"), 0)]
#[case::keyword_overrun(b"nulll", ErrorKind::MalformedLiteral("invalid literal"), 0)]
#[case::leading_zero(b"01", ErrorKind::MalformedLiteral("leading zero in number"), 0)]
#[case::bare_point(
    b"1.",
    ErrorKind::MalformedLiteral("expected a digit after the decimal point"),
    2
)]
#[case::bare_exponent(b"1e+", ErrorKind::MalformedLiteral("expected a digit in exponent"), 3)]
#[case::bare_minus(b"-", ErrorKind::MalformedLiteral("expected a digit in number"), 1)]
#[case::number_junk(b"1x", ErrorKind::MalformedLiteral("invalid character in number"), 1)]
#[case::bad_escape(br#""a\qb""#, ErrorKind::MalformedLiteral("invalid escape sequence"), 2)]
#[case::object_wants_name(b"{]", ErrorKind::Structural("expected a property name"), 1)]
#[case::trailing_comma_object(
    br#"{"a":1,}"#,
    ErrorKind::Structural("expected a property name"),
    7
)]
#[case::array_wants_value(b"[}", ErrorKind::Structural("expected a value"), 1)]
#[case::trailing_comma_array(b"[1,]", ErrorKind::Structural("expected a value"), 3)]
#[case::stray_close(b"]", ErrorKind::Structural("expected a value"), 0)]
#[case::missing_colon(
    br#"{"a" 1}"#,
    ErrorKind::Structural("expected ':' after a property name"),
    5
)]
#[case::missing_comma(
    b"[1 2]",
    ErrorKind::Structural("expected ',' or a closing bracket after a value"),
    3
)]
#[case::mismatched_close(b"[1}", ErrorKind::Structural("mismatched closing bracket"), 2)]
#[case::data_after_root(b"1 2", ErrorKind::Structural("data after the root value"), 2)]
#[case::data_after_container(b"{}x", ErrorKind::Structural("data after the root value"), 2)]
#[case::comment_disallowed_by_default(b"//x", ErrorKind::Structural("expected a value"), 0)]
fn rejects(#[case] doc: &[u8], #[case] kind: ErrorKind, #[case] offset: usize) {
    assert_eq!(read_all(doc).unwrap_err(), Error::new(kind, offset));
}

#[test]
fn rejects_invalid_unicode_escape() {
    let mut doc = b"\"a".to_vec();
    doc.extend_from_slice(&[b'\\', b'u', b'z', b'z', b'z', b'z']);
    doc.extend_from_slice(b"\"");
    assert_eq!(
        read_all(&doc).unwrap_err(),
        Error::new(
            ErrorKind::MalformedLiteral("invalid unicode escape sequence"),
            2
        ),
    );
}

#[test]
fn rejects_raw_control_character_in_string() {
    let mut doc = b"\"a".to_vec();
    doc.push(0x01);
    doc.extend_from_slice(b"b\"");
    assert_eq!(
        read_all(&doc).unwrap_err(),
        Error::new(
            ErrorKind::MalformedLiteral("raw control character in string"),
            2
        ),
    );
}

#[test]
fn rejects_nesting_past_the_configured_depth() {
    let options = ReaderOptions {
        max_depth: 3,
        ..ReaderOptions::default()
    };
    assert_eq!(
        read_all_with(b"[[[[", options).unwrap_err(),
        Error::new(ErrorKind::DepthExceeded(3), 3),
    );
}

#[test]
fn rejects_unterminated_block_comment_on_the_final_block() {
    let options = ReaderOptions {
        comment_handling: CommentHandling::Skip,
        ..ReaderOptions::default()
    };
    assert_eq!(
        read_all_with(b"/*x", options).unwrap_err(),
        Error::new(ErrorKind::Unterminated(Incomplete::Comment), 0),
    );
}

#[test]
fn rejects_a_lone_slash_even_with_comments_enabled() {
    let options = ReaderOptions {
        comment_handling: CommentHandling::Skip,
        ..ReaderOptions::default()
    };
    assert_eq!(
        read_all_with(b"/x", options).unwrap_err(),
        Error::new(
            ErrorKind::Structural("expected '/' or '*' to begin a comment"),
            0
        ),
    );
}

#[test]
fn error_offsets_are_relative_to_the_current_slice() {
    // The violation is the first byte of the second slice presented after
    // the carry was drained.
    let chunks: [&[u8]; 2] = [b"[1,", b"}"];
    assert_eq!(
        read_chunked(&chunks).unwrap_err(),
        Error::new(ErrorKind::Structural("expected a value"), 0),
    );
}

#[test]
fn final_empty_chunk_surfaces_the_open_container() {
    let chunks: [&[u8]; 2] = [b"[1", b""];
    assert_eq!(
        read_chunked(&chunks).unwrap_err(),
        Error::new(ErrorKind::Unterminated(Incomplete::Container), 1),
    );
}
