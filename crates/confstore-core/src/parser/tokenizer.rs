//! Line tokenizer for the sectioned key/value format.
//!
//! Every physical line of a configuration file is classified on its own,
//! with no state carried between lines:
//!
//! ```text
//! [network]                 -> SectionHeader("network")
//! port = 8080 # default     -> KeyValue("port", "8080")
//!    # just a comment       -> Blank
//! url = http://a/?x=1       -> KeyValue("url", "http://a/?x=1")
//! garbage                   -> Malformed("garbage")
//! ```
//!
//! # Comment rule
//!
//! `#` ends the line wherever it appears.  There is no escaping and no
//! quoting, so a value can never contain a literal `#`.

/// The character that starts a comment.
pub const COMMENT_CHAR: char = '#';

/// Separator between a key and its value.  Only the first occurrence splits.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Classification of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Nothing left after stripping the comment and surrounding whitespace.
    Blank,
    /// `[name]`; the name is trimmed and may be empty.
    SectionHeader(&'a str),
    /// `key = value`; both sides trimmed, the value may be empty.
    KeyValue { key: &'a str, value: &'a str },
    /// Non-blank content that is neither a header nor a key/value pair.
    /// Carries the trimmed, comment-stripped text.
    Malformed(&'a str),
}

/// Trims spaces and tabs only.  Other whitespace is treated as content.
pub fn trim_blanks(text: &str) -> &str {
    text.trim_matches(|c| c == ' ' || c == '\t')
}

/// Removes everything from the first `#` onward.
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Classifies one line of text.
///
/// The header test runs before the `=` test, so `[a=b]` is a section named
/// `a=b`, not a key/value pair.
///
/// # Examples
///
/// ```rust
/// use confstore_core::parser::tokenizer::{tokenize_line, LineKind};
///
/// assert_eq!(
///     tokenize_line("port = 8080 # default port"),
///     LineKind::KeyValue { key: "port", value: "8080" }
/// );
/// assert_eq!(tokenize_line(" [db] "), LineKind::SectionHeader("db"));
/// ```
pub fn tokenize_line(line: &str) -> LineKind<'_> {
    let content = trim_blanks(strip_comment(line));

    if content.is_empty() {
        return LineKind::Blank;
    }

    if content.len() >= 2 && content.starts_with('[') && content.ends_with(']') {
        // Both brackets are single-byte, so slicing them off is char-safe.
        let name = trim_blanks(&content[1..content.len() - 1]);
        return LineKind::SectionHeader(name);
    }

    match content.split_once(KEY_VALUE_SEPARATOR) {
        Some((key, value)) => LineKind::KeyValue {
            key: trim_blanks(key),
            value: trim_blanks(value),
        },
        None => LineKind::Malformed(content),
    }
}
