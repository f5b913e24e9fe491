//! Builds a [`ConfigDocument`] from the full text of a configuration file.
//!
//! # Algorithm
//!
//! ```text
//! current_section = ""
//! for each physical line:
//!     Blank              -> skip
//!     SectionHeader(n)   -> current_section = n   (existing keys are kept)
//!     KeyValue(k, v)     -> document[current_section][k] = v   (last wins)
//!     Malformed(text)    -> record a diagnostic, keep going
//! ```
//!
//! Keys that appear before the first header land in the empty-named section
//! rather than being thrown away.

use crate::domain::diagnostic::Diagnostic;
use crate::domain::document::{ConfigDocument, ROOT_SECTION};
use crate::parser::tokenizer::{tokenize_line, LineKind};

/// Result of parsing one text body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub document: ConfigDocument,
    /// One entry per malformed line, in line order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// Returns `true` if every non-blank line was understood.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses `text` into a document plus diagnostics for any malformed lines.
///
/// Never fails: the worst case is an empty document and a diagnostic for
/// every line.
///
/// A named `[header]` creates its section even when no keys follow.  An
/// empty `[]` header only switches back to the `""` section; that section
/// is created by its first key, never by a header, because the canonical
/// form writes it without one.
///
/// # Examples
///
/// ```rust
/// use confstore_core::parser::parse_document;
///
/// let outcome = parse_document("[a]\nk=v\nnot a valid line at all\n");
/// assert_eq!(outcome.document.get("a", "k"), Some("v"));
/// assert_eq!(outcome.diagnostics.len(), 1);
/// ```
pub fn parse_document(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut current_section = ROOT_SECTION;

    for (index, line) in text.lines().enumerate() {
        match tokenize_line(line) {
            LineKind::Blank => {}
            LineKind::SectionHeader(name) => {
                current_section = name;
                if !name.is_empty() {
                    outcome.document.ensure_section(current_section);
                }
            }
            LineKind::KeyValue { key, value } => {
                outcome.document.set(current_section, key, value);
            }
            LineKind::Malformed(content) => {
                outcome.diagnostics.push(Diagnostic::malformed_line(
                    index + 1,
                    current_section,
                    content,
                ));
            }
        }
    }

    outcome
}
