//! Text → document parsing.
//!
//! - **`tokenizer`** – classifies a single line (blank, header, key/value,
//!   malformed) after stripping comments and surrounding spaces/tabs.
//! - **`document_parser`** – walks a whole text body line by line, tracks the
//!   current section, and collects malformed-line diagnostics.

pub mod document_parser;
pub mod tokenizer;

pub use document_parser::{parse_document, ParseOutcome};
pub use tokenizer::{tokenize_line, LineKind};
