//! Diagnostic records produced while loading, saving, and dispatching.
//!
//! Nothing in the store fails hard because of one bad line, one unreadable
//! file, or one misbehaving handler.  Each of those situations becomes a
//! [`Diagnostic`] that is handed to the injected
//! [`DiagnosticsSink`](crate::infrastructure::sink::DiagnosticsSink) and, for
//! load-time problems, kept on the store for later inspection.

use std::fmt;
use std::path::PathBuf;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Something was skipped, but the operation carried on.
    Warning,
    /// A file operation could not be completed.
    Error,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A line matched none of the recognised grammars and was skipped.
    MalformedLine {
        /// 1-based physical line number.
        line_number: usize,
        /// Section in effect when the line was read (`""` before any header).
        section: String,
        /// The trimmed, comment-stripped line text.
        text: String,
    },
    /// The source file was missing or could not be read.
    UnreadableSource { path: PathBuf, reason: String },
    /// A save or backup could not be completed.
    WriteFailure { path: PathBuf, reason: String },
    /// A registered handler returned an error.
    HandlerFailure {
        section: String,
        key: String,
        reason: String,
    },
    /// Saved text that will not read back identically: a section name
    /// (`key` is `None`) or a key/value pair (`key` is `Some`) that the
    /// tokenizer would split, trim, or cut at a `#` or line break.
    LossyEntry {
        section: String,
        key: Option<String>,
    },
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn malformed_line(line_number: usize, section: &str, text: &str) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::MalformedLine {
                line_number,
                section: section.to_string(),
                text: text.to_string(),
            },
        }
    }

    pub fn unreadable_source(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::UnreadableSource {
                path: path.into(),
                reason: reason.to_string(),
            },
        }
    }

    pub fn write_failure(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::WriteFailure {
                path: path.into(),
                reason: reason.to_string(),
            },
        }
    }

    pub fn handler_failure(section: &str, key: &str, reason: impl fmt::Display) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::HandlerFailure {
                section: section.to_string(),
                key: key.to_string(),
                reason: reason.to_string(),
            },
        }
    }

    pub fn lossy_entry(section: &str, key: &str) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::LossyEntry {
                section: section.to_string(),
                key: Some(key.to_string()),
            },
        }
    }

    pub fn lossy_section(section: &str) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::LossyEntry {
                section: section.to_string(),
                key: None,
            },
        }
    }

    /// Returns the offending line text for [`DiagnosticKind::MalformedLine`].
    pub fn line_text(&self) -> Option<&str> {
        match &self.kind {
            DiagnosticKind::MalformedLine { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MalformedLine {
                line_number,
                section,
                text,
            } => write!(
                f,
                "invalid line {line_number} in section [{section}]: {text}"
            ),
            DiagnosticKind::UnreadableSource { path, reason } => {
                write!(f, "unable to read config file {}: {reason}", path.display())
            }
            DiagnosticKind::WriteFailure { path, reason } => {
                write!(f, "unable to write {}: {reason}", path.display())
            }
            DiagnosticKind::HandlerFailure {
                section,
                key,
                reason,
            } => write!(f, "handler for [{section}] {key} failed: {reason}"),
            DiagnosticKind::LossyEntry {
                section,
                key: Some(key),
            } => write!(f, "[{section}] {key} will not reload as written"),
            DiagnosticKind::LossyEntry { section, key: None } => {
                write!(f, "section name [{section}] will not reload as written")
            }
        }
    }
}
