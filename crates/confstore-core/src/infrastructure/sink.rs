//! Diagnostics sinks.
//!
//! The store reports malformed lines, unreadable or unwritable files, and
//! failing handlers to a [`DiagnosticsSink`] chosen by the caller.  It never
//! relies on what the sink does with them, so [`NullSink`] is always a valid
//! choice.
//!
//! | Sink              | Behaviour                                       |
//! |-------------------|-------------------------------------------------|
//! | [`TracingSink`]   | `tracing::warn!` / `tracing::error!` (default)  |
//! | [`NullSink`]      | drops everything                                |
//! | [`CollectingSink`]| appends to a shared `Vec` for later inspection  |
//! | any `Fn(&Diagnostic) + Send` closure | calls the closure            |

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, warn};

use crate::domain::diagnostic::{Diagnostic, Severity};

/// Receiver of diagnostics.
pub trait DiagnosticsSink: Send {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticsSink for F
where
    F: Fn(&Diagnostic) + Send,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to `tracing`, warnings at WARN and errors at ERROR.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Error => error!("{diagnostic}"),
        }
    }
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Keeps every diagnostic in a shared buffer.
///
/// Clones share the buffer, so one handle can be given to the store and
/// another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.records().clone()
    }

    /// Drains the buffer.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.records())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticsSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.records().push(diagnostic.clone());
    }
}
