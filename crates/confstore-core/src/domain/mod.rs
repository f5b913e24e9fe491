//! Domain types with no I/O: the document, the handler registry, and the
//! diagnostic records both of them produce.

pub mod diagnostic;
pub mod document;
pub mod registry;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use document::{ConfigDocument, LossyPart, ROOT_SECTION};
pub use registry::{ConfigHandler, HandlerError, HandlerKey, HandlerRegistry, HandlerResult};
