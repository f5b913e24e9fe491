//! # confstore-core
//!
//! A configuration store for line-oriented, sectioned key/value files:
//!
//! ```text
//! [section_name]
//! key = value
//! # comment (ignored to end of line)
//!
//! [another_section]
//! k = v
//! ```
//!
//! The store loads such a file into a section → key → value map, offers
//! string get/set/remove/list operations, writes the map back out, and runs
//! caller-registered *handlers* when particular `(section, key)` values are
//! loaded or changed.
//!
//! # Layout
//!
//! - **`parser`** – the line tokenizer and the document parser.  Pure
//!   functions from text to a [`ConfigDocument`] plus diagnostics.
//! - **`domain`** – [`ConfigDocument`], [`HandlerRegistry`], and the
//!   [`Diagnostic`] records.
//! - **`application`** – [`ConfigStore`], which ties parsing, storage, and
//!   dispatch together.
//! - **`infrastructure`** – the file system gateway ([`ConfigFs`]), `~`
//!   expansion, and diagnostics sinks ([`DiagnosticsSink`]).
//!
//! # Example
//!
//! ```rust
//! use confstore_core::infrastructure::fs::memory::MemoryFs;
//! use confstore_core::infrastructure::sink::NullSink;
//! use confstore_core::ConfigStore;
//!
//! let fs = MemoryFs::new().with_file("/app.conf", "[net]\nport = 8080 # default\n");
//! let mut store = ConfigStore::builder("/app.conf").fs(fs).sink(NullSink).build();
//!
//! assert_eq!(store.get_value("net", "port"), Some("8080"));
//! store.set_value("net", "port", "9090", false);
//! assert!(store.save_to_file(None));
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod parser;

pub use application::store::{ConfigStore, ConfigStoreBuilder, DispatchOutcome, DispatchSummary};
pub use domain::diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use domain::document::{ConfigDocument, LossyPart, ROOT_SECTION};
pub use domain::registry::{HandlerError, HandlerKey, HandlerRegistry, HandlerResult};
pub use infrastructure::fs::{ConfigFs, LocalFs, PersistenceError};
pub use infrastructure::sink::{CollectingSink, DiagnosticsSink, NullSink, TracingSink};
pub use parser::{parse_document, ParseOutcome};
