//! The configuration store use case.
//!
//! [`ConfigStore`] ties the pieces together:
//!
//! ```text
//! ConfigFs::read_to_string(source)
//!        │ text
//!        ▼
//! parse_document()  ──► diagnostics ──► DiagnosticsSink
//!        │ ConfigDocument
//!        ▼
//! ConfigStore  ── get / set / remove / list / save / backup
//!        │ apply_config_logic()
//!        ▼
//! HandlerRegistry  ── handler(value) for every present (section, key)
//! ```
//!
//! # Lifecycle
//!
//! The document is loaded on construction and replaced wholesale by
//! [`ConfigStore::reload_config_from_file`].  Unsaved edits are lost on
//! reload; that is the intended behaviour.  Handlers are independent of the
//! document and survive reloads.
//!
//! # Threading
//!
//! Every operation is synchronous and runs to completion.  The store is
//! `Send` but not internally synchronised: callers that share one between
//! threads wrap the whole store in a `Mutex`.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::diagnostic::Diagnostic;
use crate::domain::document::{ConfigDocument, LossyPart};
use crate::domain::registry::{HandlerError, HandlerKey, HandlerRegistry, HandlerResult};
use crate::infrastructure::fs::{ConfigFs, LocalFs, PersistenceError};
use crate::infrastructure::paths::{expand_tilde, home_dir};
use crate::infrastructure::sink::{DiagnosticsSink, TracingSink};
use crate::parser::parse_document;

// ── Dispatch results ──────────────────────────────────────────────────────────

/// Result of dispatching a single `(section, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No value or no handler for the pair; nothing ran.
    Skipped,
    /// The handler ran and returned `Ok`.
    Succeeded,
    /// The handler ran and returned an error.
    Failed(HandlerError),
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::Failed(_))
    }
}

/// Result of a full dispatch walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Handlers that ran, whether or not they succeeded.
    pub invoked: usize,
    /// Pairs whose handler returned an error.
    pub failed: Vec<HandlerKey>,
}

impl DispatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Configures and opens a [`ConfigStore`].
///
/// ```rust
/// use confstore_core::infrastructure::fs::memory::MemoryFs;
/// use confstore_core::infrastructure::sink::NullSink;
/// use confstore_core::ConfigStore;
///
/// let fs = MemoryFs::new().with_file("/app.conf", "[db]\nhost = x\n");
/// let store = ConfigStore::builder("/app.conf")
///     .fs(fs)
///     .sink(NullSink)
///     .handler("db", "host", |host| {
///         assert_eq!(host, "x");
///         Ok(())
///     })
///     .apply_on_load(true)
///     .build();
/// assert_eq!(store.get_value("db", "host"), Some("x"));
/// ```
pub struct ConfigStoreBuilder {
    path: PathBuf,
    fs: Box<dyn ConfigFs>,
    sink: Box<dyn DiagnosticsSink>,
    registry: HandlerRegistry,
    apply_on_load: bool,
    home: Option<PathBuf>,
}

impl ConfigStoreBuilder {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            fs: Box::new(LocalFs),
            sink: Box::new(TracingSink),
            registry: HandlerRegistry::new(),
            apply_on_load: false,
            home: None,
        }
    }

    /// Replaces the file system gateway (default: [`LocalFs`]).
    pub fn fs(mut self, fs: impl ConfigFs + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    /// Replaces the diagnostics sink (default: [`TracingSink`]).
    pub fn sink(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Starts from an existing registry.  Handlers added with
    /// [`handler`](Self::handler) afterwards are merged into it.
    pub fn handlers(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers one handler.
    pub fn handler<F>(mut self, section: &str, key: &str, handler: F) -> Self
    where
        F: FnMut(&str) -> HandlerResult + Send + 'static,
    {
        self.registry.register(section, key, handler);
        self
    }

    /// Runs [`ConfigStore::apply_config_logic`] right after the first load.
    ///
    /// Off by default; dispatch is normally an explicit step.
    pub fn apply_on_load(mut self, apply: bool) -> Self {
        self.apply_on_load = apply;
        self
    }

    /// Directory that a leading `~` expands to, for the source path and for
    /// save and backup destinations (default: `HOME`, then `USERPROFILE`).
    pub fn home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Expands `~` in the path, loads the file, and optionally dispatches.
    ///
    /// Never fails: an unreadable file yields an empty store plus a
    /// diagnostic.
    pub fn build(self) -> ConfigStore {
        let home = self.home.or_else(home_dir);
        let mut store = ConfigStore {
            source: expand_tilde(&self.path, home.as_deref()),
            home,
            document: ConfigDocument::new(),
            diagnostics: Vec::new(),
            registry: self.registry,
            fs: self.fs,
            sink: self.sink,
        };
        store.load();
        if self.apply_on_load {
            store.apply_config_logic();
        }
        store
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// A sectioned key/value configuration loaded from one file, plus the
/// handlers to run when its values are loaded or changed.
pub struct ConfigStore {
    source: PathBuf,
    home: Option<PathBuf>,
    document: ConfigDocument,
    diagnostics: Vec<Diagnostic>,
    registry: HandlerRegistry,
    fs: Box<dyn ConfigFs>,
    sink: Box<dyn DiagnosticsSink>,
}

impl ConfigStore {
    /// Opens `path` on the local file system with diagnostics sent to
    /// `tracing`.  No handlers are registered and nothing is dispatched.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::builder(path).build()
    }

    /// Starts configuring a store for `path`.
    pub fn builder(path: impl AsRef<Path>) -> ConfigStoreBuilder {
        ConfigStoreBuilder::new(path.as_ref())
    }

    /// The file the document was loaded from (after `~` expansion).
    pub fn source_path(&self) -> &Path {
        &self.source
    }

    /// Read-only view of the current document.
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Diagnostics recorded by the most recent load or reload.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn get_value(&self, section: &str, key: &str) -> Option<&str> {
        self.document.get(section, key)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.document.has_section(section)
    }

    pub fn has_value(&self, section: &str, key: &str) -> bool {
        self.document.has_value(section, key)
    }

    /// Snapshot of all section names.
    pub fn get_sections(&self) -> Vec<String> {
        self.document.sections().map(str::to_string).collect()
    }

    /// Snapshot of the keys in `section`; empty if the section is absent.
    pub fn get_keys(&self, section: &str) -> Vec<String> {
        self.document.keys(section).map(str::to_string).collect()
    }

    /// The canonical text that [`save_to_file`](Self::save_to_file) writes.
    pub fn to_config_string(&self) -> String {
        self.document.to_config_string()
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    /// Inserts or overwrites a value, creating the section if needed.
    ///
    /// With `invoke_handler` set, the handler for the pair (if any) runs
    /// afterwards, even when the value did not change.  The value is stored
    /// regardless; `false` means the handler returned an error.
    pub fn set_value(&mut self, section: &str, key: &str, value: &str, invoke_handler: bool) -> bool {
        self.document.set(section, key, value);

        if !invoke_handler {
            return true;
        }
        !self.apply_config_logic_for_key(section, key).is_failure()
    }

    /// Removes a value.  Returns `false` if the section or key was absent.
    /// The section is kept even if it becomes empty.
    pub fn remove_value(&mut self, section: &str, key: &str) -> bool {
        self.document.remove(section, key).is_some()
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Writes the canonical text to `path`, or to the source path when
    /// `path` is `None`.  Returns `false` (and reports a diagnostic) on
    /// failure.
    pub fn save_to_file(&self, path: Option<&Path>) -> bool {
        match self.try_save_to_file(path) {
            Ok(()) => true,
            Err(err) => {
                self.sink
                    .report(&Diagnostic::write_failure(err.path(), err.reason()));
                false
            }
        }
    }

    /// Like [`save_to_file`](Self::save_to_file), returning the cause.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Write`] if the file or its directory could
    /// not be written.
    pub fn try_save_to_file(&self, path: Option<&Path>) -> Result<(), PersistenceError> {
        let target = self.resolve(path);

        for part in self.document.lossy_parts() {
            let diagnostic = match part {
                LossyPart::SectionName(section) => Diagnostic::lossy_section(section),
                LossyPart::Entry { section, key } => Diagnostic::lossy_entry(section, key),
            };
            self.sink.report(&diagnostic);
        }

        self.fs.write(&target, &self.document.to_config_string())?;
        debug!(
            "saved {} values in {} sections to {}",
            self.document.value_count(),
            self.document.section_count(),
            target.display()
        );
        Ok(())
    }

    /// Copies the file currently on disk (not the in-memory document) to
    /// `path`.  Returns `false` if the source is missing or the copy fails.
    pub fn backup_config(&self, path: &Path) -> bool {
        match self.try_backup_config(path) {
            Ok(()) => true,
            Err(err) => {
                self.sink
                    .report(&Diagnostic::write_failure(self.expand(path), &err));
                false
            }
        }
    }

    /// Like [`backup_config`](Self::backup_config), returning the cause.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::SourceMissing`] if the source file does not
    /// exist, or [`PersistenceError::Copy`] if the copy fails.
    pub fn try_backup_config(&self, path: &Path) -> Result<(), PersistenceError> {
        let target = self.expand(path);
        self.fs.copy(&self.source, &target)?;
        debug!("backed up {} to {}", self.source.display(), target.display());
        Ok(())
    }

    /// Discards the document and diagnostics, re-parses the source file, and
    /// dispatches every handler again.
    ///
    /// In-memory edits made since the last load or save are lost.
    pub fn reload_config_from_file(&mut self) -> DispatchSummary {
        self.load();
        self.apply_config_logic()
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    /// Registers (or replaces) the handler for `(section, key)`.
    ///
    /// The pair does not need to exist in the document.  Returns `true` if an
    /// earlier handler was replaced.
    pub fn register_config_handler<F>(&mut self, section: &str, key: &str, handler: F) -> bool
    where
        F: FnMut(&str) -> HandlerResult + Send + 'static,
    {
        self.registry.register(section, key, handler)
    }

    /// Removes the handler for `(section, key)`.  Returns `true` if one existed.
    pub fn unregister_config_handler(&mut self, section: &str, key: &str) -> bool {
        self.registry.unregister(section, key)
    }

    pub fn has_config_handler(&self, section: &str, key: &str) -> bool {
        self.registry.contains(section, key)
    }

    /// All registered `(section, key)` pairs.
    pub fn registered_handlers(&self) -> Vec<HandlerKey> {
        self.registry.keys()
    }

    /// Runs the matching handler for every `(section, key)` present in the
    /// document, once each.
    ///
    /// Pairs without a handler are skipped silently.  A failing handler is
    /// reported to the sink and recorded in the summary; the walk continues.
    pub fn apply_config_logic(&mut self) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for (section, key, value) in self.document.entries() {
            match self.registry.invoke(section, key, value) {
                None => {}
                Some(Ok(())) => summary.invoked += 1,
                Some(Err(err)) => {
                    summary.invoked += 1;
                    self.sink
                        .report(&Diagnostic::handler_failure(section, key, &err));
                    summary.failed.push(HandlerKey::new(section, key));
                }
            }
        }

        debug!(
            "dispatched {} handlers ({} failed)",
            summary.invoked,
            summary.failed.len()
        );
        summary
    }

    /// Runs the handler for one pair.  No-op if the value or the handler is
    /// absent.
    pub fn apply_config_logic_for_key(&mut self, section: &str, key: &str) -> DispatchOutcome {
        let Some(value) = self.document.get(section, key) else {
            return DispatchOutcome::Skipped;
        };

        match self.registry.invoke(section, key, value) {
            None => DispatchOutcome::Skipped,
            Some(Ok(())) => DispatchOutcome::Succeeded,
            Some(Err(err)) => {
                self.sink
                    .report(&Diagnostic::handler_failure(section, key, &err));
                DispatchOutcome::Failed(err)
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// Replaces the document and diagnostics with a fresh parse of the source.
    fn load(&mut self) {
        self.document = ConfigDocument::new();
        self.diagnostics.clear();

        match self.fs.read_to_string(&self.source) {
            Ok(text) => {
                let outcome = parse_document(&text);
                self.document = outcome.document;
                self.diagnostics = outcome.diagnostics;
            }
            Err(err) => {
                self.diagnostics
                    .push(Diagnostic::unreadable_source(&self.source, err.reason()));
            }
        }

        for diagnostic in &self.diagnostics {
            self.sink.report(diagnostic);
        }

        debug!(
            "loaded {} values in {} sections from {} ({} diagnostics)",
            self.document.value_count(),
            self.document.section_count(),
            self.source.display(),
            self.diagnostics.len()
        );
    }

    fn resolve(&self, path: Option<&Path>) -> PathBuf {
        path.map(|path| self.expand(path))
            .unwrap_or_else(|| self.source.clone())
    }

    fn expand(&self, path: &Path) -> PathBuf {
        expand_tilde(path, self.home.as_deref())
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("source", &self.source)
            .field("document", &self.document)
            .field("diagnostics", &self.diagnostics)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
