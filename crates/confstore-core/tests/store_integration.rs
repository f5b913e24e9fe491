//! Integration tests for confstore-core against real files.
//!
//! Each test works in its own directory under the system temp dir and goes
//! through the public API only: open, edit, save, reload, back up, dispatch.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use confstore_core::{
    parse_document, CollectingSink, ConfigStore, DiagnosticKind, HandlerError, HandlerRegistry,
    NullSink, ROOT_SECTION,
};
use uuid::Uuid;

/// A scratch directory removed on drop.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("confstore_it_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        Self { dir }
    }

    fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read back")
}

const SAMPLE: &str = "\
# application settings
[section_name]
key = value
another_key=value with #not supported as literal hash

[another_section]
k = v
";

#[test]
fn test_open_real_file_parses_all_sections() {
    // Arrange
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", SAMPLE);

    // Act
    let store = ConfigStore::builder(&path).sink(NullSink).build();

    // Assert
    assert_eq!(store.source_path(), path.as_path());
    assert_eq!(store.get_value("section_name", "key"), Some("value"));
    assert_eq!(
        store.get_value("section_name", "another_key"),
        Some("value with")
    );
    assert_eq!(store.get_value("another_section", "k"), Some("v"));
    assert!(store.diagnostics().is_empty());
}

#[test]
fn test_open_missing_file_is_not_fatal() {
    // Arrange
    let scratch = Scratch::new();
    let sink = CollectingSink::new();

    // Act
    let mut store = ConfigStore::builder(scratch.path("absent.conf"))
        .sink(sink.clone())
        .build();

    // Assert – empty but usable
    assert!(store.get_sections().is_empty());
    assert_eq!(sink.len(), 1);
    assert!(store.set_value("a", "k", "v", false));
    assert!(store.save_to_file(None));
    assert_eq!(read(&scratch.path("absent.conf")), "[a]\nk = v\n");
}

#[test]
fn test_edit_save_reload_round_trip() {
    // Arrange
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", SAMPLE);
    let mut store = ConfigStore::builder(&path).sink(NullSink).build();

    // Act
    store.set_value("another_section", "k", "changed", false);
    store.set_value(ROOT_SECTION, "orphan", "1", false);
    store.remove_value("section_name", "key");
    let expected = store.document().clone();
    assert!(store.save_to_file(None));
    store.reload_config_from_file();

    // Assert
    assert_eq!(store.document(), &expected);
    assert_eq!(parse_document(&read(&path)).document, expected);
}

#[test]
fn test_save_to_explicit_path_creates_directories() {
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", "[a]\nk = v\n");
    let store = ConfigStore::builder(&path).sink(NullSink).build();
    let target = scratch.path("exports").join("copy.conf");

    assert!(store.save_to_file(Some(target.as_path())));

    assert_eq!(read(&target), "[a]\nk = v\n");
}

#[test]
fn test_save_into_a_file_used_as_directory_fails_gracefully() {
    // Arrange
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", "[a]\nk = v\n");
    let blocker = scratch.file("blocker", "");
    let sink = CollectingSink::new();
    let store = ConfigStore::builder(&path).sink(sink.clone()).build();

    // Act
    let ok = store.save_to_file(Some(blocker.join("nested.conf").as_path()));

    // Assert
    assert!(!ok);
    let reported = sink.take();
    assert_eq!(reported.len(), 1);
    assert!(matches!(
        reported[0].kind,
        DiagnosticKind::WriteFailure { .. }
    ));
}

#[test]
fn test_backup_copies_on_disk_contents() {
    // Arrange
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", SAMPLE);
    let mut store = ConfigStore::builder(&path).sink(NullSink).build();
    store.set_value("another_section", "k", "not yet saved", false);

    // Act
    let ok = store.backup_config(&scratch.path("app.conf.bak"));

    // Assert
    assert!(ok);
    assert_eq!(read(&scratch.path("app.conf.bak")), SAMPLE);
}

#[test]
fn test_backup_after_source_deleted_fails() {
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", SAMPLE);
    let store = ConfigStore::builder(&path).sink(NullSink).build();
    std::fs::remove_file(&path).expect("delete source");

    assert!(!store.backup_config(&scratch.path("app.conf.bak")));
    assert!(!scratch.path("app.conf.bak").exists());
}

#[test]
fn test_handlers_survive_reload_and_see_new_values() {
    // Arrange
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", "[db]\nhost = first\n");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let registry = {
        let seen = Arc::clone(&seen);
        HandlerRegistry::new().with("db", "host", move |host| {
            seen.lock().unwrap().push(host.to_string());
            Ok(())
        })
    };
    let mut store = ConfigStore::builder(&path)
        .sink(NullSink)
        .handlers(registry)
        .apply_on_load(true)
        .build();

    // Act
    std::fs::write(&path, "[db]\nhost = second\n").expect("rewrite source");
    let summary = store.reload_config_from_file();

    // Assert
    assert!(summary.is_clean());
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["first".to_string(), "second".to_string()]
    );
}

#[test]
fn test_handler_failure_via_set_value_is_reported() {
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", "[net]\nport = 80\n");
    let mut store = ConfigStore::builder(&path).sink(NullSink).build();
    store.register_config_handler("net", "port", |port| {
        port.parse::<u16>()
            .map(|_| ())
            .map_err(|_| HandlerError::new(format!("invalid port {port}")))
    });

    assert!(store.set_value("net", "port", "8080", true));
    assert!(!store.set_value("net", "port", "eighty", true));
    assert_eq!(store.get_value("net", "port"), Some("eighty"));
}

#[test]
fn test_invalid_utf8_in_a_comment_keeps_every_value() {
    // Arrange: Latin-1 "é" in a comment line
    let scratch = Scratch::new();
    let path = scratch.path("latin1.conf");
    std::fs::write(&path, b"[db]\nhost = x\n# caf\xE9\nport = 5432\n").expect("write fixture");
    let mut store = ConfigStore::builder(&path).sink(NullSink).build();

    // Act
    store.set_value("db", "user", "u", false);
    let saved = store.save_to_file(None);

    // Assert
    assert!(store.diagnostics().is_empty());
    assert_eq!(store.get_value("db", "host"), Some("x"));
    assert!(saved);
    assert_eq!(read(&path), "[db]\nhost = x\nport = 5432\nuser = u\n");
}

#[test]
fn test_lossy_entries_are_reported_on_save() {
    // Arrange
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", "");
    let sink = CollectingSink::new();
    let mut store = ConfigStore::builder(&path).sink(sink.clone()).build();
    store.set_value("s", "a=b", "c", false);
    store.set_value("s", "pad", " v ", false);

    // Act
    assert!(store.save_to_file(None));

    // Assert
    let reported = sink.take();
    assert_eq!(reported.len(), 2);
    assert!(reported
        .iter()
        .all(|d| matches!(d.kind, DiagnosticKind::LossyEntry { .. })));
    assert_eq!(read(&path), "[s]\na=b = c\npad =  v \n");
}

#[test]
fn test_malformed_lines_are_reported_with_line_numbers() {
    // Arrange
    let scratch = Scratch::new();
    let path = scratch.file("app.conf", "[a]\nk=v\nnot a valid line at all\n");

    // Act
    let store = ConfigStore::builder(&path).sink(NullSink).build();

    // Assert
    assert_eq!(store.get_keys("a"), vec!["k".to_string()]);
    assert_eq!(store.diagnostics().len(), 1);
    match &store.diagnostics()[0].kind {
        DiagnosticKind::MalformedLine {
            line_number, text, ..
        } => {
            assert_eq!(*line_number, 3);
            assert_eq!(text, "not a valid line at all");
        }
        other => panic!("unexpected diagnostic: {other:?}"),
    }
}
