//! In-memory section → key → value structure.
//!
//! Sections and keys are kept in ordered maps so that listing and
//! serialization are deterministic.  Callers must not rely on any particular
//! order; it is simply stable.
//!
//! # Canonical text form
//!
//! ```text
//! orphan = 1          <- keys of the "" section, no header
//!
//! [db]
//! host = localhost
//! port = 5432
//!
//! [empty]             <- named sections without keys keep their header
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::parser::tokenizer::{tokenize_line, LineKind};

/// Name of the implicit section that holds keys seen before any header.
pub const ROOT_SECTION: &str = "";

/// Keys and values of one section.
pub type SectionEntries = BTreeMap<String, String>;

/// A part of the document whose canonical line would parse back differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossyPart<'a> {
    /// The `[name]` header of a named section.
    SectionName(&'a str),
    /// The `key = value` line of one entry.
    Entry { section: &'a str, key: &'a str },
}

/// A parsed configuration: section name → key → value.
///
/// Within a section keys are unique; a later write replaces the earlier
/// value.  Sections are created implicitly on first use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    sections: BTreeMap<String, SectionEntries>,
}

impl ConfigDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the document has no sections at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections, including an empty-named one if present.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of key/value pairs across all sections.
    pub fn value_count(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// Creates `section` if it does not exist yet.  Existing keys are kept.
    pub fn ensure_section(&mut self, section: &str) -> &mut SectionEntries {
        self.sections.entry(section.to_string()).or_default()
    }

    /// Inserts or overwrites a value, creating the section if needed.
    ///
    /// Returns the previous value, if any.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Option<String> {
        self.ensure_section(section)
            .insert(key.to_string(), value.to_string())
    }

    /// Looks up a value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Removes a value and returns it.  The section itself is never removed,
    /// even when it becomes empty.
    pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
        self.sections
            .get_mut(section)
            .and_then(|entries| entries.remove(key))
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn has_value(&self, section: &str, key: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|entries| entries.contains_key(key))
    }

    /// Iterates over section names.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Iterates over the keys of `section`; empty if the section is absent.
    pub fn keys<'a>(&'a self, section: &str) -> impl Iterator<Item = &'a str> {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    /// Iterates over every `(section, key, value)` triple.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.sections.iter().flat_map(|(section, entries)| {
            entries
                .iter()
                .map(move |(key, value)| (section.as_str(), key.as_str(), value.as_str()))
        })
    }

    /// Section names and entries that cannot survive a save/reload cycle
    /// unchanged, in canonical order.
    pub fn lossy_parts(&self) -> impl Iterator<Item = LossyPart<'_>> {
        self.sections.iter().flat_map(|(section, entries)| {
            let header = (!section.is_empty() && !header_reads_back(section))
                .then_some(LossyPart::SectionName(section.as_str()));
            let lossy_entries = entries
                .iter()
                .filter(|(key, value)| !entry_reads_back(key, value))
                .map(move |(key, _)| LossyPart::Entry {
                    section: section.as_str(),
                    key: key.as_str(),
                });
            header.into_iter().chain(lossy_entries)
        })
    }

    /// Renders the canonical text form.
    ///
    /// Parsing the result yields an equal document whenever
    /// [`lossy_parts`](Self::lossy_parts) is empty.
    pub fn to_config_string(&self) -> String {
        let mut out = String::new();

        for (name, entries) in &self.sections {
            if name.is_empty() {
                if entries.is_empty() {
                    continue;
                }
            } else {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("[{name}]\n"));
            }

            for (key, value) in entries {
                out.push_str(&format!("{key} = {value}\n"));
            }
        }

        out
    }
}

/// Returns `true` if `[name]` tokenizes back to a header named `name`.
pub fn header_reads_back(name: &str) -> bool {
    reads_back(&format!("[{name}]"), LineKind::SectionHeader(name))
}

/// Returns `true` if `key = value` tokenizes back to the same pair.
pub fn entry_reads_back(key: &str, value: &str) -> bool {
    reads_back(&format!("{key} = {value}"), LineKind::KeyValue { key, value })
}

/// The rendered text must stay one physical line and classify as `expected`.
fn reads_back(rendered: &str, expected: LineKind<'_>) -> bool {
    let mut lines = rendered.lines();
    match (lines.next(), lines.next()) {
        (Some(line), None) => line == rendered && tokenize_line(line) == expected,
        _ => false,
    }
}
