//! Per-document syntax tree cache kept in sync with editor edits.
//!
//! Each open URI owns exactly one tree together with the text it was parsed
//! from and the editor version of that text. Ranged changes are replayed on
//! the previous tree so tree-sitter can reuse unchanged subtrees; full
//! replacements and malformed ranges reparse from scratch.
//!
//! When a reparse fails the last good entry (tree, text and version) is kept
//! and the failed batch is dropped.

mod edit;

pub use edit::{ContentChange, Position, Range};

use std::collections::HashMap;
use std::sync::Arc;

use tree_sitter::Tree;
use tracing::{debug, debug_span, warn};

use crate::config::LanguageAliases;
use crate::core::{Error, Language, Result};
use crate::parsing::SyntaxParser;

/// The tracked state of one open document.
#[derive(Debug)]
pub struct DocumentEntry {
    tree: Tree,
    text: String,
    version: i32,
    language: Language,
    language_id: String,
}

impl DocumentEntry {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }
}

pub struct DocumentTreeCache {
    parsers: Arc<dyn SyntaxParser>,
    aliases: LanguageAliases,
    documents: HashMap<String, DocumentEntry>,
}

impl DocumentTreeCache {
    pub fn new(parsers: Arc<dyn SyntaxParser>) -> Self {
        Self::with_aliases(parsers, LanguageAliases::default())
    }

    pub fn with_aliases(parsers: Arc<dyn SyntaxParser>, aliases: LanguageAliases) -> Self {
        Self {
            parsers,
            aliases,
            documents: HashMap::new(),
        }
    }

    /// Start tracking `uri`, replacing any previous entry.
    ///
    /// On failure the URI is left untracked.
    pub fn open(&mut self, uri: &str, language_id: &str, version: i32, text: &str) -> Result<()> {
        let _span = debug_span!("open", uri, version).entered();
        self.documents.remove(uri);

        let language = self
            .aliases
            .resolve(language_id)
            .ok_or_else(|| Error::parser_unavailable(language_id))?;

        let tree = self
            .parsers
            .parse(language, text, None)
            .map_err(|e| for_uri(e, uri))
            .inspect_err(|e| warn!(error = %e, "Failed to parse opened document"))?;

        self.documents.insert(
            uri.to_string(),
            DocumentEntry {
                tree,
                text: text.to_string(),
                version,
                language,
                language_id: language_id.to_ascii_lowercase(),
            },
        );
        debug!(%language, "Tracking document");
        Ok(())
    }

    /// Apply a batch of changes in order and reparse once.
    pub fn change(&mut self, uri: &str, version: i32, changes: &[ContentChange]) -> Result<()> {
        let _span = debug_span!("change", uri, version, changes = changes.len()).entered();
        let entry = self
            .documents
            .get(uri)
            .ok_or_else(|| Error::UnknownDocument(uri.to_string()))?;

        let mut text = entry.text.clone();
        let mut tree = entry.tree.clone();
        let mut incremental = true;

        for change in changes {
            match change.range {
                Some(range) => {
                    let applied = edit::apply_ranged(&mut text, range, &change.text);
                    if let Some(problem) = applied.malformed {
                        warn!(error = %problem, "Falling back to full reparse");
                        incremental = false;
                    }
                    if incremental {
                        tree.edit(&applied.edit);
                    }
                }
                None => {
                    text.clone_from(&change.text);
                    incremental = false;
                }
            }
        }

        let previous = incremental.then_some(&tree);
        let reparsed = self
            .parsers
            .parse(entry.language, &text, previous)
            .map_err(|e| for_uri(e, uri));

        match reparsed {
            Ok(new_tree) => {
                debug!(incremental, "Reparsed document");
                if let Some(entry) = self.documents.get_mut(uri) {
                    entry.tree = new_tree;
                    entry.text = text;
                    entry.version = version;
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, kept_version = entry.version, "Reparse failed, keeping last good tree");
                Err(e)
            }
        }
    }

    /// Force a full reparse of the stored text, discarding the old tree.
    pub fn reparse(&mut self, uri: &str) -> Result<()> {
        let entry = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| Error::UnknownDocument(uri.to_string()))?;

        entry.tree = self
            .parsers
            .parse(entry.language, &entry.text, None)
            .map_err(|e| for_uri(e, uri))?;
        debug!(uri, version = entry.version, "Recovered document by full reparse");
        Ok(())
    }

    /// Stop tracking `uri`. Returns whether it was tracked.
    pub fn close(&mut self, uri: &str) -> bool {
        let removed = self.documents.remove(uri).is_some();
        debug!(uri, removed, "Closed document");
        removed
    }

    pub fn get(&self, uri: &str) -> Option<&DocumentEntry> {
        self.documents.get(uri)
    }

    /// Borrow the entry for `uri` for the duration of `f`.
    pub fn with_document<T>(&self, uri: &str, f: impl FnOnce(&DocumentEntry) -> T) -> Option<T> {
        self.documents.get(uri).map(f)
    }

    pub fn tree(&self, uri: &str) -> Option<&Tree> {
        self.get(uri).map(DocumentEntry::tree)
    }

    pub fn version(&self, uri: &str) -> Option<i32> {
        self.get(uri).map(DocumentEntry::version)
    }

    pub fn text(&self, uri: &str) -> Option<&str> {
        self.get(uri).map(DocumentEntry::text)
    }

    pub fn language(&self, uri: &str) -> Option<Language> {
        self.get(uri).map(DocumentEntry::language)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Attach the document URI to parse errors raised by the parser registry.
fn for_uri(error: Error, uri: &str) -> Error {
    match error {
        Error::Parse { message, .. } => Error::parse(uri, message),
        other => other,
    }
}
