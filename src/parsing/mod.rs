//! Tree-sitter parser integration
//!
//! One parser per language, installed once and shared behind a lock. The
//! [`SyntaxParser`] trait is the seam the document cache parses through.

use std::collections::HashMap;

use anyhow::Context;
use parking_lot::Mutex;
use tree_sitter::{Parser, Tree};
use tracing::debug;

use crate::core::{Error, Language, Result};

/// Produces syntax trees, optionally reusing a previous (edited) tree.
pub trait SyntaxParser: Send + Sync {
    fn parse(&self, language: Language, text: &str, previous: Option<&Tree>) -> Result<Tree>;

    fn supports(&self, language: Language) -> bool;
}

/// Registry of tree-sitter parsers keyed by language.
pub struct TreeSitterParsers {
    parsers: HashMap<Language, Mutex<Parser>>,
}

impl TreeSitterParsers {
    /// Install parsers for every supported language.
    pub fn new() -> Result<Self> {
        Self::with_languages(&Language::ALL)
    }

    /// Install parsers for a subset of languages only.
    pub fn with_languages(languages: &[Language]) -> Result<Self> {
        let mut parsers = HashMap::with_capacity(languages.len());
        for &language in languages {
            parsers.insert(language, Mutex::new(create_parser(language)?));
        }
        debug!(count = parsers.len(), "Installed tree-sitter parsers");
        Ok(Self { parsers })
    }
}

fn create_parser(language: Language) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .with_context(|| format!("Failed to set {language} language"))?;
    Ok(parser)
}

impl SyntaxParser for TreeSitterParsers {
    fn parse(&self, language: Language, text: &str, previous: Option<&Tree>) -> Result<Tree> {
        let parser = self
            .parsers
            .get(&language)
            .ok_or_else(|| Error::parser_unavailable(language.id()))?;

        parser
            .lock()
            .parse(text, previous)
            .ok_or_else(|| Error::parse(language.id(), "parser returned no tree"))
    }

    fn supports(&self, language: Language) -> bool {
        self.parsers.contains_key(&language)
    }
}

/// Check if a parse tree has errors
pub fn has_parse_errors(tree: &Tree) -> bool {
    tree.root_node().has_error()
}
