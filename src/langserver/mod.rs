//! Language-server collaborator boundary.
//!
//! The wire protocol itself lives outside this crate; what the core provides
//! is the document session: a store of open documents whose parse results
//! are computed lazily on first access and cached until the document text
//! changes, plus document-symbol extraction over a parsed file. Types mirror
//! the protocol shapes (zero-based positions, numeric symbol kinds) so the
//! front-end can serialize them directly.

pub mod symbols;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::ast::types::File;
use crate::parser::{parse, ParseError, ParseOption};

pub use symbols::document_symbols;

// =============================================================================
// PROTOCOL SHAPES
// =============================================================================

/// Zero-based line/character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocPosition {
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: DocPosition,
    pub end: DocPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

/// Numeric symbol kind; only functions are produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymbolKind(pub u32);

impl SymbolKind {
    pub const FUNCTION: SymbolKind = SymbolKind(12);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolInformation {
    pub name: String,
    pub kind: SymbolKind,
    pub location: Location,
}

// =============================================================================
// DOCUMENT STORE
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    #[error("{0} is not open")]
    NotOpen(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

struct Document {
    text: String,
    version: i32,
    /// Parse result for the current `text`, filled on first access. An
    /// error is cached the same way a tree is.
    cached: Option<Result<File, ParseError>>,
}

/// Open documents keyed by URI, each with a lazily computed, per-revision
/// cached parse result.
#[derive(Default)]
pub struct DocumentStore {
    opt: ParseOption,
    files: HashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(opt: ParseOption) -> Self {
        Self { opt, files: HashMap::new() }
    }

    pub fn open(&mut self, uri: &str, text: &str) {
        self.files.insert(
            uri.to_string(),
            Document { text: text.to_string(), version: 1, cached: None },
        );
    }

    /// Replace a document's text. Any cached parse result is invalidated
    /// before the next access.
    pub fn update(&mut self, uri: &str, text: &str) {
        match self.files.get_mut(uri) {
            Some(doc) => {
                doc.text = text.to_string();
                doc.version += 1;
                doc.cached = None;
            }
            None => self.open(uri, text),
        }
    }

    pub fn close(&mut self, uri: &str) {
        self.files.remove(uri);
    }

    pub fn is_open(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }

    pub fn version(&self, uri: &str) -> Option<i32> {
        self.files.get(uri).map(|d| d.version)
    }

    /// The parse tree for a document's current text, parsing on first
    /// access.
    pub fn ast(&mut self, uri: &str) -> Result<&File, DocumentError> {
        let opt = self.opt;
        let doc = self
            .files
            .get_mut(uri)
            .ok_or_else(|| DocumentError::NotOpen(uri.to_string()))?;
        let cached = doc.cached.get_or_insert_with(|| parse(&doc.text, &opt));
        match cached {
            Ok(file) => Ok(file),
            Err(err) => Err(DocumentError::Parse(err.clone())),
        }
    }

    /// `(name, kind, location)` triples for the document's top-level
    /// function definitions.
    pub fn document_symbols(&mut self, uri: &str) -> Result<Vec<SymbolInformation>, DocumentError> {
        let uri_owned = uri.to_string();
        let file = self.ast(uri)?;
        Ok(symbols::document_symbols(&uri_owned, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_parse_and_cache() {
        let mut store = DocumentStore::new();
        store.open("file:///a.vim", "let x = 1");
        assert!(store.ast("file:///a.vim").is_ok());
        assert_eq!(store.version("file:///a.vim"), Some(1));
    }

    #[test]
    fn test_parse_error_is_cached_and_returned() {
        let mut store = DocumentStore::new();
        store.open("file:///a.vim", "hoge");
        let err = store.ast("file:///a.vim").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
        // same result on repeated access
        assert!(store.ast("file:///a.vim").is_err());
    }

    #[test]
    fn test_update_invalidates_cache() {
        let mut store = DocumentStore::new();
        store.open("file:///a.vim", "hoge");
        assert!(store.ast("file:///a.vim").is_err());
        store.update("file:///a.vim", "let x = 1");
        assert!(store.ast("file:///a.vim").is_ok());
        assert_eq!(store.version("file:///a.vim"), Some(2));
    }

    #[test]
    fn test_not_open() {
        let mut store = DocumentStore::new();
        let err = store.ast("file:///missing.vim").unwrap_err();
        assert_eq!(err.to_string(), "file:///missing.vim is not open");
    }

    #[test]
    fn test_document_symbols_through_store() {
        let mut store = DocumentStore::new();
        store.open("file:///a.vim", "function! Foo()\nendfunction");
        let syms = store.document_symbols("file:///a.vim").unwrap();
        assert_eq!(syms.len(), 1);
        assert_eq!(syms[0].name, "Foo");
        assert_eq!(syms[0].location.uri, "file:///a.vim");
    }
}
