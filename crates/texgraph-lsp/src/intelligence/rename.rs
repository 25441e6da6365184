//! Rename refactoring across related documents
//!
//! Provides safe renaming of:
//! - Labels: `\label{name}` and every `\ref`-family reference
//! - Citation keys: `@type{key,` entries and every `\cite`-family citation
//!
//! A rename either produces the complete edit set or fails; there are no
//! partial results.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use texgraph_core::syntax::Symbol;
use texgraph_core::{Span, Structure};
use tower_lsp::lsp_types::{Position, Range, TextEdit, Url, WorkspaceEdit};

use crate::document::Document;
use crate::error::{Error, Result};

/// Result of a rename operation
#[derive(Debug, Clone, PartialEq)]
pub struct RenameResult {
    /// Edits per document, in related-document order
    pub changes: IndexMap<Url, Vec<TextEdit>>,
    pub old_name: String,
    pub new_name: String,
}

impl RenameResult {
    /// Total number of edits over all documents
    pub fn edit_count(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }

    pub fn into_workspace_edit(self) -> WorkspaceEdit {
        let changes: HashMap<Url, Vec<TextEdit>> = self.changes.into_iter().collect();
        WorkspaceEdit {
            changes: Some(changes),
            document_changes: None,
            change_annotations: None,
        }
    }
}

/// The symbol a rename at a position would affect
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareRename {
    pub range: Range,
    pub placeholder: String,
}

/// Type of renameable target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameTargetType {
    Label,
    Citation,
}

/// Analyzer for rename refactoring
pub struct RenameAnalyzer<'a> {
    origin: &'a Document,
    related: &'a [Arc<Document>],
}

impl<'a> RenameAnalyzer<'a> {
    /// Create a new rename analyzer over the origin and its related documents
    pub fn new(origin: &'a Document, related: &'a [Arc<Document>]) -> Self {
        Self { origin, related }
    }

    /// Check if rename is available at position (for prepareRename)
    pub fn prepare(&self, position: Position) -> Result<PrepareRename> {
        let (symbol, _) = self.find_rename_target(position)?;
        Ok(PrepareRename {
            range: self.origin.range(symbol.span),
            placeholder: symbol.name,
        })
    }

    /// Rename the symbol at position in every related document
    pub fn rename_at_position(&self, position: Position, new_name: &str) -> Result<RenameResult> {
        let (symbol, target_type) = self.find_rename_target(position)?;
        validate_name(new_name)?;

        let definitions = self.count_definitions(&symbol.name, target_type);
        if definitions > 1 {
            return Err(Error::AmbiguousSymbol {
                name: symbol.name,
                definitions,
            });
        }

        let mut changes = IndexMap::new();
        for document in self.related {
            let mut spans = occurrences(document, &symbol.name, target_type);
            if spans.is_empty() {
                continue;
            }
            spans.sort_by_key(|span| span.start);

            let edits = spans
                .into_iter()
                .map(|span| TextEdit {
                    range: document.range(span),
                    new_text: new_name.to_string(),
                })
                .collect();
            changes.insert(document.uri().clone(), edits);
        }

        Ok(RenameResult {
            changes,
            old_name: symbol.name,
            new_name: new_name.to_string(),
        })
    }

    /// Find the label or citation key under the cursor
    fn find_rename_target(&self, position: Position) -> Result<(Symbol, RenameTargetType)> {
        let not_found = || Error::SymbolNotFound { position };
        let offset = self.origin.offset_at(position).ok_or_else(not_found)?;
        let at = |symbols: &[Symbol]| symbols.iter().find(|s| s.span.touches(offset)).cloned();

        let found = match self.origin.structure() {
            Structure::Latex(latex) => at(&latex.label_definitions)
                .or_else(|| at(&latex.label_references))
                .map(|symbol| (symbol, RenameTargetType::Label))
                .or_else(|| {
                    at(&latex.citations).map(|symbol| (symbol, RenameTargetType::Citation))
                }),
            Structure::Bibtex(bibtex) => bibtex
                .keys()
                .find(|key| key.span.touches(offset))
                .cloned()
                .map(|symbol| (symbol, RenameTargetType::Citation)),
        };

        found.ok_or_else(not_found)
    }

    fn count_definitions(&self, name: &str, target_type: RenameTargetType) -> usize {
        self.related
            .iter()
            .map(|document| match (document.structure(), target_type) {
                (Structure::Latex(latex), RenameTargetType::Label) => latex
                    .label_definitions
                    .iter()
                    .filter(|label| label.name == name)
                    .count(),
                (Structure::Bibtex(bibtex), RenameTargetType::Citation) => {
                    bibtex.keys().filter(|key| key.name == name).count()
                }
                _ => 0,
            })
            .sum()
    }
}

/// Spans of every occurrence of `name` in one document
fn occurrences(document: &Document, name: &str, target_type: RenameTargetType) -> Vec<Span> {
    let named = |symbol: &&Symbol| symbol.name == name;

    match (document.structure(), target_type) {
        (Structure::Latex(latex), RenameTargetType::Label) => latex
            .label_definitions
            .iter()
            .chain(&latex.label_references)
            .filter(named)
            .map(|symbol| symbol.span)
            .collect(),
        (Structure::Latex(latex), RenameTargetType::Citation) => latex
            .citations
            .iter()
            .filter(named)
            .map(|symbol| symbol.span)
            .collect(),
        (Structure::Bibtex(bibtex), RenameTargetType::Citation) => {
            bibtex.keys().filter(named).map(|symbol| symbol.span).collect()
        }
        (Structure::Bibtex(_), RenameTargetType::Label) => Vec::new(),
    }
}

/// Reject names that would break the key group they are written into
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | ',' | '%' | '\\'));

    if invalid {
        Err(Error::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
