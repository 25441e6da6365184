//! Citation completion
//!
//! Provides completion for `\cite{...}` keys from related bibliographies.

use std::sync::Arc;

use tower_lsp::lsp_types::CompletionItemKind;

use super::Candidate;
use crate::document::Document;

/// Citation key completer
pub struct CitationCompleter;

impl CitationCompleter {
    pub fn new() -> Self {
        Self
    }

    /// Every entry key of the related BibTeX documents, with the entry
    /// title as detail when present
    pub fn complete(&self, related: &[Arc<Document>]) -> Vec<Candidate> {
        related
            .iter()
            .filter_map(|document| document.structure().as_bibtex())
            .flat_map(|bibtex| bibtex.entries.iter())
            .filter_map(|entry| {
                let key = entry.key.as_ref()?;
                let candidate = Candidate::new(&key.name, CompletionItemKind::VALUE);
                Some(match &entry.title {
                    Some(title) => candidate.with_detail(format!("@{}: {}", entry.kind, title)),
                    None => candidate.with_detail(format!("@{}", entry.kind)),
                })
            })
            .collect()
    }
}
