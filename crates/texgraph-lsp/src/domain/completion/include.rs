//! Include path completion
//!
//! Provides completion for `\input{...}`, `\include{...}` and
//! `\bibliography{...}` paths.

use std::sync::Arc;

use texgraph_core::syntax::IncludeKind;
use texgraph_core::Language;
use tower_lsp::lsp_types::CompletionItemKind;

use super::Candidate;
use crate::document::Document;

/// Include path completer
pub struct IncludeCompleter;

impl IncludeCompleter {
    pub fn new() -> Self {
        Self
    }

    /// Paths of related documents of the kind the command includes,
    /// relative to the origin and without the implied extension
    pub fn complete(
        &self,
        origin: &Document,
        related: &[Arc<Document>],
        kind: IncludeKind,
    ) -> Vec<Candidate> {
        let language = match kind {
            IncludeKind::Bibliography => Language::Bibtex,
            _ => Language::Latex,
        };
        let extension = format!(".{}", kind.extension());

        related
            .iter()
            .filter(|document| document.uri() != origin.uri())
            .filter(|document| document.language() == language)
            .filter_map(|document| {
                let relative = origin.uri().make_relative(document.uri())?;
                let path = relative
                    .strip_suffix(extension.as_str())
                    .unwrap_or(&relative)
                    .to_string();
                Some(Candidate::new(path, CompletionItemKind::FILE).with_detail(relative))
            })
            .collect()
    }
}
