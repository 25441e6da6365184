//! Label completion
//!
//! Provides completion for `\ref{...}` and friends.

use std::sync::Arc;

use texgraph_core::syntax::LatexStructure;
use tower_lsp::lsp_types::CompletionItemKind;

use super::Candidate;
use crate::document::Document;

/// Label completer
pub struct LabelCompleter;

impl LabelCompleter {
    pub fn new() -> Self {
        Self
    }

    /// Every label defined in the related documents.
    ///
    /// The detail is the title of the section the label belongs to, or the
    /// file name when the label precedes every section.
    pub fn complete(&self, related: &[Arc<Document>]) -> Vec<Candidate> {
        related
            .iter()
            .filter_map(|document| {
                let latex = document.structure().as_latex()?;
                Some((document, latex))
            })
            .flat_map(|(document, latex)| {
                latex.label_definitions.iter().map(move |label| {
                    let detail = section_title(latex, label.span.start)
                        .unwrap_or_else(|| document.file_name());
                    Candidate::new(&label.name, CompletionItemKind::REFERENCE).with_detail(detail)
                })
            })
            .collect()
    }
}

/// Title of the last section starting before `offset`
fn section_title(latex: &LatexStructure, offset: usize) -> Option<&str> {
    latex
        .sections
        .iter()
        .take_while(|section| section.span.start <= offset)
        .last()
        .map(|section| section.title.as_str())
}
