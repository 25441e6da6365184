//! Environment completion
//!
//! Provides completion for `\begin{...}` and `\end{...}`.

use std::sync::Arc;

use texgraph_core::syntax::commands::BUILTIN_ENVIRONMENTS;
use tower_lsp::lsp_types::CompletionItemKind;

use super::Candidate;
use crate::document::Document;

/// Environment completer
pub struct EnvironmentCompleter;

impl EnvironmentCompleter {
    pub fn new() -> Self {
        Self
    }

    /// Environments used in the related documents, then the built-in ones
    pub fn complete(&self, related: &[Arc<Document>]) -> Vec<Candidate> {
        let used = related.iter().flat_map(|document| {
            let environments = document
                .structure()
                .as_latex()
                .map(|latex| latex.environments.as_slice())
                .unwrap_or_default();
            environments.iter().map(move |env| {
                Candidate::new(&env.name, CompletionItemKind::MODULE)
                    .with_detail(document.file_name())
            })
        });

        let builtin = BUILTIN_ENVIRONMENTS
            .iter()
            .map(|name| Candidate::new(*name, CompletionItemKind::MODULE).with_detail("built-in"));

        used.chain(builtin).collect()
    }
}
