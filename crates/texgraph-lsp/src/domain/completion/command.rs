//! Command completion
//!
//! Provides completion after a backslash.

use std::sync::Arc;

use texgraph_core::syntax::commands::BUILTIN_COMMANDS;
use tower_lsp::lsp_types::CompletionItemKind;

use super::Candidate;
use crate::document::Document;

/// Command completer
pub struct CommandCompleter;

impl CommandCompleter {
    pub fn new() -> Self {
        Self
    }

    /// Commands defined in the related documents, then the built-in ones
    pub fn complete(&self, related: &[Arc<Document>]) -> Vec<Candidate> {
        let defined = related.iter().flat_map(|document| {
            let definitions = document
                .structure()
                .as_latex()
                .map(|latex| latex.command_definitions.as_slice())
                .unwrap_or_default();
            definitions.iter().map(move |definition| {
                Candidate::new(&definition.name, CompletionItemKind::FUNCTION)
                    .with_detail(document.file_name())
            })
        });

        let builtin = BUILTIN_COMMANDS
            .iter()
            .map(|name| Candidate::new(*name, CompletionItemKind::FUNCTION).with_detail("built-in"));

        defined.chain(builtin).collect()
    }
}
