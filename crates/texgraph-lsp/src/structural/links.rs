//! Document links for includes

use tower_lsp::lsp_types::DocumentLink;

use crate::document::Document;
use crate::workspace::graph;
use crate::workspace::Workspace;

/// Analyzer for generating document links
pub struct LinkAnalyzer;

impl LinkAnalyzer {
    /// One link per include of `document`, in source order.
    ///
    /// The link covers the path as written. Its target is the resolved
    /// document, or `None` when no document in the workspace matches.
    pub fn generate_links(workspace: &Workspace, document: &Document) -> Vec<DocumentLink> {
        let Some(latex) = document.structure().as_latex() else {
            return Vec::new();
        };

        latex
            .includes
            .iter()
            .map(|include| DocumentLink {
                range: document.range(include.span),
                target: graph::resolve_include(workspace, document.uri(), include),
                tooltip: None,
                data: None,
            })
            .collect()
    }
}
