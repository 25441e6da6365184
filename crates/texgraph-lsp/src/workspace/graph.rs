//! Include graph
//!
//! Edges are not stored. They are derived on demand from the includes of
//! each document, resolved against the documents currently in the
//! workspace, so the graph can never disagree with the structures.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use texgraph_core::syntax::Include;
use tower_lsp::lsp_types::Url;

use super::Workspace;
use crate::document::Document;

/// Resolve an include to the URI of a document in the workspace.
///
/// The path is tried relative to the including document, first with the
/// extension implied by the include kind and then as written. When the
/// workspace has a root directory the same candidates are tried against it.
pub fn resolve_include(workspace: &Workspace, base: &Url, include: &Include) -> Option<Url> {
    let mut bases = vec![base.clone()];
    if let Some(root) = &workspace.options().root_dir {
        bases.push(directory(root));
    }

    bases
        .iter()
        .flat_map(|base| candidates(base, include))
        .find(|candidate| workspace.contains(candidate))
}

fn candidates(base: &Url, include: &Include) -> Vec<Url> {
    let with_extension = format!("{}.{}", include.path, include.kind.extension());
    [with_extension.as_str(), include.path.as_str()]
        .into_iter()
        .filter_map(|path| base.join(path).ok())
        .collect()
}

/// The URL with a trailing slash, so that joins resolve inside it
pub fn directory(url: &Url) -> Url {
    if url.path().ends_with('/') {
        return url.clone();
    }
    let mut directory = url.clone();
    directory.set_path(&format!("{}/", url.path()));
    directory
}

/// Resolved include targets of a document in reference order
pub fn targets(workspace: &Workspace, document: &Document) -> Vec<Url> {
    let Some(latex) = document.structure().as_latex() else {
        return Vec::new();
    };

    latex
        .includes
        .iter()
        .filter_map(|include| resolve_include(workspace, document.uri(), include))
        .collect()
}

/// Depth-first preorder over the include graph starting at `origin`.
///
/// Neighbors are visited in reference order. With `undirected` set, the
/// documents including a node are its neighbors too, after its own
/// targets and in workspace order.
pub fn traverse(workspace: &Workspace, origin: &Url, undirected: bool) -> Vec<Arc<Document>> {
    let parents = undirected.then(|| including_documents(workspace));

    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![origin.clone()];

    while let Some(uri) = stack.pop() {
        if !visited.insert(uri.clone()) {
            continue;
        }
        let Some(document) = workspace.get(&uri) else {
            continue;
        };

        let mut neighbors = targets(workspace, &document);
        if let Some(including) = parents.as_ref().and_then(|parents| parents.get(&uri)) {
            for parent in including {
                if !neighbors.contains(parent) {
                    neighbors.push(parent.clone());
                }
            }
        }
        order.push(document);

        stack.extend(
            neighbors
                .into_iter()
                .rev()
                .filter(|neighbor| !visited.contains(neighbor)),
        );
    }

    order
}

/// Documents including each document, in workspace order
fn including_documents(workspace: &Workspace) -> IndexMap<Url, Vec<Url>> {
    let mut parents: IndexMap<Url, Vec<Url>> = IndexMap::new();
    for document in workspace.iter() {
        for target in targets(workspace, document) {
            let including = parents.entry(target).or_default();
            if !including.contains(document.uri()) {
                including.push(document.uri().clone());
            }
        }
    }
    parents
}
