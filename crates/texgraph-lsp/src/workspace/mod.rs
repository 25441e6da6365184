//! Workspace
//!
//! The set of open documents and the relationships between them.
//!
//! # Components
//!
//! - `Workspace`: insertion-ordered document store and request builder
//! - `graph`: include resolution and traversal of the include graph

pub mod graph;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use indexmap::IndexMap;
use tower_lsp::lsp_types::{Position, Url};
use tracing::debug;

use crate::config::Settings;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::intelligence::rename::{PrepareRename, RenameAnalyzer};
use crate::requests::{
    self, CompletionRequest, DiagnosticsRequest, FoldingRequest, LinkRequest, RenameRequest,
};

/// Options affecting how documents relate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceOptions {
    /// Alternate base directory for include resolution
    pub root_dir: Option<Url>,
    /// Use the undirected include graph for related documents
    pub follow_parents: bool,
}

impl WorkspaceOptions {
    /// Options from settings; a relative `root_dir` is joined onto `root`
    pub fn from_settings(settings: &Settings, root: Option<&Url>) -> Self {
        let root_dir = settings.workspace.root_dir.as_deref().and_then(|dir| {
            Url::parse(dir)
                .ok()
                .or_else(|| Url::from_directory_path(dir).ok())
                .or_else(|| root.and_then(|root| graph::directory(root).join(dir).ok()))
        });

        Self {
            root_dir,
            follow_parents: settings.workspace.follow_parents,
        }
    }
}

/// Owning collection of analyzed documents.
///
/// Cloning is cheap enough to serve as a snapshot: documents are shared
/// behind `Arc` and never mutated once inserted.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    documents: IndexMap<Url, Arc<Document>>,
    options: WorkspaceOptions,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WorkspaceOptions) -> Self {
        Self {
            documents: IndexMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: WorkspaceOptions) {
        self.options = options;
    }

    /// Insert a document, replacing any document with the same URI.
    ///
    /// A stale document is analyzed first. A replaced document keeps its
    /// position in the insertion order.
    pub fn add(&mut self, mut document: Document) -> Arc<Document> {
        if document.is_stale() {
            debug!("Analyzing stale document before insertion: {}", document.uri());
            document.analyze();
        }

        let document = Arc::new(document);
        let replaced = self
            .documents
            .insert(document.uri().clone(), Arc::clone(&document))
            .is_some();
        debug!(
            "{} document {} ({} documents)",
            if replaced { "Updated" } else { "Added" },
            document.uri(),
            self.documents.len()
        );
        document
    }

    /// Remove a document, keeping the order of the others
    pub fn remove(&mut self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.shift_remove(uri)
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.get(uri).cloned()
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    /// Documents in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The origin followed by every document reachable through includes.
    ///
    /// Depth-first in reference order of first discovery. Includes that
    /// resolve to no document in the workspace are skipped.
    pub fn related_documents(&self, uri: &Url) -> Result<Vec<Arc<Document>>> {
        self.ensure(uri)?;
        Ok(graph::traverse(self, uri, false))
    }

    /// Like [`related_documents`](Self::related_documents) but also
    /// following includes backwards, so a chapter sees its parent and
    /// siblings.
    pub fn project_documents(&self, uri: &Url) -> Result<Vec<Arc<Document>>> {
        self.ensure(uri)?;
        Ok(graph::traverse(self, uri, true))
    }

    /// Documents a query on `uri` considers, per the workspace options
    pub fn scope(&self, uri: &Url) -> Result<Vec<Arc<Document>>> {
        if self.options.follow_parents {
            self.project_documents(uri)
        } else {
            self.related_documents(uri)
        }
    }

    fn ensure(&self, uri: &Url) -> Result<()> {
        if self.contains(uri) {
            Ok(())
        } else {
            Err(Error::DocumentNotFound(uri.clone()))
        }
    }

    pub fn completion(&self, uri: &Url, position: Position) -> Result<CompletionRequest> {
        Ok(CompletionRequest {
            uri: uri.clone(),
            related: self.scope(uri)?,
            position,
        })
    }

    pub fn diagnostics(&self, uri: &Url) -> Result<DiagnosticsRequest> {
        Ok(DiagnosticsRequest {
            uri: uri.clone(),
            related: self.scope(uri)?,
        })
    }

    pub fn folding(&self, uri: &Url) -> Result<FoldingRequest> {
        let document = self
            .get(uri)
            .ok_or_else(|| Error::DocumentNotFound(uri.clone()))?;
        Ok(FoldingRequest { document })
    }

    pub fn link(&self, uri: &Url) -> Result<LinkRequest> {
        self.ensure(uri)?;
        Ok(LinkRequest {
            workspace: self.clone(),
            uri: uri.clone(),
        })
    }

    pub fn rename(
        &self,
        uri: &Url,
        position: Position,
        new_name: impl Into<String>,
    ) -> Result<RenameRequest> {
        Ok(RenameRequest {
            uri: uri.clone(),
            related: self.scope(uri)?,
            position,
            new_name: new_name.into(),
        })
    }

    /// Range and current name of the renamable symbol at a position
    pub fn prepare_rename(&self, uri: &Url, position: Position) -> Result<PrepareRename> {
        let related = self.scope(uri)?;
        let origin = requests::origin(uri, &related)?;
        RenameAnalyzer::new(origin, &related).prepare(position)
    }

    /// Documents whose query scope includes `uri`, in workspace order.
    ///
    /// These are the documents whose diagnostics may change when `uri`
    /// changes.
    pub fn dependents(&self, uri: &Url) -> Vec<Url> {
        self.iter()
            .map(|document| document.uri())
            .filter(|candidate| {
                *candidate == uri
                    || self
                        .scope(candidate)
                        .is_ok_and(|scope| scope.iter().any(|doc| doc.uri() == uri))
            })
            .cloned()
            .collect()
    }
}
