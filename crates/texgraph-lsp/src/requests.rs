//! Requests and the query dispatcher
//!
//! A request owns everything its query needs: `Arc` snapshots of the
//! documents involved (or, for links, of the whole workspace). Answering a
//! request never touches the live workspace, so the server can release its
//! lock before computing.

use std::sync::Arc;

use tower_lsp::lsp_types::{
    CompletionItem, Diagnostic, DocumentLink, FoldingRange, Position, Url,
};
use tracing::debug;

use crate::config::Settings;
use crate::document::Document;
use crate::domain::completion::CompletionEngine;
use crate::domain::validation::DiagnosticsEngine;
use crate::error::{Error, Result};
use crate::intelligence::rename::{RenameAnalyzer, RenameResult};
use crate::structural::{FoldingAnalyzer, LinkAnalyzer};
use crate::workspace::Workspace;

/// Completion at a position of the origin document
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub uri: Url,
    /// Origin first, then the documents it relates to
    pub related: Vec<Arc<Document>>,
    pub position: Position,
}

/// Diagnostics of the origin document
#[derive(Debug, Clone)]
pub struct DiagnosticsRequest {
    pub uri: Url,
    pub related: Vec<Arc<Document>>,
}

/// Folding ranges of a single document
#[derive(Debug, Clone)]
pub struct FoldingRequest {
    pub document: Arc<Document>,
}

/// Links of the origin document's includes
#[derive(Debug, Clone)]
pub struct LinkRequest {
    pub workspace: Workspace,
    pub uri: Url,
}

/// Rename of the symbol at a position
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub uri: Url,
    pub related: Vec<Arc<Document>>,
    pub position: Position,
    pub new_name: String,
}

/// The closed set of queries
#[derive(Debug, Clone)]
pub enum Request {
    Completion(CompletionRequest),
    Diagnostics(DiagnosticsRequest),
    Folding(FoldingRequest),
    Link(LinkRequest),
    Rename(RenameRequest),
}

/// Result of a query, mirroring [`Request`]
#[derive(Debug, Clone)]
pub enum Response {
    Completion(Vec<CompletionItem>),
    Diagnostics(Vec<Diagnostic>),
    Folding(Vec<FoldingRange>),
    Link(Vec<DocumentLink>),
    Rename(RenameResult),
}

impl Request {
    /// URI of the document the request is about
    pub fn uri(&self) -> &Url {
        match self {
            Request::Completion(request) => &request.uri,
            Request::Diagnostics(request) => &request.uri,
            Request::Folding(request) => request.document.uri(),
            Request::Link(request) => &request.uri,
            Request::Rename(request) => &request.uri,
        }
    }
}

/// Answer a request.
///
/// Pure with respect to the request: nothing is mutated and the same
/// request always yields the same response.
pub fn dispatch(request: Request, settings: &Settings) -> Result<Response> {
    debug!("Dispatching request for {}", request.uri());

    match request {
        Request::Completion(request) => {
            let origin = origin(&request.uri, &request.related)?;
            let engine = CompletionEngine::new(settings.completion.matcher);
            let items = engine.get_completions(origin, &request.related, request.position);
            Ok(Response::Completion(items))
        }
        Request::Diagnostics(request) => {
            let origin = origin(&request.uri, &request.related)?;
            let engine = DiagnosticsEngine::new(&settings.diagnostics);
            Ok(Response::Diagnostics(
                engine.collect(origin, &request.related),
            ))
        }
        Request::Folding(request) => Ok(Response::Folding(FoldingAnalyzer::generate_ranges(
            &request.document,
        ))),
        Request::Link(request) => {
            let document = request
                .workspace
                .get(&request.uri)
                .ok_or_else(|| Error::DocumentNotFound(request.uri.clone()))?;
            Ok(Response::Link(LinkAnalyzer::generate_links(
                &request.workspace,
                &document,
            )))
        }
        Request::Rename(request) => {
            let origin = origin(&request.uri, &request.related)?;
            let analyzer = RenameAnalyzer::new(origin, &request.related);
            let result = analyzer.rename_at_position(request.position, &request.new_name)?;
            Ok(Response::Rename(result))
        }
    }
}

/// The document of `uri` among the related documents
pub(crate) fn origin<'a>(uri: &Url, related: &'a [Arc<Document>]) -> Result<&'a Document> {
    related
        .iter()
        .find(|document| document.uri() == uri)
        .map(|document| document.as_ref())
        .ok_or_else(|| Error::DocumentNotFound(uri.clone()))
}
