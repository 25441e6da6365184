//! tower-lsp backend
//!
//! Keeps the workspace behind an async read-write lock. Handlers hold the
//! lock only while building a request; the query itself runs on the
//! request's snapshot.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc;
use tower_lsp::lsp_types::{
    CompletionOptions, CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DocumentLink, DocumentLinkOptions,
    DocumentLinkParams, FoldingRange, FoldingRangeParams, FoldingRangeProviderCapability,
    InitializeParams, InitializeResult, InitializedParams, MessageType, OneOf,
    PrepareRenameResponse, RenameOptions, RenameParams, ServerCapabilities, ServerInfo,
    TextDocumentPositionParams, TextDocumentSyncCapability, TextDocumentSyncKind, Url,
    WorkDoneProgressOptions, WorkspaceEdit,
};
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info, warn};

use crate::config::{Settings, CONFIG_FILE};
use crate::document::Document;
use crate::error::Error;
use crate::requests::{dispatch, Request, Response};
use crate::workspace::{Workspace, WorkspaceOptions};

/// LSP Backend state
struct Backend {
    /// LSP client for sending notifications
    client: Client,
    /// Open documents and their relationships
    workspace: Arc<RwLock<Workspace>>,
    /// Settings from `texgraph.toml` and initialization options
    settings: Arc<RwLock<Settings>>,
}

impl Backend {
    /// Create a new backend instance
    fn new(client: Client) -> Self {
        Self {
            client,
            workspace: Arc::new(RwLock::new(Workspace::new())),
            settings: Arc::new(RwLock::new(Settings::default())),
        }
    }

    /// Store new text for a document, creating it on first sight
    async fn update_document(&self, uri: Url, text: String) {
        let mut workspace = self.workspace.write().await;
        let document = match workspace.get(&uri) {
            Some(existing) => {
                let mut document = Document::clone(&existing);
                document.set_text(text);
                document
            }
            None => match Document::open(uri.clone(), text) {
                Ok(document) => document,
                Err(e) => {
                    warn!("Ignoring document {}: {}", uri, e);
                    return;
                }
            },
        };
        workspace.add(document);
    }

    /// Publish diagnostics for `changed` and every document relating to it
    async fn publish_diagnostics(&self, changed: &Url) {
        let requests: Vec<_> = {
            let workspace = self.workspace.read().await;
            workspace
                .dependents(changed)
                .iter()
                .filter_map(|uri| workspace.diagnostics(uri).ok())
                .collect()
        };
        let settings = self.settings.read().await.clone();

        for request in requests {
            let uri = request.uri.clone();
            match dispatch(Request::Diagnostics(request), &settings) {
                Ok(Response::Diagnostics(diagnostics)) => {
                    debug!("Publishing {} diagnostics for {}", diagnostics.len(), uri);
                    self.client
                        .publish_diagnostics(uri, diagnostics, None)
                        .await;
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to compute diagnostics for {}: {}", uri, e),
            }
        }
    }

    /// Build a request from the current workspace and answer it
    async fn query(
        &self,
        build: impl FnOnce(&Workspace) -> crate::Result<Request>,
    ) -> crate::Result<Response> {
        let request = {
            let workspace = self.workspace.read().await;
            build(&workspace)?
        };
        let settings = self.settings.read().await.clone();
        dispatch(request, &settings)
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!("texgraph LSP server initializing");

        let root = root_uri(&params);
        let root_path = root.as_ref().and_then(|uri| uri.to_file_path().ok());
        match load_settings(root_path.as_deref(), params.initialization_options.clone()) {
            Ok(settings) => {
                let options = WorkspaceOptions::from_settings(&settings, root.as_ref());
                debug!("Workspace options: {:?}", options);
                self.workspace.write().await.set_options(options);
                *self.settings.write().await = settings;
            }
            Err(e) => warn!("Using default settings: {:#}", e),
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                })),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![
                        "\\".to_string(), // For commands
                        "{".to_string(),  // For key groups
                        ",".to_string(),  // For key lists
                    ]),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                    ..Default::default()
                }),
                document_link_provider: Some(DocumentLinkOptions {
                    resolve_provider: Some(false),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "texgraph-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("texgraph LSP server initialized");
        self.client
            .log_message(MessageType::INFO, "texgraph language server ready")
            .await;
    }

    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("texgraph LSP server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        debug!("Document opened: {}", params.text_document.uri);
        let uri = params.text_document.uri;
        self.update_document(uri.clone(), params.text_document.text)
            .await;
        self.publish_diagnostics(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        debug!("Document changed: {}", params.text_document.uri);
        // Since we use FULL sync, the entire content is in the last change
        if let Some(change) = params.content_changes.into_iter().last() {
            let uri = params.text_document.uri;
            self.update_document(uri.clone(), change.text).await;
            self.publish_diagnostics(&uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        debug!("Document closed: {}", params.text_document.uri);
        let uri = params.text_document.uri;
        let dependents = self.workspace.read().await.dependents(&uri);
        self.workspace.write().await.remove(&uri);

        // Clear diagnostics for the closed document, refresh the rest
        self.client.publish_diagnostics(uri.clone(), vec![], None).await;
        for dependent in dependents.iter().filter(|dependent| **dependent != uri) {
            self.publish_diagnostics(dependent).await;
        }
    }

    async fn folding_range(
        &self,
        params: FoldingRangeParams,
    ) -> jsonrpc::Result<Option<Vec<FoldingRange>>> {
        let uri = params.text_document.uri;
        debug!("Folding range request for: {}", uri);

        match self
            .query(|workspace| workspace.folding(&uri).map(Request::Folding))
            .await
        {
            Ok(Response::Folding(ranges)) => {
                debug!("Generated {} folding ranges for {}", ranges.len(), uri);
                Ok(Some(ranges))
            }
            Ok(_) => Ok(None),
            Err(e) => not_found_as_none(e),
        }
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> jsonrpc::Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!("Completion request for: {}", uri);

        match self
            .query(|workspace| {
                workspace
                    .completion(&uri, position)
                    .map(Request::Completion)
            })
            .await
        {
            Ok(Response::Completion(items)) if !items.is_empty() => {
                debug!("Generated {} completions for {}", items.len(), uri);
                Ok(Some(CompletionResponse::Array(items)))
            }
            Ok(_) => Ok(None),
            Err(e) => not_found_as_none(e),
        }
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> jsonrpc::Result<Option<PrepareRenameResponse>> {
        let uri = params.text_document.uri;
        debug!("Prepare rename request for: {}", uri);

        let prepared = self
            .workspace
            .read()
            .await
            .prepare_rename(&uri, params.position);
        match prepared {
            Ok(prepared) => Ok(Some(PrepareRenameResponse::RangeWithPlaceholder {
                range: prepared.range,
                placeholder: prepared.placeholder,
            })),
            Err(Error::SymbolNotFound { .. }) => Ok(None),
            Err(e) => not_found_as_none(e),
        }
    }

    async fn rename(&self, params: RenameParams) -> jsonrpc::Result<Option<WorkspaceEdit>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!("Rename request for: {}", uri);

        match self
            .query(|workspace| {
                workspace
                    .rename(&uri, position, params.new_name)
                    .map(Request::Rename)
            })
            .await
        {
            Ok(Response::Rename(result)) => {
                debug!(
                    "Renamed '{}' to '{}' with {} edits",
                    result.old_name,
                    result.new_name,
                    result.edit_count()
                );
                Ok(Some(result.into_workspace_edit()))
            }
            Ok(_) => Ok(None),
            Err(e) => not_found_as_none(e),
        }
    }

    async fn document_link(
        &self,
        params: DocumentLinkParams,
    ) -> jsonrpc::Result<Option<Vec<DocumentLink>>> {
        let uri = params.text_document.uri;
        debug!("Document link request for: {}", uri);

        match self
            .query(|workspace| workspace.link(&uri).map(Request::Link))
            .await
        {
            Ok(Response::Link(links)) => {
                debug!("Generated {} document links for {}", links.len(), uri);
                Ok(Some(links))
            }
            Ok(_) => Ok(None),
            Err(e) => not_found_as_none(e),
        }
    }
}

/// Unknown documents yield no result; other errors go back to the client
fn not_found_as_none<T>(error: Error) -> jsonrpc::Result<Option<T>> {
    match error {
        Error::DocumentNotFound(uri) => {
            warn!("Document not found: {}", uri);
            Ok(None)
        }
        other => Err(to_rpc_error(other)),
    }
}

/// Map a workspace error to a JSON-RPC error
fn to_rpc_error(error: Error) -> jsonrpc::Error {
    match error {
        Error::SymbolNotFound { .. } | Error::AmbiguousSymbol { .. } | Error::InvalidName(_) => {
            jsonrpc::Error::invalid_params(error.to_string())
        }
        other => jsonrpc::Error {
            code: jsonrpc::ErrorCode::InternalError,
            message: other.to_string().into(),
            data: None,
        },
    }
}

/// Workspace root announced by the client
#[allow(deprecated)]
fn root_uri(params: &InitializeParams) -> Option<Url> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| folder.uri.clone())
        .or_else(|| params.root_uri.clone())
}

/// Load settings from `texgraph.toml` in `root`, then let initialization
/// options replace them
fn load_settings(root: Option<&Path>, options: Option<Value>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(path) = root.map(|root| root.join(CONFIG_FILE)) {
        if path.is_file() {
            settings = Settings::from_file(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
        }
    }

    if let Some(options) = options.filter(|options| !options.is_null()) {
        settings = Settings::from_json(options).context("Invalid initialization options")?;
    }

    Ok(settings)
}

/// Run the language server over stdio
pub async fn run_server() {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting texgraph Language Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
