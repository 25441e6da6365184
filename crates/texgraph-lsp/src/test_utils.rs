//! Workspace fixture for tests
//!
//! Documents are created from `(path, text)` pairs under
//! `file:///workspace/` and requests are built by path.

use tower_lsp::lsp_types::{Position, Url};

use crate::config::Settings;
use crate::document::Document;
use crate::requests::{
    dispatch, CompletionRequest, DiagnosticsRequest, FoldingRequest, LinkRequest, RenameRequest,
    Request, Response,
};
use crate::workspace::{Workspace, WorkspaceOptions};

pub struct WorkspaceBuilder {
    pub workspace: Workspace,
    pub settings: Settings,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            settings: Settings::default(),
        }
    }

    pub fn with_options(options: WorkspaceOptions) -> Self {
        Self {
            workspace: Workspace::with_options(options),
            settings: Settings::default(),
        }
    }

    /// URI of a path inside the fixture root
    pub fn uri(path: &str) -> Url {
        Url::parse("file:///workspace/").unwrap().join(path).unwrap()
    }

    /// Add a document; the language comes from the extension
    pub fn document(&mut self, path: &str, text: &str) -> &mut Self {
        let document = Document::open(Self::uri(path), text).unwrap();
        self.workspace.add(document);
        self
    }

    pub fn completion(&self, path: &str, line: u32, character: u32) -> CompletionRequest {
        self.workspace
            .completion(&Self::uri(path), Position::new(line, character))
            .unwrap()
    }

    pub fn diagnostics(&self, path: &str) -> DiagnosticsRequest {
        self.workspace.diagnostics(&Self::uri(path)).unwrap()
    }

    pub fn folding(&self, path: &str) -> FoldingRequest {
        self.workspace.folding(&Self::uri(path)).unwrap()
    }

    pub fn link(&self, path: &str) -> LinkRequest {
        self.workspace.link(&Self::uri(path)).unwrap()
    }

    pub fn rename(&self, path: &str, line: u32, character: u32, new_name: &str) -> RenameRequest {
        self.workspace
            .rename(&Self::uri(path), Position::new(line, character), new_name)
            .unwrap()
    }

    /// Dispatch a request with the fixture settings
    pub fn run(&self, request: Request) -> crate::Result<Response> {
        dispatch(request, &self.settings)
    }
}
