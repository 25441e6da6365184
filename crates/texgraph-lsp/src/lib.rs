//! texgraph Language Server Protocol implementation
//!
//! This library provides LSP support for LaTeX and BibTeX projects,
//! answering queries over a document and everything it includes:
//! - Completion for labels, citations, environments, includes and commands
//! - Diagnostics from analysis plus cross-document label and citation checks
//! - Folding ranges for sections, environments and bibliography entries
//! - Document links for includes
//! - Rename refactoring for labels and citation keys
//!
//! # Library Usage
//!
//! ```
//! use texgraph_lsp::{dispatch, Document, Request, Response, Workspace};
//! use texgraph_lsp::config::Settings;
//! use tower_lsp::lsp_types::{Position, Url};
//!
//! let main = Url::parse("file:///project/main.tex").unwrap();
//! let chapter = Url::parse("file:///project/chapter1.tex").unwrap();
//!
//! let mut workspace = Workspace::new();
//! workspace.add(Document::open(main.clone(), "\\include{chapter1}\n\\ref{}").unwrap());
//! workspace.add(Document::open(chapter, "\\label{sec:intro}").unwrap());
//!
//! let request = workspace.completion(&main, Position::new(1, 5)).unwrap();
//! let Response::Completion(items) =
//!     dispatch(Request::Completion(request), &Settings::default()).unwrap()
//! else {
//!     unreachable!()
//! };
//! assert_eq!(items[0].label, "sec:intro");
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Start the language server (typically called by an editor)
//! texgraph-lsp
//!
//! # With debug logging
//! RUST_LOG=debug texgraph-lsp
//! ```

pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod intelligence;
pub mod requests;
pub mod server;
pub mod structural;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main entry point
pub use server::run_server;

// Re-export commonly used types
pub use document::Document;
pub use error::{Error, Result};
pub use intelligence::RenameResult;
pub use requests::{
    dispatch, CompletionRequest, DiagnosticsRequest, FoldingRequest, LinkRequest, RenameRequest,
    Request, Response,
};
pub use workspace::{Workspace, WorkspaceOptions};
