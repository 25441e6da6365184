//! Error types for workspace queries.

use thiserror::Error;
use tower_lsp::lsp_types::{Position, Url};

/// Result type for workspace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or answering a request
#[derive(Debug, Error)]
pub enum Error {
    /// Language could not be determined from the document path
    #[error(transparent)]
    Core(#[from] texgraph_core::Error),

    /// No document with this URI is in the workspace
    #[error("Document not found: {0}")]
    DocumentNotFound(Url),

    /// Nothing renamable at the requested position
    #[error(
        "No renamable symbol at line {}, character {}",
        .position.line,
        .position.character
    )]
    SymbolNotFound { position: Position },

    /// The symbol has more than one definition
    #[error("'{name}' is defined {definitions} times")]
    AmbiguousSymbol { name: String, definitions: usize },

    /// The new name cannot be written into a key group
    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
