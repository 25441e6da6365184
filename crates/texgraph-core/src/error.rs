//! Error types for document analysis

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before analysis can start.
///
/// Analysis itself never fails; see [`crate::diagnostics`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The file type has no known language
    #[error("Unsupported language for '{path}'")]
    UnsupportedLanguage { path: String },
}
