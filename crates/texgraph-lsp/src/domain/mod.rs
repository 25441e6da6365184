//! Domain features spanning related documents
//!
//! - `completion`: context-aware completion from the related documents
//! - `validation`: analysis diagnostics plus cross-document rules

pub mod completion;
pub mod validation;

pub use completion::CompletionEngine;
pub use validation::DiagnosticsEngine;
