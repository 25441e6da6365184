//! texgraph-core - structure extraction for LaTeX and BibTeX sources
//!
//! This crate turns document text into a [`Structure`]: the includes,
//! labels, references, citations, sections, environments and bibliography
//! entries a language server needs to answer cross-document queries.
//!
//! Analysis is total. Malformed input never produces an `Err`; problems are
//! recorded as [`Diagnostic`]s on the structure instead.
//!
//! # Example
//!
//! ```
//! use texgraph_core::{analyze, Language};
//!
//! let structure = analyze(Language::Latex, "\\include{chapter1}\n\\label{sec:intro}");
//! let latex = structure.as_latex().unwrap();
//!
//! assert_eq!(latex.includes[0].path, "chapter1");
//! assert_eq!(latex.label_definitions[0].name, "sec:intro");
//! ```

pub mod diagnostics;
pub mod error;
pub mod language;
pub mod line_index;
pub mod syntax;

pub use diagnostics::{Diagnostic, Severity, Span};
pub use error::{Error, Result};
pub use language::Language;
pub use line_index::{LineCol, LineIndex};
pub use syntax::{analyze, Structure};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
