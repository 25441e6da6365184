//! Structure extraction
//!
//! Each language has its own analyzer producing a language-specific
//! structure. [`analyze`] dispatches on the language and is the only entry
//! point documents need.

pub mod bibtex;
pub mod commands;
pub mod latex;


pub use bibtex::{BibtexStructure, Entry};
pub use latex::{Environment, Include, IncludeKind, LatexStructure, Section};

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Span};
use crate::language::Language;

/// A name together with the byte range it occupies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub span: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Derived structure of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    Latex(LatexStructure),
    Bibtex(BibtexStructure),
}

impl Structure {
    /// Empty structure for a language
    pub fn empty(language: Language) -> Self {
        match language {
            Language::Latex => Structure::Latex(LatexStructure::default()),
            Language::Bibtex => Structure::Bibtex(BibtexStructure::default()),
        }
    }

    /// Problems recorded while analyzing
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Structure::Latex(latex) => &latex.diagnostics,
            Structure::Bibtex(bibtex) => &bibtex.diagnostics,
        }
    }

    pub fn as_latex(&self) -> Option<&LatexStructure> {
        match self {
            Structure::Latex(latex) => Some(latex),
            Structure::Bibtex(_) => None,
        }
    }

    pub fn as_bibtex(&self) -> Option<&BibtexStructure> {
        match self {
            Structure::Bibtex(bibtex) => Some(bibtex),
            Structure::Latex(_) => None,
        }
    }
}

/// Analyze `text` as `language`.
///
/// Never fails; syntax problems end up in [`Structure::diagnostics`].
pub fn analyze(language: Language, text: &str) -> Structure {
    match language {
        Language::Latex => Structure::Latex(latex::analyze(text)),
        Language::Bibtex => Structure::Bibtex(bibtex::analyze(text)),
    }
}
