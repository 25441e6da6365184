//! Language classification by file extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Languages understood by the analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// LaTeX sources, packages and classes
    Latex,
    /// BibTeX bibliographies
    Bibtex,
}

impl Language {
    /// Map a file extension (without the dot) to a language.
    ///
    /// The lookup is case-insensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "tex" | "sty" | "cls" | "def" | "lco" | "ltx" | "dtx" => Some(Language::Latex),
            "bib" => Some(Language::Bibtex),
            _ => None,
        }
    }

    /// Classify a path, failing for unknown extensions.
    pub fn from_path(path: &str) -> Result<Self> {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| Error::UnsupportedLanguage {
                path: path.to_string(),
            })
    }

    /// Identifier used by editors for this language
    pub fn id(self) -> &'static str {
        match self {
            Language::Latex => "latex",
            Language::Bibtex => "bibtex",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
