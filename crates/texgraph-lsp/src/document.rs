//! A single source file and its derived structure.

use texgraph_core::{analyze, Language, LineCol, LineIndex, Span, Structure};
use tower_lsp::lsp_types::{Position, Range, Url};

use crate::error::Result;

/// A LaTeX or BibTeX source identified by its URI.
///
/// The structure is only rebuilt by [`Document::analyze`]. Between a
/// [`Document::set_text`] and the next analysis the document is stale and
/// its structure describes the previous text.
#[derive(Debug, Clone)]
pub struct Document {
    uri: Url,
    language: Language,
    text: String,
    line_index: LineIndex,
    structure: Structure,
    stale: bool,
}

impl Document {
    /// Create an empty document
    pub fn create(uri: Url, language: Language) -> Self {
        Self {
            uri,
            language,
            text: String::new(),
            line_index: LineIndex::new(""),
            structure: Structure::empty(language),
            stale: false,
        }
    }

    /// Create and analyze a document, taking the language from the URI path
    pub fn open(uri: Url, text: impl Into<String>) -> Result<Self> {
        let language = Language::from_path(uri.path())?;
        let mut document = Self::create(uri, language);
        document.set_text(text);
        document.analyze();
        Ok(document)
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Replace the content and mark the document stale
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.line_index = LineIndex::new(&self.text);
        self.stale = true;
    }

    /// Rebuild the structure from the current text
    pub fn analyze(&mut self) {
        self.line_index = LineIndex::new(&self.text);
        self.structure = analyze(self.language, &self.text);
        self.stale = false;
    }

    /// Position of a byte offset
    pub fn position(&self, offset: usize) -> Position {
        let LineCol { line, col } = self.line_index.line_col(&self.text, offset);
        Position::new(line, col)
    }

    /// Range covered by a byte span
    pub fn range(&self, span: Span) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }

    /// Byte offset of a position, `None` past the last line
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        self.line_index
            .offset(&self.text, LineCol::new(position.line, position.character))
    }

    /// Zero-based line of a byte offset
    pub fn line_of(&self, offset: usize) -> u32 {
        self.position(offset).line
    }

    /// Index of the last line holding content.
    ///
    /// A trailing line break does not open a foldable line.
    pub fn last_line(&self) -> u32 {
        let last = self.line_index.line_count().saturating_sub(1);
        let empty_tail = self.line_index.line_start(last) == Some(self.text.len());
        if empty_tail && last > 0 {
            (last - 1) as u32
        } else {
            last as u32
        }
    }

    /// Last path segment of the URI, for display
    pub fn file_name(&self) -> &str {
        self.uri
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_else(|| self.uri.as_str())
    }
}
