//! Conversion between byte offsets and zero-based line/column positions.
//!
//! Columns are counted in UTF-16 code units, matching the language server
//! protocol.

/// Zero-based line and UTF-16 column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Line start table for a text.
///
/// The index does not own the text; callers pass the same text that was
/// used to build it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineIndex {
    /// Byte offset where each line starts
    line_starts: Vec<usize>,
    /// Total text length in bytes
    len: usize,
}

impl LineIndex {
    /// Build the index for `text`
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Number of lines (an empty text has one line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a line/column pair.
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a
    /// multi-byte character clamp to its start.
    pub fn line_col(&self, text: &str, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };

        let start = self.line_starts[line];
        let mut end = offset;
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        let col: usize = text[start..end].chars().map(char::len_utf16).sum();
        LineCol::new(line as u32, col as u32)
    }

    /// Convert a line/column pair into a byte offset.
    ///
    /// Returns `None` when the line does not exist. Columns past the end of
    /// the line clamp to the end of the line (before its line break).
    pub fn offset(&self, text: &str, line_col: LineCol) -> Option<usize> {
        let line = line_col.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self.line_end(text, line);

        let mut remaining = line_col.col as usize;
        for (i, ch) in text[start..end].char_indices() {
            if remaining == 0 {
                return Some(start + i);
            }
            remaining = remaining.saturating_sub(ch.len_utf16());
        }

        Some(end)
    }

    /// Byte offset where `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset of the end of `line`, excluding the line break
    fn line_end(&self, text: &str, line: usize) -> usize {
        let next = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.len);

        let bytes = text.as_bytes();
        let mut end = next;
        if end > self.line_starts[line] && bytes.get(end - 1) == Some(&b'\n') {
            end -= 1;
            if end > self.line_starts[line] && bytes.get(end - 1) == Some(&b'\r') {
                end -= 1;
            }
        }
        end
    }
}
