//! BibTeX analyzer
//!
//! Text outside of `@type{...}` blocks is treated as a comment, as BibTeX
//! itself does. `@comment` and `@preamble` blocks are skipped, `@string`
//! blocks record their name, everything else is an entry.
//!
//! Bare words in field values are `@string` references. A reference to a
//! name that is neither declared in the file nor a month abbreviation is
//! reported as BIB006.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Symbol;
use crate::diagnostics::{Diagnostic, Span};

/// A bibliography entry such as `@article{key, ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry type in lowercase (`article`, `book`, ...)
    pub kind: String,
    /// Citation key, absent when the entry is malformed
    pub key: Option<Symbol>,
    /// Value of the `title` field with braces removed
    pub title: Option<String>,
    /// From the `@` through the closing delimiter
    pub span: Span,
}

/// Abbreviations every BibTeX style defines
pub static PREDEFINED_STRINGS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Structure extracted from a BibTeX document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BibtexStructure {
    pub entries: Vec<Entry>,
    /// Names declared with `@string`
    pub strings: Vec<Symbol>,
    /// Bare words used in field values, in source order
    pub string_references: Vec<Symbol>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BibtexStructure {
    /// Entry keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().filter_map(|entry| entry.key.as_ref())
    }

    /// Whether `name` is declared with `@string` or predefined.
    ///
    /// String names are case-insensitive.
    pub fn defines_string(&self, name: &str) -> bool {
        PREDEFINED_STRINGS
            .iter()
            .any(|predefined| predefined.eq_ignore_ascii_case(name))
            || self
                .strings
                .iter()
                .any(|string| string.name.eq_ignore_ascii_case(name))
    }
}

/// Analyze BibTeX source text
pub fn analyze(text: &str) -> BibtexStructure {
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        structure: BibtexStructure::default(),
    };
    parser.run();
    parser.check_duplicate_keys();
    parser.check_undefined_strings();
    parser
        .structure
        .diagnostics
        .sort_by_key(|diag| (diag.span.start, diag.span.end));
    parser.structure
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    structure: BibtexStructure,
}

/// Fields read from one block
struct Fields {
    /// Field name span and its value
    values: Vec<(Span, String)>,
    terminated: bool,
}

impl Fields {
    fn unterminated(values: Vec<(Span, String)>) -> Self {
        Self {
            values,
            terminated: false,
        }
    }
}

/// Outcome of reading one field value
enum Value {
    Text(String),
    /// Input ended inside the value
    Eof,
}

impl<'a> Parser<'a> {
    fn run(&mut self) {
        while let Some(relative) = self.text[self.pos..].find('@') {
            let start = self.pos + relative;
            self.pos = start + 1;
            self.block(start);
        }
        self.pos = self.bytes.len();
    }

    /// Parse a block whose `@` is at `start`
    fn block(&mut self, start: usize) {
        let kind_span = self.identifier();
        if kind_span.is_empty() {
            return;
        }
        let kind = self.text[kind_span.start..kind_span.end].to_ascii_lowercase();

        self.skip_whitespace();
        let close = match self.bytes.get(self.pos) {
            Some(b'{') => b'}',
            Some(b'(') => b')',
            _ => {
                self.structure.diagnostics.push(
                    Diagnostic::error(format!("Expected '{{' after '@{}'", kind))
                        .with_code("BIB004")
                        .with_span(Span::new(start, kind_span.end)),
                );
                return;
            }
        };
        let open = self.pos;
        self.pos += 1;

        match kind.as_str() {
            "comment" | "preamble" => self.skip_block(start, open, close),
            "string" => self.string(start, close),
            _ => self.entry(start, kind, close),
        }
    }

    fn skip_block(&mut self, start: usize, open: usize, close: u8) {
        let mut depth = 0usize;
        let mut i = open;
        while i < self.bytes.len() {
            let b = self.bytes[i];
            if b == b'{' || (i == open && b == b'(') {
                depth += 1;
            } else if b == b'}' || (depth == 1 && b == close) {
                depth -= 1;
                if depth == 0 {
                    self.pos = i + 1;
                    return;
                }
            }
            i += 1;
        }
        self.unterminated(start);
        self.pos = self.bytes.len();
    }

    /// `@string{name = value}`
    fn string(&mut self, start: usize, close: u8) {
        let fields = self.fields(close);
        for (name, _) in &fields.values {
            let symbol = Symbol::new(&self.text[name.start..name.end], *name);
            self.structure.strings.push(symbol);
        }
        if !fields.terminated {
            self.unterminated(start);
        }
    }

    fn entry(&mut self, start: usize, kind: String, close: u8) {
        self.skip_whitespace();
        let key_start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b',' || b == close || b == b'{' || b == b'}' || b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }

        let key = if self.pos > key_start {
            let span = Span::new(key_start, self.pos);
            Some(Symbol::new(&self.text[key_start..self.pos], span))
        } else {
            self.structure.diagnostics.push(
                Diagnostic::error(format!("Entry '@{}' has no key", kind))
                    .with_code("BIB001")
                    .with_span(Span::new(start, key_start)),
            );
            None
        };

        let fields = self.fields(close);
        if !fields.terminated {
            self.unterminated(start);
        }
        let title = fields
            .values
            .into_iter()
            .find(|(name, _)| self.text[name.start..name.end].eq_ignore_ascii_case("title"))
            .map(|(_, value)| value);

        self.structure.entries.push(Entry {
            kind,
            key,
            title,
            span: Span::new(start, self.pos),
        });
    }

    /// Read `name = value` pairs up to and including the closing delimiter
    fn fields(&mut self, close: u8) -> Fields {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(&b) = self.bytes.get(self.pos) else {
                return Fields::unterminated(values);
            };

            if b == close {
                self.pos += 1;
                return Fields {
                    values,
                    terminated: true,
                };
            }
            if b == b',' {
                self.pos += 1;
                continue;
            }
            if b == b'@' {
                // Next block started before this one was closed
                return Fields::unterminated(values);
            }

            let name = self.identifier();
            if name.is_empty() {
                self.missing_equals(Span::new(self.pos, self.pos + 1));
                if !self.recover(close) {
                    return Fields::unterminated(values);
                }
                continue;
            }

            self.skip_whitespace();
            if self.bytes.get(self.pos) != Some(&b'=') {
                self.missing_equals(name);
                if !self.recover(close) {
                    return Fields::unterminated(values);
                }
                continue;
            }
            self.pos += 1;

            match self.value(close) {
                Value::Text(value) => values.push((name, value)),
                Value::Eof => return Fields::unterminated(values),
            }
        }
    }

    /// Read a value made of pieces joined with `#`
    fn value(&mut self, close: u8) -> Value {
        let mut pieces = Vec::new();
        loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => return Value::Eof,
                Some(b'{') => {
                    let open = self.pos;
                    let Some(end) = self.balanced(open) else {
                        return Value::Eof;
                    };
                    pieces.push(self.text[open + 1..end].to_string());
                    self.pos = end + 1;
                }
                Some(b'"') => {
                    let open = self.pos;
                    let Some(end) = self.quoted(open) else {
                        return Value::Eof;
                    };
                    pieces.push(self.text[open + 1..end].to_string());
                    self.pos = end + 1;
                }
                Some(&b) if b == close || b == b',' => break,
                Some(_) => {
                    let word = self.identifier();
                    if word.is_empty() {
                        // Stray character; leave it for the field loop
                        break;
                    }
                    let name = &self.text[word.start..word.end];
                    // String names cannot start with a digit
                    if !name.starts_with(|c: char| c.is_ascii_digit()) {
                        self.structure
                            .string_references
                            .push(Symbol::new(name, word));
                    }
                    pieces.push(name.to_string());
                }
            }

            self.skip_whitespace();
            if self.bytes.get(self.pos) == Some(&b'#') {
                self.pos += 1;
            } else {
                break;
            }
        }

        let joined = pieces.concat();
        let stripped: String = joined.chars().filter(|c| *c != '{' && *c != '}').collect();
        Value::Text(stripped.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Offset of the `}` matching the `{` at `open`
    fn balanced(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = open;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 1,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Offset of the `"` closing the string opened at `open`.
    ///
    /// Quotes inside braces do not terminate the string.
    fn quoted(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = open + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 1,
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                b'"' if depth == 0 => return Some(i),
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Skip to the next `,` or closing delimiter at the current level.
    ///
    /// Returns false at the end of input.
    fn recover(&mut self, close: u8) -> bool {
        let mut depth = 0usize;
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b'{' => depth += 1,
                b'}' if depth > 0 => depth -= 1,
                b',' if depth == 0 => return true,
                b'@' if depth == 0 => return false,
                _ if depth == 0 && b == close => return true,
                _ => {}
            }
            self.pos += 1;
        }
        false
    }

    fn identifier(&mut self) -> Span {
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.' | b'+' | b'/'))
        {
            self.pos += 1;
        }
        Span::new(start, self.pos)
    }

    fn skip_whitespace(&mut self) {
        while self.bytes.get(self.pos).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn missing_equals(&mut self, span: Span) {
        self.structure.diagnostics.push(
            Diagnostic::error("Expected '=' after field name")
                .with_code("BIB003")
                .with_span(span),
        );
    }

    fn unterminated(&mut self, start: usize) {
        self.structure.diagnostics.push(
            Diagnostic::error("Entry is not terminated")
                .with_code("BIB002")
                .with_span(Span::new(start, start + 1)),
        );
    }

    fn check_duplicate_keys(&mut self) {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for key in self.structure.keys() {
            if !seen.insert(key.name.as_str()) {
                duplicates.push(
                    Diagnostic::warning(format!("Duplicate entry key '{}'", key.name))
                        .with_code("BIB005")
                        .with_span(key.span),
                );
            }
        }
        self.structure.diagnostics.extend(duplicates);
    }

    fn check_undefined_strings(&mut self) {
        let undefined: Vec<_> = self
            .structure
            .string_references
            .iter()
            .filter(|reference| !self.structure.defines_string(&reference.name))
            .map(|reference| {
                Diagnostic::warning(format!("Undefined string '{}'", reference.name))
                    .with_code("BIB006")
                    .with_span(reference.span)
            })
            .collect();
        self.structure.diagnostics.extend(undefined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_braces_are_stripped() {
        let structure = analyze("@book{k, title = {The {TeX}book}}");
        assert_eq!(structure.entries[0].title.as_deref(), Some("The TeXbook"));
    }

    #[test]
    fn test_concatenated_value() {
        let structure = analyze("@misc{k, title = \"Part\" # { one}}");
        assert_eq!(structure.entries[0].title.as_deref(), Some("Part one"));
    }

    #[test]
    fn test_numbers_are_not_string_references() {
        let structure = analyze("@misc{k, year = 2024, pages = 10-20, month = Jan}");
        let names: Vec<_> = structure
            .string_references
            .iter()
            .map(|reference| reference.name.as_str())
            .collect();
        assert_eq!(names, vec!["Jan"]);
        assert!(structure.defines_string("Jan"));
        assert!(structure.diagnostics.is_empty());
    }

    #[test]
    fn test_parenthesized_entry() {
        let structure = analyze("@article(key, title = {Round})");
        assert_eq!(structure.entries.len(), 1);
        assert_eq!(structure.entries[0].key.as_ref().unwrap().name, "key");
        assert!(structure.diagnostics.is_empty());
    }
}
