//! LaTeX analyzer
//!
//! A single-pass scanner over the source text. It does not build a syntax
//! tree; it records the pieces of structure the language server queries:
//!
//! - Includes (`\include`, `\input`, `\bibliography`, `\usepackage`, ...)
//! - Label definitions and references
//! - Citation keys
//! - Sections and environments
//! - User command definitions
//!
//! Recovery rules keep the scanner usable on half-typed input: an argument
//! group that never closes ends at the next command, nested group or blank
//! line, and unbalanced braces or environments become diagnostics.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::commands;
use super::Symbol;
use crate::diagnostics::{Diagnostic, Span};

/// Kind of resource an include points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncludeKind {
    /// Another LaTeX source (`\include`, `\input`, `\subfile`)
    Latex,
    /// A BibTeX database (`\bibliography`, `\addbibresource`)
    Bibliography,
    /// A package (`\usepackage`, `\RequirePackage`)
    Package,
    /// A document class (`\documentclass`, `\LoadClass`)
    Class,
}

impl IncludeKind {
    /// File extension implied by the include command
    pub fn extension(self) -> &'static str {
        match self {
            IncludeKind::Latex => "tex",
            IncludeKind::Bibliography => "bib",
            IncludeKind::Package => "sty",
            IncludeKind::Class => "cls",
        }
    }
}

/// A reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Include {
    pub kind: IncludeKind,
    /// Path as written in the source
    pub path: String,
    /// Span of the path inside the argument group
    pub span: Span,
}

/// A sectioning command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// 0 for `\part` through 6 for `\subparagraph`
    pub level: u8,
    pub title: String,
    /// From the backslash through the closing brace of the title
    pub span: Span,
}

/// A matched `\begin{name}` ... `\end{name}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    /// Span of `\begin{name}`
    pub begin: Span,
    /// Span of `\end{name}`
    pub end: Span,
}

/// Structure extracted from a LaTeX document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LatexStructure {
    pub includes: Vec<Include>,
    pub label_definitions: Vec<Symbol>,
    pub label_references: Vec<Symbol>,
    pub citations: Vec<Symbol>,
    pub sections: Vec<Section>,
    pub environments: Vec<Environment>,
    /// Names (without backslash) of commands defined in this document
    pub command_definitions: Vec<Symbol>,
    /// Every command name used, in order of first use
    pub commands: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Analyze LaTeX source text
pub fn analyze(text: &str) -> LatexStructure {
    Analyzer::new(text).run()
}

struct Analyzer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    structure: LatexStructure,
    /// Offsets of `{` not yet closed
    open_braces: Vec<usize>,
    /// Environments not yet closed: (name, span of `\begin{name}`)
    open_environments: Vec<(String, Span)>,
    seen_commands: HashSet<String>,
}

impl<'a> Analyzer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            structure: LatexStructure::default(),
            open_braces: Vec::new(),
            open_environments: Vec::new(),
            seen_commands: HashSet::new(),
        }
    }

    fn run(mut self) -> LatexStructure {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'%' => self.skip_comment(),
                b'\\' => self.command(),
                b'{' => {
                    self.open_braces.push(self.pos);
                    self.pos += 1;
                }
                b'}' => {
                    if self.open_braces.pop().is_none() {
                        self.structure.diagnostics.push(
                            Diagnostic::error("Unmatched closing brace")
                                .with_code("TEX001")
                                .with_span(Span::new(self.pos, self.pos + 1)),
                        );
                    }
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }

        self.finish()
    }

    fn finish(mut self) -> LatexStructure {
        for offset in std::mem::take(&mut self.open_braces) {
            self.structure.diagnostics.push(
                Diagnostic::error("Missing closing brace")
                    .with_code("TEX002")
                    .with_span(Span::new(offset, offset + 1)),
            );
        }

        for (name, begin) in std::mem::take(&mut self.open_environments) {
            self.unclosed_environment(&name, begin);
        }

        self.structure
            .diagnostics
            .sort_by_key(|diag| (diag.span.start, diag.span.end));
        self.structure
    }

    fn skip_comment(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    /// Handle a backslash at `self.pos`
    fn command(&mut self) {
        let start = self.pos;
        self.pos += 1;

        let name_start = self.pos;
        match self.bytes.get(self.pos) {
            Some(b) if is_letter(*b) => {
                while self.bytes.get(self.pos).is_some_and(|b| is_letter(*b)) {
                    self.pos += 1;
                }
                if self.bytes.get(self.pos) == Some(&b'*') {
                    self.pos += 1;
                }
            }
            Some(_) => {
                // Control symbol such as \\ or \{ - skip the whole character
                let len = self.text[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.pos += len;
                return;
            }
            None => return,
        }

        let text = self.text;
        let name = &text[name_start..self.pos];
        let bare = name.trim_end_matches('*');
        if self.seen_commands.insert(bare.to_string()) {
            self.structure.commands.push(bare.to_string());
        }

        if name == "begin" {
            self.begin_environment(start);
        } else if name == "end" {
            self.end_environment(start);
        } else if name == "label" {
            if let Some(content) = self.key_group() {
                if let Some(label) = self.trimmed(content) {
                    self.structure.label_definitions.push(label);
                }
            }
        } else if let Some(kind) = commands::include_kind(name) {
            self.skip_options();
            if let Some(content) = self.key_group() {
                for key in self.split_keys(content) {
                    self.structure.includes.push(Include {
                        kind,
                        path: key.name,
                        span: key.span,
                    });
                }
            }
        } else if commands::is_label_reference(name) {
            let groups = if commands::is_label_reference_range(name) { 2 } else { 1 };
            for _ in 0..groups {
                let Some(content) = self.key_group() else {
                    break;
                };
                let keys = self.split_keys(content);
                self.structure.label_references.extend(keys);
            }
        } else if commands::is_citation(name) {
            self.skip_options();
            if let Some(content) = self.key_group() {
                let keys = self.split_keys(content);
                self.structure
                    .citations
                    .extend(keys.into_iter().filter(|key| key.name != "*"));
            }
        } else if let Some(level) = commands::section_level(name) {
            self.section(start, level);
        } else if commands::is_command_definition(name) {
            self.command_definition();
        }
    }

    fn begin_environment(&mut self, start: usize) {
        let Some(content) = self.key_group() else {
            return;
        };
        let Some(name) = self.trimmed(content) else {
            return;
        };
        let begin = Span::new(start, self.pos);

        if commands::is_verbatim_environment(&name.name) {
            self.skip_verbatim(name.name, begin);
        } else {
            self.open_environments.push((name.name, begin));
        }
    }

    fn end_environment(&mut self, start: usize) {
        let Some(content) = self.key_group() else {
            return;
        };
        let Some(name) = self.trimmed(content) else {
            return;
        };
        let end = Span::new(start, self.pos);

        let matching = self
            .open_environments
            .iter()
            .rposition(|(open, _)| *open == name.name);

        match matching {
            Some(index) => {
                let unclosed = self.open_environments.split_off(index + 1);
                for (open, begin) in unclosed {
                    self.unclosed_environment(&open, begin);
                }
                if let Some((open, begin)) = self.open_environments.pop() {
                    self.structure.environments.push(Environment {
                        name: open,
                        begin,
                        end,
                    });
                }
            }
            None => {
                self.structure.diagnostics.push(
                    Diagnostic::error(format!(
                        "\\end{{{}}} has no matching \\begin",
                        name.name
                    ))
                    .with_code("TEX003")
                    .with_span(end),
                );
            }
        }
    }

    fn unclosed_environment(&mut self, name: &str, begin: Span) {
        self.structure.diagnostics.push(
            Diagnostic::error(format!("Environment '{}' is not closed", name))
                .with_code("TEX004")
                .with_span(begin),
        );
    }

    /// Skip the body of a verbatim environment up to its literal `\end`
    fn skip_verbatim(&mut self, name: String, begin: Span) {
        let terminator = format!("\\end{{{}}}", name);
        match self.text[self.pos..].find(&terminator) {
            Some(relative) => {
                let end_start = self.pos + relative;
                let end = Span::new(end_start, end_start + terminator.len());
                self.pos = end.end;
                self.structure
                    .environments
                    .push(Environment { name, begin, end });
            }
            None => {
                self.pos = self.bytes.len();
                self.unclosed_environment(&name, begin);
            }
        }
    }

    fn section(&mut self, start: usize, level: u8) {
        self.skip_options();

        let open = self.next_significant();
        if self.bytes.get(open) != Some(&b'{') {
            return;
        }

        // The title group is left for the main loop so that commands inside
        // it (such as \label) are still seen.
        let (title_end, span_end) = match self.matching_brace(open) {
            Some(close) => (close, close + 1),
            None => {
                let line_end = self.text[open..]
                    .find('\n')
                    .map_or(self.bytes.len(), |i| open + i);
                (line_end, line_end)
            }
        };

        let title = self.text[open + 1..title_end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        self.structure.sections.push(Section {
            level,
            title,
            span: Span::new(start, span_end),
        });
        self.pos = open;
    }

    /// Record the name in `\newcommand{\foo}`, `\newcommand\foo` or `\def\foo`
    fn command_definition(&mut self) {
        let mut next = self.next_significant();
        let braced = self.bytes.get(next) == Some(&b'{');
        if braced {
            next += 1;
            while self.bytes.get(next).is_some_and(|b| b.is_ascii_whitespace()) {
                next += 1;
            }
        }

        if self.bytes.get(next) != Some(&b'\\') {
            return;
        }

        let start = next;
        let mut end = next + 1;
        while self.bytes.get(end).is_some_and(|b| is_letter(*b)) {
            end += 1;
        }
        if end == start + 1 {
            return;
        }

        let text = self.text;
        self.structure
            .command_definitions
            .push(Symbol::new(&text[start + 1..end], Span::new(start, end)));

        // The braced form is left to the main loop so its group is counted
        if !braced {
            self.pos = end;
        }
    }

    /// Offset of the next byte that is not whitespace or inside a comment
    fn next_significant(&self) -> usize {
        let mut i = self.pos;
        while let Some(b) = self.bytes.get(i) {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                b'%' => {
                    while i < self.bytes.len() && self.bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                _ => break,
            }
        }
        i
    }

    /// Skip any number of `[...]` optional arguments.
    ///
    /// An optional argument that never closes is left in place.
    fn skip_options(&mut self) {
        loop {
            let open = self.next_significant();
            if self.bytes.get(open) != Some(&b'[') {
                return;
            }

            let mut depth = 0usize;
            let mut i = open;
            let mut close = None;
            while i < self.bytes.len() {
                match self.bytes[i] {
                    b'\\' => i += 1,
                    b'[' | b'{' => depth += 1,
                    b']' | b'}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            if self.bytes[i] == b']' {
                                close = Some(i);
                            }
                            break;
                        }
                    }
                    _ => {}
                }
                i += 1;
            }

            match close {
                Some(close) => self.pos = close + 1,
                None => return,
            }
        }
    }

    /// Consume a `{...}` group holding plain keys and return the span of
    /// its content.
    ///
    /// Nested groups and commands such as `\jobname` are accepted as long as
    /// the group is balanced before the next blank line. Otherwise the group
    /// is reported and recovered up to the first nested group, command or
    /// blank line.
    fn key_group(&mut self) -> Option<Span> {
        let open = self.next_significant();
        if self.bytes.get(open) != Some(&b'{') {
            return None;
        }

        let mut i = open + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'}' => {
                    self.pos = i + 1;
                    return Some(Span::new(open + 1, i));
                }
                b'{' | b'\\' => {
                    if let Some(close) = self.matching_brace(open) {
                        if !self.has_blank_line(open, close) {
                            self.pos = close + 1;
                            return Some(Span::new(open + 1, close));
                        }
                    }
                    break;
                }
                b'\n' if self.is_blank_line_after(i) => break,
                _ => i += 1,
            }
        }

        self.structure.diagnostics.push(
            Diagnostic::error("Missing closing brace")
                .with_code("TEX002")
                .with_span(Span::new(open, open + 1)),
        );
        self.pos = i;
        Some(Span::new(open + 1, i))
    }

    fn has_blank_line(&self, start: usize, end: usize) -> bool {
        self.text[start..end]
            .match_indices('\n')
            .any(|(i, _)| self.is_blank_line_after(start + i))
    }

    fn is_blank_line_after(&self, newline: usize) -> bool {
        self.text[newline + 1..]
            .lines()
            .next()
            .map_or(true, |line| line.trim().is_empty())
    }

    /// Offset of the brace closing the group opened at `open`
    fn matching_brace(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = open;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 1,
                b'%' => {
                    while i < self.bytes.len() && self.bytes[i] != b'\n' {
                        i += 1;
                    }
                    continue;
                }
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

    /// The content of `span` without surrounding whitespace
    fn trimmed(&self, span: Span) -> Option<Symbol> {
        let raw = &self.text[span.start..span.end];
        let word = raw.trim();
        if word.is_empty() {
            return None;
        }
        let start = span.start + (raw.len() - raw.trim_start().len());
        Some(Symbol::new(word, Span::new(start, start + word.len())))
    }

    /// Split a comma-separated key list, keeping a span per key
    fn split_keys(&self, span: Span) -> Vec<Symbol> {
        let mut keys = Vec::new();
        let mut offset = span.start;
        for part in self.text[span.start..span.end].split(',') {
            if let Some(key) = self.trimmed(Span::new(offset, offset + part.len())) {
                keys.push(key);
            }
            offset += part.len() + 1;
        }
        keys
    }
}

fn is_letter(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'@'
}
