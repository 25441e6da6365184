//! Completion engine for LaTeX documents
//!
//! Provides completions for:
//! - Label references: `\ref{sec:`
//! - Citations: `\cite{knuth`
//! - Environments: `\begin{ite`
//! - Include paths: `\input{chap`
//! - Commands: `\sec`
//!
//! Candidates come from the origin and its related documents, origin first,
//! in declaration order. The first candidate with a given label wins.

mod citation;
mod command;
mod environment;
mod include;
mod label;


pub use citation::CitationCompleter;
pub use command::CommandCompleter;
pub use environment::EnvironmentCompleter;
pub use include::IncludeCompleter;
pub use label::LabelCompleter;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use texgraph_core::syntax::{commands, IncludeKind};
use texgraph_core::{Language, Span};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Position, Range, TextEdit,
};

use crate::config::CompletionMatcher;
use crate::document::Document;

/// Context detected for completion
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionContext {
    /// Inside a `\ref`-family key group
    Label { prefix: String },
    /// Inside a `\cite`-family key group
    Citation { prefix: String },
    /// Inside `\begin{` or `\end{`
    Environment { prefix: String },
    /// Inside the path group of an include command
    Include { kind: IncludeKind, prefix: String },
    /// After a backslash
    Command { prefix: String },
    /// No completion context detected
    None,
}

impl CompletionContext {
    /// Text typed so far, replaced by the chosen item
    pub fn prefix(&self) -> &str {
        match self {
            CompletionContext::Label { prefix }
            | CompletionContext::Citation { prefix }
            | CompletionContext::Environment { prefix }
            | CompletionContext::Include { prefix, .. }
            | CompletionContext::Command { prefix } => prefix,
            CompletionContext::None => "",
        }
    }
}

/// A completion candidate before matching against the prefix
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub label: String,
    pub kind: CompletionItemKind,
    pub detail: Option<String>,
}

impl Candidate {
    pub fn new(label: impl Into<String>, kind: CompletionItemKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn into_item(self, range: Range) -> CompletionItem {
        CompletionItem {
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range,
                new_text: self.label.clone(),
            })),
            label: self.label,
            kind: Some(self.kind),
            detail: self.detail,
            ..Default::default()
        }
    }
}

/// Main completion engine
pub struct CompletionEngine {
    matcher: CompletionMatcher,
    label_completer: LabelCompleter,
    citation_completer: CitationCompleter,
    environment_completer: EnvironmentCompleter,
    include_completer: IncludeCompleter,
    command_completer: CommandCompleter,
}

impl CompletionEngine {
    /// Create a new completion engine
    pub fn new(matcher: CompletionMatcher) -> Self {
        Self {
            matcher,
            label_completer: LabelCompleter::new(),
            citation_completer: CitationCompleter::new(),
            environment_completer: EnvironmentCompleter::new(),
            include_completer: IncludeCompleter::new(),
            command_completer: CommandCompleter::new(),
        }
    }

    /// Get completions at the given position of `origin`
    pub fn get_completions(
        &self,
        origin: &Document,
        related: &[Arc<Document>],
        position: Position,
    ) -> Vec<CompletionItem> {
        if origin.language() != Language::Latex {
            return Vec::new();
        }

        let Some(offset) = origin.offset_at(position) else {
            return Vec::new();
        };
        let line_start = origin
            .line_index()
            .line_start(position.line as usize)
            .unwrap_or(offset);
        let line_before = &origin.text()[line_start..offset];

        let context = Self::detect_context(line_before);
        let candidates = match &context {
            CompletionContext::Label { .. } => self.label_completer.complete(related),
            CompletionContext::Citation { .. } => self.citation_completer.complete(related),
            CompletionContext::Environment { .. } => {
                self.environment_completer.complete(related)
            }
            CompletionContext::Include { kind, .. } => {
                self.include_completer.complete(origin, related, *kind)
            }
            CompletionContext::Command { .. } => self.command_completer.complete(related),
            CompletionContext::None => return Vec::new(),
        };

        let prefix = context.prefix();
        let range = origin.range(Span::new(offset - prefix.len(), offset));

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| self.matcher.matches(&candidate.label, prefix))
            .filter(|candidate| seen.insert(candidate.label.clone()))
            .map(|candidate| candidate.into_item(range))
            .collect()
    }

    /// Detect the completion context from the text between the start of
    /// the line and the cursor
    pub fn detect_context(line_before: &str) -> CompletionContext {
        if is_in_comment(line_before) {
            return CompletionContext::None;
        }

        if let Some((command, prefix)) = detect_group_context(line_before) {
            let bare = command.trim_end_matches('*');
            return if commands::is_label_reference(&command) {
                CompletionContext::Label { prefix }
            } else if commands::is_citation(&command) {
                CompletionContext::Citation { prefix }
            } else if bare == "begin" || bare == "end" {
                CompletionContext::Environment { prefix }
            } else {
                match commands::include_kind(&command) {
                    Some(kind @ (IncludeKind::Latex | IncludeKind::Bibliography)) => {
                        CompletionContext::Include { kind, prefix }
                    }
                    _ => CompletionContext::None,
                }
            };
        }

        if let Some(prefix) = detect_command_context(line_before) {
            return CompletionContext::Command { prefix };
        }

        CompletionContext::None
    }
}

/// Detect an open key group: `\command[opt]{key1, pre`, or the second
/// group of a range reference: `\crefrange{start}{pre`
fn detect_group_context(line_before: &str) -> Option<(String, String)> {
    static GROUP_RE: OnceLock<Regex> = OnceLock::new();
    let re = GROUP_RE.get_or_init(|| {
        Regex::new(
            r"\\([A-Za-z@]+\*?)(?:\s*\[[^\]]*\])*(\s*\{[^{}\\]*\})?\s*\{(?:[^{}\\]*,)?\s*([^{},\s\\]*)$",
        )
        .unwrap()
    });

    let cap = re.captures(line_before)?;
    if cap.get(2).is_some() && !commands::is_label_reference_range(&cap[1]) {
        return None;
    }
    Some((cap[1].to_string(), cap[3].to_string()))
}

/// Detect a command being typed: `\pre`
fn detect_command_context(line_before: &str) -> Option<String> {
    static COMMAND_RE: OnceLock<Regex> = OnceLock::new();
    let re = COMMAND_RE.get_or_init(|| Regex::new(r"\\([A-Za-z@]*)$").unwrap());

    let cap = re.captures(line_before)?;
    // `\\` is a line break, not the start of a command
    let backslash = cap.get(0)?.start();
    if line_before[..backslash].ends_with('\\') {
        return None;
    }
    Some(cap[1].to_string())
}

/// Check whether the cursor sits after an unescaped `%`
fn is_in_comment(line_before: &str) -> bool {
    static COMMENT_RE: OnceLock<Regex> = OnceLock::new();
    let re = COMMENT_RE.get_or_init(|| Regex::new(r"(^|[^\\])(\\\\)*%").unwrap());
    re.is_match(line_before)
}
