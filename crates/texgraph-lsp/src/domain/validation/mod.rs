//! Diagnostics for a document and its related documents
//!
//! Combines the analysis diagnostics of the origin with cross-document
//! rules:
//!
//! | Code | Rule |
//! |---|---|
//! | REF001 | Reference to a label no related document defines |
//! | REF002 | Citation of a key no related bibliography defines |
//! | REF003 | Label defined more than once across related documents |
//!
//! REF002 only runs when at least one bibliography is related; without
//! one every citation would be reported.
//!
//! The configured `allowed_patterns` and `ignored_patterns` filter every
//! diagnostic by message, analysis diagnostics included.


use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use regex::Regex;
use texgraph_core::syntax::Symbol;
use texgraph_core::Severity;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};
use tracing::warn;

use crate::config::{DiagnosticsSettings, RuleSeverity};
use crate::document::Document;

/// Source reported on every diagnostic
pub const SOURCE: &str = "texgraph";

/// Diagnostics engine configured with rule severities
pub struct DiagnosticsEngine<'a> {
    settings: &'a DiagnosticsSettings,
    filter: MessageFilter,
}

impl<'a> DiagnosticsEngine<'a> {
    pub fn new(settings: &'a DiagnosticsSettings) -> Self {
        Self {
            settings,
            filter: MessageFilter::new(settings),
        }
    }

    /// All diagnostics of `origin`, sorted by range
    pub fn collect(&self, origin: &Document, related: &[Arc<Document>]) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = origin
            .structure()
            .diagnostics()
            .iter()
            .map(|diag| convert_diagnostic(origin, diag))
            .collect();

        if let Some(latex) = origin.structure().as_latex() {
            let labels = label_counts(related);

            self.check(
                &mut diagnostics,
                origin,
                self.settings.undefined_labels,
                "REF001",
                latex
                    .label_references
                    .iter()
                    .filter(|reference| !labels.contains_key(reference.name.as_str()))
                    .map(|reference| (reference, format!("Undefined label '{}'", reference.name))),
            );

            let keys = if self.settings.undefined_citations.is_enabled() {
                citation_keys(related)
            } else {
                None
            };
            if let Some(keys) = keys {
                self.check(
                    &mut diagnostics,
                    origin,
                    self.settings.undefined_citations,
                    "REF002",
                    latex
                        .citations
                        .iter()
                        .filter(|citation| !keys.contains(citation.name.as_str()))
                        .map(|citation| {
                            (citation, format!("Undefined citation '{}'", citation.name))
                        }),
                );
            }

            self.check(
                &mut diagnostics,
                origin,
                self.settings.duplicate_labels,
                "REF003",
                latex.label_definitions.iter().filter_map(|label| {
                    let count = labels.get(label.name.as_str()).copied().unwrap_or(0);
                    (count > 1).then(|| {
                        (label, format!("Label '{}' is defined {} times", label.name, count))
                    })
                }),
            );
        }

        diagnostics.retain(|diag| self.filter.keeps(&diag.message));
        diagnostics.sort_by_key(|diag| {
            (
                diag.range.start.line,
                diag.range.start.character,
                diag.range.end.line,
                diag.range.end.character,
            )
        });
        diagnostics
    }

    /// Emit one diagnostic per violation unless the rule is ignored
    fn check<'s>(
        &self,
        diagnostics: &mut Vec<Diagnostic>,
        origin: &Document,
        severity: RuleSeverity,
        code: &str,
        violations: impl Iterator<Item = (&'s Symbol, String)>,
    ) {
        let Some(severity) = severity.to_diagnostic_severity() else {
            return;
        };

        diagnostics.extend(violations.map(|(symbol, message)| Diagnostic {
            range: origin.range(symbol.span),
            severity: Some(severity),
            code: Some(NumberOrString::String(code.to_string())),
            source: Some(SOURCE.to_string()),
            message,
            ..Default::default()
        }));
    }
}

/// Compiled `allowed_patterns` and `ignored_patterns`
struct MessageFilter {
    allowed: Vec<Regex>,
    ignored: Vec<Regex>,
}

impl MessageFilter {
    fn new(settings: &DiagnosticsSettings) -> Self {
        Self {
            allowed: compile_patterns(&settings.allowed_patterns),
            ignored: compile_patterns(&settings.ignored_patterns),
        }
    }

    fn keeps(&self, message: &str) -> bool {
        (self.allowed.is_empty() || self.allowed.iter().any(|re| re.is_match(message)))
            && !self.ignored.iter().any(|re| re.is_match(message))
    }
}

/// Compile each pattern, skipping the invalid ones
fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Skipping invalid diagnostics pattern {:?}: {}", pattern, e);
                None
            }
        })
        .collect()
}

/// Number of definitions of each label across the related documents
fn label_counts(related: &[Arc<Document>]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for latex in related.iter().filter_map(|doc| doc.structure().as_latex()) {
        for label in &latex.label_definitions {
            *counts.entry(label.name.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

/// Entry keys of the related bibliographies, `None` without bibliographies
fn citation_keys(related: &[Arc<Document>]) -> Option<HashSet<&str>> {
    let mut bibliographies = related
        .iter()
        .filter_map(|doc| doc.structure().as_bibtex())
        .peekable();
    bibliographies.peek()?;

    Some(
        bibliographies
            .flat_map(|bibtex| bibtex.keys())
            .map(|key| key.name.as_str())
            .collect(),
    )
}

/// Convert an analysis diagnostic to an LSP diagnostic
pub fn convert_diagnostic(document: &Document, diag: &texgraph_core::Diagnostic) -> Diagnostic {
    let severity = match diag.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    };

    Diagnostic {
        range: document.range(diag.span),
        severity: Some(severity),
        code: diag.code.clone().map(NumberOrString::String),
        source: Some(SOURCE.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}
