//! Configuration Settings
//!
//! Defines the configuration structures read from `texgraph.toml` and from
//! the client's initialization options.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::DiagnosticSeverity;

use crate::error::Result;

/// Severity levels for cross-document rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Rule violations are errors
    Error,
    /// Rule violations are warnings (default for most)
    #[default]
    Warning,
    /// Rule violations are informational
    Info,
    /// Rule is disabled
    Ignore,
}

impl RuleSeverity {
    /// Convert to an LSP severity, returns None if Ignore
    pub fn to_diagnostic_severity(self) -> Option<DiagnosticSeverity> {
        match self {
            RuleSeverity::Error => Some(DiagnosticSeverity::ERROR),
            RuleSeverity::Warning => Some(DiagnosticSeverity::WARNING),
            RuleSeverity::Info => Some(DiagnosticSeverity::INFORMATION),
            RuleSeverity::Ignore => None,
        }
    }

    /// Check if this severity means the rule is enabled
    pub fn is_enabled(self) -> bool {
        self != RuleSeverity::Ignore
    }
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Workspace settings
    pub workspace: WorkspaceSettings,
    /// Cross-document diagnostic rules
    pub diagnostics: DiagnosticsSettings,
    /// Completion settings
    pub completion: CompletionSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Parse settings from the client's initialization options
    pub fn from_json(value: serde_json::Value) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Workspace configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Directory tried when an include does not resolve next to the
    /// including document. Relative paths are taken from the workspace root.
    pub root_dir: Option<String>,
    /// Treat the include graph as undirected, so a chapter sees its parent
    /// and siblings
    pub follow_parents: bool,
}

/// Severities of the cross-document diagnostic rules and message filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Reference to a label no related document defines (REF001)
    pub undefined_labels: RuleSeverity,
    /// Citation of a key no related bibliography defines (REF002)
    pub undefined_citations: RuleSeverity,
    /// Label defined more than once across related documents (REF003)
    pub duplicate_labels: RuleSeverity,
    /// Regular expressions; when any are given, only diagnostics whose
    /// message matches one of them are reported
    pub allowed_patterns: Vec<String>,
    /// Regular expressions; diagnostics whose message matches one of them
    /// are dropped
    pub ignored_patterns: Vec<String>,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            undefined_labels: RuleSeverity::Warning,
            undefined_citations: RuleSeverity::Warning,
            duplicate_labels: RuleSeverity::Error,
            allowed_patterns: Vec::new(),
            ignored_patterns: Vec::new(),
        }
    }
}

/// How typed text is matched against completion candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionMatcher {
    /// Case-sensitive prefix match
    Prefix,
    /// Prefix match ignoring ASCII case
    #[default]
    PrefixIgnoreCase,
}

impl CompletionMatcher {
    /// Check whether `candidate` starts with `prefix`
    pub fn matches(self, candidate: &str, prefix: &str) -> bool {
        match self {
            CompletionMatcher::Prefix => candidate.starts_with(prefix),
            CompletionMatcher::PrefixIgnoreCase => candidate
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
        }
    }
}

/// Completion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompletionSettings {
    pub matcher: CompletionMatcher,
}
