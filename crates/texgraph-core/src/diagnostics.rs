//! Analysis diagnostics
//!
//! Syntax problems found while analyzing a document are recorded here
//! rather than returned as errors. Documents in an editor are routinely
//! malformed mid-edit, so analysis always produces a usable structure.

use serde::{Deserialize, Serialize};

/// A problem found while analyzing a document
///
/// # Example
///
/// ```
/// use texgraph_core::diagnostics::{Diagnostic, Severity, Span};
///
/// let diag = Diagnostic::error("Unmatched closing brace")
///     .with_code("TEX001")
///     .with_span(Span::new(10, 11));
///
/// assert!(diag.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// The diagnostic message
    pub message: String,

    /// Diagnostic code (e.g., "TEX001", "BIB002")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Byte range the diagnostic applies to
    pub span: Span,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational hint
    Hint,

    /// Informational message
    Info,

    /// Potential issue
    Warning,

    /// Problem that should be fixed
    Error,
}

/// A half-open byte range in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,

    /// End offset (exclusive)
    pub end: usize,
}

impl Diagnostic {
    /// Create a new diagnostic at the start of the document
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            span: Span::default(),
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the source span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl Span {
    /// Create a new span from start and end offsets
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if an offset touches this span.
    ///
    /// Both ends are inclusive so that a cursor placed right after a word
    /// still counts as being on it.
    pub fn touches(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[code]: message (start..end)
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {} ({}..{})", self.message, self.span.start, self.span.end)
    }
}
