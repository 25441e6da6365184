//! Folding range generation for LaTeX and BibTeX documents
//!
//! Generates LSP folding ranges for:
//! - Sections (based on hierarchy)
//! - Environments (`\begin` line through `\end` line)
//! - Bibliography entries

use texgraph_core::syntax::{BibtexStructure, Environment, LatexStructure};
use texgraph_core::Structure;
use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind};

use crate::document::Document;

/// Analyzer for generating folding ranges
pub struct FoldingAnalyzer;

impl FoldingAnalyzer {
    /// Generate folding ranges for the entire document.
    ///
    /// Only the document's own structure is used. Ranges spanning a single
    /// line are dropped and the result is sorted by position.
    pub fn generate_ranges(document: &Document) -> Vec<FoldingRange> {
        let mut ranges = match document.structure() {
            Structure::Latex(latex) => {
                let mut ranges = Self::section_ranges(document, latex);
                ranges.extend(Self::environment_ranges(document, latex));
                ranges
            }
            Structure::Bibtex(bibtex) => Self::entry_ranges(document, bibtex),
        };

        ranges.retain(|range| range.end_line > range.start_line);
        ranges.sort_by_key(|range| (range.start_line, range.end_line));
        ranges
    }

    /// A section folds up to the line before the next section of the same
    /// or higher level, but never past the environment it is written in.
    fn section_ranges(document: &Document, latex: &LatexStructure) -> Vec<FoldingRange> {
        let mut ranges = Vec::new();
        // (level, offset of the section command)
        let mut header_stack: Vec<(u8, usize)> = Vec::new();

        for section in &latex.sections {
            let line = document.line_of(section.span.start);

            // Close any sections at this level or deeper
            while let Some(&(level, start)) = header_stack.last() {
                if level < section.level {
                    break;
                }
                let end = Self::bounded_end(document, latex, start, line.saturating_sub(1));
                ranges.push(fold(document.line_of(start), end));
                header_stack.pop();
            }
            header_stack.push((section.level, section.span.start));
        }

        // ----- CLEANUP AT DOCUMENT END -----
        let last_line = document.last_line();
        for (_, start) in header_stack {
            let end = Self::bounded_end(document, latex, start, last_line);
            ranges.push(fold(document.line_of(start), end));
        }

        ranges
    }

    /// Clamp a section end to the line before its enclosing `\end`
    fn bounded_end(document: &Document, latex: &LatexStructure, offset: usize, end: u32) -> u32 {
        match enclosing_environment(latex, offset) {
            Some(environment) => end.min(document.line_of(environment.end.start).saturating_sub(1)),
            None => end,
        }
    }

    fn environment_ranges(document: &Document, latex: &LatexStructure) -> Vec<FoldingRange> {
        latex
            .environments
            .iter()
            .map(|environment| {
                fold(
                    document.line_of(environment.begin.start),
                    document.line_of(environment.end.start),
                )
            })
            .collect()
    }

    fn entry_ranges(document: &Document, bibtex: &BibtexStructure) -> Vec<FoldingRange> {
        bibtex
            .entries
            .iter()
            .map(|entry| {
                fold(
                    document.line_of(entry.span.start),
                    document.line_of(entry.span.end.saturating_sub(1)),
                )
            })
            .collect()
    }
}

/// Innermost environment whose body contains `offset`
fn enclosing_environment(latex: &LatexStructure, offset: usize) -> Option<&Environment> {
    latex
        .environments
        .iter()
        .filter(|env| env.begin.end <= offset && offset < env.end.start)
        .min_by_key(|env| env.end.start - env.begin.end)
}

fn fold(start_line: u32, end_line: u32) -> FoldingRange {
    FoldingRange {
        start_line,
        end_line,
        kind: Some(FoldingRangeKind::Region),
        start_character: None,
        end_character: None,
        collapsed_text: None,
    }
}
