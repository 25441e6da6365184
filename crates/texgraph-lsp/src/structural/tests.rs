//! TDD Tests for Structural Intelligence
//!
//! Tests folding ranges and include links.

use super::*;
use crate::requests::{Request, Response};
use crate::test_utils::WorkspaceBuilder;
use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind, Position, Range};

fn lines(ranges: &[FoldingRange]) -> Vec<(u32, u32)> {
    ranges
        .iter()
        .map(|range| (range.start_line, range.end_line))
        .collect()
}

fn folding(builder: &WorkspaceBuilder, path: &str) -> Vec<FoldingRange> {
    match builder.run(Request::Folding(builder.folding(path))).unwrap() {
        Response::Folding(ranges) => ranges,
        other => panic!("Expected folding response, got {:?}", other),
    }
}

// ==================== FOLDING TESTS ====================

mod folding_tests {
    use super::*;

    /// Test 1: Sections fold until the next section of the same level
    #[test]
    fn test_section_hierarchy() {
        let mut builder = WorkspaceBuilder::new();
        builder.document(
            "main.tex",
            "\\section{A}\ntext\n\\subsection{B}\ntext\n\\section{C}\ntext\n",
        );

        let ranges = folding(&builder, "main.tex");
        assert_eq!(lines(&ranges), vec![(0, 3), (2, 3), (4, 5)]);
        assert!(ranges
            .iter()
            .all(|range| range.kind == Some(FoldingRangeKind::Region)));
    }

    /// Test 2: Sections stop before the end of their environment
    #[test]
    fn test_section_inside_environment() {
        let mut builder = WorkspaceBuilder::new();
        builder.document(
            "main.tex",
            "\\begin{document}\n\\section{Intro}\nText\n\\end{document}\n",
        );

        let ranges = folding(&builder, "main.tex");
        assert_eq!(lines(&ranges), vec![(0, 3), (1, 2)]);
    }

    /// Test 3: Nested environments each fold
    #[test]
    fn test_nested_environments() {
        let mut builder = WorkspaceBuilder::new();
        builder.document(
            "main.tex",
            "\\begin{figure}\n\\begin{center}\nx\n\\end{center}\n\\end{figure}",
        );

        let ranges = folding(&builder, "main.tex");
        assert_eq!(lines(&ranges), vec![(0, 4), (1, 3)]);
    }

    /// Test 4: Single-line constructs do not fold
    #[test]
    fn test_single_line_dropped() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\begin{center}x\\end{center}\n\\section{Only}")
            .document("empty.tex", "");

        assert!(folding(&builder, "main.tex").is_empty());
        assert!(folding(&builder, "empty.tex").is_empty());
    }

    /// Test 5: Bibliography entries fold over their body
    #[test]
    fn test_bibtex_entries() {
        let mut builder = WorkspaceBuilder::new();
        builder.document(
            "refs.bib",
            "@article{a,\n  title = {T},\n}\n@book{b, title = {X}}\n",
        );

        let ranges = folding(&builder, "refs.bib");
        assert_eq!(lines(&ranges), vec![(0, 2)]);
    }

    /// Test 6: Only the requested document contributes
    #[test]
    fn test_independent_of_included_documents() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\include{chapter}")
            .document("chapter.tex", "\\section{A}\nx\ny\n");

        assert!(folding(&builder, "main.tex").is_empty());
        assert_eq!(lines(&folding(&builder, "chapter.tex")), vec![(0, 2)]);
    }
}

// ==================== LINK TESTS ====================

mod link_tests {
    use super::*;

    fn links(builder: &WorkspaceBuilder, path: &str) -> Vec<tower_lsp::lsp_types::DocumentLink> {
        match builder.run(Request::Link(builder.link(path))).unwrap() {
            Response::Link(links) => links,
            other => panic!("Expected link response, got {:?}", other),
        }
    }

    /// Test 7: Resolved and unresolved includes
    #[test]
    fn test_include_links() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document(
                "main.tex",
                "\\documentclass{article}\n\\usepackage{amsmath}\n\\include{chapter1}\n\\input{missing}\n\\bibliography{refs}\n",
            )
            .document("chapter1.tex", "")
            .document("refs.bib", "");

        let links = links(&builder, "main.tex");
        assert_eq!(links.len(), 5);

        assert_eq!(
            links[0].range,
            Range::new(Position::new(0, 15), Position::new(0, 22))
        );
        assert_eq!(links[0].target, None);

        assert_eq!(
            links[1].range,
            Range::new(Position::new(1, 12), Position::new(1, 19))
        );
        assert_eq!(links[1].target, None);

        assert_eq!(
            links[2].range,
            Range::new(Position::new(2, 9), Position::new(2, 17))
        );
        assert_eq!(
            links[2].target,
            Some(WorkspaceBuilder::uri("chapter1.tex"))
        );

        assert_eq!(
            links[3].range,
            Range::new(Position::new(3, 7), Position::new(3, 14))
        );
        assert_eq!(links[3].target, None);

        assert_eq!(
            links[4].range,
            Range::new(Position::new(4, 14), Position::new(4, 18))
        );
        assert_eq!(links[4].target, Some(WorkspaceBuilder::uri("refs.bib")));
    }

    /// Test 8: Documents without includes have no links
    #[test]
    fn test_no_links() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "Plain text")
            .document("refs.bib", "@book{k, title = {T}}");

        assert!(links(&builder, "main.tex").is_empty());
        assert!(links(&builder, "refs.bib").is_empty());
    }

    /// Test 9: Links resolve through the analyzer directly
    #[test]
    fn test_link_analyzer() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\input{sub/part}")
            .document("sub/part.tex", "");

        let document = builder.workspace.get(&WorkspaceBuilder::uri("main.tex")).unwrap();
        let links = LinkAnalyzer::generate_links(&builder.workspace, &document);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, Some(WorkspaceBuilder::uri("sub/part.tex")));
    }

    /// Test 10: Unresolved packages are reported with no target
    #[test]
    fn test_unresolved_package_link() {
        let mut builder = WorkspaceBuilder::new();
        builder.document("main.tex", "\\usepackage{mystyle}\n\\input{missing}\n");

        let links = links(&builder, "main.tex");

        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|link| link.target.is_none()));
        assert_eq!(
            links[0].range,
            Range::new(Position::new(0, 12), Position::new(0, 19))
        );
    }

    /// Test 11: A package kept in the project resolves to its style file
    #[test]
    fn test_local_package_link() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\usepackage{mystyle}")
            .document("mystyle.sty", "");

        let links = links(&builder, "main.tex");
        assert_eq!(links[0].target, Some(WorkspaceBuilder::uri("mystyle.sty")));
    }
}
