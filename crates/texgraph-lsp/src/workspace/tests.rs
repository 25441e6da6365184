//! TDD Tests for the Workspace
//!
//! Tests document storage, include resolution and related-document
//! traversal.

use super::*;
use crate::test_utils::WorkspaceBuilder;
use texgraph_core::Language;

fn uri(path: &str) -> Url {
    WorkspaceBuilder::uri(path)
}

fn uris(documents: &[Arc<Document>]) -> Vec<Url> {
    documents.iter().map(|doc| doc.uri().clone()).collect()
}

// ==================== STORAGE TESTS ====================

mod storage_tests {
    use super::*;

    /// Test 1: Added documents are retrievable in insertion order
    #[test]
    fn test_add_and_get() {
        let mut builder = WorkspaceBuilder::new();
        builder.document("b.tex", "").document("a.tex", "");

        let workspace = &builder.workspace;
        assert_eq!(workspace.len(), 2);
        assert!(workspace.get(&uri("a.tex")).is_some());
        assert!(workspace.get(&uri("c.tex")).is_none());

        let order: Vec<_> = workspace.iter().map(|doc| doc.file_name()).collect();
        assert_eq!(order, vec!["b.tex", "a.tex"]);
    }

    /// Test 2: A stale document is analyzed on insertion
    #[test]
    fn test_add_analyzes_stale_document() {
        let mut document = Document::create(uri("main.tex"), Language::Latex);
        document.set_text("\\label{fresh}");
        assert!(document.is_stale());

        let mut workspace = Workspace::new();
        let stored = workspace.add(document);

        assert!(!stored.is_stale());
        let latex = stored.structure().as_latex().unwrap();
        assert_eq!(latex.label_definitions[0].name, "fresh");
    }

    /// Test 3: Replacing a document keeps its position
    #[test]
    fn test_replace_keeps_order() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("a.tex", "old")
            .document("b.tex", "")
            .document("a.tex", "new");

        let workspace = &builder.workspace;
        assert_eq!(workspace.len(), 2);
        let first = workspace.iter().next().unwrap();
        assert_eq!(first.text(), "new");
    }

    /// Test 4: Removing a document keeps the order of the rest
    #[test]
    fn test_remove() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("a.tex", "")
            .document("b.tex", "")
            .document("c.tex", "");

        let removed = builder.workspace.remove(&uri("a.tex"));
        assert!(removed.is_some());
        assert!(builder.workspace.remove(&uri("a.tex")).is_none());

        let order: Vec<_> = builder.workspace.iter().map(|doc| doc.file_name()).collect();
        assert_eq!(order, vec!["b.tex", "c.tex"]);
    }

    /// Test 5: A snapshot is unaffected by later updates
    #[test]
    fn test_snapshot_isolation() {
        let mut builder = WorkspaceBuilder::new();
        builder.document("main.tex", "\\label{a}");
        let snapshot = builder.workspace.clone();

        builder.document("main.tex", "\\label{b}");

        let old = snapshot.get(&uri("main.tex")).unwrap();
        assert_eq!(old.text(), "\\label{a}");
    }
}

// ==================== RELATED DOCUMENTS TESTS ====================

mod related_tests {
    use super::*;

    /// Test 6: A lone document relates only to itself
    #[test]
    fn test_reflexive() {
        let mut builder = WorkspaceBuilder::new();
        builder.document("main.tex", "Hello");

        let related = builder.workspace.related_documents(&uri("main.tex")).unwrap();
        assert_eq!(uris(&related), vec![uri("main.tex")]);
    }

    /// Test 7: Include of a sibling file
    #[test]
    fn test_include_chapter() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\include{chapter1}")
            .document("chapter1.tex", "\\section{Intro}\\label{sec:intro}");

        let related = builder.workspace.related_documents(&uri("main.tex")).unwrap();
        assert_eq!(uris(&related), vec![uri("main.tex"), uri("chapter1.tex")]);

        // Inclusion is directed
        let related = builder
            .workspace
            .related_documents(&uri("chapter1.tex"))
            .unwrap();
        assert_eq!(uris(&related), vec![uri("chapter1.tex")]);
    }

    /// Test 8: Depth-first in reference order
    #[test]
    fn test_depth_first_order() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("c.tex", "")
            .document("b.tex", "")
            .document("a.tex", "\\input{c}")
            .document("main.tex", "\\input{a}\n\\input{b}");

        let related = builder.workspace.related_documents(&uri("main.tex")).unwrap();
        assert_eq!(
            uris(&related),
            vec![uri("main.tex"), uri("a.tex"), uri("c.tex"), uri("b.tex")]
        );
    }

    /// Test 9: Cycles terminate and list each document once
    #[test]
    fn test_cycle() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("a.tex", "\\input{b}")
            .document("b.tex", "\\input{a}");

        let related = builder.workspace.related_documents(&uri("a.tex")).unwrap();
        assert_eq!(uris(&related), vec![uri("a.tex"), uri("b.tex")]);

        let related = builder.workspace.related_documents(&uri("b.tex")).unwrap();
        assert_eq!(uris(&related), vec![uri("b.tex"), uri("a.tex")]);
    }

    /// Test 10: A document included twice appears once
    #[test]
    fn test_diamond() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\input{a}\\input{b}")
            .document("a.tex", "\\input{shared}")
            .document("b.tex", "\\input{shared}")
            .document("shared.tex", "");

        let related = builder.workspace.related_documents(&uri("main.tex")).unwrap();
        assert_eq!(
            uris(&related),
            vec![uri("main.tex"), uri("a.tex"), uri("shared.tex"), uri("b.tex")]
        );
    }

    /// Test 11: Includes of missing files are skipped
    #[test]
    fn test_missing_target_omitted() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\input{missing}\\bibliography{refs}")
            .document("refs.bib", "@book{k,}");

        let related = builder.workspace.related_documents(&uri("main.tex")).unwrap();
        assert_eq!(uris(&related), vec![uri("main.tex"), uri("refs.bib")]);
    }

    /// Test 12: Unknown URI is an error
    #[test]
    fn test_unknown_uri() {
        let builder = WorkspaceBuilder::new();
        let unknown = uri("nowhere.tex");

        let result = builder.workspace.related_documents(&unknown);
        assert!(matches!(result, Err(Error::DocumentNotFound(u)) if u == unknown));
        assert!(builder.workspace.project_documents(&unknown).is_err());
    }

    /// Test 13: Every request builder reports unknown URIs
    #[test]
    fn test_request_builders_unknown_uri() {
        let workspace = Workspace::new();
        let unknown = uri("nowhere.tex");
        let position = Position::new(0, 0);

        assert!(matches!(
            workspace.completion(&unknown, position),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            workspace.diagnostics(&unknown),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            workspace.folding(&unknown),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            workspace.link(&unknown),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            workspace.rename(&unknown, position, "x"),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            workspace.prepare_rename(&unknown, position),
            Err(Error::DocumentNotFound(_))
        ));
    }
}

// ==================== RESOLUTION TESTS ====================

mod resolution_tests {
    use super::*;

    /// Test 14: Explicit extension and bibliography extension
    #[test]
    fn test_extension_candidates() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\input{intro.tex}\n\\addbibresource{refs.bib}\n\\bibliography{more}")
            .document("intro.tex", "")
            .document("refs.bib", "")
            .document("more.bib", "");

        let related = builder.workspace.related_documents(&uri("main.tex")).unwrap();
        assert_eq!(
            uris(&related),
            vec![uri("main.tex"), uri("intro.tex"), uri("refs.bib"), uri("more.bib")]
        );
    }

    /// Test 15: Paths resolve relative to the including document
    #[test]
    fn test_relative_to_including_document() {
        let mut builder = WorkspaceBuilder::new();
        builder
            .document("main.tex", "\\include{chapters/one}")
            .document("chapters/one.tex", "\\input{two}")
            .document("chapters/two.tex", "");

        let related = builder.workspace.related_documents(&uri("main.tex")).unwrap();
        assert_eq!(
            uris(&related),
            vec![
                uri("main.tex"),
                uri("chapters/one.tex"),
                uri("chapters/two.tex")
            ]
        );
    }

    /// Test 16: Root directory as fallback base
    #[test]
    fn test_root_dir_fallback() {
        let options = WorkspaceOptions {
            root_dir: Some(Url::parse("file:///workspace").unwrap()),
            follow_parents: false,
        };
        let mut builder = WorkspaceBuilder::with_options(options);
        builder
            .document("main.tex", "\\include{chapters/one}")
            .document("chapters/one.tex", "\\input{figures/plot}")
            .document("figures/plot.tex", "");

        let related = builder
            .workspace
            .related_documents(&uri("chapters/one.tex"))
            .unwrap();
        assert_eq!(
            uris(&related),
            vec![uri("chapters/one.tex"), uri("figures/plot.tex")]
        );
    }

    /// Test 17: Relative root directory is taken from the workspace root
    #[test]
    fn test_options_from_settings() {
        let mut settings = Settings::default();
        settings.workspace.root_dir = Some("src".to_string());
        settings.workspace.follow_parents = true;

        let root = Url::parse("file:///project").unwrap();
        let options = WorkspaceOptions::from_settings(&settings, Some(&root));

        assert_eq!(
            options.root_dir,
            Some(Url::parse("file:///project/src").unwrap())
        );
        assert!(options.follow_parents);
    }
}

// ==================== PROJECT TESTS ====================

mod project_tests {
    use super::*;

    fn project(follow_parents: bool) -> WorkspaceBuilder {
        let options = WorkspaceOptions {
            root_dir: None,
            follow_parents,
        };
        let mut builder = WorkspaceBuilder::with_options(options);
        builder
            .document("main.tex", "\\include{a}\n\\include{b}")
            .document("a.tex", "")
            .document("b.tex", "");
        builder
    }

    /// Test 18: A chapter sees its parent and siblings
    #[test]
    fn test_project_documents() {
        let builder = project(false);

        let related = builder.workspace.project_documents(&uri("a.tex")).unwrap();
        assert_eq!(
            uris(&related),
            vec![uri("a.tex"), uri("main.tex"), uri("b.tex")]
        );
    }

    /// Test 19: Scope follows the configured direction
    #[test]
    fn test_scope() {
        let forward = project(false);
        assert_eq!(forward.workspace.scope(&uri("a.tex")).unwrap().len(), 1);

        let undirected = project(true);
        assert_eq!(undirected.workspace.scope(&uri("a.tex")).unwrap().len(), 3);
    }

    /// Test 20: Dependents of a changed chapter
    #[test]
    fn test_dependents() {
        let builder = project(false);

        let dependents = builder.workspace.dependents(&uri("a.tex"));
        assert_eq!(dependents, vec![uri("main.tex"), uri("a.tex")]);

        let dependents = builder.workspace.dependents(&uri("main.tex"));
        assert_eq!(dependents, vec![uri("main.tex")]);
    }
}
