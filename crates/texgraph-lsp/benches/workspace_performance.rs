//! Workspace Performance Benchmarks
//!
//! Targets:
//! - Related documents of a 250 chapter book: <1ms
//! - Diagnostics of the root of a 250 chapter book: <10ms
//! - Analysis of 100 concatenated chapters: <5ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use texgraph_lsp::config::Settings;
use texgraph_lsp::{dispatch, Document, Request, Workspace};
use tower_lsp::lsp_types::{Position, Url};

fn uri(path: &str) -> Url {
    Url::parse("file:///workspace/").unwrap().join(path).unwrap()
}

/// A book including `chapters` chapters and one bibliography
fn create_book(chapters: usize) -> Workspace {
    let mut workspace = Workspace::new();

    workspace.add(Document::open(uri("main.tex"), generate_main(chapters)).unwrap());
    for i in 1..=chapters {
        let path = format!("chapters/ch{:03}.tex", i);
        workspace.add(Document::open(uri(&path), generate_chapter(i, chapters)).unwrap());
    }
    workspace.add(Document::open(uri("refs.bib"), generate_bibliography(chapters)).unwrap());

    workspace
}

fn generate_main(chapters: usize) -> String {
    let mut content = String::from(
        "\\documentclass{book}\n\\usepackage{amsmath}\n\\begin{document}\n\\tableofcontents\n",
    );
    for i in 1..=chapters {
        content.push_str(&format!("\\include{{chapters/ch{:03}}}\n", i));
    }
    content.push_str("\\bibliography{refs}\n\\end{document}\n");
    content
}

fn generate_chapter(number: usize, total: usize) -> String {
    let previous = if number > 1 { number - 1 } else { total };
    format!(
        r#"\chapter{{Chapter {number}}}\label{{ch:{number}}}

This chapter builds on Chapter~\ref{{ch:{previous}}} and \cite{{key{number}}}.

\section{{Background}}\label{{sec:{number}:background}}

\begin{{equation}}\label{{eq:{number}}}
  E = mc^2
\end{{equation}}

\begin{{itemize}}
  \item First point, see Equation~\eqref{{eq:{number}}}.
  \item Second point % a comment with \ref{{ignored}}
\end{{itemize}}

\section{{Results}}
\newcommand{{\result{number}}}{{42}}
"#,
        number = number,
        previous = previous,
    )
}

fn generate_bibliography(entries: usize) -> String {
    (1..=entries)
        .map(|i| {
            format!(
                "@article{{key{i},\n  author = {{Author {i}}},\n  title = {{Title {i}}},\n  year = 2024,\n}}\n",
                i = i
            )
        })
        .collect()
}

/// Benchmark related-document traversal
fn bench_related_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("related_documents");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for chapters in [50, 250] {
        group.bench_with_input(BenchmarkId::new("forward", chapters), &chapters, |b, &count| {
            let workspace = create_book(count);
            let main = uri("main.tex");
            b.iter(|| black_box(workspace.related_documents(black_box(&main)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("project", chapters), &chapters, |b, &count| {
            let workspace = create_book(count);
            let chapter = uri("chapters/ch001.tex");
            b.iter(|| black_box(workspace.project_documents(black_box(&chapter)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the query dispatcher
fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(3));

    let workspace = create_book(250);
    let settings = Settings::default();
    let main = uri("main.tex");
    let chapter = uri("chapters/ch010.tex");

    group.bench_function("diagnostics_250_chapters", |b| {
        b.iter(|| {
            let request = workspace.diagnostics(&main).unwrap();
            black_box(dispatch(Request::Diagnostics(request), &settings).unwrap())
        });
    });

    group.bench_function("completion_label", |b| {
        b.iter(|| {
            // Inside the `\ref` group of the chapter introduction
            let request = workspace.completion(&chapter, Position::new(2, 38)).unwrap();
            black_box(dispatch(Request::Completion(request), &settings).unwrap())
        });
    });

    group.bench_function("folding_chapter", |b| {
        b.iter(|| {
            let request = workspace.folding(&chapter).unwrap();
            black_box(dispatch(Request::Folding(request), &settings).unwrap())
        });
    });

    group.bench_function("links_250_includes", |b| {
        b.iter(|| {
            let request = workspace.link(&main).unwrap();
            black_box(dispatch(Request::Link(request), &settings).unwrap())
        });
    });

    group.bench_function("rename_label", |b| {
        b.iter(|| {
            let request = workspace
                .rename(&chapter, Position::new(0, 29), "ch:ten")
                .unwrap();
            black_box(dispatch(Request::Rename(request), &settings))
        });
    });

    group.finish();
}

/// Benchmark document analysis
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    group.warm_up_time(Duration::from_millis(200));
    group.measurement_time(Duration::from_secs(2));

    let chapter: String = (1..=100).map(|i| generate_chapter(i, 100)).collect();
    let bibliography = generate_bibliography(500);

    group.bench_function("latex_100_chapters", |b| {
        b.iter(|| black_box(Document::open(uri("big.tex"), black_box(chapter.as_str())).unwrap()));
    });

    group.bench_function("bibtex_500_entries", |b| {
        b.iter(|| {
            black_box(Document::open(uri("big.bib"), black_box(bibliography.as_str())).unwrap())
        });
    });

    group.bench_function("add_document", |b| {
        let mut workspace = create_book(50);
        let content = generate_chapter(1, 50);
        b.iter(|| {
            let document = Document::open(uri("chapters/ch001.tex"), content.as_str()).unwrap();
            black_box(workspace.add(document))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_related_documents,
    bench_queries,
    bench_analysis
);
criterion_main!(benches);
