//! Command tables used by the LaTeX analyzer and by completion.

use crate::syntax::latex::IncludeKind;

/// Commands whose argument is a comma-separated list of label names
pub static LABEL_REFERENCE_COMMANDS: &[&str] = &[
    "ref", "eqref", "pageref", "autoref", "nameref", "vref", "Vref", "cref", "Cref", "cref*",
    "Cref*", "cpageref", "Cpageref", "labelcref", "labelcpageref", "crefrange", "Crefrange",
    "crefrange*", "Crefrange*",
];

/// Reference commands taking a second label group for the end of a range
pub static LABEL_RANGE_COMMANDS: &[&str] =
    &["crefrange", "Crefrange", "crefrange*", "Crefrange*"];

/// Commands whose argument is a comma-separated list of citation keys
pub static CITATION_COMMANDS: &[&str] = &[
    "cite",
    "cite*",
    "Cite",
    "nocite",
    "citet",
    "citet*",
    "citep",
    "citep*",
    "citeauthor",
    "citeauthor*",
    "Citeauthor",
    "Citeauthor*",
    "citetitle",
    "citetitle*",
    "citeyear",
    "citeyear*",
    "citedate",
    "citedate*",
    "citeurl",
    "fullcite",
    "citeyearpar",
    "citealt",
    "citealp",
    "citetext",
    "parencite",
    "parencite*",
    "Parencite",
    "footcite",
    "footfullcite",
    "footcitetext",
    "textcite",
    "Textcite",
    "smartcite",
    "supercite",
    "autocite",
    "autocite*",
    "Autocite",
    "Autocite*",
    "volcite",
    "Volcite",
    "pvolcite",
    "Pvolcite",
    "fvolcite",
    "ftvolcite",
    "svolcite",
    "Svolcite",
    "tvolcite",
    "Tvolcite",
    "avolcite",
    "Avolcite",
    "notecite",
    "pnotecite",
    "Pnotecite",
    "fnotecite",
    "citeA",
    "citeA*",
];

/// Sectioning commands with their nesting level
pub static SECTION_COMMANDS: &[(&str, u8)] = &[
    ("part", 0),
    ("chapter", 1),
    ("section", 2),
    ("subsection", 3),
    ("subsubsection", 4),
    ("paragraph", 5),
    ("subparagraph", 6),
];

/// Commands that define a new command
pub static COMMAND_DEFINITIONS: &[&str] = &[
    "newcommand",
    "newcommand*",
    "renewcommand",
    "renewcommand*",
    "providecommand",
    "providecommand*",
    "DeclareMathOperator",
    "DeclareMathOperator*",
    "DeclareRobustCommand",
    "DeclareRobustCommand*",
    "def",
];

/// Environments whose body is not LaTeX
pub static VERBATIM_ENVIRONMENTS: &[&str] = &[
    "verbatim",
    "verbatim*",
    "Verbatim",
    "lstlisting",
    "minted",
    "pycode",
    "asy",
    "comment",
];

/// Environments offered by completion even when no document uses them
pub static BUILTIN_ENVIRONMENTS: &[&str] = &[
    "document",
    "abstract",
    "itemize",
    "enumerate",
    "description",
    "figure",
    "table",
    "tabular",
    "center",
    "equation",
    "equation*",
    "align",
    "align*",
    "gather",
    "multline",
    "minipage",
    "quote",
    "quotation",
    "verbatim",
    "thebibliography",
];

/// Commands offered by completion even when no document defines them
pub static BUILTIN_COMMANDS: &[&str] = &[
    "documentclass",
    "usepackage",
    "begin",
    "end",
    "part",
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "label",
    "ref",
    "eqref",
    "pageref",
    "cite",
    "include",
    "input",
    "bibliography",
    "bibliographystyle",
    "addbibresource",
    "textbf",
    "textit",
    "emph",
    "item",
    "caption",
    "footnote",
    "newcommand",
    "renewcommand",
    "maketitle",
    "tableofcontents",
];

/// Classify an include command
pub fn include_kind(command: &str) -> Option<IncludeKind> {
    match command {
        "include" | "input" | "subfile" | "subfileinclude" => Some(IncludeKind::Latex),
        "bibliography" | "addbibresource" => Some(IncludeKind::Bibliography),
        "usepackage" | "RequirePackage" => Some(IncludeKind::Package),
        "documentclass" | "LoadClass" => Some(IncludeKind::Class),
        _ => None,
    }
}

/// Nesting level of a sectioning command, ignoring a trailing star
pub fn section_level(command: &str) -> Option<u8> {
    let name = command.strip_suffix('*').unwrap_or(command);
    SECTION_COMMANDS
        .iter()
        .find(|(section, _)| *section == name)
        .map(|(_, level)| *level)
}

pub fn is_label_reference(command: &str) -> bool {
    LABEL_REFERENCE_COMMANDS.contains(&command)
}

pub fn is_label_reference_range(command: &str) -> bool {
    LABEL_RANGE_COMMANDS.contains(&command)
}

pub fn is_citation(command: &str) -> bool {
    CITATION_COMMANDS.contains(&command)
}

pub fn is_command_definition(command: &str) -> bool {
    COMMAND_DEFINITIONS.contains(&command)
}

pub fn is_verbatim_environment(name: &str) -> bool {
    VERBATIM_ENVIRONMENTS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_kinds() {
        assert_eq!(include_kind("include"), Some(IncludeKind::Latex));
        assert_eq!(include_kind("input"), Some(IncludeKind::Latex));
        assert_eq!(include_kind("addbibresource"), Some(IncludeKind::Bibliography));
        assert_eq!(include_kind("usepackage"), Some(IncludeKind::Package));
        assert_eq!(include_kind("documentclass"), Some(IncludeKind::Class));
        assert_eq!(include_kind("section"), None);
    }

    #[test]
    fn test_section_levels() {
        assert_eq!(section_level("chapter"), Some(1));
        assert_eq!(section_level("section*"), Some(2));
        assert_eq!(section_level("label"), None);
    }

    #[test]
    fn test_citation_table() {
        assert!(is_citation("parencite"));
        assert!(is_citation("citeA*"));
        assert!(!is_citation("ref"));
    }

    #[test]
    fn test_range_commands_are_references() {
        for command in LABEL_RANGE_COMMANDS {
            assert!(is_label_reference(command));
            assert!(is_label_reference_range(command));
        }
        assert!(!is_label_reference_range("cref"));
    }
}
