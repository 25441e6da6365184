//! Intelligence module for texgraph LSP
//!
//! This module provides smart editing features:
//! - Rename refactoring (labels and citation keys across related documents)

pub mod rename;


pub use rename::{PrepareRename, RenameAnalyzer, RenameResult};
