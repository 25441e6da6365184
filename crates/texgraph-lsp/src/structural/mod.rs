//! Structural intelligence for texgraph LSP
//!
//! This module provides per-document structure features:
//! - Folding ranges (sections, environments, bibliography entries)
//! - Document links (includes)

pub mod folding;
pub mod links;

pub use folding::FoldingAnalyzer;
pub use links::LinkAnalyzer;

#[cfg(test)]
mod tests;
