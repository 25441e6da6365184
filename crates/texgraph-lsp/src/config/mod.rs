//! Configuration Engine
//!
//! Settings are loaded from `texgraph.toml` in the workspace root:
//!
//! ```toml
//! [workspace]
//! root_dir = "src/"
//! follow_parents = true
//!
//! [diagnostics]
//! undefined_labels = "error"
//! undefined_citations = "warning"
//! duplicate_labels = "ignore"
//! ignored_patterns = ["^Undefined string"]
//!
//! [completion]
//! matcher = "prefix"
//! ```
//!
//! The same structure is accepted as JSON in the client's
//! `initializationOptions`. Every section is optional.

mod settings;


pub use settings::{
    CompletionMatcher, CompletionSettings, DiagnosticsSettings, RuleSeverity, Settings,
    WorkspaceSettings,
};

/// Name of the configuration file looked up in the workspace root
pub const CONFIG_FILE: &str = "texgraph.toml";
