//! Core types for the tplfold template folding system
//!
//! This crate provides the foundational pieces shared by the engine and the
//! command-line driver:
//!
//! - **Configuration**: rewrite and file discovery settings
//! - **Locations**: line/column positions of tree-sitter nodes
//! - **Error handling**: Unified error types
//!

pub mod config;
pub mod error;
pub mod location;

// Re-export main types for convenience
pub use config::{Config, FilesConfig, QuoteStyle, RewriteConfig, TransformKind};
pub use error::{Error, Result};
pub use location::SourceLocation;

