//! Configuration module for the tplfold system
//!
//! This module provides configuration structures and loading mechanisms for the
//! rewrite pass and the file discovery done by the driver. Configuration can be
//! loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use defaults::*;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "tplfold.toml";

/// Quote character used when rendering replacement string literals
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuoteStyle {
    #[default]
    Double,
    Single,
}

impl QuoteStyle {
    /// The quote character itself
    pub fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

/// Built-in string transforms applied to folded template text
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransformKind {
    /// Leave the folded text as is
    Identity,
    /// Uppercase the folded text
    Uppercase,
    /// Collapse whitespace and strip comments from HTML templates
    #[default]
    Minify,
}

/// Main configuration structure for the tplfold system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rewrite pass configuration
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// File discovery configuration
    #[serde(default)]
    pub files: FilesConfig,
}

/// Configuration for the rewrite pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Object-literal property whose value is folded
    #[serde(default = "default_property_name")]
    pub property_name: String,

    /// Quote character of the emitted string literals
    #[serde(default)]
    pub quote_style: QuoteStyle,

    /// Transform applied to the folded text
    #[serde(default)]
    pub transform: TransformKind,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            property_name: default_property_name(),
            quote_style: QuoteStyle::default(),
            transform: TransformKind::default(),
        }
    }
}

/// Configuration for discovering source files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// File extensions (without the dot) that are loaded into the program
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns matched against file and directory names to skip
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.rewrite.property_name) {
            return Err(Error::config(format!(
                "Invalid property name '{}'. Must be a JavaScript identifier",
                self.rewrite.property_name
            )));
        }

        if self.files.extensions.is_empty() {
            return Err(Error::config(
                "files.extensions must list at least one extension".to_string(),
            ));
        }

        if let Some(ext) = self
            .files
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(Error::config(format!(
                "Invalid extension '{ext}'. Use the bare extension, e.g. \"ts\""
            )));
        }

        for pattern in &self.files.ignore_patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                Error::config(format!("Invalid ignore pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }
}

/// Returns true if `name` is usable as an identifier property key
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
