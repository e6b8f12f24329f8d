//! Parsed source units and whole programs
//!
//! A [`SourceUnit`] is one file parsed with the tree-sitter grammar matching
//! its extension. A [`Program`] owns every unit that takes part in a pass and
//! the [`SymbolIndex`] built over all of them, so identifiers in one unit can
//! resolve against script-level declarations of another.

use crate::symbols::SymbolIndex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tplfold_core::error::{Error, Result};
use tree_sitter::{Language, Node, Parser, Tree};

/// Syntax flavour a unit was parsed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    TypeScript,
    Tsx,
    JavaScript,
}

/// Grammar descriptor for automatic registration
pub struct GrammarDescriptor {
    pub dialect: Dialect,
    pub extensions: &'static [&'static str],
    pub language: fn() -> Language,
}

inventory::collect!(GrammarDescriptor);

fn typescript_language() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

fn tsx_language() -> Language {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

fn javascript_language() -> Language {
    tree_sitter_javascript::LANGUAGE.into()
}

inventory::submit! {
    GrammarDescriptor {
        dialect: Dialect::TypeScript,
        extensions: &["ts", "mts", "cts"],
        language: typescript_language,
    }
}

inventory::submit! {
    GrammarDescriptor {
        dialect: Dialect::Tsx,
        extensions: &["tsx"],
        language: tsx_language,
    }
}

inventory::submit! {
    GrammarDescriptor {
        dialect: Dialect::JavaScript,
        extensions: &["js", "jsx", "mjs", "cjs"],
        language: javascript_language,
    }
}

/// Find the grammar registered for a file's extension
pub fn grammar_for_path(path: &Path) -> Option<&'static GrammarDescriptor> {
    let extension = path.extension()?.to_str()?.to_lowercase();

    inventory::iter::<GrammarDescriptor>
        .into_iter()
        .find(|descriptor| descriptor.extensions.contains(&extension.as_str()))
}

/// Stable identifier of a unit within its [`Program`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub(crate) usize);

impl UnitId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One parsed file
pub struct SourceUnit {
    id: UnitId,
    path: PathBuf,
    dialect: Dialect,
    text: String,
    tree: Tree,
}

impl SourceUnit {
    /// Parse `text` with the grammar registered for the extension of `path`
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let text = text.into();

        let descriptor = grammar_for_path(&path).ok_or_else(|| {
            Error::parse(
                path.display().to_string(),
                "no grammar registered for this file extension",
            )
        })?;

        let mut parser = Parser::new();
        parser
            .set_language(&(descriptor.language)())
            .map_err(|e| Error::parse(path.display().to_string(), e.to_string()))?;

        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| Error::parse(path.display().to_string(), "parser produced no tree"))?;

        if tree.root_node().has_error() {
            tracing::debug!(
                file = %path.display(),
                "Source contains syntax errors; templates next to them will not be folded"
            );
        }

        Ok(Self {
            id: UnitId::default(),
            path,
            dialect: descriptor.dialect,
            text,
            tree,
        })
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`
    pub fn node_text(&self, node: Node<'_>) -> &str {
        self.text.get(node.byte_range()).unwrap_or("")
    }

    /// True when the unit has top-level imports or exports
    ///
    /// Module units keep their top-level declarations private; script units
    /// contribute theirs to the program-wide global scope.
    pub fn is_module(&self) -> bool {
        let root = self.root();
        let mut cursor = root.walk();
        let is_module = root
            .named_children(&mut cursor)
            .any(|child| matches!(child.kind(), "import_statement" | "export_statement"));
        is_module
    }
}

impl fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceUnit")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("dialect", &self.dialect)
            .field("len", &self.text.len())
            .finish()
    }
}

/// Every unit taking part in one pass, plus their shared symbol index
#[derive(Debug)]
pub struct Program {
    units: Vec<SourceUnit>,
    symbols: SymbolIndex,
}

impl Program {
    /// Assign unit ids and build the symbol index
    pub fn new(mut units: Vec<SourceUnit>) -> Self {
        for (index, unit) in units.iter_mut().enumerate() {
            unit.id = UnitId(index);
        }

        let symbols = SymbolIndex::build(&units);
        tracing::debug!(
            units = units.len(),
            declarations = symbols.declaration_count(),
            "Built program symbol index"
        );

        Self { units, symbols }
    }

    /// Parse `(path, text)` pairs into a program
    pub fn from_sources<I, P, S>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let units = sources
            .into_iter()
            .map(|(path, text)| SourceUnit::parse(path, text))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(units))
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&SourceUnit> {
        self.units.get(id.0)
    }

    pub fn symbols(&self) -> &SymbolIndex {
        &self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_lookup_by_extension() {
        let ts = grammar_for_path(Path::new("src/app.component.ts")).unwrap();
        assert_eq!(ts.dialect, Dialect::TypeScript);

        let tsx = grammar_for_path(Path::new("View.TSX")).unwrap();
        assert_eq!(tsx.dialect, Dialect::Tsx);

        let js = grammar_for_path(Path::new("legacy.mjs")).unwrap();
        assert_eq!(js.dialect, Dialect::JavaScript);

        assert!(grammar_for_path(Path::new("README.md")).is_none());
        assert!(grammar_for_path(Path::new("Makefile")).is_none());
    }

    #[test]
    fn test_parse_unknown_extension_fails() {
        let err = SourceUnit::parse("notes.txt", "hello").unwrap_err();
        assert!(err.to_string().contains("no grammar registered"));
    }

    #[test]
    fn test_module_detection() {
        let script = SourceUnit::parse("a.ts", "const A = 'a';").unwrap();
        assert!(!script.is_module());

        let module = SourceUnit::parse("b.ts", "export const B = 'b';").unwrap();
        assert!(module.is_module());

        let importer = SourceUnit::parse("c.js", "import { B } from './b';").unwrap();
        assert!(importer.is_module());
    }

    #[test]
    fn test_program_assigns_ids_in_order() {
        let program =
            Program::from_sources([("a.ts", "const A = 1;"), ("b.js", "var B = 2;")]).unwrap();

        let ids: Vec<usize> = program.units().iter().map(|u| u.id().index()).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(
            program.unit(UnitId(1)).map(|u| u.path().to_path_buf()),
            Some(PathBuf::from("b.js"))
        );
    }
}
