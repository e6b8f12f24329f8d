//! Whole-program symbol information
//!
//! The [`SymbolIndex`] records every declaration of every unit in a
//! [`Program`](crate::source::Program), keyed by lexical scope. The
//! [`SymbolResolver`] trait is the narrow view the fragment traverser needs:
//! given an identifier or member access, the literal text its declaration
//! was initialised with.
//!
//! Resolution is deliberately one level deep. A declaration initialised with
//! another identifier does not bind, even if that identifier would.

mod index;
mod resolve;

pub use index::SymbolIndex;

use crate::source::{SourceUnit, UnitId};
use serde::Serialize;
use tplfold_core::SourceLocation;
use tree_sitter::Node;

/// Something that can map a reference to its literal binding
pub trait SymbolResolver {
    /// Literal text bound to `reference`, an identifier or member access
    /// node inside `unit`
    fn resolve(&self, unit: &SourceUnit, reference: Node<'_>) -> Option<LiteralBinding>;
}

/// Resolved text for one reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralBinding {
    pub text: String,
    pub kind: DeclarationKind,
    pub unit: UnitId,
    pub declared_at: SourceLocation,
}

/// What introduced a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Const,
    Let,
    Var,
    EnumMember,
    Function,
    Class,
    Enum,
    Namespace,
    Import,
    Parameter,
}

impl DeclarationKind {
    /// Kinds whose initializer may provide a literal binding
    pub fn binds_value(self) -> bool {
        matches!(self, Self::Const | Self::Let | Self::Var | Self::EnumMember)
    }

    /// Kinds whose members are reachable through member access
    pub fn is_container(self) -> bool {
        matches!(self, Self::Enum | Self::Namespace)
    }
}

/// Initializer of a declaration, as far as resolution cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    Missing,
    /// Cooked text of a literal-like initializer
    Literal(String),
    /// Any other initializer, by node kind
    Expression(&'static str),
}

/// Index of a declaration within its [`SymbolIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub(crate) usize);

/// One declared name
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub initializer: Initializer,
    pub unit: UnitId,
    pub location: SourceLocation,
}

impl Declaration {
    /// The literal binding this declaration provides, if any
    pub fn binding(&self) -> Option<LiteralBinding> {
        if !self.kind.binds_value() {
            return None;
        }
        match &self.initializer {
            Initializer::Literal(text) => Some(LiteralBinding {
                text: text.clone(),
                kind: self.kind,
                unit: self.unit,
                declared_at: self.location,
            }),
            Initializer::Missing | Initializer::Expression(_) => None,
        }
    }
}
