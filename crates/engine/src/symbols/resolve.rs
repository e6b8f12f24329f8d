//! [`SymbolResolver`] over the program-wide [`SymbolIndex`]

use super::{DeclId, Declaration, LiteralBinding, SymbolIndex, SymbolResolver};
use crate::source::SourceUnit;
use tree_sitter::Node;

impl SymbolIndex {
    /// Declaration an identifier or member access is bound to
    pub fn declaration_of(&self, unit: &SourceUnit, reference: Node<'_>) -> Option<&Declaration> {
        self.declaration_id_of(unit, reference)
            .and_then(|id| self.declaration(id))
    }

    fn declaration_id_of(&self, unit: &SourceUnit, reference: Node<'_>) -> Option<DeclId> {
        match reference.kind() {
            "identifier" | "undefined" => {
                self.lookup(unit, reference, unit.node_text(reference))
            }
            "member_expression" => {
                let object = reference.child_by_field_name("object")?;
                let property = reference.child_by_field_name("property")?;
                let container = self.container_of(unit, object)?;
                self.member(container, unit.node_text(property))
            }
            _ => None,
        }
    }

    /// Enum or namespace named by `node`
    fn container_of(&self, unit: &SourceUnit, node: Node<'_>) -> Option<DeclId> {
        let id = self.declaration_id_of(unit, node)?;
        self.declaration(id)
            .filter(|declaration| declaration.kind.is_container())
            .map(|_| id)
    }
}

impl SymbolResolver for SymbolIndex {
    fn resolve(&self, unit: &SourceUnit, reference: Node<'_>) -> Option<LiteralBinding> {
        let binding = self.declaration_of(unit, reference)?.binding();

        if binding.is_none() {
            tracing::trace!(
                file = %unit.path().display(),
                reference = unit.node_text(reference),
                "Reference has no literal binding"
            );
        }

        binding
    }
}
