//! Scope-keyed declaration index built over every unit of a program

use super::{DeclId, Declaration, DeclarationKind, Initializer};
use crate::classify::literal_text;
use crate::source::{SourceUnit, UnitId};
use std::collections::HashMap;
use tplfold_core::SourceLocation;
use tree_sitter::Node;

/// A lexical scope, or the member table of an enum or namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ScopeKey {
    /// Shared top level of every script unit
    Global,
    /// Scope introduced by a node (module root, function, block, ...)
    Node { unit: UnitId, node: usize },
    /// Exported members of a container declaration
    Members(DeclId),
}

impl ScopeKey {
    fn of(unit: &SourceUnit, node: Node<'_>) -> Self {
        Self::Node {
            unit: unit.id(),
            node: node.id(),
        }
    }
}

/// Where declarations met during the walk are bound
#[derive(Debug, Clone, Copy)]
struct Frame {
    block: ScopeKey,
    function: ScopeKey,
    /// Namespace whose `export`ed declarations also become members
    container: Option<DeclId>,
}

/// Declarations of a whole program, keyed by scope
#[derive(Debug, Default)]
pub struct SymbolIndex {
    declarations: Vec<Declaration>,
    scopes: HashMap<ScopeKey, HashMap<String, DeclId>>,
}

impl SymbolIndex {
    /// Index every declaration of `units`
    pub fn build(units: &[SourceUnit]) -> Self {
        let mut index = Self::default();
        for unit in units {
            Collector {
                index: &mut index,
                unit,
            }
            .collect();
        }
        index
    }

    pub fn declaration_count(&self) -> usize {
        self.declarations.len()
    }

    pub fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.0)
    }

    /// Declaration `name` refers to when used at `at`
    ///
    /// Walks the enclosing scopes of `at` outwards and finishes at the
    /// program-wide global scope.
    pub fn lookup(&self, unit: &SourceUnit, at: Node<'_>, name: &str) -> Option<DeclId> {
        let mut current = Some(at);
        while let Some(node) = current {
            if let Some(id) = self.find(ScopeKey::of(unit, node), name) {
                return Some(id);
            }
            current = node.parent();
        }
        self.find(ScopeKey::Global, name)
    }

    /// Exported member `name` of an enum or namespace
    pub fn member(&self, container: DeclId, name: &str) -> Option<DeclId> {
        self.find(ScopeKey::Members(container), name)
    }

    fn find(&self, scope: ScopeKey, name: &str) -> Option<DeclId> {
        self.scopes.get(&scope)?.get(name).copied()
    }

    /// Record a declaration in `scope`
    ///
    /// The first declaration of a name in a scope wins, except that enums
    /// and namespaces merge with an earlier declaration of the same kind.
    fn add(&mut self, scope: ScopeKey, declaration: Declaration) -> DeclId {
        if let Some(existing) = self.find(scope, &declaration.name) {
            let merges = self
                .declaration(existing)
                .is_some_and(|prior| prior.kind.is_container() && prior.kind == declaration.kind);
            if merges {
                return existing;
            }
        }

        let id = DeclId(self.declarations.len());
        self.scopes
            .entry(scope)
            .or_default()
            .entry(declaration.name.clone())
            .or_insert(id);
        self.declarations.push(declaration);
        id
    }

    /// Make an existing declaration visible in another scope too
    fn alias(&mut self, scope: ScopeKey, name: &str, id: DeclId) {
        self.scopes
            .entry(scope)
            .or_default()
            .entry(name.to_string())
            .or_insert(id);
    }
}

/// Walks one unit and feeds its declarations into the index
struct Collector<'i, 'u> {
    index: &'i mut SymbolIndex,
    unit: &'u SourceUnit,
}

impl<'u> Collector<'_, 'u> {
    fn collect(&mut self) {
        let root = self.unit.root();
        let top = if self.unit.is_module() {
            ScopeKey::of(self.unit, root)
        } else {
            ScopeKey::Global
        };

        let mut stack = vec![(
            root,
            Frame {
                block: top,
                function: top,
                container: None,
            },
        )];

        while let Some((node, frame)) = stack.pop() {
            let declared = self.declare_at(node, frame);
            let child_frame = self.child_frame(node, frame, declared);

            let mut cursor = node.walk();
            let children: Vec<Node<'u>> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, child_frame)));
        }
    }

    /// Record whatever `node` declares; returns the namespace it opened
    fn declare_at(&mut self, node: Node<'u>, frame: Frame) -> Option<DeclId> {
        if is_function_like(node.kind()) {
            self.declare_parameters(node);
        }

        let exported = node
            .parent()
            .is_some_and(|parent| parent.kind() == "export_statement");

        match node.kind() {
            "lexical_declaration" => {
                let kind = match node.child(0).map(|keyword| keyword.kind()) {
                    Some("const") => DeclarationKind::Const,
                    _ => DeclarationKind::Let,
                };
                self.declare_variables(node, kind, frame.block, frame, exported);
            }
            "variable_declaration" => {
                self.declare_variables(node, DeclarationKind::Var, frame.function, frame, exported);
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                self.declare_named(node, DeclarationKind::Function, frame, exported);
            }
            "class_declaration" | "abstract_class_declaration" => {
                self.declare_named(node, DeclarationKind::Class, frame, exported);
            }
            "enum_declaration" => self.declare_enum(node, frame, exported),
            "internal_module" | "module" => return self.declare_namespace(node, frame, exported),
            "import_statement" => self.declare_imports(node, frame.block),
            "catch_clause" => {
                if let Some(parameter) = node.child_by_field_name("parameter") {
                    let scope = ScopeKey::of(self.unit, node);
                    for name in pattern_names(parameter) {
                        self.declare(scope, name, DeclarationKind::Parameter, Initializer::Missing);
                    }
                }
            }
            "for_in_statement" => self.declare_loop_binding(node, frame),
            _ => {}
        }

        None
    }

    fn child_frame(&self, node: Node<'u>, frame: Frame, declared: Option<DeclId>) -> Frame {
        let own = ScopeKey::of(self.unit, node);
        let kind = node.kind();

        if is_function_like(kind) {
            return Frame {
                block: own,
                function: own,
                container: None,
            };
        }

        match kind {
            "internal_module" | "module" => Frame {
                container: declared,
                ..frame
            },
            "statement_block"
                if node
                    .parent()
                    .is_some_and(|parent| matches!(parent.kind(), "internal_module" | "module")) =>
            {
                Frame {
                    block: own,
                    function: own,
                    container: frame.container,
                }
            }
            "statement_block" | "for_statement" | "for_in_statement" | "switch_body"
            | "catch_clause" | "class_body" => Frame {
                block: own,
                function: frame.function,
                container: None,
            },
            "export_statement" | "ambient_declaration" => frame,
            _ => Frame {
                container: None,
                ..frame
            },
        }
    }

    fn declare(
        &mut self,
        scope: ScopeKey,
        name_node: Node<'u>,
        kind: DeclarationKind,
        initializer: Initializer,
    ) -> DeclId {
        let name = self.unit.node_text(name_node).to_string();
        self.index.add(
            scope,
            Declaration {
                name,
                kind,
                initializer,
                unit: self.unit.id(),
                location: SourceLocation::from_tree_sitter_node(name_node),
            },
        )
    }

    /// Also expose an exported declaration as a member of the open namespace
    fn export_member(&mut self, frame: Frame, exported: bool, name_node: Node<'u>, id: DeclId) {
        if let (true, Some(container)) = (exported, frame.container) {
            let name = self.unit.node_text(name_node).to_string();
            self.index.alias(ScopeKey::Members(container), &name, id);
        }
    }

    fn declare_variables(
        &mut self,
        node: Node<'u>,
        kind: DeclarationKind,
        scope: ScopeKey,
        frame: Frame,
        exported: bool,
    ) {
        let mut cursor = node.walk();
        let declarators: Vec<Node<'u>> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "variable_declarator")
            .collect();

        for declarator in declarators {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };

            if name.kind() == "identifier" {
                let initializer = match declarator.child_by_field_name("value") {
                    None => Initializer::Missing,
                    Some(value) => match literal_text(value, self.unit) {
                        Some(text) => Initializer::Literal(text),
                        None => Initializer::Expression(value.kind()),
                    },
                };
                let id = self.declare(scope, name, kind, initializer);
                self.export_member(frame, exported, name, id);
            } else {
                for binding in pattern_names(name) {
                    let id = self.declare(scope, binding, kind, Initializer::Missing);
                    self.export_member(frame, exported, binding, id);
                }
            }
        }
    }

    fn declare_named(&mut self, node: Node<'u>, kind: DeclarationKind, frame: Frame, exported: bool) {
        if let Some(name) = node.child_by_field_name("name") {
            let id = self.declare(frame.block, name, kind, Initializer::Expression(node.kind()));
            self.export_member(frame, exported, name, id);
        }
    }

    fn declare_parameters(&mut self, function: Node<'u>) {
        let scope = ScopeKey::of(self.unit, function);
        let mut names = Vec::new();

        if let Some(parameter) = function.child_by_field_name("parameter") {
            names.extend(pattern_names(parameter));
        }
        if let Some(parameters) = function.child_by_field_name("parameters") {
            let mut cursor = parameters.walk();
            for parameter in parameters.named_children(&mut cursor) {
                let target = parameter.child_by_field_name("pattern").unwrap_or(parameter);
                names.extend(pattern_names(target));
            }
        }

        for name in names {
            self.declare(scope, name, DeclarationKind::Parameter, Initializer::Missing);
        }

        // A named function expression can refer to itself
        if matches!(function.kind(), "function_expression" | "function" | "generator_function") {
            if let Some(name) = function.child_by_field_name("name") {
                self.declare(
                    scope,
                    name,
                    DeclarationKind::Function,
                    Initializer::Expression(function.kind()),
                );
            }
        }
    }

    fn declare_enum(&mut self, node: Node<'u>, frame: Frame, exported: bool) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let id = self.declare(
            frame.block,
            name,
            DeclarationKind::Enum,
            Initializer::Expression(node.kind()),
        );
        self.export_member(frame, exported, name, id);

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let members = ScopeKey::Members(id);
        let mut cursor = body.walk();
        let entries: Vec<Node<'u>> = body.named_children(&mut cursor).collect();

        for entry in entries {
            let (member, value) = match entry.kind() {
                "comment" => continue,
                "enum_assignment" => match entry.child_by_field_name("name") {
                    Some(member) => (member, entry.child_by_field_name("value")),
                    None => continue,
                },
                _ => (entry, None),
            };

            let initializer = match value {
                None => Initializer::Missing,
                Some(value) => match literal_text(value, self.unit) {
                    Some(text) => Initializer::Literal(text),
                    None => Initializer::Expression(value.kind()),
                },
            };

            // Quoted member names are keyed by their cooked text
            let member_name = if member.kind() == "string" {
                literal_text(member, self.unit).unwrap_or_default()
            } else {
                self.unit.node_text(member).to_string()
            };

            self.index.add(
                members,
                Declaration {
                    name: member_name,
                    kind: DeclarationKind::EnumMember,
                    initializer,
                    unit: self.unit.id(),
                    location: SourceLocation::from_tree_sitter_node(member),
                },
            );
        }
    }

    /// Declare `namespace A.B.C`, returning the innermost namespace
    fn declare_namespace(&mut self, node: Node<'u>, frame: Frame, exported: bool) -> Option<DeclId> {
        let name = node.child_by_field_name("name")?;
        let parts = name_parts(name)?;
        let (first, rest) = parts.split_first()?;

        let initializer = Initializer::Expression(node.kind());
        let mut id = self.declare(
            frame.block,
            *first,
            DeclarationKind::Namespace,
            initializer.clone(),
        );
        self.export_member(frame, exported, *first, id);

        for part in rest {
            id = self.declare(
                ScopeKey::Members(id),
                *part,
                DeclarationKind::Namespace,
                initializer.clone(),
            );
        }

        Some(id)
    }

    fn declare_imports(&mut self, node: Node<'u>, scope: ScopeKey) {
        let mut names = Vec::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            match current.kind() {
                "import_specifier" => {
                    let local = current
                        .child_by_field_name("alias")
                        .or_else(|| current.child_by_field_name("name"));
                    names.extend(local.filter(|n| n.kind() == "identifier"));
                }
                "import_clause" | "namespace_import" | "named_imports" | "import_require_clause"
                | "import_statement" => {
                    let mut cursor = current.walk();
                    for child in current.named_children(&mut cursor) {
                        match child.kind() {
                            "identifier" => names.push(child),
                            "string" => {}
                            _ => stack.push(child),
                        }
                    }
                }
                _ => {}
            }
        }

        for name in names {
            self.declare(scope, name, DeclarationKind::Import, Initializer::Missing);
        }
    }

    fn declare_loop_binding(&mut self, node: Node<'u>, frame: Frame) {
        let Some(keyword) = node.child_by_field_name("kind") else {
            return;
        };
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };

        let (kind, scope) = match keyword.kind() {
            "var" => (DeclarationKind::Var, frame.function),
            "const" => (DeclarationKind::Const, ScopeKey::of(self.unit, node)),
            _ => (DeclarationKind::Let, ScopeKey::of(self.unit, node)),
        };

        for name in pattern_names(left) {
            self.declare(scope, name, kind, Initializer::Missing);
        }
    }
}

fn is_function_like(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
            | "class_static_block"
    )
}

/// Identifiers bound by a binding pattern
fn pattern_names(pattern: Node<'_>) -> Vec<Node<'_>> {
    let mut names = Vec::new();
    let mut stack = vec![pattern];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => names.push(node),
            "assignment_pattern" | "object_assignment_pattern" => {
                stack.extend(node.child_by_field_name("left"));
            }
            "pair_pattern" => stack.extend(node.child_by_field_name("value")),
            "object_pattern" | "array_pattern" | "rest_pattern" => {
                let mut cursor = node.walk();
                let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
            _ => {}
        }
    }

    names
}

/// `A.B.C` as its identifier nodes; `None` for quoted module names
fn name_parts(name: Node<'_>) -> Option<Vec<Node<'_>>> {
    match name.kind() {
        "identifier" => Some(vec![name]),
        "nested_identifier" | "member_expression" => {
            let mut parts = Vec::new();
            let mut stack = vec![name];
            while let Some(node) = stack.pop() {
                match node.kind() {
                    "identifier" | "property_identifier" => parts.push(node),
                    _ => {
                        let mut cursor = node.walk();
                        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
                        stack.extend(children.into_iter().rev());
                    }
                }
            }
            Some(parts)
        }
        _ => None,
    }
}
