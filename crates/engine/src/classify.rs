//! Node classification
//!
//! Maps a tree-sitter node onto the closed set of shapes the fragment
//! traverser knows how to walk. All functions here are pure.

use crate::literal::{canonical_number, cook_string, cook_template};
use crate::source::SourceUnit;
use tree_sitter::Node;

/// One classified node
#[derive(Debug, Clone)]
pub enum TemplateNode<'t> {
    /// String, number or substitution-free template, already cooked
    Literal(String),
    /// Template string with at least one `${...}` substitution
    Template(TemplateExpression<'t>),
    /// Binary expression; the operator is validated by the traverser
    Concatenation {
        left: Node<'t>,
        operator: &'static str,
        right: Node<'t>,
    },
    /// Parenthesized expression, carrying the inner expression
    Parenthesized(Node<'t>),
    /// Identifier or member access, resolved through the symbol index
    Reference(Node<'t>),
    /// Anything else
    Unsupported(Node<'t>),
}

/// Template string split into its head and spans
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExpression<'t> {
    pub head: String,
    pub spans: Vec<TemplateSpan<'t>>,
}

/// Substitution followed by the literal segment after it
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSpan<'t> {
    pub expression: Node<'t>,
    pub literal: String,
}

/// True for nodes that may start an extraction
pub fn is_entry_node(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "string" | "template_string" | "binary_expression"
    )
}

/// True for nodes that directly carry literal text
pub fn is_literal_like(node: Node<'_>) -> bool {
    match node.kind() {
        "string" | "number" => true,
        "template_string" => substitutions(node).next().is_none(),
        _ => false,
    }
}

/// Cooked text of a literal-like node
///
/// Returns `None` when the node is not literal-like or has no string value,
/// e.g. BigInt numbers or escapes denoting a lone surrogate.
pub fn literal_text(node: Node<'_>, unit: &SourceUnit) -> Option<String> {
    if !is_literal_like(node) {
        return None;
    }

    let text = unit.node_text(node);
    match node.kind() {
        "number" => canonical_number(text),
        "string" => cook_string(strip_delimiters(text)),
        _ => cook_template(strip_delimiters(text)),
    }
}

/// Classify `node` for traversal
pub fn classify<'t>(node: Node<'t>, unit: &SourceUnit) -> TemplateNode<'t> {
    if let Some(text) = literal_text(node, unit) {
        return TemplateNode::Literal(text);
    }

    match node.kind() {
        "template_string" => match template_expression(node, unit) {
            Some(template) => TemplateNode::Template(template),
            None => TemplateNode::Unsupported(node),
        },
        "binary_expression" => {
            match (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some(operator), Some(right)) => TemplateNode::Concatenation {
                    left,
                    operator: operator.kind(),
                    right,
                },
                _ => TemplateNode::Unsupported(node),
            }
        }
        "parenthesized_expression" => match first_expression(node) {
            Some(inner) => TemplateNode::Parenthesized(inner),
            None => TemplateNode::Unsupported(node),
        },
        "identifier" | "member_expression" | "undefined" => TemplateNode::Reference(node),
        _ => TemplateNode::Unsupported(node),
    }
}

fn template_expression<'t>(node: Node<'t>, unit: &SourceUnit) -> Option<TemplateExpression<'t>> {
    let source = unit.text();
    let segment = |start: usize, end: usize| cook_template(source.get(start..end).unwrap_or(""));

    // Segments lie between the backticks and around each `${...}`
    let mut cursor = node.start_byte() + 1;
    let end = node.end_byte().saturating_sub(1).max(cursor);

    let mut head = None;
    let mut spans: Vec<TemplateSpan<'t>> = Vec::new();
    let mut pending: Option<Node<'t>> = None;

    for substitution in substitutions(node) {
        let literal = segment(cursor, substitution.start_byte())?;
        match pending.take() {
            Some(expression) => spans.push(TemplateSpan {
                expression,
                literal,
            }),
            None => head = Some(literal),
        }
        cursor = substitution.end_byte();
        pending = Some(first_expression(substitution).unwrap_or(substitution));
    }

    match pending {
        Some(expression) => spans.push(TemplateSpan {
            expression,
            literal: segment(cursor, end)?,
        }),
        None => head = Some(segment(cursor, end)?),
    }

    Some(TemplateExpression {
        head: head.unwrap_or_default(),
        spans,
    })
}

fn substitutions<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    (0..node.named_child_count())
        .filter_map(move |i| node.named_child(i))
        .filter(|child| child.kind() == "template_substitution")
}

/// First named child that is not a comment
fn first_expression(node: Node<'_>) -> Option<Node<'_>> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .find(|child| child.kind() != "comment")
}

fn strip_delimiters(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Parse `const v = <expr>;` and hand back the initializer
    fn with_value<R>(expr: &str, check: impl FnOnce(Node<'_>, &SourceUnit) -> R) -> R {
        let unit = SourceUnit::parse("test.ts", format!("const v = {expr};")).unwrap();
        let root = unit.root();
        let declaration = root.named_child(0).unwrap();
        let declarator = declaration.named_child(0).unwrap();
        let value = declarator.child_by_field_name("value").unwrap();
        check(value, &unit)
    }

    #[test]
    fn test_entry_nodes() {
        for expr in ["'a'", "`a`", "`a${b}`", "'a' + b", "a - b"] {
            with_value(expr, |node, _| assert!(is_entry_node(node), "{expr}"));
        }
        for expr in ["1", "b", "(a)", "f()", "null"] {
            with_value(expr, |node, _| assert!(!is_entry_node(node), "{expr}"));
        }
    }

    #[test]
    fn test_literal_like() {
        for expr in ["'a'", "\"a\"", "`plain`", "42", "1e3"] {
            with_value(expr, |node, _| assert!(is_literal_like(node), "{expr}"));
        }
        for expr in ["`a${b}`", "a", "true", "null"] {
            with_value(expr, |node, _| assert!(!is_literal_like(node), "{expr}"));
        }
    }

    #[test]
    fn test_literal_text_is_cooked() {
        with_value(r"'it\'s\n'", |node, unit| {
            assert_eq!(literal_text(node, unit).as_deref(), Some("it's\n"));
        });
        with_value("1e3", |node, unit| {
            assert_eq!(literal_text(node, unit).as_deref(), Some("1000"));
        });
        with_value("`<b>`", |node, unit| {
            assert_eq!(literal_text(node, unit).as_deref(), Some("<b>"));
        });
        with_value("10n", |node, unit| {
            assert_eq!(literal_text(node, unit), None);
        });
        with_value(r"'\uDC00'", |node, unit| {
            assert_eq!(literal_text(node, unit), None);
        });
    }

    #[test]
    fn test_undecodable_template_is_unsupported() {
        with_value(r"`a\u{D800}b${c}`", |node, unit| {
            assert!(matches!(classify(node, unit), TemplateNode::Unsupported(_)));
        });
    }

    #[test]
    fn test_classify_template_expression() {
        with_value("`head${a}mid${ (b) }tail`", |node, unit| {
            let TemplateNode::Template(template) = classify(node, unit) else {
                panic!("expected template expression");
            };
            assert_eq!(template.head, "head");
            let literals: Vec<&str> = template.spans.iter().map(|s| s.literal.as_str()).collect();
            assert_eq!(literals, vec!["mid", "tail"]);
            assert_eq!(template.spans[0].expression.kind(), "identifier");
            assert_eq!(
                template.spans[1].expression.kind(),
                "parenthesized_expression"
            );
        });
    }

    #[test]
    fn test_classify_adjacent_substitutions() {
        with_value("`${a}${b}`", |node, unit| {
            let TemplateNode::Template(template) = classify(node, unit) else {
                panic!("expected template expression");
            };
            assert_eq!(template.head, "");
            assert_eq!(template.spans.len(), 2);
            assert!(template.spans.iter().all(|s| s.literal.is_empty()));
        });
    }

    #[test]
    fn test_classify_other_shapes() {
        with_value("'a' * b", |node, unit| match classify(node, unit) {
            TemplateNode::Concatenation { operator, .. } => assert_eq!(operator, "*"),
            other => panic!("unexpected {other:?}"),
        });
        with_value("('a')", |node, unit| match classify(node, unit) {
            TemplateNode::Parenthesized(inner) => assert_eq!(inner.kind(), "string"),
            other => panic!("unexpected {other:?}"),
        });
        with_value("NS.Member", |node, unit| {
            assert!(matches!(classify(node, unit), TemplateNode::Reference(_)));
        });
        with_value("call()", |node, unit| {
            assert!(matches!(classify(node, unit), TemplateNode::Unsupported(_)));
        });
    }
}
