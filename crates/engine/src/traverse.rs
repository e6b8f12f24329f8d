//! Fragment extraction
//!
//! [`fragments`] walks an entry node depth-first and yields the literal text
//! pieces it is made of, in source order. The walk is pull-based: each call
//! to `next` does just enough work to produce one fragment, and the iterator
//! is fused after the first error so nothing is observable past a failure.

use crate::classify::{classify, TemplateNode};
use crate::source::SourceUnit;
use crate::symbols::SymbolResolver;
use serde::Serialize;
use std::iter::FusedIterator;
use thiserror::Error;
use tplfold_core::SourceLocation;
use tree_sitter::Node;

/// One indivisible piece of resolved literal text
pub type Fragment = String;

/// Why an entry node could not be reduced to literal text
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraversalError {
    #[error("can only join template parts with the \"+\" operator, saw \"{operator}\" at {location}")]
    UnsupportedOperator {
        operator: String,
        location: SourceLocation,
    },

    #[error("could not get a literal value for \"{path}\" at {location}")]
    UnresolvedReference {
        path: String,
        location: SourceLocation,
    },

    #[error("non-traversable {kind} found at {location}: {text}")]
    NonTraversableNode {
        #[serde(rename = "node_kind")]
        kind: String,
        text: String,
        location: SourceLocation,
    },
}

/// Per-pass inputs of a traversal
#[derive(Clone, Copy)]
pub struct FragmentContext<'a> {
    unit: &'a SourceUnit,
    resolver: &'a dyn SymbolResolver,
}

impl<'a> FragmentContext<'a> {
    pub fn new(unit: &'a SourceUnit, resolver: &'a dyn SymbolResolver) -> Self {
        Self { unit, resolver }
    }

    pub fn unit(&self) -> &'a SourceUnit {
        self.unit
    }
}

/// Lazily extract the fragments of `node`
pub fn fragments<'a>(node: Node<'a>, cx: FragmentContext<'a>) -> Fragments<'a> {
    Fragments {
        cx,
        stack: vec![Pending::Node(node)],
        failed: false,
    }
}

enum Pending<'a> {
    Node(Node<'a>),
    Text(String),
}

/// Iterator returned by [`fragments`]
pub struct Fragments<'a> {
    cx: FragmentContext<'a>,
    stack: Vec<Pending<'a>>,
    failed: bool,
}

impl Fragments<'_> {
    fn fail(&mut self, error: TraversalError) -> Option<Result<Fragment, TraversalError>> {
        self.failed = true;
        self.stack.clear();
        Some(Err(error))
    }
}

impl<'a> Iterator for Fragments<'a> {
    type Item = Result<Fragment, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let node = match self.stack.pop()? {
                Pending::Text(text) => return Some(Ok(text)),
                Pending::Node(node) => node,
            };

            match classify(node, self.cx.unit) {
                TemplateNode::Literal(text) => return Some(Ok(text)),
                TemplateNode::Concatenation {
                    left,
                    operator,
                    right,
                } => {
                    if operator != "+" {
                        let location = location_of(node);
                        return self.fail(TraversalError::UnsupportedOperator {
                            operator: operator.to_string(),
                            location,
                        });
                    }
                    self.stack.push(Pending::Node(right));
                    self.stack.push(Pending::Node(left));
                }
                TemplateNode::Template(template) => {
                    for span in template.spans.into_iter().rev() {
                        self.stack.push(Pending::Text(span.literal));
                        self.stack.push(Pending::Node(span.expression));
                    }
                    return Some(Ok(template.head));
                }
                TemplateNode::Parenthesized(inner) => self.stack.push(Pending::Node(inner)),
                TemplateNode::Reference(reference) => {
                    return match self.cx.resolver.resolve(self.cx.unit, reference) {
                        Some(binding) => Some(Ok(binding.text)),
                        None => {
                            let path = reference_path(self.cx.unit.node_text(reference));
                            self.fail(TraversalError::UnresolvedReference {
                                path,
                                location: location_of(reference),
                            })
                        }
                    };
                }
                TemplateNode::Unsupported(other) => {
                    return self.fail(TraversalError::NonTraversableNode {
                        kind: other.kind().to_string(),
                        text: self.cx.unit.node_text(other).to_string(),
                        location: location_of(other),
                    });
                }
            }
        }
    }
}

impl FusedIterator for Fragments<'_> {}

fn location_of(node: Node<'_>) -> SourceLocation {
    SourceLocation::from_tree_sitter_node(node)
}

/// `NS . Member` as `NS.Member`
fn reference_path(text: &str) -> String {
    text.split_whitespace().collect()
}
