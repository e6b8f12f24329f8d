//! Per-occurrence pipeline: visit, transform, rebuild
//!
//! A [`TemplateEntity`] wraps the value of one matched property. Each step
//! only runs when the previous one produced text, and every failure is
//! logged and recorded as a [`SkipReason`] instead of being propagated.

use crate::classify::is_entry_node;
use crate::literal::render_string_literal;
use crate::traverse::{fragments, Fragment, FragmentContext, TraversalError};
use crate::transform::{apply_guarded, TemplateTransform, TransformError};
use serde::Serialize;
use std::fmt;
use tplfold_core::{QuoteStyle, SourceLocation};
use tree_sitter::Node;

/// Progress of one entity; it only ever moves forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityState {
    Created,
    Visited(Option<String>),
    Transformed(Option<String>),
}

/// Why an occurrence was left as written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The value is not a string, template or binary expression
    NotEntryNode { kind: String },
    Traversal { error: TraversalError },
    /// The value, or the object literal holding it, failed to parse
    SyntaxError,
    /// Traversal produced no fragments at all
    Empty,
    Transform { error: TransformError },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEntryNode { kind } => write!(f, "value is a {kind}, not a foldable expression"),
            Self::Traversal { error } => write!(f, "failed to visit: {error}"),
            Self::SyntaxError => write!(f, "value is next to a syntax error"),
            Self::Empty => write!(f, "template produced no text"),
            Self::Transform { error } => write!(f, "failed to transform: {error}"),
        }
    }
}

/// One template occurrence moving through the pipeline
#[derive(Debug)]
pub struct TemplateEntity<'a> {
    node: Node<'a>,
    state: EntityState,
    skipped: Option<SkipReason>,
}

impl<'a> TemplateEntity<'a> {
    /// Whether extraction may start at `node`
    pub fn will_enter_at(node: Node<'_>) -> bool {
        is_entry_node(node)
    }

    pub fn new(node: Node<'a>) -> Self {
        Self {
            node,
            state: EntityState::Created,
            skipped: None,
        }
    }

    pub fn node(&self) -> Node<'a> {
        self.node
    }

    pub fn state(&self) -> &EntityState {
        &self.state
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        self.skipped.as_ref()
    }

    /// Extract and join the fragments of the wrapped node
    pub fn visit(&mut self, cx: FragmentContext<'a>) -> &mut Self {
        if self.state != EntityState::Created {
            return self;
        }

        if !Self::will_enter_at(self.node) {
            self.skip(SkipReason::NotEntryNode {
                kind: self.node.kind().to_string(),
            });
            self.state = EntityState::Visited(None);
            return self;
        }

        if has_syntax_error(self.node) {
            tracing::warn!(
                file = %cx.unit().path().display(),
                location = %self.location(),
                "Template is next to a syntax error"
            );
            self.skip(SkipReason::SyntaxError);
            self.state = EntityState::Visited(None);
            return self;
        }

        let result = fragments(self.node, cx).collect::<Result<Vec<Fragment>, TraversalError>>();
        let text = match result {
            Ok(parts) if parts.is_empty() => {
                self.skip(SkipReason::Empty);
                None
            }
            Ok(parts) => Some(parts.concat()),
            Err(error) => {
                tracing::warn!(
                    file = %cx.unit().path().display(),
                    location = %self.location(),
                    error = %error,
                    "Failed to visit template"
                );
                self.skip(SkipReason::Traversal { error });
                None
            }
        };

        self.state = EntityState::Visited(text);
        self
    }

    /// Apply `transform` to the visited text
    pub fn transform(&mut self, transform: &dyn TemplateTransform) -> &mut Self {
        if matches!(self.state, EntityState::Transformed(_)) {
            return self;
        }

        let outcome = match &self.state {
            EntityState::Visited(Some(text)) => Some(apply_guarded(transform, text)),
            _ => None,
        };

        let transformed = match outcome {
            None => None,
            Some(Ok(output)) => Some(output),
            Some(Err(error)) => {
                tracing::warn!(
                    location = %self.location(),
                    error = %error,
                    "Failed to transform template"
                );
                self.skip(SkipReason::Transform { error });
                None
            }
        };

        self.state = EntityState::Transformed(transformed);
        self
    }

    /// Source text of the replacement string literal, if there is one
    pub fn rebuild(&self, quote: QuoteStyle) -> Option<String> {
        match &self.state {
            EntityState::Transformed(Some(text)) => Some(render_string_literal(text, quote)),
            _ => None,
        }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::from_tree_sitter_node(self.node)
    }

    fn skip(&mut self, reason: SkipReason) {
        self.skipped.get_or_insert(reason);
    }
}

/// True when `node` or the property and object literal around it hold
/// ERROR or MISSING nodes
fn has_syntax_error(node: Node<'_>) -> bool {
    std::iter::successors(Some(node), |current| current.parent())
        .take(3)
        .any(|current| current.has_error())
}
