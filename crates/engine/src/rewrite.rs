//! Rewrite visitor
//!
//! Walks a unit top-down looking for object-literal properties named after
//! the configured property (`template: ...`). Each match is driven through a
//! [`TemplateEntity`]; successful ones become byte-range replacements and are
//! not descended into, everything else is walked structurally so nested
//! occurrences are still found.

use crate::source::{Program, SourceUnit};
use crate::symbols::SymbolResolver;
use crate::template::{SkipReason, TemplateEntity};
use crate::transform::TemplateTransform;
use crate::traverse::FragmentContext;
use serde::Serialize;
use std::ops::Range;
use std::path::PathBuf;
use tplfold_core::{QuoteStyle, RewriteConfig, SourceLocation};
use tree_sitter::Node;

/// Options of one rewrite pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Key of the properties whose values are folded
    pub property_name: String,
    pub quote_style: QuoteStyle,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self::from(&RewriteConfig::default())
    }
}

impl From<&RewriteConfig> for RewriteOptions {
    fn from(config: &RewriteConfig) -> Self {
        Self {
            property_name: config.property_name.clone(),
            quote_style: config.quote_style,
        }
    }
}

/// A folded property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub location: SourceLocation,
    /// Byte range of the original value
    pub range: Range<usize>,
    pub original: String,
    /// Rendered string literal replacing the value
    pub literal: String,
}

/// An occurrence left as written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOccurrence {
    pub location: SourceLocation,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of rewriting one unit
#[derive(Debug, Clone, Serialize)]
pub struct RewrittenUnit {
    pub path: PathBuf,
    /// Full text with every replacement applied
    #[serde(skip)]
    pub source: String,
    pub replacements: Vec<Replacement>,
    pub skipped: Vec<SkippedOccurrence>,
    /// Occurrences that folded to exactly their current text
    pub unchanged: usize,
}

impl RewrittenUnit {
    pub fn is_changed(&self) -> bool {
        !self.replacements.is_empty()
    }

    /// Every matched occurrence, whatever became of it
    pub fn occurrences(&self) -> usize {
        self.replacements.len() + self.skipped.len() + self.unchanged
    }
}

/// Rewriting function over single units
pub struct Rewriter<'p> {
    resolver: &'p dyn SymbolResolver,
    transform: &'p dyn TemplateTransform,
    options: RewriteOptions,
}

/// Create a rewriter from the program's symbol service and a transform
pub fn rewriter<'p>(
    resolver: &'p dyn SymbolResolver,
    transform: &'p dyn TemplateTransform,
    options: RewriteOptions,
) -> Rewriter<'p> {
    Rewriter {
        resolver,
        transform,
        options,
    }
}

impl<'p> Rewriter<'p> {
    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Rewrite one unit
    ///
    /// Always succeeds; an occurrence that cannot be folded keeps its
    /// original text and is listed in [`RewrittenUnit::skipped`].
    pub fn rewrite(&self, unit: &SourceUnit) -> RewrittenUnit {
        let cx = FragmentContext::new(unit, self.resolver);
        let mut replacements = Vec::new();
        let mut skipped = Vec::new();
        let mut unchanged = 0;

        let mut stack = vec![unit.root()];
        while let Some(node) = stack.pop() {
            if let Some(value) = self.template_value(unit, node) {
                let mut entity = TemplateEntity::new(value);
                entity.visit(cx).transform(self.transform);

                match entity.rebuild(self.options.quote_style) {
                    Some(literal) => {
                        let original = unit.node_text(value);
                        if literal == original {
                            unchanged += 1;
                        } else {
                            tracing::debug!(
                                file = %unit.path().display(),
                                location = %entity.location(),
                                "Folded template"
                            );
                            replacements.push(Replacement {
                                location: entity.location(),
                                range: value.byte_range(),
                                original: original.to_string(),
                                literal,
                            });
                        }
                        // The replacement is opaque
                        continue;
                    }
                    None => {
                        if let Some(reason) = entity.skip_reason() {
                            skipped.push(SkippedOccurrence {
                                location: entity.location(),
                                reason: reason.clone(),
                            });
                        }
                    }
                }
            }

            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        let source = apply_replacements(unit.text(), &replacements);
        RewrittenUnit {
            path: unit.path().to_path_buf(),
            source,
            replacements,
            skipped,
            unchanged,
        }
    }

    /// Value of `node` if it is a `name: value` pair with the configured key
    fn template_value<'t>(&self, unit: &SourceUnit, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "pair" {
            return None;
        }
        let key = node.child_by_field_name("key")?;
        if key.kind() != "property_identifier" || unit.node_text(key) != self.options.property_name
        {
            return None;
        }
        node.child_by_field_name("value")
    }
}

/// Splice non-overlapping replacements into `source`
pub fn apply_replacements(source: &str, replacements: &[Replacement]) -> String {
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by_key(|replacement| replacement.range.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for replacement in ordered {
        let Some(before) = source.get(cursor..replacement.range.start) else {
            continue;
        };
        out.push_str(before);
        out.push_str(&replacement.literal);
        cursor = replacement.range.end;
    }
    out.push_str(source.get(cursor..).unwrap_or(""));
    out
}

impl Program {
    /// Rewrite every unit of the program with one transform
    pub fn rewrite_all(
        &self,
        transform: &dyn TemplateTransform,
        options: RewriteOptions,
    ) -> Vec<RewrittenUnit> {
        let rewriter = rewriter(self.symbols(), transform, options);
        self.units()
            .iter()
            .map(|unit| rewriter.rewrite(unit))
            .collect()
    }
}
