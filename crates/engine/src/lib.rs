//! Static template folding over TypeScript and JavaScript syntax trees
//!
//! The engine finds object-literal properties such as `template: ...` whose
//! value is provably a compile-time string (literal concatenation, template
//! interpolation, or a reference to a literal constant), folds the value to a
//! single string, runs it through a [`TemplateTransform`] and replaces the
//! value with a string literal.
//!
//! - [`source`]: parsing files into a [`Program`]
//! - [`classify`]: node shapes the folder understands
//! - [`symbols`]: one-level literal resolution over the whole program
//! - [`traverse`]: lazy fragment extraction
//! - [`template`]: the visit/transform/rebuild pipeline of one occurrence
//! - [`rewrite`]: the tree walk that applies it

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod classify;
pub mod literal;
pub mod rewrite;
pub mod source;
pub mod symbols;
pub mod template;
pub mod transform;
pub mod traverse;

pub use rewrite::{
    apply_replacements, rewriter, Replacement, RewriteOptions, RewrittenUnit, Rewriter,
    SkippedOccurrence,
};
pub use source::{Dialect, Program, SourceUnit, UnitId};
pub use symbols::{LiteralBinding, SymbolIndex, SymbolResolver};
pub use template::{EntityState, SkipReason, TemplateEntity};
pub use transform::{builtin, TemplateTransform, TransformError};
pub use traverse::{fragments, Fragment, FragmentContext, Fragments, TraversalError};
