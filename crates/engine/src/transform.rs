//! String transforms applied to folded template text

use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tplfold_core::TransformKind;

/// Failure of a transform; the occurrence is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformError {
    #[error("transform rejected the template: {message}")]
    Rejected { message: String },

    #[error("transform panicked: {message}")]
    Panicked { message: String },
}

impl TransformError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// A function from joined template text to processed text
pub trait TemplateTransform {
    fn apply(&self, text: &str) -> Result<String, TransformError>;
}

impl<F> TemplateTransform for F
where
    F: Fn(&str) -> Result<String, TransformError>,
{
    fn apply(&self, text: &str) -> Result<String, TransformError> {
        self(text)
    }
}

/// Returns the text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TemplateTransform for Identity {
    fn apply(&self, text: &str) -> Result<String, TransformError> {
        Ok(text.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl TemplateTransform for Uppercase {
    fn apply(&self, text: &str) -> Result<String, TransformError> {
        Ok(text.to_uppercase())
    }
}

/// Whitespace and comment minifier for HTML templates
///
/// Comments are dropped, whitespace runs collapse to a single space, and
/// whitespace between a closing `>` and an opening `<` disappears.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyHtml;

impl TemplateTransform for MinifyHtml {
    fn apply(&self, text: &str) -> Result<String, TransformError> {
        let stripped = strip_comments(text)?;

        let mut out = String::with_capacity(stripped.len());
        let mut pending_space = false;
        for c in stripped.chars() {
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space && !out.is_empty() && !(out.ends_with('>') && c == '<') {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }

        Ok(out)
    }
}

fn strip_comments(text: &str) -> Result<String, TransformError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 4..];
        let end = body
            .find("-->")
            .ok_or_else(|| TransformError::rejected("unterminated HTML comment"))?;
        rest = &body[end + 3..];
    }

    out.push_str(rest);
    Ok(out)
}

/// The built-in transform selected by `kind`
pub fn builtin(kind: TransformKind) -> Box<dyn TemplateTransform> {
    match kind {
        TransformKind::Identity => Box::new(Identity),
        TransformKind::Uppercase => Box::new(Uppercase),
        TransformKind::Minify => Box::new(MinifyHtml),
    }
}

/// Run `transform`, turning a panic into [`TransformError::Panicked`]
pub fn apply_guarded(transform: &dyn TemplateTransform, text: &str) -> Result<String, TransformError> {
    panic::catch_unwind(AssertUnwindSafe(|| transform.apply(text))).unwrap_or_else(|payload| {
        Err(TransformError::Panicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
