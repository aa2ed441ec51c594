//! A [`ParseError`] is the error type returned by [`parse`][crate::parse].

use annotate_snippets::{Level, Renderer, Snippet};
use thiserror::Error;

use crate::span::Span;

#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseErrorKind {
    #[error("invalid token")]
    InvalidToken,
    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("unexpected token {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: String },
    #[error("invalid diagnostic severity `{severity}`")]
    InvalidDiagnosticSeverity { severity: String },
}

impl ParseErrorKind {
    pub(crate) fn at(self, span: Span) -> ParseError {
        ParseError::new(self, span)
    }
}

/// A parse error with the byte range it applies to.
///
/// The span is relative to the text handed to [`parse`][crate::parse]; use
/// [`offset`][ParseError::offset] to rebase it when that text was itself a
/// slice of a larger file.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Shift the error span by `by` bytes.
    pub fn offset(mut self, by: usize) -> Self {
        self.span = self.span.offset(by);
        self
    }

    /// Render the error as an annotated snippet of `source`.
    pub fn render_on(&self, source: &str) -> String {
        let title = self.kind.to_string();
        let message = Level::Error.title(&title).snippet(
            Snippet::source(source).fold(true).annotation(
                Level::Error
                    .span(self.span.range())
                    .label("while parsing this"),
            ),
        );
        let renderer = Renderer::styled();
        let rendered = renderer.render(message).to_string();
        rendered
    }
}
