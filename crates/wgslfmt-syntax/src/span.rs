use std::ops::Range;

use derive_more::derive::{Deref, DerefMut};

/// A byte range into the source file.
///
/// Spans attached to syntax nodes are outer spans: a statement span includes
/// its terminating `;`, a declaration span includes its attributes. They do
/// not include surrounding whitespace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn extend(&self, other: &Span) -> Self {
        Self::new(self.start, other.end)
    }

    /// Shift the span by `by` bytes, e.g. to rebase a snippet-relative span
    /// onto the enclosing file.
    pub fn offset(&self, by: usize) -> Self {
        Self::new(self.start + by, self.end + by)
    }

    /// The source text this span covers.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range()]
    }
}

/// A syntax node paired with its outer [`Span`].
#[derive(Clone, Debug, Deref, DerefMut)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spanned<T> {
    pub span: Span,
    #[deref]
    #[deref_mut]
    pub node: T,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { span, node }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn node(&self) -> &T {
        &self.node
    }

    pub fn into_inner(self) -> T {
        self.node
    }
}

// spans are ignored for equality comparison
impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node.eq(&other.node)
    }
}
