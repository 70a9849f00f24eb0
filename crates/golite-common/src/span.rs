//! Byte positions and spans.
//!
//! All positions live in one global space: the `SourceMap` assigns each file
//! a disjoint base offset, so a `Span` alone identifies its file.

use std::fmt;
use std::ops::Range;

/// An absolute byte offset.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BytePos(pub u32);

impl BytePos {
    #[inline]
    pub const fn new(pos: u32) -> Self {
        Self(pos)
    }

    #[inline]
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for BytePos {
    #[inline]
    fn from(pos: u32) -> Self {
        Self(pos)
    }
}

impl fmt::Debug for BytePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BytePos({})", self.0)
    }
}

impl fmt::Display for BytePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A half-open byte range `[start, end)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: BytePos,
    pub end: BytePos,
}

impl Span {
    #[inline]
    pub const fn new(start: BytePos, end: BytePos) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn from_u32(start: u32, end: u32) -> Self {
        Self {
            start: BytePos(start),
            end: BytePos(end),
        }
    }

    /// A span for nodes that have no source location.
    #[inline]
    pub const fn dummy() -> Self {
        Self::from_u32(0, 0)
    }

    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.start.0 == 0 && self.end.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.0.saturating_sub(self.start.0)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start.0 >= self.end.0
    }

    #[inline]
    pub const fn contains(&self, pos: BytePos) -> bool {
        self.start.0 <= pos.0 && pos.0 < self.end.0
    }

    /// Smallest span covering both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: BytePos(self.start.0.min(other.start.0)),
            end: BytePos(self.end.0.max(other.end.0)),
        }
    }

    /// From this span's start to `other`'s end.
    #[inline]
    pub const fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }

    /// The empty span sitting at this span's end.
    #[inline]
    pub const fn shrink_to_hi(self) -> Span {
        Span {
            start: self.end,
            end: self.end,
        }
    }
}

impl From<Range<u32>> for Span {
    #[inline]
    fn from(range: Range<u32>) -> Self {
        Self::from_u32(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    #[inline]
    fn from(span: Span) -> Self {
        span.start.to_usize()..span.end.to_usize()
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.0, self.end.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let span = Span::from_u32(4, 9);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(span.contains(BytePos(4)));
        assert!(!span.contains(BytePos(9)));
        assert!(Span::dummy().is_dummy());
    }

    #[test]
    fn test_span_combine() {
        let a = Span::from_u32(2, 5);
        let b = Span::from_u32(8, 12);
        assert_eq!(a.to(b), Span::from_u32(2, 12));
        assert_eq!(b.merge(a), Span::from_u32(2, 12));
        assert_eq!(b.shrink_to_hi(), Span::from_u32(12, 12));
    }

    #[test]
    fn test_span_conversions() {
        let span: Span = (3..7).into();
        let range: Range<usize> = span.into();
        assert_eq!(range, 3..7);
        assert_eq!(format!("{:?}", span), "3..7");
    }
}
