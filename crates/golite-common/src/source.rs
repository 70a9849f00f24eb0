//! Source files and the global position space.

use std::fmt;

use crate::span::{BytePos, Span};

/// Index of a file inside a `SourceMap`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// One source file mapped at `base` in the global position space.
#[derive(Clone)]
pub struct SourceFile {
    id: FileId,
    name: String,
    source: String,
    base: BytePos,
}

impl SourceFile {
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Global span covering the whole file.
    pub fn span(&self) -> Span {
        Span::from_u32(self.base.0, self.base.0 + self.source.len() as u32)
    }

    /// Converts a global position into an offset inside this file.
    pub fn local_offset(&self, pos: BytePos) -> u32 {
        pos.0.saturating_sub(self.base.0)
    }

    /// Text under a global span, if it lies inside this file.
    pub fn snippet(&self, span: Span) -> Option<&str> {
        let start = self.local_offset(span.start) as usize;
        let end = self.local_offset(span.end) as usize;
        self.source.get(start..end)
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("base", &self.base)
            .field("len", &self.source.len())
            .finish()
    }
}

/// All files of a check, laid out back to back.
///
/// Position 0 is reserved for `Span::dummy`, so the first file starts at 1.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file and returns its id; spans into it start at `base_of(id)`.
    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> FileId {
        let base = self
            .files
            .last()
            .map(|f| f.span().end.0 + 1)
            .unwrap_or(1);
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile {
            id,
            name: name.into(),
            source: source.into(),
            base: BytePos(base),
        });
        id
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn base_of(&self, id: FileId) -> Option<BytePos> {
        self.file(id).map(|f| f.base)
    }

    /// Finds the file a span starts in. Empty spans at end-of-file still resolve.
    pub fn lookup_span(&self, span: Span) -> Option<&SourceFile> {
        self.files.iter().find(|f| {
            let whole = f.span();
            whole.start <= span.start && span.start <= whole.end
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_get_disjoint_bases() {
        let mut map = SourceMap::new();
        let a = map.add_file("a.go", "x := 1");
        let b = map.add_file("b.go", "y := 2");
        let base_a = map.base_of(a).unwrap();
        let base_b = map.base_of(b).unwrap();
        assert_eq!(base_a, BytePos(1));
        assert!(base_b.0 > base_a.0 + 6);
    }

    #[test]
    fn test_lookup_and_snippet() {
        let mut map = SourceMap::new();
        map.add_file("a.go", "x := 1");
        let id = map.add_file("b.go", "y := 2");
        let base = map.base_of(id).unwrap().0;
        let span = Span::from_u32(base + 5, base + 6);
        let file = map.lookup_span(span).unwrap();
        assert_eq!(file.name(), "b.go");
        assert_eq!(file.snippet(span), Some("2"));
        assert_eq!(file.local_offset(span.start), 5);
    }
}
