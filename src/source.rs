//! Source management: file loading, stable source ids, and byte-span
//! bookkeeping.
//!
//! Every token, AST node, and diagnostic in the pipeline carries a [`Span`]
//! that refers back to a [`SourceManager`], so errors stay precisely
//! localized without any stage holding on to the source text itself.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Identifies a loaded source file. A dense index into the
/// [`SourceManager`]'s file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub u32);

impl SourceId {
    /// Sentinel id used by [`Span::invalid`].
    pub const INVALID: SourceId = SourceId(u32::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// A half-open `[start, end)` byte range within one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub source_id: SourceId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// The invalid/empty span.
    pub fn invalid() -> Span {
        Span {
            source_id: SourceId::INVALID,
            start: 0,
            end: 0,
        }
    }

    /// A single-byte span at `offset`.
    pub fn point(source_id: SourceId, offset: u32) -> Span {
        Span {
            source_id,
            start: offset,
            end: offset + 1,
        }
    }

    pub fn range(source_id: SourceId, start: u32, end: u32) -> Span {
        Span {
            source_id,
            start,
            end,
        }
    }

    pub fn is_valid(self) -> bool {
        self.source_id.is_valid() && self.start <= self.end
    }

    pub fn contains(self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn len(self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Convex union of two spans from the same source. Merging spans from
    /// different sources yields the invalid span.
    pub fn merge(self, other: Span) -> Span {
        if self.source_id != other.source_id {
            return Span::invalid();
        }
        Span {
            source_id: self.source_id,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A loaded source file: path, full content, and a line-start offset table
/// built once at load time.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    /// Byte offset of each line start. `line_offsets[0] == 0`; one entry per
    /// `\n`, pointing at the byte after it.
    line_offsets: Vec<u32>,
}

impl SourceFile {
    fn new(path: PathBuf, content: String) -> SourceFile {
        let line_offsets = compute_line_offsets(&content);
        SourceFile {
            path,
            content,
            line_offsets,
        }
    }

    /// Converts a byte offset to a 1-indexed `(line, column)` pair.
    /// Returns `(0, 0)` if the offset is past the end of the file.
    pub fn offset_to_line_col(&self, offset: u32) -> (u32, u32) {
        if self.line_offsets.is_empty() || offset as usize > self.content.len() {
            return (0, 0);
        }
        // First line start strictly greater than `offset`; the line that
        // contains the offset is the one before it.
        let idx = self.line_offsets.partition_point(|&start| start <= offset);
        if idx == 0 {
            return (1, offset + 1);
        }
        let line_start = self.line_offsets[idx - 1];
        (idx as u32, offset - line_start + 1)
    }

    /// Content of the 1-indexed line, without its trailing newline (or
    /// `\r\n`). Empty string when out of range.
    pub fn line(&self, line_number: u32) -> &str {
        if line_number == 0 || line_number as usize > self.line_offsets.len() {
            return "";
        }
        let idx = (line_number - 1) as usize;
        let start = self.line_offsets[idx] as usize;
        let mut end = if idx + 1 < self.line_offsets.len() {
            self.line_offsets[idx + 1] as usize
        } else {
            self.content.len()
        };
        if end > start && self.content.as_bytes()[end - 1] == b'\n' {
            end -= 1;
        }
        if end > start && self.content.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        &self.content[start..end]
    }

    pub fn line_count(&self) -> u32 {
        self.line_offsets.len() as u32
    }
}

fn compute_line_offsets(content: &str) -> Vec<u32> {
    let mut offsets = vec![0u32];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i as u32 + 1);
        }
    }
    offsets
}

/// Owns every loaded source file and provides span resolution.
///
/// Instance-scoped, never global: each compilation owns its manager, and
/// tests construct a fresh one per case.
#[derive(Debug, Default)]
pub struct SourceManager {
    files: Vec<SourceFile>,
}

impl SourceManager {
    pub fn new() -> SourceManager {
        SourceManager::default()
    }

    /// Loads a file from disk verbatim and assigns it the next id.
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<SourceId> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(self.push(SourceFile::new(path.to_path_buf(), content)))
    }

    /// Registers in-memory content under a virtual file name. Equivalent to
    /// [`SourceManager::load`] for everything downstream.
    pub fn load_from_string(
        &mut self,
        name: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> SourceId {
        self.push(SourceFile::new(name.into(), content.into()))
    }

    fn push(&mut self, file: SourceFile) -> SourceId {
        let id = SourceId(self.files.len() as u32);
        self.files.push(file);
        id
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile> {
        if !id.is_valid() {
            return None;
        }
        self.files.get(id.0 as usize)
    }

    /// The text covered by `span`. Empty for an invalid id or an
    /// out-of-range span; never an error.
    pub fn get_text(&self, span: Span) -> &str {
        let Some(file) = self.get(span.source_id) else {
            return "";
        };
        if !span.is_valid() || span.end as usize > file.content.len() {
            return "";
        }
        &file.content[span.start as usize..span.end as usize]
    }

    /// 1-indexed `(line, column)` of the span's start, or `(0, 0)` when the
    /// span cannot be resolved.
    pub fn get_line_col(&self, span: Span) -> (u32, u32) {
        match self.get(span.source_id) {
            Some(file) => file.offset_to_line_col(span.start),
            None => (0, 0),
        }
    }

    pub fn get_path(&self, id: SourceId) -> Option<&Path> {
        self.get(id).map(|f| f.path.as_path())
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
