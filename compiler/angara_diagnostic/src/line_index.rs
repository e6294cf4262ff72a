//! Byte offset → line/column conversion.
//!
//! Diagnostics store byte spans; the text emitter converts them to the
//! 1-based `line:col` pairs users see. Build a [`LineIndex`] once per file
//! and reuse it for every label.

/// Byte offsets of every line start in a source file.
#[derive(Clone, Debug, Default)]
pub struct LineIndex {
    /// `starts[n]` is the byte offset where line `n + 1` begins.
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0u32];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| u32::try_from(i + 1).unwrap_or(u32::MAX)),
        );
        LineIndex { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        let idx = match self.starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based `(line, column)` for `offset`. Columns count characters,
    /// not bytes, so multi-byte identifiers line up with what editors show.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        let start = self.starts[(line - 1) as usize] as usize;
        let end = (offset as usize).min(source.len());
        let column = source
            .get(start..end)
            .map_or(0, |prefix| prefix.chars().count());
        (line, u32::try_from(column).unwrap_or(u32::MAX - 1) + 1)
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// One-shot conversion for callers with a single offset to resolve.
pub fn line_col(source: &str, offset: u32) -> (u32, u32) {
    LineIndex::new(source).line_col(source, offset)
}
