//! Full-text index reader.
//!
//! Binary search over the sorted suffix offset array, prefix-run walking,
//! and boundary-clipped text extraction. Sources are either memory-mapped
//! files or in-memory buffers; both are read-only, so every operation takes
//! `&self` and concurrent lookups need no synchronization.

use super::types::{
    unescape_text, FullTextOptions, Pattern, FOOTER_CLOSE, FOOTER_OPEN,
};
use crate::error::{Error, Result};
use memchr::memmem;
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Read-only byte source backing one index artifact.
#[derive(Debug)]
enum DataSource {
    Memory(Vec<u8>),
    Mapped(Mmap),
}

impl AsRef<[u8]> for DataSource {
    fn as_ref(&self) -> &[u8] {
        match self {
            DataSource::Memory(buf) => buf,
            DataSource::Mapped(map) => map,
        }
    }
}

/// One full-text match: a position in the sorted suffix array plus the
/// document it falls in. Produced per lookup and threaded explicitly by the
/// caller; holds no mutable state.
pub struct Match<'a> {
    engine: &'a FullTextIndex,
    /// The original lookup term.
    pub query: Vec<u8>,
    /// Position in the sorted suffix array.
    pub index: usize,
    /// Byte offset of the suffix in the text blob.
    pub offset: u32,
    /// Unescaped name of the document containing the suffix.
    pub path: String,
}

impl Match<'_> {
    /// Up to `size` bytes of text starting at the match, clipped at the
    /// document's end.
    pub fn text(&self, size: usize) -> Vec<u8> {
        self.engine.fetch_window(self.index, size, 0)
    }

    /// A window of up to `size` bytes on each side of the match, clipped at
    /// the document's boundaries.
    pub fn context(&self, size: usize) -> Vec<u8> {
        self.engine.fetch_window(self.index, 2 * size + 1, -(size as i64))
    }
}

impl fmt::Debug for Match<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("query", &String::from_utf8_lossy(&self.query))
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("path", &self.path)
            .finish()
    }
}

/// Reader over the text blob and suffix offset array.
#[derive(Debug)]
pub struct FullTextIndex {
    text: DataSource,
    suffixes: DataSource,
    max_query_size: usize,
}

impl FullTextIndex {
    /// Open both artifacts from disk via memory mapping.
    pub fn open(
        text_path: &Path,
        suffix_array_path: &Path,
        options: FullTextOptions,
    ) -> Result<Self> {
        let text_file = File::open(text_path)?;
        let text = unsafe { Mmap::map(&text_file)? };
        let sa_file = File::open(suffix_array_path)?;
        let suffixes = unsafe { Mmap::map(&sa_file)? };

        Self::validate(suffixes.len())?;
        Ok(Self {
            text: DataSource::Mapped(text),
            suffixes: DataSource::Mapped(suffixes),
            max_query_size: options.max_query_size,
        })
    }

    /// Open from in-memory buffers.
    pub fn from_buffers(
        text: Vec<u8>,
        suffix_array: Vec<u8>,
        options: FullTextOptions,
    ) -> Result<Self> {
        Self::validate(suffix_array.len())?;
        Ok(Self {
            text: DataSource::Memory(text),
            suffixes: DataSource::Memory(suffix_array),
            max_query_size: options.max_query_size,
        })
    }

    fn validate(suffix_array_len: usize) -> Result<()> {
        if suffix_array_len % 4 != 0 {
            return Err(Error::Format(format!(
                "suffix array length {suffix_array_len} is not a multiple of 4"
            )));
        }
        Ok(())
    }

    /// Number of entries in the suffix offset array.
    pub fn suffix_count(&self) -> usize {
        self.suffixes.as_ref().len() / 4
    }

    /// Total blob size in bytes, footers included.
    pub fn text_size(&self) -> usize {
        self.text.as_ref().len()
    }

    pub fn max_query_size(&self) -> usize {
        self.max_query_size
    }

    #[inline]
    fn offset_at(&self, index: usize) -> usize {
        let sa = self.suffixes.as_ref();
        let bytes: [u8; 4] = sa[index * 4..index * 4 + 4].try_into().unwrap();
        u32::from_le_bytes(bytes) as usize
    }

    /// The bounded slice a suffix is sorted and compared by.
    #[inline]
    fn bounded_at(&self, index: usize) -> &[u8] {
        self.window(self.offset_at(index), self.max_query_size)
    }

    /// Up to `size` blob bytes starting at `offset`, clipped at blob end.
    #[inline]
    fn window(&self, offset: usize, size: usize) -> &[u8] {
        let blob = self.text.as_ref();
        let start = offset.min(blob.len());
        &blob[start..blob.len().min(offset + size)]
    }

    /// Binary search for a suffix whose bounded slice starts with `term`.
    ///
    /// Converges to *a* matching index, not necessarily the first of a run
    /// of equal-prefix suffixes; use [`next_matches`](Self::next_matches) to
    /// walk the rest of the run.
    pub fn lookup(&self, term: &[u8]) -> Option<Match<'_>> {
        let count = self.suffix_count();
        if count == 0 {
            return None;
        }

        let mut from = 0usize;
        let mut to = count - 1;
        while from < to {
            let middle = (from + to) / 2;
            // `term <= pivot` descends left inclusive of the pivot.
            if term <= self.bounded_at(middle) {
                to = middle;
            } else {
                from = middle + 1;
            }
        }

        if !self.bounded_at(from).starts_with(term) {
            return None;
        }
        self.result_at(from, term)
    }

    /// First index after `result` still sharing the original query's prefix
    /// whose extracted text also satisfies `pattern` (`None` = any).
    pub fn next_match(&self, result: &Match<'_>, pattern: Option<&Pattern>) -> Option<Match<'_>> {
        self.walk_run(result, pattern, true).into_iter().next()
    }

    /// All indices after `result` in the same prefix run that satisfy
    /// `pattern`, in ascending index order.
    pub fn next_matches(&self, result: &Match<'_>, pattern: Option<&Pattern>) -> Vec<Match<'_>> {
        self.walk_run(result, pattern, false)
    }

    fn walk_run(
        &self,
        result: &Match<'_>,
        pattern: Option<&Pattern>,
        first_only: bool,
    ) -> Vec<Match<'_>> {
        let query = &result.query;
        let size = pattern
            .map(|p| p.extract_size(query.len()))
            .unwrap_or(query.len())
            .max(query.len());

        let mut matches = Vec::new();
        let count = self.suffix_count();
        for index in result.index + 1..count {
            let window = self.window(self.offset_at(index), size);
            // Suffixes are sorted by prefix: once the run breaks it never
            // resumes.
            if !window.starts_with(query) {
                break;
            }
            if pattern.is_none_or(|p| p.matches(window)) {
                if let Some(m) = self.result_at(index, query) {
                    matches.push(m);
                    if first_only {
                        break;
                    }
                }
            }
        }
        matches
    }

    fn result_at(&self, index: usize, query: &[u8]) -> Option<Match<'_>> {
        let offset = self.offset_at(index);
        let path = self.find_path(offset)?;
        Some(Match {
            engine: self,
            query: query.to_vec(),
            index,
            offset: offset as u32,
            path,
        })
    }

    /// Recover the containing document's name by scanning forward to the
    /// next footer.
    fn find_path(&self, offset: usize) -> Option<String> {
        let blob = self.text.as_ref();
        let open = offset + memmem::find(&blob[offset..], FOOTER_OPEN)?;
        let name_start = open + FOOTER_OPEN.len();
        let close = name_start + memmem::find(&blob[name_start..], FOOTER_CLOSE)?;
        Some(unescape_text(&String::from_utf8_lossy(
            &blob[name_start..close],
        )))
    }

    /// Extract up to `size` bytes relative to the suffix at `index`, shifted
    /// backward by `offset` (which must be `<= 0`), clipping the window at
    /// document footers.
    ///
    /// Clipping only scans the fetched window itself for footer markers: a
    /// neighboring document whose footer lies entirely outside the window is
    /// not detected, so the returned text can include foreign-document bytes.
    /// This is an accepted bounded approximation, not subject to unbounded
    /// scanning.
    pub fn fetch_data(&self, index: usize, size: usize, offset: i64) -> Result<Vec<u8>> {
        if offset > 0 {
            return Err(Error::InvalidOffset(offset));
        }
        Ok(self.fetch_window(index, size, offset))
    }

    fn fetch_window(&self, index: usize, size: usize, offset: i64) -> Vec<u8> {
        let base = self.offset_at(index) as i64;
        let start = base + offset;

        if start < 0 {
            // Window runs past the blob start: clamp to 0, shrink by the
            // excess.
            let excess = (-start) as usize;
            let newsize = size.saturating_sub(excess);
            let win = self.window(0, newsize + 4);
            let match_idx = (base as usize).min(win.len());
            let from = backward_clip(win, match_idx, 0);
            let to = forward_clip(win, match_idx).max(from);
            win[from..to].to_vec()
        } else if start < 8 {
            // Too close to the blob start for a preceding footer to fit.
            let start = start as usize;
            let win = self.window(start, size + 4);
            let match_idx = ((base as usize) - start).min(win.len());
            let to = forward_clip(win, match_idx);
            win[..to].to_vec()
        } else {
            // Read 4 extra bytes on each side so a marker straddling the
            // requested window is still seen.
            let wstart = start as usize - 4;
            let win = self.window(wstart, size + 8);
            let match_idx = ((base as usize) - wstart).min(win.len());
            let from = backward_clip(win, match_idx, 4.min(win.len()));
            let to = forward_clip(win, match_idx).max(from);
            win[from..to].to_vec()
        }
    }
}

/// End of the last footer before the match inside the window, or `default`.
fn backward_clip(win: &[u8], match_idx: usize, default: usize) -> usize {
    match memmem::rfind(&win[..match_idx], FOOTER_CLOSE) {
        Some(pos) => pos + FOOTER_CLOSE.len(),
        None => default,
    }
}

/// Start of the first footer at or after the match inside the window, or the
/// window edge (the overread bytes dropped).
fn forward_clip(win: &[u8], match_idx: usize) -> usize {
    match memmem::find(&win[match_idx..], FOOTER_OPEN) {
        Some(pos) => match_idx + pos,
        None => win.len().saturating_sub(4).max(match_idx),
    }
}
