//! Full-text index builder.
//!
//! Builds the two on-disk artifacts from a set of named documents:
//! 1. the text blob - each document's body (stray markers stripped) followed
//!    by its `<<<<escaped-name>>>>` footer
//! 2. the suffix offset array - one 4-byte LE offset per word-boundary
//!    position, sorted by the bounded byte slice at each offset
//!
//! The offset array has no sentinel or header: readers derive the entry
//! count as `len / 4`.

use super::types::{escape_text, strip_markers, FullTextOptions, FOOTER_CLOSE, FOOTER_OPEN};
use crate::error::{Error, Result};
use ahash::AHashMap;
use rayon::prelude::*;
use std::io::Write;

/// Threshold above which suffix sorting goes parallel.
const PARALLEL_SORT_THRESHOLD: usize = 100_000;

/// Entries per write batch when emitting the offset array.
const WRITE_BATCH: usize = 4096;

/// Accumulates named documents and writes the full-text artifacts.
pub struct FullTextIndexer {
    max_query_size: usize,
    /// Registration order, duplicates included until [`Self::documents`] dedups.
    names: Vec<String>,
    docs: AHashMap<String, Vec<u8>>,
}

impl FullTextIndexer {
    pub fn new(options: FullTextOptions) -> Self {
        Self {
            max_query_size: options.max_query_size,
            names: Vec::new(),
            docs: AHashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FullTextOptions::default())
    }

    /// Register a document. Re-adding a name overwrites its data but keeps
    /// the name's original position in the document order.
    pub fn add_document(&mut self, name: &str, data: Vec<u8>) {
        self.docs.insert(name.to_string(), data);
        self.names.push(name.to_string());
    }

    /// Data currently registered under `name`.
    pub fn data(&self, name: &str) -> Option<&[u8]> {
        self.docs.get(name).map(Vec::as_slice)
    }

    /// Document names in first-registration order, deduplicated.
    pub fn documents(&self) -> Vec<&str> {
        let mut seen = AHashMap::new();
        let mut out = Vec::new();
        for name in &self.names {
            if seen.insert(name.as_str(), ()).is_none() {
                out.push(name.as_str());
            }
        }
        out
    }

    pub fn doc_count(&self) -> usize {
        self.documents().len()
    }

    /// Build and write both artifacts.
    ///
    /// Returns `(text_size, suffix_count)` for callers that persist metadata.
    pub fn build_index<T: Write, S: Write>(
        &self,
        text_out: &mut T,
        suffix_array_out: &mut S,
    ) -> Result<(u64, u64)> {
        let mut blob: Vec<u8> = Vec::new();
        // Body spans (footer excluded); suffix offsets are absolute.
        let mut spans: Vec<(usize, usize)> = Vec::new();

        for name in self.documents() {
            let body = strip_markers(&self.docs[name]);
            let start = blob.len();
            blob.extend_from_slice(&body);
            spans.push((start, blob.len()));
            blob.extend_from_slice(FOOTER_OPEN);
            blob.extend_from_slice(escape_text(name).as_bytes());
            blob.extend_from_slice(FOOTER_CLOSE);
        }

        if blob.len() > u32::MAX as usize {
            return Err(Error::Format(
                "text blob exceeds the 4-byte offset range".to_string(),
            ));
        }

        text_out.write_all(&blob)?;

        let mut suffixes: Vec<u32> = Vec::new();
        for &(start, end) in &spans {
            find_suffixes(&blob[start..end], start, &mut suffixes);
        }

        let max = self.max_query_size;
        let key = |&off: &u32| {
            let off = off as usize;
            &blob[off..blob.len().min(off + max)]
        };
        if suffixes.len() > PARALLEL_SORT_THRESHOLD {
            suffixes.par_sort_unstable_by(|a, b| key(a).cmp(key(b)));
        } else {
            suffixes.sort_unstable_by(|a, b| key(a).cmp(key(b)));
        }

        // Batched LE writes to keep syscall overhead down; chunking has no
        // effect on the on-disk order.
        let mut buffer = Vec::with_capacity(WRITE_BATCH * 4);
        for &offset in &suffixes {
            buffer.extend_from_slice(&offset.to_le_bytes());
            if buffer.len() >= WRITE_BATCH * 4 {
                suffix_array_out.write_all(&buffer)?;
                buffer.clear();
            }
        }
        if !buffer.is_empty() {
            suffix_array_out.write_all(&buffer)?;
        }

        Ok((blob.len() as u64, suffixes.len() as u64))
    }
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Record one suffix offset at the start of each maximal word run in `text`,
/// expressed as absolute blob offsets via `base`.
fn find_suffixes(text: &[u8], base: usize, out: &mut Vec<u32>) {
    let mut prev_word = false;
    for (i, &b) in text.iter().enumerate() {
        let word = is_word_byte(b);
        if word && !prev_word {
            out.push((base + i) as u32);
        }
        prev_word = word;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes_of(text: &[u8]) -> Vec<u32> {
        let mut out = Vec::new();
        find_suffixes(text, 0, &mut out);
        out
    }

    #[test]
    fn test_find_suffixes_word_starts() {
        assert_eq!(suffixes_of(b"this is a test "), vec![0, 5, 8, 10]);
        assert_eq!(suffixes_of(b"  leading"), vec![2]);
        assert_eq!(suffixes_of(b"one"), vec![0]);
        assert_eq!(suffixes_of(b"a_b c-d"), vec![0, 4, 6]);
        assert_eq!(suffixes_of(b"...---..."), Vec::<u32>::new());
        assert_eq!(suffixes_of(b""), Vec::<u32>::new());
    }

    #[test]
    fn test_find_suffixes_offset() {
        let mut out = Vec::new();
        find_suffixes(b"ab cd", 100, &mut out);
        assert_eq!(out, vec![100, 103]);
    }

    #[test]
    fn test_documents_stable_unique() {
        let mut indexer = FullTextIndexer::with_defaults();
        indexer.add_document("a", b"first".to_vec());
        indexer.add_document("b", b"other".to_vec());
        indexer.add_document("a", b"second".to_vec());

        // First-seen position, last-added data.
        assert_eq!(indexer.documents(), vec!["a", "b"]);
        assert_eq!(indexer.data("a"), Some(&b"second"[..]));
    }

    #[test]
    fn test_build_blob_layout() {
        let mut indexer = FullTextIndexer::with_defaults();
        indexer.add_document("foo.txt", b"this is a test ".to_vec());
        indexer.add_document("bar.txt", b"zzzz".to_vec());

        let (mut text, mut sarray) = (Vec::new(), Vec::new());
        let (text_size, suffix_count) = indexer.build_index(&mut text, &mut sarray).unwrap();

        assert_eq!(
            text,
            b"this is a test <<<<foo.txt>>>>zzzz<<<<bar.txt>>>>".to_vec()
        );
        assert_eq!(text_size as usize, text.len());
        assert_eq!(suffix_count, 5);

        let offsets: Vec<u32> = sarray
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        // Sorted by the bounded slice at each offset:
        // "a test ..." < "is a ..." < "test ..." < "this ..." < "zzzz..."
        assert_eq!(offsets, vec![8, 5, 10, 0, 30]);
    }

    #[test]
    fn test_build_strips_stray_markers() {
        let mut indexer = FullTextIndexer::with_defaults();
        indexer.add_document("doc", b"pre<<<<mid>>>>post".to_vec());

        let (mut text, mut sarray) = (Vec::new(), Vec::new());
        indexer.build_index(&mut text, &mut sarray).unwrap();

        assert_eq!(text, b"premidpost<<<<doc>>>>".to_vec());
    }

    #[test]
    fn test_build_escapes_names() {
        let mut indexer = FullTextIndexer::with_defaults();
        indexer.add_document("we|ird<name", b"body".to_vec());

        let (mut text, mut sarray) = (Vec::new(), Vec::new());
        indexer.build_index(&mut text, &mut sarray).unwrap();

        assert_eq!(text, b"body<<<<we||ird|<name>>>>".to_vec());
    }
}
