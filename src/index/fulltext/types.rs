//! Types and constants for the full-text suffix-array engine.

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

/// Format-version string persisted by callers alongside the two on-disk
/// artifacts (neither file carries a header of its own).
pub const FULLTEXT_FORMAT_VERSION: &str = "dxi fulltext index v1";

/// Default bound on suffix comparisons. Suffixes are sorted, and binary
/// search pivots read, at most this many bytes.
pub const MAX_QUERY_SIZE: usize = 20;

/// Extraction bound used when a regex pattern restricts a prefix-run walk.
pub const MAX_REGEX_MATCH_SIZE: usize = 255;

/// Opens a document footer in the text blob.
pub const FOOTER_OPEN: &[u8] = b"<<<<";
/// Closes a document footer in the text blob.
pub const FOOTER_CLOSE: &[u8] = b">>>>";

/// Options shared by the builder and reader.
#[derive(Debug, Clone)]
pub struct FullTextOptions {
    /// Maximum number of bytes compared per suffix. Must match between the
    /// build that produced an index and the reader that searches it.
    pub max_query_size: usize,
}

impl Default for FullTextOptions {
    fn default() -> Self {
        Self {
            max_query_size: MAX_QUERY_SIZE,
        }
    }
}

/// Metadata sidecar written by the CLI next to the blob and suffix array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulltextMeta {
    /// Must equal [`FULLTEXT_FORMAT_VERSION`] for the artifacts to be opened.
    pub format_version: String,
    /// Number of documents concatenated into the blob.
    pub doc_count: usize,
    /// Total blob size in bytes, footers included.
    pub text_size: u64,
    /// Number of entries in the suffix offset array.
    pub suffix_count: u64,
}

/// Restriction applied while walking a run of same-prefix suffixes.
#[derive(Debug)]
pub enum Pattern {
    /// Substring that must occur in the extracted text.
    Term(Vec<u8>),
    /// Regex that must match the extracted text.
    Regex(Regex),
}

impl Pattern {
    /// How many bytes to extract per candidate when testing this pattern.
    pub fn extract_size(&self, query_len: usize) -> usize {
        match self {
            Pattern::Term(t) => query_len.max(t.len()),
            Pattern::Regex(_) => MAX_REGEX_MATCH_SIZE,
        }
    }

    /// Test the pattern against an extracted byte window.
    pub fn matches(&self, text: &[u8]) -> bool {
        match self {
            Pattern::Term(t) => memchr::memmem::find(text, t).is_some(),
            Pattern::Regex(re) => re.is_match(text),
        }
    }
}

/// Escape a document name for embedding in a footer: `|` becomes `||`,
/// then `<` becomes `|<`. Exact inverse of [`unescape_text`].
pub fn escape_text(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '|' => out.push_str("||"),
            '<' => out.push_str("|<"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape_text`]: `|<` becomes `<`, `||` becomes `|`.
pub fn unescape_text(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(ch) = chars.next() {
        if ch == '|' {
            match chars.next() {
                Some('|') => out.push('|'),
                Some('<') => out.push('<'),
                // Dangling escape; keep the byte rather than drop it.
                Some(other) => {
                    out.push('|');
                    out.push(other);
                }
                None => out.push('|'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strip stray footer markers from a document body so footers stay the only
/// occurrences of `<<<<`/`>>>>` in the blob. Single pass, as the delimiter
/// uniqueness invariant only requires removing literal 4-byte runs.
pub fn strip_markers(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut pos = 0;
    while pos < data.len() {
        let rest = &data[pos..];
        if rest.starts_with(FOOTER_OPEN) || rest.starts_with(FOOTER_CLOSE) {
            pos += 4;
        } else {
            out.push(data[pos]);
            pos += 1;
        }
    }
    out
}
