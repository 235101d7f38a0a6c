//! Suffix-array full-text engine.
//!
//! The write side ([`builder`]) concatenates documents into a single text
//! blob, marking each document's end with a `<<<<name>>>>` footer, and emits
//! a sorted array of 4-byte little-endian suffix offsets. The read side
//! ([`reader`]) binary-searches that array and extracts boundary-clipped
//! text windows around matches.
//!
//! ## File format
//!
//! Two artifacts, no headers:
//! - the raw text blob (documents + footers)
//! - the suffix offset array (`len / 4` entries, sorted by the bounded
//!   byte slice each offset points at)
//!
//! Compatibility is tracked out-of-band via [`types::FULLTEXT_FORMAT_VERSION`],
//! which callers persist alongside the artifacts (the CLI stores it in a
//! `meta.json` sidecar).

pub mod builder;
pub mod reader;
pub mod types;

pub use builder::FullTextIndexer;
pub use reader::{FullTextIndex, Match};
pub use types::{FullTextOptions, FulltextMeta, Pattern, FULLTEXT_FORMAT_VERSION, MAX_QUERY_SIZE};
