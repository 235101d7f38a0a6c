//! # DXI - Documentation Index and Search Engine
//!
//! DXI indexes documentation extracted from source comments and serves two
//! independent query engines over it:
//!
//! 1. **Full-text engine** - a suffix-array index over concatenated document
//!    text, answering substring-prefix queries by binary search with
//!    document-boundary-aware context extraction.
//! 2. **Symbol index** - a flat-file index of namespaces and methods from one
//!    or more documentation sources, answering scoped exact/descendant/prefix
//!    lookups used for completion and name resolution.
//!
//! ## Architecture
//!
//! - [`index`] - Index building and reading (full-text + symbol indexes)
//! - [`query`] - Name parsing and tiered resolution/disambiguation
//! - [`output`] - Result rendering (plain or ANSI)
//! - [`error`] - Error taxonomy shared by both engines
//!
//! ## Quick Start
//!
//! ```ignore
//! use dxi::index::fulltext::{FullTextIndexer, FullTextIndex, FullTextOptions};
//!
//! let mut indexer = FullTextIndexer::new(FullTextOptions::default());
//! indexer.add_document("intro.txt", "this is a test ".as_bytes().to_vec());
//! let (mut text, mut suffixes) = (Vec::new(), Vec::new());
//! indexer.build_index(&mut text, &mut suffixes).unwrap();
//!
//! let index = FullTextIndex::from_buffers(text, suffixes, FullTextOptions::default()).unwrap();
//! let hit = index.lookup(b"test").unwrap();
//! assert_eq!(hit.path, "intro.txt");
//! ```
//!
//! ## Concurrency
//!
//! Both engines are read-only after construction. The full-text index backs
//! onto memory-mapped (or in-memory) byte sources and every operation takes
//! `&self` with no shared cursor, so any number of threads may query one
//! instance. The symbol index is fully materialized by its parser before any
//! query runs.

pub mod error;
pub mod index;
pub mod output;
pub mod query;

pub use error::{Error, Result};
