//! Structured documentation symbol index.
//!
//! Parses the flat-file index format (sources, namespaces, methods) into an
//! immutable in-memory structure and answers hierarchical, prefix and scoped
//! queries over it. The parsed index never mutates, so any number of threads
//! may query one instance concurrently.

pub mod reader;
pub mod types;
pub mod writer;

pub use reader::SymbolIndex;
pub use types::{
    MethodEntry, MethodKind, NamespaceEntry, NamespaceScope, SourceFilter, SourceInfo,
    TopLevelEntry, SYMBOL_INDEX_MAGIC,
};
