//! Index building and reading.
//!
//! Two independent engines live here:
//!
//! - [`fulltext`]: suffix-array full-text search over concatenated documents
//! - [`symbols`]: the flat-file namespace/method documentation index

pub mod fulltext;
pub mod symbols;
