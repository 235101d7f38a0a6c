//! Error taxonomy shared by the full-text and symbol index engines.
//!
//! "Not found" is never an error here: lookups return `Option` or an empty
//! `Vec`. Errors are reserved for malformed on-disk data, malformed queries,
//! misuse of the fetch API, and I/O failures.

use thiserror::Error;

/// Errors produced by index loading and querying.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or incompatible on-disk index data (bad magic line, missing
    /// section terminator, malformed record). The load that produced this
    /// never partially populates an index.
    #[error("incompatible index format: {0}")]
    Format(String),

    /// A query string that cannot be parsed into a name descriptor.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// `fetch_data` called with a positive offset; only backward shifts are
    /// supported.
    #[error("fetch offset must be <= 0, got {0}")]
    InvalidOffset(i64),

    /// I/O failure while opening or reading index data. Scoped to the failing
    /// operation; already-loaded in-memory indexes stay valid.
    #[error("index I/O failed")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
