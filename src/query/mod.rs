//! Query parsing and resolution against the symbol index.
//!
//! [`parser`] turns a raw query string into a [`NameDescriptor`];
//! [`resolver`] matches descriptors against a loaded
//! [`SymbolIndex`](crate::index::symbols::SymbolIndex) in layered tiers
//! (exact, nested, partial) and drives name completion.

pub mod parser;
pub mod resolver;

pub use parser::NameDescriptor;
pub use resolver::{Entry, QueryData, QueryResolver};
