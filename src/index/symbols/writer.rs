//! Symbol index serialization.
//!
//! `dump` is the byte-exact inverse of parsing: a freshly parsed, unmodified
//! index serializes back to the input file.

use super::reader::SymbolIndex;
use super::types::SEPARATOR_WIDTH;
use crate::error::Result;
use std::io::Write;

impl SymbolIndex {
    /// Serialize the index in the flat-file format.
    pub fn dump<W: Write>(&self, out: &mut W) -> Result<()> {
        let separator = "=".repeat(SEPARATOR_WIDTH);

        writeln!(out, "{}", super::SYMBOL_INDEX_MAGIC)?;
        writeln!(out, "Sources:")?;
        for source in self.sources() {
            if source.name.len() < 32 {
                writeln!(out, "{:<32}{}", source.name, source.path)?;
            } else {
                writeln!(out, "{} {}", source.name, source.path)?;
            }
        }
        writeln!(out, "{separator}")?;

        writeln!(out, "Namespaces:")?;
        for entry in self.namespaces_under("", true, super::SourceFilter::Any) {
            write_entry(out, &entry.full_name, &entry.sources)?;
        }
        writeln!(out, "{separator}")?;

        writeln!(out, "Methods:")?;
        for entry in self.methods_under("", true, super::SourceFilter::Any) {
            write_entry(out, &entry.full_name, &entry.sources)?;
        }
        writeln!(out, "{separator}")?;
        Ok(())
    }
}

fn write_entry<W: Write>(out: &mut W, full_name: &str, sources: &[u32]) -> Result<()> {
    write!(out, "{full_name}")?;
    for idx in sources {
        write!(out, " {idx}")?;
    }
    writeln!(out)?;
    Ok(())
}
