//! Output formatting for search hits and resolved entries.

use crate::error::Result;
use crate::index::symbols::{MethodKind, SourceInfo};
use crate::query::Entry;
use memchr::memmem;
use std::io::{self, Write};
use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Rendering style for resolved entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Ansi,
}

/// One full-text search hit ready for display.
pub struct SearchHit {
    /// Document name recovered from the blob footer.
    pub path: String,
    /// Context bytes around the match.
    pub context: Vec<u8>,
}

/// Print full-text hits, one per line: magenta path, then the context with
/// every occurrence of the search term highlighted.
pub fn print_search_hits(hits: &[SearchHit], term: &[u8], color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    for hit in hits {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(stdout, "{}", hit.path)?;
        stdout.reset()?;
        write!(stdout, ":")?;
        print_highlighted(&mut stdout, &hit.context, term)?;
        writeln!(stdout)?;
    }
    Ok(())
}

/// Write `text` with every occurrence of `term` in bold red. Works on byte
/// slices so highlight offsets never split the context mid-character.
fn print_highlighted(stdout: &mut StandardStream, text: &[u8], term: &[u8]) -> io::Result<()> {
    if term.is_empty() {
        write!(stdout, "{}", String::from_utf8_lossy(text))?;
        return Ok(());
    }

    let mut pos = 0;
    for start in memmem::find_iter(text, term) {
        // Overlapping occurrences collapse into the first.
        if start < pos {
            continue;
        }
        write!(stdout, "{}", String::from_utf8_lossy(&text[pos..start]))?;
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(
            stdout,
            "{}",
            String::from_utf8_lossy(&text[start..start + term.len()])
        )?;
        stdout.reset()?;
        pos = start + term.len();
    }
    write!(stdout, "{}", String::from_utf8_lossy(&text[pos..]))?;
    Ok(())
}

/// Render one resolved entry to a display string. Pure with respect to the
/// entry: the style is a parameter and the result is returned, never
/// printed here.
pub fn render(entry: &Entry, sources: &[SourceInfo], style: Style) -> Result<String> {
    let mut buf = match style {
        Style::Ansi => Buffer::ansi(),
        Style::Plain => Buffer::no_color(),
    };

    buf.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buf, "{}", entry.full_name())?;
    buf.reset()?;

    let source_indices = match entry {
        Entry::Namespace(ns) => {
            writeln!(buf, " (namespace)")?;
            &ns.sources
        }
        Entry::Method(m) => {
            let kind = match m.kind() {
                MethodKind::Class => "class method",
                MethodKind::Instance => "instance method",
            };
            writeln!(buf, " ({kind})")?;
            &m.sources
        }
    };

    write!(buf, "from:")?;
    for &idx in source_indices {
        match sources.get(idx as usize) {
            Some(source) => write!(buf, " {}", source.name)?,
            None => write!(buf, " #{idx}")?,
        }
    }
    writeln!(buf)?;

    Ok(String::from_utf8_lossy(buf.as_slice()).into_owned())
}
