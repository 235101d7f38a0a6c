//! Symbol index parsing and queries.

use super::types::{
    MethodEntry, MethodKind, NamespaceEntry, NamespaceScope, SourceFilter, SourceInfo,
    TopLevelEntry, SEPARATOR_WIDTH, SYMBOL_INDEX_MAGIC,
};
use crate::error::{Error, Result};
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The parsed, immutable symbol index.
///
/// Parsing is atomic: any malformed input fails the whole load and leaves no
/// partially populated index behind. Once built, all queries are `&self` and
/// safe to run from any number of threads.
pub struct SymbolIndex {
    sources: Vec<SourceInfo>,
    namespaces: Vec<NamespaceEntry>,
    methods: Vec<MethodEntry>,
    namespace_by_name: AHashMap<String, usize>,
    method_by_name: AHashMap<String, usize>,
}

/// A source filter with any name already resolved to its ordinal.
#[derive(Clone, Copy)]
enum Resolved {
    Any,
    Index(u32),
    /// Named a source this index does not know; every query yields nothing.
    Unmatched,
}

impl Resolved {
    fn admits(self, sources: &[u32]) -> bool {
        match self {
            Resolved::Any => true,
            Resolved::Index(i) => sources.contains(&i),
            Resolved::Unmatched => false,
        }
    }

    /// The `source_index` tag stamped onto retrieved entries.
    fn tag(self) -> Option<u32> {
        match self {
            Resolved::Index(i) => Some(i),
            _ => None,
        }
    }
}

impl SymbolIndex {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse the flat-file format from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let magic = next_line(&mut lines)?;
        if magic != SYMBOL_INDEX_MAGIC {
            return Err(Error::Format(format!(
                "bad magic line {magic:?}, expected {SYMBOL_INDEX_MAGIC:?}"
            )));
        }

        expect_header(&mut lines, "Sources:")?;
        let mut sources = Vec::new();
        for line in section_lines(&mut lines)? {
            let (name, path) = split_record(&line)
                .ok_or_else(|| Error::Format(format!("malformed source line {line:?}")))?;
            sources.push(SourceInfo {
                name: name.to_string(),
                path: path.to_string(),
            });
        }

        expect_header(&mut lines, "Namespaces:")?;
        let mut namespaces = Vec::new();
        let mut namespace_by_name = AHashMap::new();
        for (index, line) in section_lines(&mut lines)?.into_iter().enumerate() {
            let (full_name, source_indices) = parse_entry_line(&line, sources.len())?;
            namespace_by_name.insert(full_name.clone(), index);
            namespaces.push(NamespaceEntry {
                full_name,
                index,
                sources: source_indices,
                source_index: None,
            });
        }

        expect_header(&mut lines, "Methods:")?;
        let mut methods = Vec::new();
        let mut method_by_name = AHashMap::new();
        for (index, line) in section_lines(&mut lines)?.into_iter().enumerate() {
            let (full_name, source_indices) = parse_entry_line(&line, sources.len())?;
            if full_name.matches(['#', '.']).count() != 1 {
                return Err(Error::Format(format!(
                    "method name {full_name:?} lacks a single `#` or `.` separator"
                )));
            }
            method_by_name.insert(full_name.clone(), index);
            methods.push(MethodEntry {
                full_name,
                index,
                sources: source_indices,
                source_index: None,
            });
        }

        Ok(Self {
            sources,
            namespaces,
            methods,
            namespace_by_name,
            method_by_name,
        })
    }

    /// The ordered source list; a source's position is its ordinal index.
    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    /// The synthetic root container, scoped by `filter`. Empty when the
    /// filter names an unknown source.
    pub fn top_level_namespace(&self, filter: SourceFilter<'_>) -> Vec<TopLevelEntry> {
        match self.resolve(filter) {
            Resolved::Any => vec![TopLevelEntry { source_index: None }],
            Resolved::Index(i) => vec![TopLevelEntry {
                source_index: Some(i),
            }],
            Resolved::Unmatched => Vec::new(),
        }
    }

    /// Full names of all namespaces contributed to by a matching source, in
    /// section order.
    pub fn full_class_names(&self, filter: SourceFilter<'_>) -> Vec<String> {
        let resolved = self.resolve(filter);
        self.namespaces
            .iter()
            .filter(|e| resolved.admits(&e.sources))
            .map(|e| e.full_name.clone())
            .collect()
    }

    /// Full names of all methods contributed to by a matching source.
    pub fn full_method_names(&self, filter: SourceFilter<'_>) -> Vec<String> {
        let resolved = self.resolve(filter);
        self.methods
            .iter()
            .filter(|e| resolved.admits(&e.sources))
            .map(|e| e.full_name.clone())
            .collect()
    }

    /// Namespace names followed by method names.
    pub fn all_names(&self, filter: SourceFilter<'_>) -> Vec<String> {
        let mut names = self.full_class_names(filter);
        names.extend(self.full_method_names(filter));
        names
    }

    /// Exact-name namespace lookup, honoring the source filter.
    pub fn get_class_entry(&self, full_name: &str, filter: SourceFilter<'_>) -> Option<NamespaceEntry> {
        let resolved = self.resolve(filter);
        let entry = &self.namespaces[*self.namespace_by_name.get(full_name)?];
        if !resolved.admits(&entry.sources) {
            return None;
        }
        Some(tag_namespace(entry, resolved))
    }

    /// Exact-name method lookup, honoring the source filter.
    pub fn get_method_entry(&self, full_name: &str, filter: SourceFilter<'_>) -> Option<MethodEntry> {
        let resolved = self.resolve(filter);
        let entry = &self.methods[*self.method_by_name.get(full_name)?];
        if !resolved.admits(&entry.sources) {
            return None;
        }
        Some(tag_method(entry, resolved))
    }

    /// Strict descendants of `scope` in the Namespaces section: one level
    /// when `recursive` is false, any depth otherwise. An explicit `filter`
    /// overrides the scope's own source.
    pub fn namespaces_under<S>(
        &self,
        scope: &S,
        recursive: bool,
        filter: SourceFilter<'_>,
    ) -> Vec<NamespaceEntry>
    where
        S: NamespaceScope + ?Sized,
    {
        let resolved = self.resolve_scoped(scope, filter);
        let prefix = child_prefix(scope.scope_name());
        self.namespaces
            .iter()
            .filter(|e| {
                e.full_name.starts_with(&prefix)
                    && (recursive || !e.full_name[prefix.len()..].contains("::"))
                    && resolved.admits(&e.sources)
            })
            .map(|e| tag_namespace(e, resolved))
            .collect()
    }

    /// Methods owned by `namespace` (non-recursive: exactly, recursive: it
    /// or any nested namespace; the empty name recursively matches all).
    pub fn methods_under(
        &self,
        namespace: &str,
        recursive: bool,
        filter: SourceFilter<'_>,
    ) -> Vec<MethodEntry> {
        let resolved = self.resolve(filter);
        let prefix = child_prefix(namespace);
        self.methods
            .iter()
            .filter(|m| {
                let owner = m.namespace();
                let in_scope = if recursive {
                    namespace.is_empty() || owner == namespace || owner.starts_with(&prefix)
                } else {
                    owner == namespace
                };
                in_scope && resolved.admits(&m.sources)
            })
            .map(|m| tag_method(m, resolved))
            .collect()
    }

    /// For each container, its immediate child namespace named exactly
    /// `class_name`, scoped to the container's source. Concatenated across
    /// containers, so a name reopened by several sources yields one entry
    /// per contributing container.
    pub fn lookup_namespace_in<S>(&self, class_name: &str, containers: &[S]) -> Vec<NamespaceEntry>
    where
        S: NamespaceScope,
    {
        let mut out = Vec::new();
        for container in containers {
            out.extend(
                self.namespaces_under(container, false, SourceFilter::Any)
                    .into_iter()
                    .filter(|e| e.name() == class_name),
            );
        }
        out
    }

    /// Immediate children of each container whose unqualified name starts
    /// with `prefix` (empty prefix matches all). Used for completion.
    pub fn contained_namespaces_matching<S>(
        &self,
        prefix: &str,
        containers: &[S],
    ) -> Vec<NamespaceEntry>
    where
        S: NamespaceScope,
    {
        let mut out = Vec::new();
        for container in containers {
            out.extend(
                self.namespaces_under(container, false, SourceFilter::Any)
                    .into_iter()
                    .filter(|e| e.name().starts_with(prefix)),
            );
        }
        out
    }

    /// Methods of the given containers whose unqualified name starts with
    /// `fragment` (empty matches all) and whose kind matches (`None` =
    /// either), each container scoped to its own source. A namespace
    /// container contributes its direct methods; the synthetic root spans
    /// every method.
    pub fn find_methods<S>(
        &self,
        fragment: &str,
        kind: Option<MethodKind>,
        containers: &[S],
    ) -> Vec<MethodEntry>
    where
        S: NamespaceScope,
    {
        let mut out = Vec::new();
        for container in containers {
            let resolved = self.resolve_scoped(container, SourceFilter::Any);
            let namespace = container.scope_name();
            for m in &self.methods {
                let in_scope = namespace.is_empty() || m.namespace() == namespace;
                if in_scope
                    && m.name().starts_with(fragment)
                    && kind.is_none_or(|k| m.kind() == k)
                    && resolved.admits(&m.sources)
                {
                    out.push(tag_method(m, resolved));
                }
            }
        }
        out
    }

    fn resolve(&self, filter: SourceFilter<'_>) -> Resolved {
        match filter {
            SourceFilter::Any => Resolved::Any,
            SourceFilter::Index(i) if (i as usize) < self.sources.len() => Resolved::Index(i),
            SourceFilter::Index(_) => Resolved::Unmatched,
            SourceFilter::Name(name) => match self.sources.iter().position(|s| s.name == name) {
                Some(i) => Resolved::Index(i as u32),
                None => Resolved::Unmatched,
            },
        }
    }

    /// An explicit filter wins; otherwise the scope's own source applies.
    fn resolve_scoped<S>(&self, scope: &S, filter: SourceFilter<'_>) -> Resolved
    where
        S: NamespaceScope + ?Sized,
    {
        match filter {
            SourceFilter::Any => match scope.scope_source() {
                Some(i) => self.resolve(SourceFilter::Index(i)),
                None => Resolved::Any,
            },
            other => self.resolve(other),
        }
    }
}

fn tag_namespace(entry: &NamespaceEntry, resolved: Resolved) -> NamespaceEntry {
    NamespaceEntry {
        source_index: resolved.tag(),
        ..entry.clone()
    }
}

fn tag_method(entry: &MethodEntry, resolved: Resolved) -> MethodEntry {
    MethodEntry {
        source_index: resolved.tag(),
        ..entry.clone()
    }
}

/// `"A::B"` becomes `"A::B::"`; the root scope stays empty so every entry
/// qualifies as a descendant.
fn child_prefix(namespace: &str) -> String {
    if namespace.is_empty() {
        String::new()
    } else {
        format!("{namespace}::")
    }
}

fn next_line<I>(lines: &mut I) -> Result<String>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(Error::Format("unexpected end of index file".to_string())),
    }
}

fn expect_header<I>(lines: &mut I, header: &str) -> Result<()>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let line = next_line(lines)?;
    if line != header {
        return Err(Error::Format(format!(
            "expected section header {header:?}, got {line:?}"
        )));
    }
    Ok(())
}

fn is_separator(line: &str) -> bool {
    line.len() == SEPARATOR_WIDTH && line.bytes().all(|b| b == b'=')
}

/// Collect a section's record lines up to its `=` separator. Hitting EOF
/// first is a format error: sections are never left unterminated.
fn section_lines<I>(lines: &mut I) -> Result<Vec<String>>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut out = Vec::new();
    loop {
        let line = next_line(lines)?;
        if is_separator(&line) {
            return Ok(out);
        }
        out.push(line);
    }
}

/// Split a record into its name token and the remainder, trimmed.
fn split_record(line: &str) -> Option<(&str, &str)> {
    let name_end = line.find(char::is_whitespace)?;
    let rest = line[name_end..].trim_start();
    if rest.is_empty() {
        return None;
    }
    Some((&line[..name_end], rest))
}

/// Parse `<full_name> <idx> [<idx> ...]`, validating every source ordinal.
fn parse_entry_line(line: &str, source_count: usize) -> Result<(String, Vec<u32>)> {
    let (full_name, rest) = split_record(line)
        .ok_or_else(|| Error::Format(format!("malformed entry line {line:?}")))?;
    let mut indices = Vec::new();
    for token in rest.split_whitespace() {
        let idx: u32 = token
            .parse()
            .map_err(|_| Error::Format(format!("bad source index {token:?} in {line:?}")))?;
        if idx as usize >= source_count {
            return Err(Error::Format(format!(
                "source index {idx} out of range in {line:?}"
            )));
        }
        indices.push(idx);
    }
    Ok((full_name.to_string(), indices))
}
