//! Entry types for the symbol index.

/// Magic header line of the flat-file symbol index. Loading fails on any
/// mismatch; there is no forward-compatible parsing.
pub const SYMBOL_INDEX_MAGIC: &str = "dxi symbol index v1";

/// Width of the `=` separator line terminating each file section.
pub(crate) const SEPARATOR_WIDTH: usize = 80;

/// One documentation-generating origin: an installed package contributing a
/// subset of the namespaces and methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub path: String,
}

/// Whether a method is a class method (`.` separator) or an instance method
/// (`#` separator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Class,
    Instance,
}

impl MethodKind {
    pub fn separator(self) -> char {
        match self {
            MethodKind::Class => '.',
            MethodKind::Instance => '#',
        }
    }
}

/// A class/module node. The same full name may be contributed to by several
/// sources (a namespace reopened across packages).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    /// Fully qualified `A::B::C` name.
    pub full_name: String,
    /// Ordinal position within the Namespaces section.
    pub index: usize,
    /// Indices of the sources contributing to this namespace.
    pub sources: Vec<u32>,
    /// The source the entry was retrieved under, when a query carried a
    /// source filter. `None` for unscoped retrievals.
    pub source_index: Option<u32>,
}

impl NamespaceEntry {
    /// Unqualified name, the last `::` segment.
    pub fn name(&self) -> &str {
        match self.full_name.rsplit_once("::") {
            Some((_, last)) => last,
            None => &self.full_name,
        }
    }
}

/// A method node keyed by its fully qualified name, e.g. `A::B#each` or
/// `A::B.parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    pub full_name: String,
    /// Ordinal position within the Methods section.
    pub index: usize,
    pub sources: Vec<u32>,
    pub source_index: Option<u32>,
}

impl MethodEntry {
    pub fn kind(&self) -> MethodKind {
        // The last segment contains exactly one separator; parsing rejects
        // method names without one.
        match self.full_name.rfind('#') {
            Some(_) => MethodKind::Instance,
            None => MethodKind::Class,
        }
    }

    /// Unqualified method name after the `#`/`.` separator.
    pub fn name(&self) -> &str {
        let sep = self
            .full_name
            .rfind(['#', '.'])
            .map(|p| p + 1)
            .unwrap_or(0);
        &self.full_name[sep..]
    }

    /// The owning namespace's full name.
    pub fn namespace(&self) -> &str {
        match self.full_name.rfind(['#', '.']) {
            Some(pos) => &self.full_name[..pos],
            None => &self.full_name,
        }
    }
}

/// Synthetic root container for top-level namespaces, optionally scoped to
/// one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelEntry {
    pub source_index: Option<u32>,
}

/// Restricts a query to entries contributed by one source. `Name` filters
/// matching no known source yield empty results, not errors.
#[derive(Debug, Clone, Copy, Default)]
pub enum SourceFilter<'a> {
    #[default]
    Any,
    Index(u32),
    Name(&'a str),
}

/// Anything usable as the scope of a descendant query: a bare namespace
/// name, a retrieved [`NamespaceEntry`], or the synthetic root. Entries
/// carry their retrieval source along, so walking a scoped hierarchy stays
/// within the source it was entered under.
pub trait NamespaceScope {
    fn scope_name(&self) -> &str;
    fn scope_source(&self) -> Option<u32> {
        None
    }
}

impl NamespaceScope for str {
    fn scope_name(&self) -> &str {
        self
    }
}

impl NamespaceScope for &str {
    fn scope_name(&self) -> &str {
        self
    }
}

impl NamespaceScope for NamespaceEntry {
    fn scope_name(&self) -> &str {
        &self.full_name
    }

    fn scope_source(&self) -> Option<u32> {
        self.source_index
    }
}

impl NamespaceScope for TopLevelEntry {
    fn scope_name(&self) -> &str {
        ""
    }

    fn scope_source(&self) -> Option<u32> {
        self.source_index
    }
}
