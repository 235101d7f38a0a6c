//! Tiered query resolution.
//!
//! Resolution runs in strictly ordered tiers, stopping at the first tier
//! that yields anything:
//!
//! 1. exact full-name match
//! 2. nested match: the query names a suffix of a deeper qualified name
//! 3. partial match: the final fragment is a prefix (then a substring) of
//!    an unqualified name
//!
//! Ties within a tier are all returned; picking one is the caller's job.
//! Namespace suffixes are compared segment by segment, never by building a
//! pattern out of the query string.

use super::parser::NameDescriptor;
use crate::error::Result;
use crate::index::symbols::{
    MethodEntry, MethodKind, NamespaceEntry, SourceFilter, SymbolIndex,
};

/// A resolved candidate, either engine entry kind.
#[derive(Debug, Clone)]
pub enum Entry {
    Namespace(NamespaceEntry),
    Method(MethodEntry),
}

impl Entry {
    pub fn full_name(&self) -> &str {
        match self {
            Entry::Namespace(e) => &e.full_name,
            Entry::Method(e) => &e.full_name,
        }
    }
}

/// One keyword lookup's worth of state, returned as a value instead of
/// being stashed on the resolver.
#[derive(Debug, Clone)]
pub struct QueryData {
    pub desc: NameDescriptor,
    /// Namespaces matching the final path segment (prefix-wise for bare
    /// namespace queries, exactly for method queries).
    pub namespaces: Vec<NamespaceEntry>,
    /// `None` for pure namespace queries.
    pub methods: Option<Vec<MethodEntry>>,
}

/// Stateless facade over a loaded [`SymbolIndex`].
pub struct QueryResolver<'a> {
    index: &'a SymbolIndex,
}

impl<'a> QueryResolver<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self { index }
    }

    /// Resolve `query` through all three tiers.
    pub fn resolve(&self, query: &str) -> Result<Vec<Entry>> {
        self.resolve_tiers(query, true)
    }

    /// Resolve without the partial tier, for callers that need an exactly
    /// named entry (argument listings and the like).
    pub fn resolve_exact(&self, query: &str) -> Result<Vec<Entry>> {
        self.resolve_tiers(query, false)
    }

    fn resolve_tiers(&self, query: &str, allow_partial: bool) -> Result<Vec<Entry>> {
        let desc = NameDescriptor::parse(query)?;

        let exact = self.tier_exact(&desc);
        if !exact.is_empty() {
            return Ok(exact);
        }
        let nested = self.tier_nested(&desc);
        if !nested.is_empty() {
            return Ok(nested);
        }
        if allow_partial {
            return Ok(self.tier_partial(&desc));
        }
        Ok(Vec::new())
    }

    fn tier_exact(&self, desc: &NameDescriptor) -> Vec<Entry> {
        let path = desc.full_class_name();
        match desc.method_name.as_deref() {
            None => self
                .index
                .get_class_entry(&path, SourceFilter::Any)
                .map(Entry::Namespace)
                .into_iter()
                .collect(),
            // Trailing marker: every method of the marked kind directly on
            // the named namespace.
            Some("") => {
                if self.index.get_class_entry(&path, SourceFilter::Any).is_none() {
                    return Vec::new();
                }
                self.index
                    .methods_under(&path, false, SourceFilter::Any)
                    .into_iter()
                    .filter(|m| kind_matches(m, desc.kind))
                    .map(Entry::Method)
                    .collect()
            }
            Some(method) => {
                if desc.class_names.is_empty() {
                    return Vec::new();
                }
                let mut out = Vec::new();
                for kind in candidate_kinds(desc.kind) {
                    let full = format!("{path}{}{method}", kind.separator());
                    if let Some(e) = self.index.get_method_entry(&full, SourceFilter::Any) {
                        out.push(Entry::Method(e));
                    }
                }
                out
            }
        }
    }

    fn tier_nested(&self, desc: &NameDescriptor) -> Vec<Entry> {
        match desc.method_name.as_deref() {
            None => self
                .nested_namespaces(&desc.class_names)
                .into_iter()
                .map(Entry::Namespace)
                .collect(),
            Some("") => {
                let mut out = Vec::new();
                for ns in self.nested_namespaces(&desc.class_names) {
                    out.extend(
                        self.index
                            .methods_under(&ns.full_name, false, SourceFilter::Any)
                            .into_iter()
                            .filter(|m| kind_matches(m, desc.kind))
                            .map(Entry::Method),
                    );
                }
                out
            }
            Some(method) => self
                .index
                .methods_under("", true, SourceFilter::Any)
                .into_iter()
                .filter(|m| {
                    m.name() == method
                        && kind_matches(m, desc.kind)
                        && suffix_matches(m.namespace(), &desc.class_names)
                })
                .map(Entry::Method)
                .collect(),
        }
    }

    /// Namespaces whose path strictly ends with the descriptor's segments.
    fn nested_namespaces(&self, class_names: &[String]) -> Vec<NamespaceEntry> {
        if class_names.is_empty() {
            return Vec::new();
        }
        self.index
            .namespaces_under("", true, SourceFilter::Any)
            .into_iter()
            .filter(|e| {
                let segments: Vec<&str> = e.full_name.split("::").collect();
                segments.len() > class_names.len() && suffix_matches(&e.full_name, class_names)
            })
            .collect()
    }

    fn tier_partial(&self, desc: &NameDescriptor) -> Vec<Entry> {
        match desc.method_name.as_deref() {
            None | Some("") => {
                // Complete the final segment; any leading segments must
                // still match as a path suffix.
                let (parents, fragment) = match desc.class_names.split_last() {
                    Some((last, init)) => (init, last.as_str()),
                    None => return Vec::new(),
                };
                let candidates: Vec<NamespaceEntry> = self
                    .index
                    .namespaces_under("", true, SourceFilter::Any)
                    .into_iter()
                    .filter(|e| parent_suffix_matches(&e.full_name, parents))
                    .collect();
                let picked = pick_partial(&candidates, fragment, |e| e.name());
                picked.into_iter().map(Entry::Namespace).collect()
            }
            Some(method) => {
                let candidates: Vec<MethodEntry> = self
                    .index
                    .methods_under("", true, SourceFilter::Any)
                    .into_iter()
                    .filter(|m| {
                        kind_matches(m, desc.kind)
                            && suffix_matches(m.namespace(), &desc.class_names)
                    })
                    .collect();
                let picked = pick_partial(&candidates, method, |m| m.name());
                picked.into_iter().map(Entry::Method).collect()
            }
        }
    }

    /// Walk a descriptor's namespace path through the index, completing the
    /// final component. `None` when the query is malformed or nothing
    /// matches; query errors never escape this entry point.
    pub fn lookup_keyword(&self, keyword: &str) -> Option<QueryData> {
        let desc = NameDescriptor::parse(keyword).ok()?;
        let toplevel = self.index.top_level_namespace(SourceFilter::Any);

        // `matching` holds the last segment's prefix matches, `exact` the
        // narrowed containers the next segment descends into.
        let mut matching: Vec<NamespaceEntry> = Vec::new();
        let mut exact: Vec<NamespaceEntry> = Vec::new();
        for (i, class_name) in desc.class_names.iter().enumerate() {
            matching = if i == 0 {
                self.index.contained_namespaces_matching(class_name, &toplevel)
            } else {
                if exact.is_empty() {
                    return None;
                }
                self.index.contained_namespaces_matching(class_name, &exact)
            };
            exact = matching
                .iter()
                .filter(|e| e.name() == class_name)
                .cloned()
                .collect();
        }

        match desc.method_name.as_deref() {
            None => {
                if matching.is_empty() {
                    return None;
                }
                Some(QueryData {
                    desc,
                    namespaces: matching,
                    methods: None,
                })
            }
            Some(method) => {
                let methods = if desc.class_names.is_empty() {
                    self.index.find_methods(method, desc.kind, &toplevel)
                } else {
                    if exact.is_empty() {
                        return None;
                    }
                    self.index.find_methods(method, desc.kind, &exact)
                };
                if methods.is_empty() {
                    return None;
                }
                Some(QueryData {
                    desc,
                    namespaces: exact,
                    methods: Some(methods),
                })
            }
        }
    }

    /// Completion candidates for a partial query. `None` means the query
    /// matched nothing; the empty query completes to every namespace.
    pub fn completion_list(&self, keyword: &str) -> Option<Vec<String>> {
        if keyword.is_empty() {
            return Some(self.index.full_class_names(SourceFilter::Any));
        }
        let qdata = self.lookup_keyword(keyword)?;
        match &qdata.methods {
            None => Some(qdata.namespaces.iter().map(|n| n.full_name.clone()).collect()),
            Some(methods) if qdata.desc.class_names.is_empty() => {
                Some(dedup_stable(methods.iter().map(|m| m.name().to_string())))
            }
            Some(methods) => Some(methods.iter().map(|m| m.full_name.clone()).collect()),
        }
    }

    /// Owning namespaces of a bare method query, deduplicated. `None` when
    /// the query already names a namespace or matches nothing.
    pub fn class_list(&self, keyword: &str) -> Option<Vec<String>> {
        self.owning_classes(keyword, false)
    }

    /// Like [`class_list`](Self::class_list) but keeps each namespace's
    /// method separator attached, distinguishing class from instance sites.
    pub fn class_list_with_flag(&self, keyword: &str) -> Option<Vec<String>> {
        self.owning_classes(keyword, true)
    }

    fn owning_classes(&self, keyword: &str, with_flag: bool) -> Option<Vec<String>> {
        let qdata = self.lookup_keyword(keyword)?;
        if !qdata.desc.class_names.is_empty() {
            return None;
        }
        let wanted = qdata.desc.method_name.as_deref()?;
        let methods = qdata.methods?;
        Some(dedup_stable(
            methods
                .iter()
                .filter(|m| m.name() == wanted)
                .map(|m| {
                    if with_flag {
                        format!("{}{}", m.namespace(), m.kind().separator())
                    } else {
                        m.namespace().to_string()
                    }
                }),
        ))
    }
}

fn candidate_kinds(kind: Option<MethodKind>) -> Vec<MethodKind> {
    match kind {
        Some(k) => vec![k],
        None => vec![MethodKind::Class, MethodKind::Instance],
    }
}

fn kind_matches(method: &MethodEntry, kind: Option<MethodKind>) -> bool {
    kind.is_none_or(|k| method.kind() == k)
}

/// Whether `namespace`'s trailing segments equal `class_names`. An empty
/// path matches anything.
fn suffix_matches(namespace: &str, class_names: &[String]) -> bool {
    if class_names.is_empty() {
        return true;
    }
    let segments: Vec<&str> = namespace.split("::").collect();
    if segments.len() < class_names.len() {
        return false;
    }
    segments[segments.len() - class_names.len()..]
        .iter()
        .zip(class_names)
        .all(|(seg, name)| *seg == name)
}

/// Suffix match against all but the entry's own final segment.
fn parent_suffix_matches(full_name: &str, parents: &[String]) -> bool {
    match full_name.rsplit_once("::") {
        Some((parent, _)) => suffix_matches(parent, parents),
        None => parents.is_empty(),
    }
}

/// Prefix matches on the unqualified name, falling back to substring
/// matches only when no prefix matches exist.
fn pick_partial<T: Clone>(candidates: &[T], fragment: &str, name: impl Fn(&T) -> &str) -> Vec<T> {
    let prefixed: Vec<T> = candidates
        .iter()
        .filter(|c| name(c).starts_with(fragment))
        .cloned()
        .collect();
    if !prefixed.is_empty() {
        return prefixed;
    }
    candidates
        .iter()
        .filter(|c| name(c).contains(fragment))
        .cloned()
        .collect()
}

fn dedup_stable<I: Iterator<Item = String>>(names: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
