//! Symbol index integration tests over a small three-source fixture with
//! reopened namespaces.

use dxi::index::symbols::{MethodKind, SourceFilter, SymbolIndex, SYMBOL_INDEX_MAGIC};
use dxi::query::{Entry, QueryResolver};
use dxi::Error;
use std::io::Cursor;

fn index_data() -> String {
    let sep = "=".repeat(80);
    format!(
        "{SYMBOL_INDEX_MAGIC}\n\
         Sources:\n\
         system                          /usr/share/doc/system/\n\
         somegem-0.1.0                   /long/path/somegem-0.1.0\n\
         stuff-1.1.0                     /long/path/stuff-1.1.0\n\
         {sep}\n\
         Namespaces:\n\
         ABC 0 1\n\
         ABC::DEF 0 1\n\
         ABC::DEF::Foo 1\n\
         ABC::Zzz 0\n\
         CDE 1 2\n\
         FGH 2\n\
         FGH::Adfdsf 2\n\
         {sep}\n\
         Methods:\n\
         ABC::DEF.bar 0\n\
         ABC::DEF::Foo#baz 1\n\
         ABC::DEF::Foo#foo 1\n\
         ABC::Zzz.foo 0 1\n\
         ABC::Zzz#foo 0\n\
         CDE.foo 1 2\n\
         FGH::Adfdsf#foo 2\n\
         {sep}\n"
    )
}

fn load() -> SymbolIndex {
    SymbolIndex::from_reader(Cursor::new(index_data().into_bytes())).unwrap()
}

fn full_names<E: FullName>(entries: &[E]) -> Vec<&str> {
    entries.iter().map(|e| e.full()).collect()
}

trait FullName {
    fn full(&self) -> &str;
}

impl FullName for dxi::index::symbols::NamespaceEntry {
    fn full(&self) -> &str {
        &self.full_name
    }
}

impl FullName for dxi::index::symbols::MethodEntry {
    fn full(&self) -> &str {
        &self.full_name
    }
}

#[test]
fn test_dump_round_trip() {
    let index = load();
    let mut out = Vec::new();
    index.dump(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), index_data());
}

#[test]
fn test_sources() {
    let index = load();
    let names: Vec<&str> = index.sources().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["system", "somegem-0.1.0", "stuff-1.1.0"]);
    assert_eq!(index.sources()[0].path, "/usr/share/doc/system/");
}

#[test]
fn test_full_class_names() {
    let index = load();
    assert_eq!(
        index.full_class_names(SourceFilter::Any),
        ["ABC", "ABC::DEF", "ABC::DEF::Foo", "ABC::Zzz", "CDE", "FGH", "FGH::Adfdsf"]
    );
    assert_eq!(
        index.full_class_names(SourceFilter::Index(0)),
        ["ABC", "ABC::DEF", "ABC::Zzz"]
    );
    assert_eq!(
        index.full_class_names(SourceFilter::Index(1)),
        ["ABC", "ABC::DEF", "ABC::DEF::Foo", "CDE"]
    );
    assert_eq!(
        index.full_class_names(SourceFilter::Index(2)),
        ["CDE", "FGH", "FGH::Adfdsf"]
    );
    assert_eq!(
        index.full_class_names(SourceFilter::Name("stuff-1.1.0")),
        ["CDE", "FGH", "FGH::Adfdsf"]
    );
    assert!(index
        .full_class_names(SourceFilter::Name("nonexistent-1.1.0"))
        .is_empty());
}

#[test]
fn test_full_method_names() {
    let index = load();
    assert_eq!(
        index.full_method_names(SourceFilter::Any),
        [
            "ABC::DEF.bar",
            "ABC::DEF::Foo#baz",
            "ABC::DEF::Foo#foo",
            "ABC::Zzz.foo",
            "ABC::Zzz#foo",
            "CDE.foo",
            "FGH::Adfdsf#foo"
        ]
    );
    assert_eq!(
        index.full_method_names(SourceFilter::Index(0)),
        ["ABC::DEF.bar", "ABC::Zzz.foo", "ABC::Zzz#foo"]
    );
    assert_eq!(
        index.full_method_names(SourceFilter::Index(1)),
        ["ABC::DEF::Foo#baz", "ABC::DEF::Foo#foo", "ABC::Zzz.foo", "CDE.foo"]
    );
    assert_eq!(
        index.full_method_names(SourceFilter::Name("stuff-1.1.0")),
        ["CDE.foo", "FGH::Adfdsf#foo"]
    );
    assert!(index
        .full_method_names(SourceFilter::Name("nonexistent-1.1.0"))
        .is_empty());
}

#[test]
fn test_all_names() {
    let index = load();
    assert_eq!(
        index.all_names(SourceFilter::Index(0)),
        [
            "ABC",
            "ABC::DEF",
            "ABC::Zzz",
            "ABC::DEF.bar",
            "ABC::Zzz.foo",
            "ABC::Zzz#foo"
        ]
    );
    assert_eq!(
        index.all_names(SourceFilter::Name("somegem-0.1.0")),
        [
            "ABC",
            "ABC::DEF",
            "ABC::DEF::Foo",
            "CDE",
            "ABC::DEF::Foo#baz",
            "ABC::DEF::Foo#foo",
            "ABC::Zzz.foo",
            "CDE.foo"
        ]
    );
    assert!(index.all_names(SourceFilter::Name("notinstalled-1.0")).is_empty());
}

#[test]
fn test_get_class_entry() {
    let index = load();
    let unscoped = index.get_class_entry("ABC", SourceFilter::Any).unwrap();
    assert_eq!(unscoped.full_name, "ABC");
    assert_eq!(unscoped.source_index, None);

    assert!(index
        .get_class_entry("ABC::DEF::Foo", SourceFilter::Index(0))
        .is_none());
    let scoped = index
        .get_class_entry("ABC::DEF::Foo", SourceFilter::Index(1))
        .unwrap();
    assert_eq!(scoped.source_index, Some(1));
    assert_eq!(scoped.index, 2);

    assert!(index.get_class_entry("AB", SourceFilter::Any).is_none());
}

#[test]
fn test_get_method_entry() {
    let index = load();
    let bar = index
        .get_method_entry("ABC::DEF.bar", SourceFilter::Any)
        .unwrap();
    assert_eq!(bar.full_name, "ABC::DEF.bar");
    assert_eq!(bar.source_index, None);
    assert_eq!(bar.kind(), MethodKind::Class);

    assert!(index
        .get_method_entry("FGH::Adfdsf#foo", SourceFilter::Index(1))
        .is_none());
    let scoped = index
        .get_method_entry("FGH::Adfdsf#foo", SourceFilter::Index(2))
        .unwrap();
    assert_eq!(scoped.index, 6);
    assert_eq!(scoped.source_index, Some(2));
    assert_eq!(scoped.kind(), MethodKind::Instance);
}

#[test]
fn test_namespaces_under() {
    let index = load();
    let all = index.namespaces_under("ABC", true, SourceFilter::Any);
    assert_eq!(full_names(&all), ["ABC::DEF", "ABC::DEF::Foo", "ABC::Zzz"]);

    let direct = index.namespaces_under("ABC", false, SourceFilter::Any);
    assert_eq!(full_names(&direct), ["ABC::DEF", "ABC::Zzz"]);
}

#[test]
fn test_namespaces_under_scoped() {
    let index = load();
    assert_eq!(
        full_names(&index.namespaces_under("ABC", false, SourceFilter::Index(1))),
        ["ABC::DEF"]
    );
    assert_eq!(
        full_names(&index.namespaces_under("ABC", true, SourceFilter::Index(1))),
        ["ABC::DEF", "ABC::DEF::Foo"]
    );
    assert_eq!(
        full_names(&index.namespaces_under("ABC", true, SourceFilter::Name("somegem-0.1.0"))),
        ["ABC::DEF", "ABC::DEF::Foo"]
    );
    assert_eq!(
        full_names(&index.namespaces_under("ABC", true, SourceFilter::Index(0))),
        ["ABC::DEF", "ABC::Zzz"]
    );
}

#[test]
fn test_namespaces_under_toplevel() {
    let index = load();
    let toplevel = index.top_level_namespace(SourceFilter::Any);
    assert_eq!(toplevel.len(), 1);

    assert_eq!(
        full_names(&index.namespaces_under(&toplevel[0], false, SourceFilter::Any)),
        ["ABC", "CDE", "FGH"]
    );
    assert_eq!(
        full_names(&index.namespaces_under(&toplevel[0], true, SourceFilter::Any)),
        ["ABC", "ABC::DEF", "ABC::DEF::Foo", "ABC::Zzz", "CDE", "FGH", "FGH::Adfdsf"]
    );
    assert_eq!(
        full_names(&index.namespaces_under(&toplevel[0], true, SourceFilter::Name("stuff-1.1.0"))),
        ["CDE", "FGH", "FGH::Adfdsf"]
    );

    // A scoped root carries its source into unfiltered descendant queries.
    let scoped = index.top_level_namespace(SourceFilter::Index(2));
    assert_eq!(scoped[0].source_index, Some(2));
    assert_eq!(
        full_names(&index.namespaces_under(&scoped[0], false, SourceFilter::Any)),
        ["CDE", "FGH"]
    );

    assert!(index
        .top_level_namespace(SourceFilter::Name("unknown-0.0"))
        .is_empty());
}

#[test]
fn test_methods_under() {
    let index = load();
    assert_eq!(
        full_names(&index.methods_under("ABC", true, SourceFilter::Index(1))),
        ["ABC::DEF::Foo#baz", "ABC::DEF::Foo#foo", "ABC::Zzz.foo"]
    );
    assert_eq!(
        full_names(&index.methods_under("CDE", false, SourceFilter::Name("stuff-1.1.0"))),
        ["CDE.foo"]
    );
    assert_eq!(
        full_names(&index.methods_under("ABC", true, SourceFilter::Any)),
        [
            "ABC::DEF.bar",
            "ABC::DEF::Foo#baz",
            "ABC::DEF::Foo#foo",
            "ABC::Zzz.foo",
            "ABC::Zzz#foo"
        ]
    );
    assert_eq!(
        full_names(&index.methods_under("", true, SourceFilter::Any)),
        [
            "ABC::DEF.bar",
            "ABC::DEF::Foo#baz",
            "ABC::DEF::Foo#foo",
            "ABC::Zzz.foo",
            "ABC::Zzz#foo",
            "CDE.foo",
            "FGH::Adfdsf#foo"
        ]
    );
    assert!(index.methods_under("ABC", false, SourceFilter::Any).is_empty());
    assert_eq!(
        full_names(&index.methods_under("CDE", false, SourceFilter::Any)),
        ["CDE.foo"]
    );
    assert_eq!(
        full_names(&index.methods_under("FGH", true, SourceFilter::Any)),
        ["FGH::Adfdsf#foo"]
    );
    assert!(index.methods_under("FGH", true, SourceFilter::Index(0)).is_empty());
    assert_eq!(
        full_names(&index.methods_under("FGH", true, SourceFilter::Index(2))),
        ["FGH::Adfdsf#foo"]
    );
    assert!(index.methods_under("FGH", false, SourceFilter::Index(2)).is_empty());
    assert_eq!(
        full_names(&index.methods_under("FGH::Adfdsf", false, SourceFilter::Index(2))),
        ["FGH::Adfdsf#foo"]
    );
    assert!(index
        .methods_under("FGH::Adfdsf", false, SourceFilter::Index(0))
        .is_empty());
}

#[test]
fn test_lookup_namespace_in() {
    let index = load();
    let toplevel = index.top_level_namespace(SourceFilter::Any);
    assert_eq!(
        full_names(&index.lookup_namespace_in("ABC", &toplevel)),
        ["ABC"]
    );

    let toplevel2 = index.top_level_namespace(SourceFilter::Index(2));
    assert!(index.lookup_namespace_in("ABC", &toplevel2).is_empty());
    assert_eq!(
        full_names(&index.lookup_namespace_in("FGH", &toplevel2)),
        ["FGH"]
    );
}

#[test]
fn test_find_methods() {
    let index = load();
    let toplevel = index.top_level_namespace(SourceFilter::Any);
    assert_eq!(
        full_names(&index.find_methods("", Some(MethodKind::Instance), &toplevel)),
        ["ABC::DEF::Foo#baz", "ABC::DEF::Foo#foo", "ABC::Zzz#foo", "FGH::Adfdsf#foo"]
    );
    assert_eq!(
        full_names(&index.find_methods("", Some(MethodKind::Class), &toplevel)),
        ["ABC::DEF.bar", "ABC::Zzz.foo", "CDE.foo"]
    );
    assert!(index
        .find_methods("ABC", Some(MethodKind::Class), &toplevel)
        .is_empty());
    assert_eq!(
        full_names(&index.find_methods("foo", Some(MethodKind::Instance), &toplevel)),
        ["ABC::DEF::Foo#foo", "ABC::Zzz#foo", "FGH::Adfdsf#foo"]
    );
    assert_eq!(
        full_names(&index.find_methods("foo", Some(MethodKind::Class), &toplevel)),
        ["ABC::Zzz.foo", "CDE.foo"]
    );

    let toplevel1 = index.top_level_namespace(SourceFilter::Index(1));
    assert_eq!(
        full_names(&index.find_methods("foo", Some(MethodKind::Instance), &toplevel1)),
        ["ABC::DEF::Foo#foo"]
    );
    let toplevel_stuff = index.top_level_namespace(SourceFilter::Name("stuff-1.1.0"));
    assert_eq!(
        full_names(&index.find_methods("foo", Some(MethodKind::Class), &toplevel_stuff)),
        ["CDE.foo"]
    );
}

#[test]
fn test_contained_namespaces_matching() {
    let index = load();
    let toplevel = index.top_level_namespace(SourceFilter::Any);
    assert_eq!(
        full_names(&index.contained_namespaces_matching("ABC", &toplevel)),
        ["ABC"]
    );

    let abc = index.get_class_entry("ABC", SourceFilter::Any).unwrap();
    let containers = vec![abc];
    assert!(index
        .contained_namespaces_matching("ABC", &containers)
        .is_empty());
    assert_eq!(
        full_names(&index.contained_namespaces_matching("", &containers)),
        ["ABC::DEF", "ABC::Zzz"]
    );
}

#[test]
fn test_completion_list() {
    let index = load();
    let resolver = QueryResolver::new(&index);

    assert_eq!(
        resolver.completion_list("").unwrap(),
        index.full_class_names(SourceFilter::Any)
    );
    assert_eq!(resolver.completion_list("AB").unwrap(), ["ABC"]);
    assert_eq!(
        resolver.completion_list("ABC::DEF::Foo#").unwrap(),
        ["ABC::DEF::Foo#baz", "ABC::DEF::Foo#foo"]
    );
    assert_eq!(resolver.completion_list("ABC::DEF.").unwrap(), ["ABC::DEF.bar"]);
    // A marker only completes a namespace's own methods: ABC::DEF has no
    // direct instance methods.
    assert!(resolver.completion_list("ABC::DEF#").is_none());
    assert_eq!(
        resolver.completion_list("ABC::Zzz.foo").unwrap(),
        ["ABC::Zzz.foo", "ABC::Zzz#foo"]
    );
    // Bare method fragments complete to unqualified names, deduplicated.
    assert_eq!(resolver.completion_list("foo").unwrap(), ["foo"]);
    assert!(resolver.completion_list("Bogus").is_none());
    assert!(resolver.completion_list("Foo##").is_none());
}

#[test]
fn test_class_list() {
    let index = load();
    let resolver = QueryResolver::new(&index);

    assert_eq!(
        resolver.class_list("foo").unwrap(),
        ["ABC::DEF::Foo", "ABC::Zzz", "CDE", "FGH::Adfdsf"]
    );
    assert_eq!(
        resolver.class_list_with_flag("foo").unwrap(),
        ["ABC::DEF::Foo#", "ABC::Zzz.", "ABC::Zzz#", "CDE.", "FGH::Adfdsf#"]
    );
    assert_eq!(resolver.class_list("bar").unwrap(), ["ABC::DEF"]);
    // Already qualified: not a bare method query.
    assert!(resolver.class_list("ABC::Zzz.foo").is_none());
}

#[test]
fn test_resolve_exact_tier() {
    let index = load();
    let resolver = QueryResolver::new(&index);

    let entries = resolver.resolve("ABC::DEF").unwrap();
    assert_eq!(entries.len(), 1);
    assert!(matches!(&entries[0], Entry::Namespace(e) if e.full_name == "ABC::DEF"));

    let entries = resolver.resolve("ABC::DEF::Foo#baz").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].full_name(), "ABC::DEF::Foo#baz");

    // Kind left open: both separators are tried.
    let entries = resolver.resolve("ABC::Zzz.foo").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["ABC::Zzz.foo", "ABC::Zzz#foo"]
    );

    // Trailing marker lists the namespace's direct methods of that kind.
    let entries = resolver.resolve("ABC::DEF.").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["ABC::DEF.bar"]
    );
}

#[test]
fn test_resolve_nested_tier() {
    let index = load();
    let resolver = QueryResolver::new(&index);

    let entries = resolver.resolve("DEF").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["ABC::DEF"]
    );

    let entries = resolver.resolve("Foo#baz").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["ABC::DEF::Foo#baz"]
    );

    // Suffix matching is per segment: "EF" does not match "DEF".
    let entries = resolver.resolve_exact("EF").unwrap();
    assert!(entries.is_empty());

    let entries = resolver.resolve("Zzz.foo").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["ABC::Zzz.foo", "ABC::Zzz#foo"]
    );
}

#[test]
fn test_resolve_partial_tier() {
    let index = load();
    let resolver = QueryResolver::new(&index);

    let entries = resolver.resolve("ba").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["ABC::DEF.bar", "ABC::DEF::Foo#baz"]
    );

    let entries = resolver.resolve("Ad").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["FGH::Adfdsf"]
    );

    // Substring fallback only when no prefix match exists.
    let entries = resolver.resolve("GH").unwrap();
    assert_eq!(
        entries.iter().map(Entry::full_name).collect::<Vec<_>>(),
        ["FGH"]
    );

    assert!(resolver.resolve_exact("ba").unwrap().is_empty());
}

#[test]
fn test_resolve_rejects_malformed() {
    let index = load();
    let resolver = QueryResolver::new(&index);
    assert!(matches!(resolver.resolve(""), Err(Error::InvalidQuery(_))));
    assert!(matches!(resolver.resolve("::"), Err(Error::InvalidQuery(_))));
}
