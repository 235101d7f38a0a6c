//! Query string parsing.

use crate::error::{Error, Result};
use crate::index::symbols::MethodKind;

/// A query string decomposed into a namespace path, an optional method name
/// and an optional method kind.
///
/// A trailing `::`, `#` or `.` marker keeps the namespace path and sets
/// `method_name` to the empty string: "list this namespace's methods of the
/// marked kind" (`.` leaves the kind open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDescriptor {
    pub class_names: Vec<String>,
    pub method_name: Option<String>,
    pub kind: Option<MethodKind>,
}

impl NameDescriptor {
    /// Parse a raw query. Malformed input (empty string, empty path
    /// segments, stray separators) fails with
    /// [`InvalidQuery`](Error::InvalidQuery).
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidQuery("empty query".to_string()));
        }

        if let Some(rest) = query.strip_suffix("::") {
            return Ok(Self {
                class_names: parse_class_path(rest)?,
                method_name: Some(String::new()),
                kind: Some(MethodKind::Class),
            });
        }
        if let Some(rest) = query.strip_suffix('#') {
            return Ok(Self {
                class_names: parse_class_path(rest)?,
                method_name: Some(String::new()),
                kind: Some(MethodKind::Instance),
            });
        }
        if let Some(rest) = query.strip_suffix('.') {
            return Ok(Self {
                class_names: parse_class_path(rest)?,
                method_name: Some(String::new()),
                kind: None,
            });
        }

        // An embedded `#` always marks an instance method; `#foo` alone is a
        // namespace-less method query.
        if let Some((path, method)) = query.split_once('#') {
            if method.is_empty() || method.contains(['#', ':']) {
                return Err(Error::InvalidQuery(format!("malformed query {query:?}")));
            }
            let class_names = if path.is_empty() {
                Vec::new()
            } else {
                parse_class_path(path)?
            };
            return Ok(Self {
                class_names,
                method_name: Some(method.to_string()),
                kind: Some(MethodKind::Instance),
            });
        }

        // `A::B.foo` names a method of unspecified kind: `.` doubles as the
        // class-method separator and as "either" in queries.
        if let Some((path, method)) = query.rsplit_once('.') {
            if method.is_empty() || method.contains(':') {
                return Err(Error::InvalidQuery(format!("malformed query {query:?}")));
            }
            return Ok(Self {
                class_names: parse_class_path(path)?,
                method_name: Some(method.to_string()),
                kind: None,
            });
        }

        let mut segments: Vec<&str> = query.split("::").collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::InvalidQuery(format!(
                "empty path segment in {query:?}"
            )));
        }

        // A lowercase final segment is a method name; reached through `::`
        // it can only be a class method.
        let last = segments[segments.len() - 1];
        if last.starts_with(|c: char| c.is_ascii_lowercase() || c == '_') {
            segments.pop();
            let kind = if segments.is_empty() {
                None
            } else {
                Some(MethodKind::Class)
            };
            return Ok(Self {
                class_names: class_segments(&segments, query)?,
                method_name: Some(last.to_string()),
                kind,
            });
        }

        Ok(Self {
            class_names: class_segments(&segments, query)?,
            method_name: None,
            kind: None,
        })
    }

    /// The namespace path joined back into an `A::B::C` name.
    pub fn full_class_name(&self) -> String {
        self.class_names.join("::")
    }
}

fn parse_class_path(path: &str) -> Result<Vec<String>> {
    if path.is_empty() {
        return Err(Error::InvalidQuery("empty namespace path".to_string()));
    }
    let segments: Vec<&str> = path.split("::").collect();
    class_segments(&segments, path)
}

fn class_segments(segments: &[&str], query: &str) -> Result<Vec<String>> {
    for segment in segments {
        if segment.is_empty() || !segment.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(Error::InvalidQuery(format!(
                "bad namespace segment {segment:?} in {query:?}"
            )));
        }
        if segment.contains(['.', '#']) {
            return Err(Error::InvalidQuery(format!(
                "separator inside namespace segment in {query:?}"
            )));
        }
    }
    Ok(segments.iter().map(|s| s.to_string()).collect())
}
