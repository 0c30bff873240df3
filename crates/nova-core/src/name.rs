use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A single Java identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name(SmolStr);

impl Name {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name(SmolStr::from(value))
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A dotted name as written in source (`java.util.Map.Entry`).
///
/// Whether a prefix denotes a package or an enclosing type is not known
/// until the name is resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    segments: Vec<Name>,
}

impl QualifiedName {
    pub fn from_dotted(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Name::from)
                .collect(),
        }
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Name>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn first(&self) -> Option<&Name> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&Name> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, name: Name) {
        self.segments.push(name);
    }

    /// Everything but the last segment.
    pub fn parent(&self) -> Option<QualifiedName> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    pub fn to_dotted(&self) -> String {
        let mut out = String::new();
        for (idx, seg) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('.');
            }
            out.push_str(seg.as_str());
        }
        out
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

/// A Java package name (`java.util`). The unnamed package is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageName(QualifiedName);

impl PackageName {
    pub fn from_dotted(path: &str) -> Self {
        Self(QualifiedName::from_dotted(path))
    }

    pub fn is_unnamed(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_dotted(&self) -> String {
        self.0.to_dotted()
    }

    /// Binary name of `simple` declared in this package.
    pub fn qualify(&self, simple: &str) -> String {
        if self.is_unnamed() {
            simple.to_string()
        } else {
            format!("{}.{simple}", self.to_dotted())
        }
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A canonical binary type name (`java.util.Map$Entry`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Package part of the binary name (`java.util` for `java.util.Map$Entry`).
    pub fn package(&self) -> &str {
        match self.0.rsplit_once('.') {
            Some((pkg, _)) => pkg,
            None => "",
        }
    }

    /// Simple name of the innermost class (`Entry` for `java.util.Map$Entry`).
    pub fn simple_name(&self) -> &str {
        let tail = match self.0.rsplit_once('.') {
            Some((_, tail)) => tail,
            None => self.0.as_str(),
        };
        match tail.rsplit_once('$') {
            Some((_, inner)) => inner,
            None => tail,
        }
    }

    /// Binary name of a member class nested directly in this one.
    pub fn nested(&self, simple: &str) -> TypeName {
        TypeName(format!("{}${simple}", self.0))
    }

    /// Path of the class file relative to a classpath root.
    pub fn to_class_file_path(&self) -> String {
        format!("{}.class", self.0.replace('.', "/"))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        TypeName::new(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn type_name_parts() {
        let name = TypeName::new("java.util.Map$Entry");
        assert_eq!(name.package(), "java.util");
        assert_eq!(name.simple_name(), "Entry");
        assert_eq!(name.to_class_file_path(), "java/util/Map$Entry.class");
        assert_eq!(
            TypeName::new("Foo").nested("Bar"),
            TypeName::new("Foo$Bar")
        );
    }

    #[test]
    fn qualified_name_parent() {
        let name = QualifiedName::from_dotted("a.b.C");
        assert_eq!(name.parent().map(|p| p.to_dotted()).as_deref(), Some("a.b"));
        assert_eq!(name.last().map(Name::as_str), Some("C"));
        assert_eq!(PackageName::from_dotted("").qualify("A"), "A");
    }
}
