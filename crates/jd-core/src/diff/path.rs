use std::fmt;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::Node;

/// A metadata tag attached to a path segment, carrying set/multiset identity
/// information the way the native jd text format renders it inline with the
/// path rather than as call-wide configuration.
///
/// ```
/// # use jd_core::diff::MetadataTag;
/// let tag = MetadataTag::MultiSet;
/// assert_eq!(tag.to_string(), "multiset");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetadataTag {
    /// The enclosing array behaves as a set.
    Set,
    /// The enclosing array behaves as a multiset.
    MultiSet,
    /// Object identity within a set is determined by these keys.
    SetKeys(Vec<String>),
}

impl fmt::Display for MetadataTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => f.write_str("set"),
            Self::MultiSet => f.write_str("multiset"),
            Self::SetKeys(keys) => write!(f, "setkeys={}", keys.join(",")),
        }
    }
}

impl MetadataTag {
    /// Flattens this tag into the raw string tokens it contributes to the
    /// enclosing tag array, e.g. `SetKeys(["id"])` becomes `["setkeys","id"]`
    /// rather than a single combined string.
    fn to_json_values(&self) -> Vec<Value> {
        match self {
            Self::Set => vec![Value::String("set".to_owned())],
            Self::MultiSet => vec![Value::String("multiset".to_owned())],
            Self::SetKeys(keys) => {
                let mut values = Vec::with_capacity(keys.len() + 1);
                values.push(Value::String("setkeys".to_owned()));
                values.extend(keys.iter().map(|key| Value::String(key.clone())));
                values
            }
        }
    }
}

/// Parses a flat tag array (the raw string tokens following a path
/// segment's tag marker) back into `MetadataTag`s. `setkeys` consumes every
/// token after it as a key, so it must be the only tag in its array.
fn parse_metadata_tags(values: &[Value]) -> Vec<MetadataTag> {
    let mut tags = Vec::new();
    let mut idx = 0;
    while idx < values.len() {
        let Some(text) = values[idx].as_str() else {
            idx += 1;
            continue;
        };
        match text {
            "set" => {
                tags.push(MetadataTag::Set);
                idx += 1;
            }
            "multiset" => {
                tags.push(MetadataTag::MultiSet);
                idx += 1;
            }
            "setkeys" => {
                idx += 1;
                let mut keys = Vec::new();
                while let Some(key) = values.get(idx).and_then(Value::as_str) {
                    keys.push(key.to_owned());
                    idx += 1;
                }
                tags.push(MetadataTag::SetKeys(keys));
            }
            _ => idx += 1,
        }
    }
    tags
}

/// Represents a single element within a diff path.
///
/// ```
/// # use jd_core::diff::PathSegment;
/// let key = PathSegment::key("name");
/// let index = PathSegment::index(2);
/// assert!(matches!(key, PathSegment::Key(_)));
/// assert!(matches!(index, PathSegment::Index(_)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum PathSegment {
    /// Object key lookup.
    Key(String),
    /// Array index lookup.
    Index(i64),
    /// An anonymous element within a set/multiset, addressed by position
    /// within the rendered diff rather than by value.
    SetElement(Vec<MetadataTag>),
    /// A specific element within a set/multiset, addressed by its full value
    /// (used for object identity under `SETKEYS`).
    SpecificSetElement(Box<Node>, Vec<MetadataTag>),
}

impl PathSegment {
    /// Creates a key segment.
    #[must_use]
    pub fn key<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::Key(value.into())
    }

    /// Creates an index segment.
    #[must_use]
    pub fn index<I>(value: I) -> Self
    where
        I: Into<i64>,
    {
        Self::Index(value.into())
    }

    /// Creates a bare set-element marker (renders as `{}`), implying `Set`
    /// metadata when no tag is given explicitly.
    #[must_use]
    pub fn set_element(tags: Vec<MetadataTag>) -> Self {
        Self::SetElement(tags)
    }

    /// Creates a specific set-element marker addressed by value.
    #[must_use]
    pub fn specific_set_element(value: Node, tags: Vec<MetadataTag>) -> Self {
        Self::SpecificSetElement(Box::new(value), tags)
    }

    pub(crate) fn tags(&self) -> &[MetadataTag] {
        match self {
            Self::Key(_) | Self::Index(_) => &[],
            Self::SetElement(tags) | Self::SpecificSetElement(_, tags) => tags,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
            Self::SetElement(_) => f.write_str("{}"),
            Self::SpecificSetElement(value, _) => {
                let json = value.to_json_value().unwrap_or(Value::Null);
                write!(f, "{json}")
            }
        }
    }
}

/// Represents the fully qualified location of a diff hunk within a document.
///
/// Each segment serializes to one JSON value, except a segment carrying
/// metadata tags, which serializes to two consecutive values: the tag array
/// followed by the segment's own marker. A bare `{}` marker with no
/// preceding tag array implies `Set` metadata, mirroring the upstream
/// encoding.
///
/// ```
/// # use jd_core::diff::{Path, PathSegment};
/// let path = Path::new().with_segment(PathSegment::key("foo"))
///     .with_segment(PathSegment::index(0));
/// assert_eq!(path.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new segment, returning the extended path.
    #[must_use]
    pub fn with_segment(mut self, segment: PathSegment) -> Self {
        self.0.push(segment);
        self
    }

    /// Returns the underlying segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path with the last segment removed, if any.
    ///
    /// ```
    /// # use jd_core::diff::{Path, PathSegment};
    /// let path = Path::new().with_segment(PathSegment::index(1));
    /// assert!(path.drop_last().is_empty());
    /// ```
    #[must_use]
    pub fn drop_last(&self) -> Self {
        let mut segments = self.0.clone();
        segments.pop();
        Self(segments)
    }

    /// Consumes the path and returns the owned segments.
    ///
    /// ```
    /// # use jd_core::diff::{Path, PathSegment};
    /// let path = Path::from(PathSegment::key("id"));
    /// let segments = path.into_segments();
    /// assert_eq!(segments.len(), 1);
    /// ```
    #[must_use]
    pub fn into_segments(self) -> Vec<PathSegment> {
        self.0
    }

    /// Pushes a new segment in-place.
    ///
    /// ```
    /// # use jd_core::diff::{Path, PathSegment};
    /// let mut path = Path::new();
    /// path.push(PathSegment::key("name"));
    /// assert_eq!(path.len(), 1);
    /// ```
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// Pops the last segment off the path.
    ///
    /// ```
    /// # use jd_core::diff::{Path, PathSegment};
    /// let mut path = Path::from(PathSegment::index(0));
    /// assert!(path.pop().is_some());
    /// assert!(path.is_empty());
    /// ```
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Returns whether `self` is a prefix of (or equal to) `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(value: Vec<PathSegment>) -> Self {
        Self(value)
    }
}

impl From<PathSegment> for Path {
    fn from(value: PathSegment) -> Self {
        Self(vec![value])
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, segment) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str("]")
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Path {
    type Item = PathSegment;
    type IntoIter = std::vec::IntoIter<PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn segment_marker_json(segment: &PathSegment) -> Value {
    match segment {
        PathSegment::Key(key) => Value::String(key.clone()),
        PathSegment::Index(index) => Value::Number((*index).into()),
        PathSegment::SetElement(_) => Value::Object(serde_json::Map::new()),
        PathSegment::SpecificSetElement(value, _) => {
            value.to_json_value().unwrap_or_else(|| Value::Object(serde_json::Map::new()))
        }
    }
}

fn path_to_json(path: &Path) -> Value {
    let mut out = Vec::new();
    for segment in &path.0 {
        let tags = segment.tags();
        if !tags.is_empty() {
            let tag_values: Vec<Value> = tags.iter().flat_map(MetadataTag::to_json_values).collect();
            out.push(Value::Array(tag_values));
        }
        out.push(segment_marker_json(segment));
    }
    Value::Array(out)
}

fn path_from_json(values: &[Value]) -> Result<Vec<PathSegment>, String> {
    let mut segments = Vec::new();
    let mut idx = 0;
    while idx < values.len() {
        let value = &values[idx];
        if let Value::Array(tag_values) = value {
            let tags = parse_metadata_tags(tag_values);
            idx += 1;
            let marker = values.get(idx).ok_or("expected path marker after metadata tags")?;
            idx += 1;
            segments.push(marker_to_segment(marker, tags)?);
            continue;
        }
        idx += 1;
        segments.push(marker_to_segment(value, Vec::new())?);
    }
    Ok(segments)
}

fn marker_to_segment(marker: &Value, tags: Vec<MetadataTag>) -> Result<PathSegment, String> {
    match marker {
        Value::String(s) => Ok(PathSegment::Key(s.clone())),
        Value::Number(n) => {
            let i = n.as_i64().ok_or_else(|| format!("path index out of range: {n}"))?;
            Ok(PathSegment::Index(i))
        }
        Value::Object(map) if map.is_empty() => {
            let tags = if tags.is_empty() { vec![MetadataTag::Set] } else { tags };
            Ok(PathSegment::SetElement(tags))
        }
        Value::Object(_) => {
            let node = Node::from_json_value(marker.clone())
                .map_err(|e| format!("invalid set element marker: {e}"))?;
            Ok(PathSegment::SpecificSetElement(Box::new(node), tags))
        }
        other => Err(format!("unsupported path marker: {other}")),
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        path_to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<Value>::deserialize(deserializer)?;
        let segments = path_from_json(&values).map_err(D::Error::custom)?;
        Ok(Self(segments))
    }
}

/// Creates a path representing the root of a document.
///
/// ```
/// # use jd_core::diff::root_path;
/// let path = root_path();
/// assert!(path.is_empty());
/// ```
#[must_use]
pub fn root_path() -> Path {
    Path::new()
}

/// Builds a path from an iterator of segments.
///
/// ```
/// # use jd_core::diff::{path_from_segments, PathSegment};
/// let path = path_from_segments([PathSegment::key("a"), PathSegment::index(1)]);
/// assert_eq!(path.len(), 2);
/// ```
#[must_use]
pub fn path_from_segments<I>(segments: I) -> Path
where
    I: IntoIterator<Item = PathSegment>,
{
    Path(segments.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip_for_key_segments() {
        let path = path_from_segments([PathSegment::key("foo"), PathSegment::index(3)]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "[\"foo\",3]");
        let decoded: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn renders_bare_set_element_as_empty_object() {
        let path = path_from_segments([PathSegment::set_element(Vec::new())]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "[{}]");
    }

    #[test]
    fn renders_multiset_tag_before_marker() {
        let path = path_from_segments([PathSegment::set_element(vec![MetadataTag::MultiSet])]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "[[\"multiset\"],{}]");
    }

    #[test]
    fn bare_empty_object_marker_implies_set_metadata_on_decode() {
        let decoded: Path = serde_json::from_str("[{}]").unwrap();
        match &decoded.segments()[0] {
            PathSegment::SetElement(tags) => assert_eq!(tags, &[MetadataTag::Set]),
            other => panic!("unexpected segment: {other:?}"),
        }
    }

    #[test]
    fn renders_setkeys_tag_as_flat_string_array() {
        let path =
            path_from_segments([PathSegment::set_element(vec![MetadataTag::SetKeys(vec![
                "id".to_owned(),
            ])])]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "[[\"setkeys\",\"id\"],{}]");
    }

    #[test]
    fn setkeys_tag_round_trips_multiple_keys() {
        let path = path_from_segments([PathSegment::set_element(vec![MetadataTag::SetKeys(
            vec!["a".to_owned(), "b".to_owned()],
        )])]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "[[\"setkeys\",\"a\",\"b\"],{}]");
        let decoded: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn is_prefix_of_matches_exact_and_deeper_paths() {
        let a = path_from_segments([PathSegment::key("a")]);
        let ab = path_from_segments([PathSegment::key("a"), PathSegment::key("b")]);
        assert!(a.is_prefix_of(&a));
        assert!(a.is_prefix_of(&ab));
        assert!(!ab.is_prefix_of(&a));
    }
}
