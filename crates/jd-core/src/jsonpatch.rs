//! Interop with RFC 6902 JSON Patch and RFC 7396 JSON Merge Patch.
//!
//! Only list and object diffs can be represented: set and multiset elements
//! have no JSON Patch equivalent and are rejected with
//! [`JsonPatchError::Unrepresentable`].

use serde_json::{Map, Value};

use crate::{
    diff::{Diff, DiffElement, Path, PathSegment},
    JsonPatchError, Node,
};

fn is_void(node: &Node) -> bool {
    matches!(node, Node::Void)
}

fn node_value(node: &Node) -> Value {
    node.to_json_value().unwrap_or(Value::Null)
}

fn pointer_segment(segment: &PathSegment) -> Result<String, JsonPatchError> {
    match segment {
        PathSegment::Key(key) => {
            if key.parse::<i64>().is_ok() {
                return Err(JsonPatchError::NumericObjectKey { key: key.clone() });
            }
            Ok(escape_pointer_token(key))
        }
        PathSegment::Index(index) => Ok(index.to_string()),
        PathSegment::SetElement(_) | PathSegment::SpecificSetElement(_, _) => {
            Err(JsonPatchError::Unrepresentable {
                path: String::new(),
                reason: "set and multiset elements have no JSON Pointer representation".into(),
            })
        }
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn path_to_pointer(path: &Path) -> Result<String, JsonPatchError> {
    let mut pointer = String::new();
    for segment in path {
        pointer.push('/');
        pointer.push_str(&pointer_segment(segment)?);
    }
    Ok(pointer)
}

fn sibling_pointer(path: &Path, offset: i64) -> Result<String, JsonPatchError> {
    let mut segments = path.segments().to_vec();
    let Some(PathSegment::Index(index)) = segments.pop() else {
        return Err(JsonPatchError::Unrepresentable {
            path: path.to_string(),
            reason: "context is only meaningful for list elements".into(),
        });
    };
    segments.push(PathSegment::Index(index + offset));
    path_to_pointer(&Path::from(segments))
}

fn op(name: &'static str, path: String, value: Option<Value>) -> Value {
    let mut map = Map::new();
    map.insert("op".to_owned(), Value::String(name.to_owned()));
    map.insert("path".to_owned(), Value::String(path));
    if let Some(value) = value {
        map.insert("value".to_owned(), value);
    }
    Value::Object(map)
}

fn render_patch_element(element: &DiffElement) -> Result<Vec<Value>, JsonPatchError> {
    if element.before.len() > 1 {
        return Err(JsonPatchError::TooMuchContext { kind: "before", found: element.before.len() });
    }
    if element.after.len() > 1 {
        return Err(JsonPatchError::TooMuchContext { kind: "after", found: element.after.len() });
    }

    let pointer = path_to_pointer(&element.path)?;
    let is_list_context = matches!(element.path.segments().last(), Some(PathSegment::Index(_)));

    if !is_list_context {
        return Ok(match (element.remove.first(), element.add.first()) {
            (Some(_), Some(new)) => vec![op("replace", pointer, Some(node_value(new)))],
            (Some(old), None) => vec![op("remove", pointer, Some(node_value(old)))],
            (None, Some(new)) => vec![op("add", pointer, Some(node_value(new)))],
            (None, None) => Vec::new(),
        });
    }

    let mut ops = Vec::new();
    if let Some(before) = element.before.first() {
        if !is_void(before) {
            ops.push(op("test", sibling_pointer(&element.path, -1)?, Some(node_value(before))));
        }
    }
    if let Some(after) = element.after.first() {
        if !is_void(after) {
            ops.push(op("test", sibling_pointer(&element.path, 1)?, Some(node_value(after))));
        }
    }
    if let Some(old) = element.remove.first() {
        ops.push(op("test", pointer.clone(), Some(node_value(old))));
        ops.push(op("remove", pointer.clone(), Some(node_value(old))));
    }
    if let Some(new) = element.add.first() {
        ops.push(op("add", pointer, Some(node_value(new))));
    }
    Ok(ops)
}

fn insert_merge_leaf(map: &mut Map<String, Value>, path: &[PathSegment], leaf: Value) {
    let Some((PathSegment::Key(key), rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.insert(key.clone(), leaf);
        return;
    }
    let entry = map.entry(key.clone()).or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(nested) = entry {
        insert_merge_leaf(nested, rest, leaf);
    }
}

impl Diff {
    /// Renders the diff as an RFC 6902 JSON Patch document.
    ///
    /// List-context elements (those addressed by an array index) emit
    /// `test` operations guarding the surrounding context and the replaced
    /// value before the `remove`/`add` pair, since JSON Patch has no native
    /// notion of list-diff context.
    pub fn render_patch(&self) -> Result<String, JsonPatchError> {
        let mut ops = Vec::new();
        for element in self.iter() {
            ops.extend(render_patch_element(element)?);
        }
        Ok(Value::Array(ops).to_string())
    }

    /// Renders the diff as an RFC 7396 JSON Merge Patch document. Every
    /// element must carry `ASSOC_IN`/merge metadata, since merge patches
    /// have no way to express strict old-value checks.
    pub fn render_merge(&self) -> Result<String, JsonPatchError> {
        let mut root = Map::new();
        for element in self.iter() {
            if !element.metadata.as_ref().is_some_and(|m| m.merge) {
                return Err(JsonPatchError::NotMergeElement);
            }
            let leaf = element.add.first().map(node_value).unwrap_or(Value::Null);
            insert_merge_leaf(&mut root, element.path.segments(), leaf);
        }
        Ok(Value::Object(root).to_string())
    }
}

/// Parses an RFC 6902 JSON Patch document into a best-effort [`Diff`].
///
/// Only `add`/`remove`/`replace` operations are supported; `test`
/// operations are consumed as context and do not produce elements of their
/// own.
pub fn parse_json_patch(text: &str) -> Result<Diff, JsonPatchError> {
    let ops: Vec<Value> = serde_json::from_str(text)?;
    let mut elements = Vec::new();
    for entry in ops {
        let object = entry.as_object().ok_or_else(|| JsonPatchError::Unrepresentable {
            path: String::new(),
            reason: "patch operation must be a JSON object".into(),
        })?;
        let Some(op_name) = object.get("op").and_then(Value::as_str) else {
            continue;
        };
        if op_name == "test" {
            continue;
        }
        let pointer = object.get("path").and_then(Value::as_str).unwrap_or("/");
        let path = pointer_to_path(pointer);
        let value = object.get("value").cloned();
        let node = match value {
            Some(v) => Node::from_json_value(v).map_err(|_| JsonPatchError::Unrepresentable {
                path: pointer.to_owned(),
                reason: "invalid value".into(),
            })?,
            None => Node::Void,
        };
        let element = match op_name {
            "add" => DiffElement::new().with_path(path).with_add(vec![node]),
            "remove" => DiffElement::new().with_path(path).with_remove(vec![node]),
            "replace" => {
                DiffElement::new().with_path(path).with_remove(vec![Node::Void]).with_add(vec![node])
            }
            other => {
                return Err(JsonPatchError::Unrepresentable {
                    path: pointer.to_owned(),
                    reason: format!("unsupported op {other}"),
                })
            }
        };
        elements.push(element);
    }
    Ok(Diff::from_elements(elements))
}

fn pointer_to_path(pointer: &str) -> Path {
    let mut segments = Vec::new();
    for token in pointer.split('/').skip(1) {
        let token = token.replace("~1", "/").replace("~0", "~");
        if let Ok(index) = token.parse::<i64>() {
            segments.push(PathSegment::Index(index));
        } else {
            segments.push(PathSegment::Key(token));
        }
    }
    Path::from(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diff::DiffMetadata, DiffOptions};

    #[test]
    fn renders_list_context_with_test_ops() {
        let lhs = Node::from_json_str("[1,2,3]").unwrap();
        let rhs = Node::from_json_str("[1,4,3]").unwrap();
        let diff = lhs.diff(&rhs, &DiffOptions::default());
        let patch = diff.render_patch().unwrap();
        assert_eq!(
            patch,
            "[{\"op\":\"test\",\"path\":\"/0\",\"value\":1},{\"op\":\"test\",\"path\":\"/2\",\"value\":3},{\"op\":\"test\",\"path\":\"/1\",\"value\":2},{\"op\":\"remove\",\"path\":\"/1\",\"value\":2},{\"op\":\"add\",\"path\":\"/1\",\"value\":4}]"
        );
    }

    #[test]
    fn rejects_numeric_object_keys() {
        let element = DiffElement::new()
            .with_path(PathSegment::key("0"))
            .with_remove(vec![Node::Null])
            .with_add(vec![Node::Null]);
        let diff = Diff::from_elements(vec![element]);
        let err = diff.render_patch().unwrap_err();
        assert!(err
            .to_string()
            .contains("JSON Pointer does not support object keys that look like numbers"));
    }

    #[test]
    fn merge_requires_merge_metadata() {
        let element = DiffElement::new()
            .with_path(PathSegment::key("name"))
            .with_add(vec![Node::from_json_str("\"jd\"").unwrap()]);
        let diff = Diff::from_elements(vec![element]);
        let err = diff.render_merge().unwrap_err();
        assert_eq!(err.to_string(), "cannot render non-merge element as merge");
    }

    #[test]
    fn merge_outputs_object() {
        let element = DiffElement::new()
            .with_metadata(DiffMetadata::merge())
            .with_path(PathSegment::key("name"))
            .with_add(vec![Node::from_json_str("\"jd\"").unwrap()]);
        let diff = Diff::from_elements(vec![element]);
        let rendered = diff.render_merge().unwrap();
        assert_eq!(rendered, "{\"name\":\"jd\"}");
    }
}
