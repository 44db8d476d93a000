//! Parser for the native jd diff text format rendered by [`Diff::render`](crate::diff::Diff::render).
//!
//! Each element starts with an `@ <path>` header line followed by body
//! lines: unprefixed lines are before/after context, `-`-prefixed lines are
//! removed values, `+`-prefixed lines are added values. Context lines
//! before the first edit are `before`; context lines after the last edit
//! are `after`.

use crate::{
    diff::{Diff, DiffElement, Path},
    DiffTextError, Node,
};

fn parse_value(text: &str) -> Result<Node, DiffTextError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|_| DiffTextError::InvalidBody { line: text.to_owned() })?;
    Node::from_json_value(value).map_err(|_| DiffTextError::InvalidBody { line: text.to_owned() })
}

/// Parses the native jd diff text format into a [`Diff`].
pub fn parse_diff_str(text: &str) -> Result<Diff, DiffTextError> {
    let mut elements = Vec::new();
    let lines: Vec<&str> = text.lines().collect();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx].trim_end();
        idx += 1;
        if line.is_empty() {
            continue;
        }
        let Some(header) = line.strip_prefix("@ ") else {
            return Err(DiffTextError::InvalidBody { line: line.to_owned() });
        };
        let path: Path = serde_json::from_str(header)
            .map_err(|e| DiffTextError::InvalidHeader { line: header.to_owned(), reason: e.to_string() })?;

        let mut before = Vec::new();
        let mut remove = Vec::new();
        let mut add = Vec::new();
        let mut after = Vec::new();
        let mut seen_edit = false;

        while idx < lines.len() && !lines[idx].starts_with("@ ") {
            let body_line = lines[idx];
            idx += 1;
            if body_line.is_empty() {
                continue;
            }
            if let Some(rest) = body_line.strip_prefix("- ") {
                seen_edit = true;
                remove.push(parse_value(rest)?);
            } else if let Some(rest) = body_line.strip_prefix("+ ") {
                seen_edit = true;
                add.push(parse_value(rest)?);
            } else {
                let value = parse_value(body_line)?;
                if seen_edit {
                    after.push(value);
                } else {
                    before.push(value);
                }
            }
        }

        elements.push(
            DiffElement::new()
                .with_path(path)
                .with_before(before)
                .with_remove(remove)
                .with_add(add)
                .with_after(after),
        );
    }

    Ok(Diff::from_elements(elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiffOptions;

    #[test]
    fn round_trips_object_replacement() {
        let lhs = Node::from_json_str("{\"a\":1}").unwrap();
        let rhs = Node::from_json_str("{\"a\":2}").unwrap();
        let diff = lhs.diff(&rhs, &DiffOptions::default());
        let rendered = diff.render(&crate::RenderConfig::default());
        let parsed = parse_diff_str(&rendered).unwrap();
        assert_eq!(parsed, diff);
    }

    #[test]
    fn round_trips_list_context() {
        let lhs = Node::from_json_str("[1,2,3]").unwrap();
        let rhs = Node::from_json_str("[1,4,3]").unwrap();
        let diff = lhs.diff(&rhs, &DiffOptions::default());
        let rendered = diff.render(&crate::RenderConfig::default());
        let parsed = parse_diff_str(&rendered).unwrap();
        let patched = lhs.apply_patch(&parsed).unwrap();
        assert_eq!(patched, rhs);
    }

    #[test]
    fn rejects_missing_header() {
        let err = parse_diff_str("not a header").unwrap_err();
        assert!(matches!(err, DiffTextError::InvalidBody { .. }));
    }
}
