//! Rendering of [`Diff`] values into the native jd text format, and the
//! non-reversible transformations (`reverse`, raw JSON) used by consumers
//! that don't need an interop format.

use thiserror::Error;

use crate::{
    diff::{Diff, DiffElement, DiffMetadata},
    Node,
};

/// Errors produced while reversing a [`Diff`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReverseError {
    /// A diff element carrying `ASSOC_IN`/merge metadata cannot be reversed:
    /// merge patches are one-directional (they tolerate missing structure on
    /// the way in, which has no inverse).
    #[error("cannot reverse merge diff element at {path}")]
    MergeElement {
        /// The rendered path of the offending element.
        path: String,
    },
}

/// Configuration for [`Diff::render`].
///
/// ```
/// # use jd_core::RenderConfig;
/// let config = RenderConfig::default().with_color(true);
/// assert!(config.color());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderConfig {
    color: bool,
}

impl RenderConfig {
    /// Enables or disables ANSI color highlighting of removed/added lines.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Returns whether ANSI colorization is enabled.
    #[must_use]
    pub fn color(&self) -> bool {
        self.color
    }
}

const RED: &str = "\u{1b}[31m";
const GREEN: &str = "\u{1b}[32m";
const RESET: &str = "\u{1b}[0m";

fn node_text(node: &Node) -> String {
    node.to_json_value().map(|v| v.to_string()).unwrap_or_default()
}

impl Diff {
    /// Renders the diff in the native jd text format: one `@ <path>` header
    /// line per element, followed by unprefixed context lines and
    /// `-`/`+`-prefixed removal/addition lines.
    ///
    /// ```
    /// # use jd_core::{DiffOptions, Node, RenderConfig};
    /// let diff = Node::from_json_str("{\"a\":1}").unwrap()
    ///     .diff(&Node::from_json_str("{\"a\":2}").unwrap(), &DiffOptions::default());
    /// assert_eq!(diff.render(&RenderConfig::default()), "@ [\"a\"]\n- 1\n+ 2\n");
    /// ```
    #[must_use]
    pub fn render(&self, config: &RenderConfig) -> String {
        let mut out = String::new();
        for element in self.iter() {
            out.push_str("@ ");
            out.push_str(&serde_json::to_string(&element.path).unwrap_or_default());
            out.push('\n');
            for value in &element.before {
                if matches!(value, Node::Void) {
                    continue;
                }
                out.push_str(&node_text(value));
                out.push('\n');
            }
            for value in &element.remove {
                if config.color() {
                    out.push_str(RED);
                }
                out.push_str("- ");
                out.push_str(&node_text(value));
                if config.color() {
                    out.push_str(RESET);
                }
                out.push('\n');
            }
            for value in &element.add {
                if config.color() {
                    out.push_str(GREEN);
                }
                out.push_str("+ ");
                out.push_str(&node_text(value));
                if config.color() {
                    out.push_str(RESET);
                }
                out.push('\n');
            }
            for value in &element.after {
                if matches!(value, Node::Void) {
                    continue;
                }
                out.push_str(&node_text(value));
                out.push('\n');
            }
        }
        out
    }

    /// Renders the diff as raw JSON (an array of [`DiffElement`]s).
    ///
    /// ```
    /// # use jd_core::{DiffOptions, Node};
    /// let diff = Node::from_json_str("1").unwrap()
    ///     .diff(&Node::from_json_str("2").unwrap(), &DiffOptions::default());
    /// let raw = diff.render_raw().unwrap();
    /// let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    /// assert_eq!(value.as_array().unwrap().len(), 1);
    /// ```
    pub fn render_raw(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Produces the inverse diff: swapping `remove`/`add` per element while
    /// leaving `path`/`before`/`after` unchanged.
    ///
    /// Sound because list-diff path indices are computed against the
    /// common-subsequence-aligned position, which is identical seen from
    /// either direction. `ASSOC_IN`/merge elements have no inverse (tolerant
    /// patching into missing structure isn't reversible) and are rejected.
    pub fn reverse(&self) -> Result<Diff, ReverseError> {
        let mut reversed = Vec::with_capacity(self.len());
        for element in self.iter() {
            if element.metadata.as_ref().is_some_and(DiffMetadata::is_effective) {
                return Err(ReverseError::MergeElement { path: element.path.to_string() });
            }
            reversed.push(DiffElement {
                metadata: element.metadata.clone(),
                path: element.path.clone(),
                before: element.before.clone(),
                remove: element.add.clone(),
                add: element.remove.clone(),
                after: element.after.clone(),
            });
        }
        Ok(Diff::from_elements(reversed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiffOptions;

    #[test]
    fn renders_object_replacement() {
        let lhs = Node::from_json_str("{\"a\":1}").unwrap();
        let rhs = Node::from_json_str("{\"a\":2}").unwrap();
        let diff = lhs.diff(&rhs, &DiffOptions::default());
        assert_eq!(diff.render(&RenderConfig::default()), "@ [\"a\"]\n- 1\n+ 2\n");
    }

    #[test]
    fn colorizes_when_requested() {
        let lhs = Node::from_json_str("\"x\"").unwrap();
        let rhs = Node::from_json_str("\"y\"").unwrap();
        let diff = lhs.diff(&rhs, &DiffOptions::default());
        let rendered = diff.render(&RenderConfig::default().with_color(true));
        assert!(rendered.contains(RED));
        assert!(rendered.contains(GREEN));
    }

    #[test]
    fn reverse_swaps_add_and_remove() {
        let lhs = Node::from_json_str("{\"a\":1}").unwrap();
        let rhs = Node::from_json_str("{\"a\":2}").unwrap();
        let diff = lhs.diff(&rhs, &DiffOptions::default());
        let reversed = diff.reverse().unwrap();
        let patched = rhs.apply_patch(&reversed).unwrap();
        assert_eq!(patched, lhs);
    }

    #[test]
    fn reverse_rejects_merge_elements() {
        let element = DiffElement::new()
            .with_metadata(DiffMetadata::merge())
            .with_path(crate::diff::PathSegment::key("a"))
            .with_add(vec![Node::from_json_str("1").unwrap()]);
        let diff = Diff::from_elements(vec![element]);
        let err = diff.reverse().unwrap_err();
        assert_eq!(err.to_string(), "cannot reverse merge diff element at [a]");
    }
}
