//! Path masks restricting which positions a diff is allowed to mention.
//!
//! A mask is an ordered list of inclusion/exclusion rules, each a JSON path
//! prefix. A position in the document is masked out (and so excluded from
//! the diff) when the *last* rule whose path is a prefix of that position is
//! exclusive, or when no rule matches at all and the mask's first rule is
//! inclusive (an inclusive-first mask defaults everything else to excluded).
//! A masked-out position is still recursed into when some inclusive rule's
//! path lies at or below it, so that a deeper include can still surface.

use serde::{Deserialize, Serialize};

use crate::{
    diff::{Path, PathSegment},
    MaskError,
};

/// A single mask rule: include or exclude the subtree rooted at `path`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskElement {
    /// Whether this rule includes (`true`) or excludes (`false`) its subtree.
    pub include: bool,
    /// The path this rule applies to.
    pub path: Path,
}

/// An ordered collection of [`MaskElement`]s.
///
/// ```
/// # use jd_core::mask::Mask;
/// let mask = Mask::parse("+[\"a\"]\n-[\"a\",\"b\"]").unwrap();
/// assert_eq!(mask.elements().len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    elements: Vec<MaskElement>,
}

impl Mask {
    /// Builds a mask from an explicit list of elements.
    #[must_use]
    pub fn from_elements(elements: Vec<MaskElement>) -> Self {
        Self { elements }
    }

    /// Returns the mask's elements, in declaration order.
    #[must_use]
    pub fn elements(&self) -> &[MaskElement] {
        &self.elements
    }

    /// Parses a mask from its text form: one rule per line, each line
    /// starting with `+` (include) or `-` (exclude) followed by a JSON array
    /// path, e.g. `+["a","b"]`.
    pub fn parse(text: &str) -> Result<Self, MaskError> {
        let mut elements = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (include, rest) = if let Some(rest) = line.strip_prefix('+') {
                (true, rest)
            } else if let Some(rest) = line.strip_prefix('-') {
                (false, rest)
            } else {
                return Err(MaskError::MissingMarker { line: line.to_owned() });
            };
            let segments: Vec<PathSegment> = serde_json::from_str(rest)
                .map_err(|source| MaskError::InvalidPath { line: line.to_owned(), source })?;
            elements.push(MaskElement { include, path: Path::from(segments) });
        }
        Ok(Self { elements })
    }

    /// Decides whether `path` is masked out under this mask.
    #[must_use]
    pub fn is_masked_out(&self, path: &Path) -> bool {
        if self.elements.is_empty() {
            return false;
        }

        let mut last_match: Option<bool> = None;
        for element in &self.elements {
            if is_prefix(&element.path, path) {
                last_match = Some(element.include);
            }
        }

        match last_match {
            Some(include) => !include,
            None => self.elements[0].include,
        }
    }

    /// Decides whether a masked-out `path` should still be recursed into,
    /// because some inclusive rule targets a position at or below it.
    #[must_use]
    pub fn could_reenter(&self, path: &Path) -> bool {
        self.elements
            .iter()
            .any(|element| element.include && is_prefix(path, &element.path))
    }
}

fn is_prefix(candidate: &Path, full: &Path) -> bool {
    let candidate = candidate.segments();
    let full = full.segments();
    candidate.len() <= full.len() && candidate.iter().zip(full.iter()).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_marker() {
        let err = Mask::parse("[\"a\"]").unwrap_err();
        assert!(matches!(err, MaskError::MissingMarker { .. }));
    }

    #[test]
    fn default_exclude_when_first_rule_excludes() {
        let mask = Mask::parse("-[\"secret\"]").unwrap();
        assert!(!mask.is_masked_out(&Path::from(vec![PathSegment::key("visible")])));
        assert!(mask.is_masked_out(&Path::from(vec![PathSegment::key("secret")])));
    }

    #[test]
    fn default_include_absent_when_first_rule_includes() {
        let mask = Mask::parse("+[\"a\"]").unwrap();
        assert!(!mask.is_masked_out(&Path::from(vec![PathSegment::key("a")])));
        assert!(mask.is_masked_out(&Path::from(vec![PathSegment::key("b")])));
    }

    #[test]
    fn later_rule_overrides_earlier_one() {
        let mask = Mask::parse("+[\"a\"]\n-[\"a\",\"b\"]").unwrap();
        let a = Path::from(vec![PathSegment::key("a")]);
        let ab = Path::from(vec![PathSegment::key("a"), PathSegment::key("b")]);
        assert!(!mask.is_masked_out(&a));
        assert!(mask.is_masked_out(&ab));
    }

    #[test]
    fn masked_out_parent_can_still_be_reentered() {
        let mask = Mask::parse("-[]\n+[\"a\",\"b\"]").unwrap();
        let a = Path::from(vec![PathSegment::key("a")]);
        assert!(mask.is_masked_out(&a));
        assert!(mask.could_reenter(&a));
    }
}
