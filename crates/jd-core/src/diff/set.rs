use std::collections::BTreeMap;

use super::{diff_impl, Diff, DiffElement, MetadataTag, Path, PathSegment};
use crate::{hash::HashCode, DiffOptions, Node};

/// Diffs two arrays interpreted as sets: membership only, order and
/// duplicates ignored. Identity is the full object hash by default, or a
/// projection onto `options.set_keys()` when `SETKEYS` is configured.
///
/// Identities present on both sides whose values are both objects recurse
/// into a `SpecificSetElement` sub-diff to capture field-level changes
/// instead of treating the whole member as replaced; identities unique to
/// one side go into a single bare set-element's remove/add lists.
pub(super) fn diff_sets(lhs: &[Node], rhs: &[Node], path: &Path, options: &DiffOptions) -> Diff {
    let lhs_map = identity_map(lhs, options);
    let rhs_map = identity_map(rhs, options);
    let tag = set_tag(options);

    let mut elements = Vec::new();
    let mut removed: Vec<(HashCode, Node)> = Vec::new();
    let mut added: Vec<(HashCode, Node)> = Vec::new();

    for (hash, value) in &lhs_map {
        match rhs_map.get(hash) {
            None => removed.push((*hash, value.clone())),
            Some(other) => {
                if let (Node::Object(_), Node::Object(_)) = (value, other) {
                    let sub_path = path
                        .clone()
                        .with_segment(PathSegment::specific_set_element(value.clone(), tag.clone()));
                    elements.extend(diff_impl(value, other, &sub_path, options));
                }
            }
        }
    }

    for (hash, value) in &rhs_map {
        if !lhs_map.contains_key(hash) {
            added.push((*hash, value.clone()));
        }
    }

    if !removed.is_empty() || !added.is_empty() {
        removed.sort_by_key(|(hash, _)| *hash);
        added.sort_by_key(|(hash, _)| *hash);

        let element = DiffElement::new()
            .with_path(path.clone().with_segment(PathSegment::set_element(tag)))
            .with_remove(removed.into_iter().map(|(_, v)| v).collect())
            .with_add(added.into_iter().map(|(_, v)| v).collect());
        elements.push(element);
    }

    Diff::from_elements(elements)
}

fn identity_map(values: &[Node], options: &DiffOptions) -> BTreeMap<HashCode, Node> {
    values.iter().map(|value| (value.identity_hash_code(options), value.clone())).collect()
}

fn set_tag(options: &DiffOptions) -> Vec<MetadataTag> {
    match options.set_keys() {
        Some(keys) => vec![MetadataTag::SetKeys(keys.to_vec())],
        None => vec![MetadataTag::Set],
    }
}
