use std::collections::BTreeMap;

use super::{Diff, DiffElement, MetadataTag, Path, PathSegment};
use crate::{hash::HashCode, DiffOptions, Node};

/// Diffs two arrays interpreted as multisets: order ignored, duplicates
/// counted. Produces a single element addressed at a bare set-element marker
/// tagged `MultiSet`, carrying every excess copy on each side.
pub(super) fn diff_multisets(
    lhs: &[Node],
    rhs: &[Node],
    path: &Path,
    options: &DiffOptions,
) -> Diff {
    let mut lhs_counts: BTreeMap<HashCode, (usize, Node)> = BTreeMap::new();
    for value in lhs {
        let hash = value.hash_code(options);
        let entry = lhs_counts.entry(hash).or_insert((0, value.clone()));
        entry.0 += 1;
    }

    let mut rhs_counts: BTreeMap<HashCode, (usize, Node)> = BTreeMap::new();
    for value in rhs {
        let hash = value.hash_code(options);
        let entry = rhs_counts.entry(hash).or_insert((0, value.clone()));
        entry.0 += 1;
    }

    let mut removed = Vec::new();
    let mut added = Vec::new();

    for (hash, (count, value)) in &lhs_counts {
        let rhs_count = rhs_counts.get(hash).map_or(0, |(c, _)| *c);
        if *count > rhs_count {
            for _ in 0..(*count - rhs_count) {
                removed.push((*hash, value.clone()));
            }
        }
    }

    for (hash, (count, value)) in &rhs_counts {
        let lhs_count = lhs_counts.get(hash).map_or(0, |(c, _)| *c);
        if *count > lhs_count {
            for _ in 0..(*count - lhs_count) {
                added.push((*hash, value.clone()));
            }
        }
    }

    if removed.is_empty() && added.is_empty() {
        return Diff::empty();
    }

    removed.sort_by_key(|(hash, _)| *hash);
    added.sort_by_key(|(hash, _)| *hash);

    let element = DiffElement::new()
        .with_path(
            path.clone().with_segment(PathSegment::set_element(vec![MetadataTag::MultiSet])),
        )
        .with_remove(removed.into_iter().map(|(_, v)| v).collect())
        .with_add(added.into_iter().map(|(_, v)| v).collect());

    Diff::from_elements(vec![element])
}
