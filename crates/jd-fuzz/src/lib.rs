//! Fuzzing harnesses for the jd diff/patch engine.
//!
//! Each `fuzz_*` function is the logic behind one `cargo-fuzz` target under
//! `fuzz/fuzz_targets/`; the targets themselves are thin `fuzz_target!`
//! wrappers so the harness logic can also run under plain `#[test]`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Arbitrary;
use jd_core::{DiffOptions, Node};

/// Canonicalizes arbitrary bytes as JSON, asserting the canonicalization
/// round-trips through `to_json_value` without panicking.
pub fn fuzz_canonicalization(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let Ok(node) = Node::from_json_str(text) else { return };
    if let Some(value) = node.to_json_value() {
        let _ = Node::from_json_value(value);
    }
}

/// Input for the `diff` fuzz target: two independently-generated JSON texts.
#[derive(Arbitrary, Debug)]
pub struct DiffInput {
    /// Left-hand document text.
    pub lhs: String,
    /// Right-hand document text.
    pub rhs: String,
}

/// Diffs two arbitrary JSON texts and asserts the round-trip law holds:
/// `patch(lhs, diff(lhs, rhs)) = rhs`.
pub fn fuzz_diff(lhs: &str, rhs: &str) {
    let Ok(lhs_node) = Node::from_json_str(lhs) else { return };
    let Ok(rhs_node) = Node::from_json_str(rhs) else { return };
    let diff = lhs_node.diff(&rhs_node, &DiffOptions::default());
    if let Ok(patched) = lhs_node.apply_patch(&diff) {
        assert_eq!(patched, rhs_node, "round-trip invariant violated");
    }
}

/// Input for the `patch_apply` fuzz target: a document and an independently
/// generated diff-text body.
#[derive(Arbitrary, Debug)]
pub struct PatchApplyInput {
    /// The document to patch.
    pub document: String,
    /// The native jd diff text to parse and apply.
    pub diff_text: String,
}

/// Parses arbitrary diff text and applies it to an arbitrary document,
/// asserting only that patch application never panics (applying an
/// unrelated diff is expected to fail with a typed error, not crash).
pub fn fuzz_patch_apply(document: &str, diff_text: &str) {
    let Ok(node) = Node::from_json_str(document) else { return };
    let Ok(diff) = jd_core::parse_diff_str(diff_text) else { return };
    let _ = node.apply_patch(&diff);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalization_survives_garbage_input() {
        fuzz_canonicalization(b"not json");
        fuzz_canonicalization(b"{\"a\":1}");
    }

    #[test]
    fn diff_round_trips_on_valid_input() {
        fuzz_diff("{\"a\":1}", "{\"a\":2}");
    }

    #[test]
    fn patch_apply_rejects_unrelated_diff_without_panicking() {
        fuzz_patch_apply("{\"a\":1}", "@ [\"b\"]\n- 1\n+ 2\n");
    }
}
