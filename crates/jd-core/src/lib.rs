//! Core library for a JSON/YAML structural diff and patch engine.
//!
//! `jd-core` canonicalizes JSON or YAML documents into a small tagged value
//! model ([`Node`]), computes a structural diff between two values
//! ([`Node::diff`]), and applies that diff back to a document
//! ([`Node::apply_patch`]). Arrays can be interpreted as ordered lists,
//! unordered sets, or multisets via [`DiffOptions`]; diffs can be rendered
//! in the native jd text format, RFC 6902 JSON Patch, or RFC 7396 JSON
//! Merge Patch.
//!
//! ```
//! use jd_core::{DiffOptions, Node};
//!
//! let before = Node::from_json_str(r#"{"count": 1}"#).unwrap();
//! let after = Node::from_json_str(r#"{"count": 2}"#).unwrap();
//! let diff = before.diff(&after, &DiffOptions::default());
//! let patched = before.apply_patch(&diff).unwrap();
//! assert_eq!(patched, after);
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod hash;
pub mod jsonpatch;
pub mod mask;
mod node;
mod number;
mod options;
pub mod patch;
pub mod render;
pub mod textformat;

pub mod diff;

pub use diff::{Diff, DiffElement, DiffMetadata};
pub use error::{
    CanonicalizeError, DiffTextError, JsonPatchError, MaskError, OptionsError, PatchErrorKind,
};
pub use hash::{combine, hash_bytes, HashCode};
pub use jsonpatch::parse_json_patch;
pub use mask::{Mask, MaskElement};
pub use node::Node;
pub use number::Number;
pub use options::{ArrayMode, DiffOptions};
pub use patch::PatchError;
pub use render::{RenderConfig, ReverseError};
pub use textformat::parse_diff_str;

/// Returns the semantic version of the `jd-core` crate.
///
/// ```
/// assert!(!jd_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
