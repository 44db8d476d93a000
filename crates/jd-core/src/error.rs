use thiserror::Error;

/// Errors that can occur while canonicalizing external data into [`Node`](crate::Node).
///
/// ```
/// # use jd_core::Node;
/// let err = Node::from_json_str("{").unwrap_err();
/// assert!(matches!(err, jd_core::CanonicalizeError::Json(_)));
/// ```
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// YAML maps may only contain string keys.
    #[error("unsupported YAML key type: {found}")]
    NonStringYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags are not supported by the Go implementation and therefore
    /// rejected by the Rust port as well.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
    /// Attempted to construct a [`Number`](crate::Number) that is not finite.
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
}

/// Errors emitted when constructing [`DiffOptions`](crate::DiffOptions).
///
/// ```
/// # use jd_core::{ArrayMode, DiffOptions};
/// let err = DiffOptions::default()
///     .with_array_mode(ArrayMode::Set)
///     .and_then(|opts| opts.with_precision(0.1))
///     .unwrap_err();
/// assert!(matches!(err, jd_core::OptionsError::PrecisionIncompatible));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// Precision tolerance is incompatible with set or multiset semantics.
    #[error("precision tolerance cannot be combined with set or multiset array modes")]
    PrecisionIncompatible,
    /// Set keys require arrays to operate in set mode.
    #[error("set keys require array mode to be set")]
    SetKeysRequireSetMode,
    /// Set keys must be non-empty strings.
    #[error("set keys must be non-empty strings")]
    EmptySetKey,
}

/// Classifies a [`PatchError`](crate::patch::PatchError) without disturbing its
/// rendered message, following the taxonomy of error conditions a patch
/// application can run into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchErrorKind {
    /// A path segment did not resolve against the document shape (e.g. an
    /// object key used where an array index was expected).
    Path,
    /// The document did not contain the value the diff expected to find.
    ExpectedValue,
    /// A diff element carried more removals/additions than the target
    /// collection's cardinality allows (e.g. multiple values at a scalar).
    Cardinality,
    /// A set or multiset element could not be matched by identity.
    Identity,
    /// The diff cannot be represented in the requested output encoding.
    Unrepresentable,
}

/// Errors produced while parsing or evaluating a [`Mask`](crate::mask::Mask).
#[derive(Debug, Error)]
pub enum MaskError {
    /// A mask line did not start with an inclusion (`+`) or exclusion (`-`) marker.
    #[error("mask line must start with '+' or '-': {line}")]
    MissingMarker {
        /// The offending line.
        line: String,
    },
    /// A mask line's path could not be parsed as a JSON array.
    #[error("invalid mask path on line {line}: {source}")]
    InvalidPath {
        /// The offending line.
        line: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}

/// Errors produced while parsing or rendering the native jd diff text format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffTextError {
    /// An `@` header line could not be parsed as a JSON path array.
    #[error("invalid diff header {line}: {reason}")]
    InvalidHeader {
        /// The offending line.
        line: String,
        /// A human readable reason.
        reason: String,
    },
    /// A body line was missing its `+`/`-` prefix and is not valid context.
    #[error("invalid diff body line: {line}")]
    InvalidBody {
        /// The offending line.
        line: String,
    },
    /// The document ended while a diff element was still being parsed.
    #[error("unexpected end of diff text")]
    UnexpectedEof,
}

/// Errors produced while rendering or parsing RFC 6902 JSON Patch / RFC 7396
/// JSON Merge Patch documents.
#[derive(Debug, Error)]
pub enum JsonPatchError {
    /// The diff contains set or multiset elements, which have no
    /// representation in JSON Patch or JSON Merge Patch.
    #[error("diff element at {path} cannot be represented in this format: {reason}")]
    Unrepresentable {
        /// The path of the offending element, rendered for display.
        path: String,
        /// A human readable reason.
        reason: String,
    },
    /// More than one line of before/after context was supplied, which JSON
    /// Pointer addressing cannot express.
    #[error("only one line of {kind} context supported. got {found}")]
    TooMuchContext {
        /// Which context list overflowed (`"before"` or `"after"`).
        kind: &'static str,
        /// How many lines were supplied.
        found: usize,
    },
    /// The path contains an object key that looks like a JSON Pointer array
    /// index, which is ambiguous under RFC 6901.
    #[error("JSON Pointer does not support object keys that look like numbers: {key}")]
    NumericObjectKey {
        /// The offending key.
        key: String,
    },
    /// Attempted to render a non-merge element as a JSON Merge Patch.
    #[error("cannot render non-merge element as merge")]
    NotMergeElement,
    /// The underlying JSON document could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
