//! Benchmark corpora for the jd diff/patch engine.
//!
//! Corpora are small, realistic before/after JSON document pairs embedded
//! directly in source (no fixture directory, so the crate has no external
//! data dependency). [`available_corpora`] is the single entry point the
//! Criterion harness and the smoke tests both consume.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use jd_core::{CanonicalizeError, Diff, DiffOptions, Node, RenderConfig};

/// A named pair of JSON document texts used as a benchmark fixture.
#[derive(Clone, Copy, Debug)]
pub struct Corpus {
    name: &'static str,
    before: &'static str,
    after: &'static str,
}

impl Corpus {
    /// The corpus's identifier, used to label Criterion groups.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The combined byte size of the before/after fixture texts, used to
    /// report Criterion throughput.
    #[must_use]
    pub fn fixture_bytes(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Canonicalizes the fixture texts into a ready-to-diff [`Dataset`].
    pub fn load(&self) -> Result<Dataset, CanonicalizeError> {
        Ok(Dataset { before: Node::from_json_str(self.before)?, after: Node::from_json_str(self.after)? })
    }
}

/// A canonicalized before/after document pair.
#[derive(Clone, Debug)]
pub struct Dataset {
    before: Node,
    after: Node,
}

impl Dataset {
    /// The document before the change.
    #[must_use]
    pub fn before(&self) -> &Node {
        &self.before
    }

    /// The document after the change.
    #[must_use]
    pub fn after(&self) -> &Node {
        &self.after
    }

    /// Computes the structural diff between the two documents.
    #[must_use]
    pub fn diff(&self, options: &DiffOptions) -> Diff {
        self.before.diff(&self.after, options)
    }

    /// Renders a diff computed from this dataset in the native jd text
    /// format.
    #[must_use]
    pub fn render_native(&self, diff: &Diff, config: &RenderConfig) -> String {
        diff.render(config)
    }
}

const GITHUB_ISSUE_BEFORE: &str = r#"{
  "number": 482,
  "title": "diff output is confusing for reordered arrays",
  "state": "open",
  "labels": ["bug", "needs-triage"],
  "assignees": [],
  "comments": 2,
  "user": { "login": "arin", "id": 9931 },
  "body": "When I diff two documents that only swapped array order I get a huge diff."
}"#;

const GITHUB_ISSUE_AFTER: &str = r#"{
  "number": 482,
  "title": "diff output is confusing for reordered arrays",
  "state": "closed",
  "labels": ["bug", "wontfix"],
  "assignees": ["kcz"],
  "comments": 4,
  "user": { "login": "arin", "id": 9931 },
  "body": "When I diff two documents that only swapped array order I get a huge diff.",
  "closed_by": { "login": "kcz", "id": 1 }
}"#;

const CONFIG_SNAPSHOT_BEFORE: &str = r#"{
  "service": "billing-api",
  "replicas": 3,
  "resources": { "cpu": "500m", "memory": "512Mi" },
  "env": {
    "LOG_LEVEL": "info",
    "FEATURE_FLAGS": "new-invoice-ui"
  },
  "dependencies": ["postgres", "redis"]
}"#;

const CONFIG_SNAPSHOT_AFTER: &str = r#"{
  "service": "billing-api",
  "replicas": 5,
  "resources": { "cpu": "1", "memory": "1Gi" },
  "env": {
    "LOG_LEVEL": "debug",
    "FEATURE_FLAGS": "new-invoice-ui,bulk-export"
  },
  "dependencies": ["postgres", "redis", "kafka"]
}"#;

const DEEP_NESTING_BEFORE: &str = r#"{
  "org": {
    "teams": [
      { "name": "platform", "members": ["a", "b", "c"] },
      { "name": "growth", "members": ["d"] }
    ]
  }
}"#;

const DEEP_NESTING_AFTER: &str = r#"{
  "org": {
    "teams": [
      { "name": "platform", "members": ["a", "b"] },
      { "name": "growth", "members": ["d", "e"] },
      { "name": "data", "members": ["f"] }
    ]
  }
}"#;

/// Returns the registered benchmark corpora.
#[must_use]
pub fn available_corpora() -> Vec<Corpus> {
    vec![
        Corpus { name: "github-issue", before: GITHUB_ISSUE_BEFORE, after: GITHUB_ISSUE_AFTER },
        Corpus {
            name: "config-snapshot",
            before: CONFIG_SNAPSHOT_BEFORE,
            after: CONFIG_SNAPSHOT_AFTER,
        },
        Corpus { name: "deep-nesting", before: DEEP_NESTING_BEFORE, after: DEEP_NESTING_AFTER },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_corpus_loads_and_diffs() {
        for corpus in available_corpora() {
            let dataset = corpus.load().expect("corpus should canonicalize");
            let diff = dataset.diff(&DiffOptions::default());
            assert!(!diff.is_empty(), "{} should produce a non-empty diff", corpus.name());
        }
    }

    #[test]
    fn fixture_bytes_matches_text_length() {
        let corpus = available_corpora().into_iter().next().unwrap();
        assert_eq!(corpus.fixture_bytes(), corpus.before.len() + corpus.after.len());
    }
}
