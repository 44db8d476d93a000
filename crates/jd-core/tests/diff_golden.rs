//! Golden diff cases, inlined rather than loaded from fixture files (this
//! port carries no `tests/fixtures/` directory; see `DESIGN.md`).

use jd_core::diff::{Diff, DiffElement, Path, PathSegment};
use jd_core::{ArrayMode, DiffOptions, Node, RenderConfig};

fn node(text: &str) -> Node {
    Node::from_json_str(text).expect("fixture text should parse")
}

#[test]
fn list_mode_scalar_replacement() {
    let lhs = node(r#"{"a":1}"#);
    let rhs = node(r#"{"a":2}"#);
    let diff = lhs.diff(&rhs, &DiffOptions::default());
    let expected = Diff::from_elements(vec![DiffElement::new()
        .with_path(PathSegment::key("a"))
        .with_remove(vec![node("1")])
        .with_add(vec![node("2")])]);
    assert_eq!(diff, expected);
}

#[test]
fn list_mode_nested_array_insertion() {
    let lhs = node("[[]]");
    let rhs = node("[[1]]");
    let diff = lhs.diff(&rhs, &DiffOptions::default());
    let expected = Diff::from_elements(vec![DiffElement::new()
        .with_path(Path::from(vec![PathSegment::index(0), PathSegment::index(0)]))
        .with_add(vec![node("1")])
        .with_after(vec![Node::Void])]);
    assert_eq!(diff, expected);

    let base = node("[[],[2]]");
    let patched = base.apply_patch(&diff).expect("patch should apply");
    assert_eq!(patched, node("[[1],[2]]"));
}

#[test]
fn list_mode_append_marks_void_after_context() {
    let lhs = node("[1,2]");
    let rhs = node("[1,2,3]");
    let diff = lhs.diff(&rhs, &DiffOptions::default());
    let expected = Diff::from_elements(vec![DiffElement::new()
        .with_path(Path::from(vec![PathSegment::index(2)]))
        .with_before(vec![node("2")])
        .with_add(vec![node("3")])
        .with_after(vec![Node::Void])]);
    assert_eq!(diff, expected);
}

#[test]
fn set_mode_adds_new_members() {
    let lhs = node(r#"{"a":{"b":["3","4"]}}"#);
    let rhs = node(r#"{"a":{"b":["3","4","5","6"]}}"#);
    let options = DiffOptions::default().with_array_mode(ArrayMode::Set).unwrap();
    let diff = lhs.diff(&rhs, &options);
    let patched = lhs.apply_patch(&diff).expect("patch should apply");
    assert!(patched.eq_with_options(&rhs, &options));
}

#[test]
fn setkeys_mode_recurses_into_identity_matched_objects() {
    let lhs = node(r#"[{"id":1,"name":"alice"},{"id":2,"name":"bob"}]"#);
    let rhs = node(r#"[{"id":1,"name":"alicia"},{"id":3,"name":"carl"}]"#);
    let options =
        DiffOptions::default().with_array_mode(ArrayMode::Set).unwrap().with_set_keys(["id"]).unwrap();
    let diff = lhs.diff(&rhs, &options);

    let expected = Diff::from_elements(vec![
        DiffElement::new()
            .with_path(Path::from(vec![
                PathSegment::specific_set_element(
                    node(r#"{"id":1,"name":"alice"}"#),
                    vec![jd_core::diff::MetadataTag::SetKeys(vec!["id".to_owned()])],
                ),
                PathSegment::key("name"),
            ]))
            .with_remove(vec![node("\"alice\"")])
            .with_add(vec![node("\"alicia\"")]),
        DiffElement::new()
            .with_path(Path::from(vec![PathSegment::set_element(vec![
                jd_core::diff::MetadataTag::SetKeys(vec!["id".to_owned()]),
            ])]))
            .with_remove(vec![node(r#"{"id":2,"name":"bob"}"#)])
            .with_add(vec![node(r#"{"id":3,"name":"carl"}"#)]),
    ]);
    assert_eq!(diff, expected);

    let patched = lhs.apply_patch(&diff).expect("setkeys patch should apply");
    assert!(patched.eq_with_options(&rhs, &options));
}

#[test]
fn multiset_mode_replace_reports_every_excess_copy() {
    let lhs = node(r#"["foo","foo","bar"]"#);
    let rhs = node(r#"["baz"]"#);
    let options = DiffOptions::default().with_array_mode(ArrayMode::MultiSet).unwrap();
    let diff = lhs.diff(&rhs, &options);
    let rendered = diff.render(&RenderConfig::default());
    assert_eq!(rendered, "@ [[\"multiset\"],{}]\n- \"bar\"\n- \"foo\"\n- \"foo\"\n+ \"baz\"\n");
}
