use chassis_core::{array_remove, is_json, str_remove_first, to_json};

#[test]
fn is_json_accepts_valid_documents_and_rejects_garbage() {
    assert!(is_json(r#"{"name": "amr"}"#));
    assert!(is_json("[1, 2, 3]"));
    assert!(is_json("42"));
    assert!(!is_json("{not json"));
    assert!(!is_json(""));
}

#[test]
fn to_json_pretty_prints_without_escaping() {
    let value = serde_json::json!({"path": "a/b", "name": "مرحبا"});
    let encoded = to_json(&value).expect("encode");
    assert!(encoded.contains("a/b"));
    assert!(encoded.contains("مرحبا"));
    assert!(encoded.contains('\n'));
}

#[test]
fn array_remove_first_only_removes_a_single_occurrence() {
    let mut items = vec![1, 2, 1, 3, 1];
    let removed = array_remove(&mut items, &1, true);
    assert_eq!(removed, 1);
    assert_eq!(items, vec![2, 1, 3, 1]);
}

#[test]
fn array_remove_all_removes_every_occurrence() {
    let mut items = vec!["a", "b", "a", "c"];
    let removed = array_remove(&mut items, &"a", false);
    assert_eq!(removed, 2);
    assert_eq!(items, vec!["b", "c"]);
}

#[test]
fn array_remove_missing_value_is_a_noop() {
    let mut items = vec![1, 2, 3];
    assert_eq!(array_remove(&mut items, &9, true), 0);
    assert_eq!(array_remove(&mut items, &9, false), 0);
    assert_eq!(items, vec![1, 2, 3]);
}

#[test]
fn str_remove_first_drops_only_the_first_occurrence() {
    assert_eq!(str_remove_first("foo.bar.foo", "foo"), ".bar.foo");
    assert_eq!(str_remove_first("no match here", "zap"), "no match here");
}
