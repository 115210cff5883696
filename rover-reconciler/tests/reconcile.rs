//! Structural operations, update signalling and commit through the adapter

use rover_reconciler::{
    is_same, props, HostAdapter, PropValue, Props, ReconcileError, ReconcilerConfig,
    StubRenderer,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn json_value(value: serde_json::Value) -> PropValue {
    PropValue::from(value)
}

#[test]
fn test_children_follow_insertion_order() {
    init_tracing();
    let mut host = HostAdapter::new(StubRenderer::new());
    let stack = host.create_node("wr-stack", Props::new()).unwrap();

    let a = host.create_node("wr-box", Props::new()).unwrap();
    let b = host.create_node("wr-button", Props::new()).unwrap();
    let c = host.create_node("wr-slider", Props::new()).unwrap();
    let d = host.create_node("wr-digits", Props::new()).unwrap();

    host.append_child(stack, a).unwrap();
    host.append_child(stack, c).unwrap();
    host.insert_child(stack, b, Some(c)).unwrap();
    host.insert_child(stack, d, None).unwrap();

    assert_eq!(host.children(stack).unwrap(), vec![a, b, c, d]);
    for child in [a, b, c, d] {
        assert_eq!(host.parent(child), Some(stack));
    }
}

#[test]
fn test_insert_before_unknown_sibling_appends() {
    let mut host = HostAdapter::new(StubRenderer::new());
    let stack = host.create_node("wr-stack", Props::new()).unwrap();
    let stranger = host.create_node("wr-box", Props::new()).unwrap();
    let a = host.create_node("wr-box", Props::new()).unwrap();
    let b = host.create_node("wr-box", Props::new()).unwrap();

    host.append_child(stack, a).unwrap();
    host.insert_child(stack, b, Some(stranger)).unwrap();

    assert_eq!(host.children(stack).unwrap(), vec![a, b]);
}

#[test]
fn test_reinsert_moves_instead_of_duplicating() {
    let mut host = HostAdapter::new(StubRenderer::new());
    let stack = host.create_node("wr-stack", Props::new()).unwrap();
    let a = host.create_node("wr-box", Props::new()).unwrap();
    let b = host.create_node("wr-box", Props::new()).unwrap();
    host.append_child(stack, a).unwrap();
    host.append_child(stack, b).unwrap();

    host.insert_child(stack, b, Some(a)).unwrap();

    assert_eq!(host.children(stack).unwrap(), vec![b, a]);
}

#[test]
fn test_unknown_component_is_fatal() {
    let mut host = HostAdapter::new(StubRenderer::new());
    let err = host.create_node("wr-blink", Props::new()).unwrap_err();
    assert_eq!(err, ReconcileError::UnknownKind("wr-blink".to_string()));
    assert_eq!(err.to_string(), "unknown component \"wr-blink\"");
}

#[test]
fn test_every_registered_tag_creates() {
    let mut host = HostAdapter::new(StubRenderer::new());
    for tag in [
        "br",
        "wr-br",
        "text",
        "wr-literal",
        "wr-text",
        "wr-style",
        "wr-window",
        "wr-box",
        "wr-button",
        "wr-collapsible",
        "wr-scrollable",
        "wr-stack",
        "wr-tree",
        "wr-accordion",
        "wr-accordion-section",
        "wr-drawer",
        "wr-tabs",
        "wr-tabs-section",
        "wr-checkbox",
        "wr-collapsible-text",
        "wr-console",
        "wr-digits",
        "wr-input",
        "wr-separator",
        "wr-slider",
        "wr-space",
    ] {
        assert!(host.create_node(tag, Props::new()).is_ok(), "{tag}");
    }
}

#[test]
fn test_prepare_update_contract() {
    let host = HostAdapter::new(StubRenderer::new());
    let old = props([
        ("label", json_value(json!("Save"))),
        ("style", json_value(json!({ "bold": true, "fg": "blue" }))),
        ("items", json_value(json!([1, 2, 3]))),
    ]);

    assert!(host.prepare_update(&old, &old.clone()).is_none());

    let mut changed = old.clone();
    changed.insert("items".into(), json_value(json!([1, 3, 2])));
    assert!(host.prepare_update(&old, &changed).is_some());

    let mut added = old.clone();
    added.insert("width".into(), PropValue::from(10));
    assert!(host.prepare_update(&old, &added).is_some());
    assert!(host.prepare_update(&added, &old).is_some());

    let mut nil_added = old.clone();
    nil_added.insert("width".into(), PropValue::Nil);
    assert!(host.prepare_update(&old, &nil_added).is_some());
}

#[test]
fn test_comparator_examples() {
    let xy = json_value(json!({ "x": 1, "y": 2 }));
    assert!(is_same(&xy, &json_value(json!({ "y": 2, "x": 1 }))));
    assert!(!is_same(&json_value(json!({ "x": 1 })), &xy));
    assert!(is_same(
        &json_value(json!([1, 2, 3])),
        &json_value(json!([1, 2, 3]))
    ));
    assert!(!is_same(
        &json_value(json!([1, 2, 3])),
        &json_value(json!([1, 3, 2]))
    ));
}

#[test]
fn test_update_props_replaces_bag() {
    let mut host = HostAdapter::new(StubRenderer::new());
    let node = host
        .create_node("wr-input", props([("value", "a"), ("placeholder", "type")]))
        .unwrap();

    host.update_props(
        node,
        props([("value", json_value(json!("b"))), ("children", json_value(json!([])))]),
    )
    .unwrap();

    let bag = &host.tree().get(node).unwrap().props;
    assert_eq!(bag.len(), 1);
    assert_eq!(bag["value"].as_str(), Some("b"));
}

#[test]
fn test_remove_then_destroy_releases_subtree() {
    let mut host = HostAdapter::new(StubRenderer::new());
    let root = host.root();
    let boxed = host.create_node("wr-box", Props::new()).unwrap();
    let inner = host.create_node("wr-stack", Props::new()).unwrap();
    let text = host.create_text("inside");
    host.append_child(root, boxed).unwrap();
    host.append_child(boxed, inner).unwrap();
    host.append_child(inner, text).unwrap();
    host.commit().unwrap();

    host.remove_child(root, boxed).unwrap();
    assert!(host.children(root).unwrap().is_empty());
    assert!(host.tree().contains(text));

    host.destroy(boxed).unwrap();
    assert!(!host.tree().contains(inner));
    assert!(!host.tree().contains(text));
    assert_eq!(host.tree().len(), 1);
}

#[test]
fn test_clear_container() {
    let mut host = HostAdapter::new(StubRenderer::new());
    let root = host.root();
    for _ in 0..3 {
        let node = host.create_node("wr-box", Props::new()).unwrap();
        host.append_child(root, node).unwrap();
    }
    let text = host.create_text("loose");
    host.append_child(root, text).unwrap();

    host.clear_container();

    assert!(host.children(root).unwrap().is_empty());
    assert_eq!(host.tree().len(), 1);
}

#[test]
fn test_commit_redraws_once_per_call() {
    init_tracing();
    let buffer = Rc::new(RefCell::new(Vec::new()));
    let config = ReconcilerConfig::new().with_log_operations(true);
    let mut host = HostAdapter::with_config(StubRenderer::with_buffer(buffer.clone()), config);
    let root = host.root();
    let button = host.create_node("wr-button", Props::new()).unwrap();
    host.append_child(root, button).unwrap();

    host.commit().unwrap();
    host.commit().unwrap();

    assert_eq!(host.renderer().frames(), 2);
    let log = buffer.borrow();
    assert_eq!(log.iter().filter(|line| line.starts_with("=== FRAME")).count(), 2);
    assert!(log.iter().any(|line| line.contains("wr-button")));
}

#[test]
fn test_destroying_unresolved_run_frees_slot_cleanly() {
    let mut host = HostAdapter::new(StubRenderer::new());
    let root = host.root();
    let boxed = host.create_node("wr-box", Props::new()).unwrap();
    let text = host.create_text("a");
    host.append_child(root, boxed).unwrap();
    host.append_child(boxed, text).unwrap();
    let run = host.text_run_of(text).unwrap();

    // no commit: the run is still waiting for resolution
    host.destroy(boxed).unwrap();
    assert!(!host.tree().contains(run));

    let stacks: Vec<_> = (0..3)
        .map(|_| host.create_node("wr-stack", Props::new()).unwrap())
        .collect();
    assert!(stacks.contains(&run));

    for stack in stacks {
        assert!(host.children(stack).unwrap().is_empty());
        assert_eq!(
            host.text_content(stack),
            Err(ReconcileError::NotAContainer { kind: "wr-stack" })
        );
    }
    host.commit().unwrap();
}
