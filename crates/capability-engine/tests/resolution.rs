use std::sync::Arc;

use capability_engine::{Arg, AxError, Criteria, Namespace, Node, Resolution, TransportError, Value};
use element_transport::mock::{MockElement, MockTree};
use element_transport::NoopTransport;

fn sheet() -> (Arc<MockTree>, Node) {
    let tree = Arc::new(MockTree::new());
    let sheet = tree.add_root(
        MockElement::new("AXSheet")
            .attribute("AXShowMenu", "attribute wins")
            .action("AXShowMenu")
            .writable_attribute("AXFocused", false)
            .attribute("AXTitle", "Export")
            .action("AXRaise")
            .action("AXCancel"),
    );
    tree.add_child(&sheet, MockElement::new("AXButton").attribute("AXTitle", "OK"));
    let node = Node::new(tree.clone(), sheet);
    (tree, node)
}

#[tokio::test]
async fn getter_is_preferred_over_action() {
    let (tree, node) = sheet();

    let resolved = node.resolve("show_menu", vec![]).await.unwrap();

    assert_eq!(resolved.into_value(), Some(Value::from("attribute wins")));
    assert_eq!(tree.calls().invoke_action, 0);
}

#[tokio::test]
async fn setter_writes_then_getter_reads_back() {
    let (_tree, node) = sheet();

    let written = node
        .resolve("focused=", vec![Arg::from(Value::from(true))])
        .await
        .unwrap();
    assert!(matches!(written, Resolution::Written(Value::Bool(true))));

    let read = node.resolve("focused?", vec![]).await.unwrap();
    assert_eq!(read.into_value(), Some(Value::Bool(true)));
}

#[tokio::test]
async fn setter_never_falls_through() {
    let (tree, node) = sheet();

    let err = node
        .resolve("raise=", vec![Value::from(true).into()])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AxError::CapabilityNotFound {
            namespace: Namespace::Attribute,
            ..
        }
    ));

    let err = node
        .resolve("title=", vec![Value::from("Import").into()])
        .await
        .unwrap_err();
    assert!(matches!(err, AxError::AttributeNotWritable { .. }));

    let err = node.resolve("focused=", vec![]).await.unwrap_err();
    assert!(matches!(err, AxError::InvalidArgument { .. }));

    assert_eq!(tree.calls().invoke_action, 0);
    assert_eq!(tree.calls().write_attribute, 0);
}

#[tokio::test]
async fn action_is_invoked() {
    let (tree, node) = sheet();

    let resolved = node.resolve("raise", vec![]).await.unwrap();

    assert!(matches!(resolved, Resolution::Performed(true)));
    let invoked: Vec<String> = tree.invocations().into_iter().map(|(_, a)| a).collect();
    assert_eq!(invoked, vec!["AXRaise".to_string()]);
}

#[tokio::test]
async fn unmatched_name_falls_back_to_search() {
    let (_tree, node) = sheet();

    let found = node
        .resolve("button", vec![Criteria::new().equals("title", "OK").into()])
        .await
        .unwrap();
    assert!(matches!(found, Resolution::Found(Some(_))));

    let all = node.resolve("text_fields", vec![]).await.unwrap();
    assert!(matches!(all, Resolution::FoundAll(ref nodes) if nodes.is_empty()));

    let err = node
        .resolve("buttons", vec![Value::from("OK").into()])
        .await
        .unwrap_err();
    assert!(matches!(err, AxError::InvalidArgument { .. }));
}

#[tokio::test]
async fn unknown_call_on_leaf_is_not_found() {
    let tree = Arc::new(MockTree::new());
    let leaf = tree.add_root(MockElement::new("AXStaticText").attribute("AXValue", "hi"));
    let node = Node::new(tree, leaf);

    let err = node.resolve("frobnicate", vec![]).await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        AxError::CapabilityNotFound {
            name,
            namespace,
            role,
        } => {
            assert_eq!(name, "frobnicate");
            assert_eq!(namespace, Namespace::Call);
            assert_eq!(role.as_deref(), Some("AXStaticText"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn lookup_never_performs_actions() {
    let (tree, node) = sheet();

    assert!(node.lookup("cancel", Criteria::new()).await.unwrap().is_some());
    assert_eq!(tree.calls().invoke_action, 0);
}

#[tokio::test]
async fn transport_failures_propagate_unchanged() {
    let node = Node::new(Arc::new(NoopTransport), capability_engine::ElementRef::new(1));

    let err = node.resolve("title", vec![]).await.unwrap_err();

    assert!(matches!(
        err,
        AxError::Transport(TransportError::Unavailable(_))
    ));
}

#[tokio::test]
async fn destroyed_element_fails_on_next_call() {
    let (tree, node) = sheet();
    let sheet = node.element().clone();
    let sheet_for_action = sheet.clone();
    tree.on_action(&sheet, "AXCancel", move |tree| tree.remove(&sheet_for_action));

    node.resolve("cancel", vec![]).await.unwrap();
    let err = node.resolve("title", vec![]).await.unwrap_err();

    assert!(matches!(
        err,
        AxError::Transport(TransportError::InvalidReference(_))
    ));
}
