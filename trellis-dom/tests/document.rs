//! Document behaviour exercised through the public API only.

use std::cell::RefCell;
use std::rc::Rc;
use trellis_dom::{Document, DomError, DomEvent, EventTarget};

/// Builds `<div id="app" class="shell"><ul><li>a</li><li>b</li></ul></div>` under body.
fn sample(document: &Document) -> (trellis_dom::NodeId, trellis_dom::NodeId) {
    let app = document.create_element("div");
    document.set_attribute(app, "id", "app").unwrap();
    document.add_class(app, "shell").unwrap();
    let list = document.create_element("ul");
    for label in ["a", "b"] {
        let item = document.create_element("li");
        document.append_child(item, document.create_text_node(label)).unwrap();
        document.append_child(list, item).unwrap();
    }
    document.append_child(app, list).unwrap();
    document.append_child(document.body(), app).unwrap();
    (app, list)
}

#[test]
fn test_serialises_skeleton_and_content() {
    let document = Document::new();
    assert_eq!(
        document.to_html(),
        "<!DOCTYPE html><html><head></head><body></body></html>"
    );

    let (app, _) = sample(&document);
    assert_eq!(
        document.outer_html(app).unwrap(),
        "<div id=\"app\" class=\"shell\"><ul><li>a</li><li>b</li></ul></div>"
    );
}

#[test]
fn test_query_selector() {
    let document = Document::new();
    let (app, list) = sample(&document);

    assert_eq!(document.query_selector("#app").unwrap(), Some(app));
    assert_eq!(document.query_selector("div.shell > ul").unwrap(), Some(list));
    assert_eq!(document.query_selector_all("body li").unwrap().len(), 2);
    assert_eq!(document.query_selector("my-app").unwrap(), None);
    assert!(matches!(
        document.query_selector("div >"),
        Err(DomError::InvalidSelector { .. })
    ));
}

#[test]
fn test_insert_before_reorders_siblings() {
    let document = Document::new();
    let (_, list) = sample(&document);
    let items = document.child_nodes(list);

    document.insert_before(list, items[1], Some(items[0])).unwrap();
    assert_eq!(document.inner_html(list).unwrap(), "<li>b</li><li>a</li>");

    let stray = document.create_element("span");
    assert!(matches!(
        document.insert_before(list, stray, Some(stray)),
        Ok(())
    ));
    assert!(matches!(
        document.insert_before(document.body(), stray, Some(items[0])),
        Err(DomError::HierarchyRequest { .. })
    ));
}

#[test]
fn test_listener_bubbling_and_default_prevention() {
    let document = Document::new();
    let (app, list) = sample(&document);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    document
        .add_event_listener(
            EventTarget::Node(app),
            "click",
            Rc::new(move |event: &DomEvent| {
                log.borrow_mut().push("app");
                event.prevent_default();
            }),
        )
        .unwrap();
    let log = seen.clone();
    let window = document
        .add_event_listener(
            EventTarget::Window,
            "click",
            Rc::new(move |_: &DomEvent| log.borrow_mut().push("window")),
        )
        .unwrap();

    let allowed = document
        .dispatch_event(EventTarget::Node(list), &DomEvent::new("click"))
        .unwrap();
    assert!(!allowed);
    assert_eq!(*seen.borrow(), vec!["app", "window"]);

    assert!(document.remove_event_listener(window));
    assert_eq!(document.listener_count(EventTarget::Window, "click"), 0);
}

#[test]
fn test_styles_and_classes() {
    let document = Document::new();
    let (app, _) = sample(&document);

    document.set_style(app, "Background-Color", "red").unwrap();
    assert_eq!(
        document.get_style(app, "background-color").unwrap().as_deref(),
        Some("red")
    );
    assert_eq!(
        document.get_attribute(app, "style").unwrap().as_deref(),
        Some("background-color: red;")
    );

    document.remove_class(app, "shell").unwrap();
    assert!(!document.has_class(app, "shell"));
    assert!(document.class_list(app).unwrap().is_empty());
}

#[test]
fn test_shadow_root_serialises_before_light_children() {
    let document = Document::new();
    let host = document.create_element("x-panel");
    document.append_child(host, document.create_text_node("light")).unwrap();
    let shadow_root = document.create_shadow_root(host).unwrap();
    document
        .append_child(shadow_root, document.create_element("slot"))
        .unwrap();

    assert_eq!(document.shadow_root(host), Some(shadow_root));
    assert_eq!(document.host(shadow_root), Some(host));
    assert_eq!(
        document.outer_html(host).unwrap(),
        "<x-panel><template shadowrootmode=\"open\"><slot></slot></template>light</x-panel>"
    );
    assert_eq!(
        document.create_shadow_root(host).unwrap_err(),
        DomError::ShadowRootExists(host)
    );
}
