//! HTML serialisation. Shadow roots are written as declarative
//! `<template shadowrootmode="open">` blocks ahead of the light children.

use crate::node::{NodeArena, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(crate) fn write_node(arena: &NodeArena, id: NodeId, out: &mut String) {
    match arena.get(id) {
        Some(NodeKind::Document) => write_children(arena, id, out),
        Some(NodeKind::Text(text)) => {
            let raw = arena
                .parent(id)
                .and_then(|parent| arena.get(parent))
                .and_then(NodeKind::as_element)
                .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent.tag.as_str()));
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        Some(NodeKind::Comment(text)) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Some(NodeKind::ShadowRoot { .. }) => {
            out.push_str("<template shadowrootmode=\"open\">");
            write_children(arena, id, out);
            out.push_str("</template>");
        }
        Some(NodeKind::Element(data)) => {
            out.push('<');
            out.push_str(&data.tag);
            for (name, value) in &data.attributes {
                write_attribute(name, value, out);
            }
            if let Some(style) = data.style_text() {
                write_attribute("style", &style, out);
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&data.tag.as_str()) {
                return;
            }
            if let Some(shadow_root) = data.shadow_root {
                write_node(arena, shadow_root, out);
            }
            write_children(arena, id, out);
            out.push_str("</");
            out.push_str(&data.tag);
            out.push('>');
        }
        None => {}
    }
}

pub(crate) fn write_children(arena: &NodeArena, id: NodeId, out: &mut String) {
    for child in arena.children(id) {
        write_node(arena, *child, out);
    }
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(value, true, out);
    out.push('"');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn test_serialises_attributes_text_and_void_elements() {
        let doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "a \"quoted\" & <b>").unwrap();
        doc.append_child(p, doc.create_text_node("1 < 2 & 3")).unwrap();
        doc.append_child(p, doc.create_element("br")).unwrap();

        assert_eq!(
            doc.outer_html(p).unwrap(),
            "<p title=\"a &quot;quoted&quot; &amp; <b>\">1 &lt; 2 &amp; 3<br></p>"
        );
    }

    #[test]
    fn test_style_elements_are_raw_text() {
        let doc = Document::new();
        let style = doc.create_style_element("a > b { color: red }");
        assert_eq!(
            doc.outer_html(style).unwrap(),
            "<style>a > b { color: red }</style>"
        );
    }

    #[test]
    fn test_shadow_root_is_declarative_template() {
        let doc = Document::new();
        let host = doc.create_element("x-card");
        let shadow = doc.create_shadow_root(host).unwrap();
        doc.append_child(shadow, doc.create_element("slot")).unwrap();
        doc.append_child(host, doc.create_text_node("light")).unwrap();

        assert_eq!(
            doc.outer_html(host).unwrap(),
            "<x-card><template shadowrootmode=\"open\"><slot></slot></template>light</x-card>"
        );
    }

    #[test]
    fn test_document_html() {
        let doc = Document::new();
        assert_eq!(
            doc.to_html(),
            "<!DOCTYPE html><html><head></head><body></body></html>"
        );
    }
}
