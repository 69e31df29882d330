//! Attribute stripping for crawled content.

use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::{ElementRef, Node};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text is emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize `el` and its subtree with every attribute removed.
///
/// Tag structure and text are kept; comments and processing instructions
/// are dropped.
pub fn strip_attributes(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    write_node(*el, &mut out, false);
    out
}

fn write_node(node: NodeRef<'_, Node>, out: &mut String, raw_text: bool) {
    match node.value() {
        Node::Element(element) => write_element(node, element, out),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_text(text, out),
        _ => {}
    }
}

fn write_element(node: NodeRef<'_, Node>, element: &Element, out: &mut String) {
    let name = element.name();
    out.push('<');
    out.push_str(name);
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    let raw_text = RAW_TEXT_ELEMENTS.contains(&name);
    for child in node.children() {
        write_node(child, out, raw_text);
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
