//! HTML fragment serialization.
//!
//! Serializes the children of a node (innerHTML), using the default HTML
//! fragment serialization rules: every attribute is written with a quoted
//! value, void elements have no end tag, and raw-text element content is
//! written without escaping.

use crate::node::{Element, Node};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Serialize the children of an element.
pub fn serialize_inner(element: &Element) -> String {
    let mut output = String::new();
    serialize_children(element, &mut output);
    output
}

fn serialize_children(parent: &Element, output: &mut String) {
    for child in &parent.children {
        serialize_node(child, Some(parent.name.as_str()), output);
    }
}

fn serialize_node(node: &Node, parent: Option<&str>, output: &mut String) {
    match node {
        Node::Element(element) => {
            output.push('<');
            output.push_str(&element.name);

            for attr in &element.attrs {
                output.push(' ');
                output.push_str(&attr.name);
                output.push_str("=\"");
                escape_attribute(&attr.value, output);
                output.push('"');
            }

            output.push('>');

            if !VOID_ELEMENTS.contains(&element.name.as_str()) {
                serialize_children(element, output);
                output.push_str("</");
                output.push_str(&element.name);
                output.push('>');
            }
        }
        Node::Text(text) => {
            if parent.is_some_and(|p| RAW_TEXT_ELEMENTS.contains(&p)) {
                output.push_str(text);
            } else {
                escape_text(text, output);
            }
        }
        Node::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
        Node::Doctype(name) => {
            output.push_str("<!DOCTYPE ");
            output.push_str(name);
            output.push('>');
        }
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' => output.push_str("&quot;"),
            _ => output.push(c),
        }
    }
}
