//! HTML5 parsing.
//!
//! Parses with html5ever into an `RcDom`, then converts the shared handles
//! into the owned [`Document`] tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::QualName;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::node::{Attribute, Document, Element, Node};

/// Parse a full HTML document.
///
/// Never fails: malformed markup is recovered by the HTML5 tree builder.
pub fn parse_document_str(html: &str) -> Document {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    let children = convert_children(&dom.document);
    tracing::debug!("Parsed document with {} top-level nodes", children.len());

    Document { children }
}

fn convert_children(handle: &Handle) -> Vec<Node> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect()
}

fn convert_node(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute::new(qualified_name(&attr.name), attr.value.to_string()))
                .collect();

            // Template contents live in a separate fragment; fold them in so
            // the tree can be walked like any other element.
            let mut children = convert_children(handle);
            if let Some(contents) = template_contents.borrow().as_ref() {
                children.extend(convert_children(contents));
            }

            Some(Node::Element(Element {
                name: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Doctype { name, .. } => Some(Node::Doctype(name.to_string())),
        NodeData::Document | NodeData::ProcessingInstruction { .. } => None,
    }
}

/// Attribute names keep their namespace prefix (`xlink:href`).
fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(doc: &Document) -> &Element {
        doc.children
            .iter()
            .find_map(Node::as_element)
            .and_then(|html| html.children.iter().find(|n| n.is_element_named("body")))
            .and_then(Node::as_element)
            .unwrap()
    }

    #[test]
    fn wraps_fragment_in_html_head_body() {
        let doc = parse_document_str("<body><p>Hello</p></body>");

        let html = doc.children[0].as_element().unwrap();
        assert_eq!(html.name, "html");
        assert_eq!(html.children.len(), 2);
        assert!(html.children[0].is_element_named("head"));
        assert!(html.children[1].is_element_named("body"));
    }

    #[test]
    fn keeps_attribute_order() {
        let doc = parse_document_str(r#"<body><div b="2" a="1" ng-if="x"></div></body>"#);

        let div = body(&doc).children[0].as_element().unwrap();
        let names: Vec<_> = div.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "ng-if"]);
    }

    #[test]
    fn keeps_whitespace_text() {
        let doc = parse_document_str("<body><b>a</b> <i>b</i></body>");

        assert_eq!(body(&doc).children[1], Node::Text(" ".to_string()));
    }

    #[test]
    fn folds_template_contents_into_children() {
        let doc = parse_document_str("<body><template><span>x</span></template></body>");

        let template = body(&doc).children[0].as_element().unwrap();
        assert_eq!(template.name, "template");
        assert!(template.children[0].is_element_named("span"));
    }

    #[test]
    fn keeps_comments() {
        let doc = parse_document_str("<body><!-- note --></body>");

        assert_eq!(body(&doc).children[0], Node::Comment(" note ".to_string()));
    }
}
