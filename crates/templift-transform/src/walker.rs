//! Bottom-up tree rewriting.

use templift_html::{Element, Node};

/// Rebuild a tree, applying `mapper` to every element.
///
/// Children are rewritten before their parent, so `mapper` always sees an
/// element whose subtree is already final. Non-element nodes are returned
/// as they are; `mapper` never sees them directly.
pub fn map_element_nodes<F>(node: Node, mapper: &F) -> Node
where
    F: Fn(Element) -> Element,
{
    match node {
        Node::Element(element) => Node::Element(map_element(element, mapper)),
        other => other,
    }
}

/// Same as [`map_element_nodes`] for a root already known to be an element.
pub fn map_element<F>(element: Element, mapper: &F) -> Element
where
    F: Fn(Element) -> Element,
{
    let Element {
        name,
        attrs,
        children,
    } = element;

    let children = children
        .into_iter()
        .map(|child| map_element_nodes(child, mapper))
        .collect();

    mapper(Element {
        name,
        attrs,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn sample() -> Element {
        Element::new("ul")
            .with_child(Element::new("li").with_child("one"))
            .with_child("\n")
            .with_child(Element::new("li").with_child(Element::new("b")))
    }

    #[test]
    fn visits_children_before_parents() {
        let visited = RefCell::new(Vec::new());

        map_element(sample(), &|element: Element| {
            visited.borrow_mut().push(element.name.clone());
            element
        });

        assert_eq!(*visited.borrow(), ["li", "b", "li", "ul"]);
    }

    #[test]
    fn parent_sees_rewritten_children() {
        let result = map_element(sample(), &|mut element: Element| {
            let child_tags = element
                .children
                .iter()
                .filter_map(Node::as_element)
                .filter(|c| c.attr("seen").is_some())
                .count();
            element.attrs.push(templift_html::Attribute::new("seen", child_tags.to_string()));
            element
        });

        assert_eq!(result.attr("seen"), Some("2"));
        let second = result.children[2].as_element().unwrap();
        assert_eq!(second.attr("seen"), Some("1"));
    }

    #[test]
    fn identity_mapper_preserves_tree() {
        let original = sample();

        let result = map_element(original.clone(), &|element| element);

        assert_eq!(result, original);
    }

    #[test]
    fn leaves_non_elements_untouched() {
        let text = Node::Text("{{x}}".to_string());

        let result = map_element_nodes(text.clone(), &|_| panic!("mapper called on text"));

        assert_eq!(result, text);
    }
}
