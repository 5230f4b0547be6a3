//! Owned, value-typed HTML tree.
//!
//! Every node owns its children outright. Rewrites build new values instead of
//! mutating nodes in place, so an old tree and a new tree never alias.

/// A parsed HTML document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Top-level nodes (doctype, comments, the `html` element)
    pub children: Vec<Node>,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

impl Node {
    /// Get as element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Take the element out of this node, if it is one.
    pub fn into_element(self) -> Option<Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Check if this node is an element with the given tag name.
    pub fn is_element_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|e| e.name == name)
    }
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name (lowercase for HTML elements)
    pub name: String,

    /// Attributes in source order
    pub attrs: Vec<Attribute>,

    /// Child nodes in source order
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute append.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(Attribute::new(name, value));
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Look up an attribute value by exact name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

/// A name/value attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
