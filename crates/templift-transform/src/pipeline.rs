//! Template upgrade pipeline.
//!
//! Wraps a fragment in `<body>`, parses it, strips controller references,
//! upgrades directive attributes and serializes the body's contents.

use serde::Deserialize;

use templift_html::{parse_document_str, serialize_inner, Attribute, Document, Element, Node};

use crate::interpolation::rewrite_value;
use crate::mapping::map_attribute;
use crate::walker::map_element;

/// Conventional AngularJS `controllerAs` alias.
pub const DEFAULT_CONTROLLER_VAR: &str = "$ctrl";

/// Options for upgrading a template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpgradeOptions {
    /// Controller aliases to strip from expressions; empty disables stripping
    #[serde(default = "default_controller_vars")]
    pub controller_vars: Vec<String>,
}

fn default_controller_vars() -> Vec<String> {
    vec![DEFAULT_CONTROLLER_VAR.to_string()]
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            controller_vars: default_controller_vars(),
        }
    }
}

impl UpgradeOptions {
    /// Options with the given controller aliases.
    pub fn with_controller_vars<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            controller_vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

/// Errors that can occur when upgrading a template.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    #[error("Template parsing failed: body tag missing ({0})")]
    MissingBody(String),
}

/// Upgrade an AngularJS template fragment to Angular syntax.
pub fn upgrade_template(source: &str, options: &UpgradeOptions) -> Result<String, UpgradeError> {
    let body = parse_fragment(source)?;

    let stripped = remove_ctrl_references(body, options.controller_vars.as_slice());
    let upgraded = upgrade_attribute_names(stripped);

    let output = serialize_inner(&upgraded);
    tracing::debug!(
        "Upgraded template ({} bytes in, {} bytes out)",
        source.len(),
        output.len()
    );

    Ok(output)
}

/// Parse and re-serialize a fragment without rewriting anything.
///
/// Equal to `upgrade_template` output for a template with nothing to
/// rewrite: attributes quoted, self-closing slashes dropped.
pub fn normalize_template(source: &str) -> Result<String, UpgradeError> {
    Ok(serialize_inner(&parse_fragment(source)?))
}

fn parse_fragment(source: &str) -> Result<Element, UpgradeError> {
    locate_body(parse_document_str(&format!("<body>{}</body>", source)))
}

/// Find the `body` element of a document parsed from a wrapped fragment.
pub fn locate_body(document: Document) -> Result<Element, UpgradeError> {
    let html = document
        .children
        .into_iter()
        .find_map(Node::into_element)
        .ok_or_else(|| UpgradeError::MissingBody("document has no root element".to_string()))?;

    if html.name != "html" {
        return Err(UpgradeError::MissingBody(format!(
            "root element is <{}>",
            html.name
        )));
    }

    html.children
        .into_iter()
        .find(|node| node.is_element_named("body"))
        .and_then(Node::into_element)
        .ok_or_else(|| UpgradeError::MissingBody("<html> has no <body> child".to_string()))
}

/// Strip controller aliases from every attribute value and text node.
pub fn remove_ctrl_references<S: AsRef<str>>(root: Element, controller_vars: &[S]) -> Element {
    map_element(root, &|element: Element| Element {
        attrs: element
            .attrs
            .into_iter()
            .map(|attr| Attribute {
                value: rewrite_value(&attr.value, controller_vars),
                ..attr
            })
            .collect(),
        // Text nodes are never visited by the walker itself.
        children: element
            .children
            .into_iter()
            .map(|child| match child {
                Node::Text(text) => Node::Text(rewrite_value(&text, controller_vars)),
                other => other,
            })
            .collect(),
        ..element
    })
}

/// Replace every directive attribute with its upgraded form, in place.
pub fn upgrade_attribute_names(root: Element) -> Element {
    map_element(root, &|element: Element| Element {
        attrs: element.attrs.into_iter().flat_map(map_attribute).collect(),
        ..element
    })
}
