//! Directive attribute mapping table.
//!
//! Maps AngularJS directive attributes to their Angular binding form. A rule
//! either renames the attribute and keeps its value, or rewrites it into any
//! number of replacement attributes.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use templift_html::Attribute;

use crate::expression::{negate_expression, transform_repeat_expression};

/// How a directive attribute is upgraded.
#[derive(Debug, Clone, Copy)]
pub enum AttributeRule {
    /// Same value, new name
    Rename(&'static str),
    /// Full control over the replacement attributes
    Rewrite(fn(Attribute) -> Vec<Attribute>),
}

/// Prefix of AngularJS's optional attribute binding (`ng-attr-title`).
pub const NG_ATTR_PREFIX: &str = "ng-attr-";

const RULES: &[(&str, AttributeRule)] = &[
    ("ng-checked", AttributeRule::Rename("[checked]")),
    ("ng-class", AttributeRule::Rename("[ngClass]")),
    ("ng-disabled", AttributeRule::Rename("[disabled]")),
    ("ng-hide", AttributeRule::Rename("[hidden]")),
    ("ng-href", AttributeRule::Rename("href")),
    ("ng-if", AttributeRule::Rename("*ngIf")),
    ("ng-model", AttributeRule::Rename("[(ngModel)]")),
    ("ng-readonly", AttributeRule::Rename("[readonly]")),
    ("ng-repeat", AttributeRule::Rewrite(rewrite_repeat)),
    ("ng-selected", AttributeRule::Rename("[selected]")),
    ("ng-show", AttributeRule::Rewrite(rewrite_show)),
    ("ng-src", AttributeRule::Rename("src")),
    ("ng-srcset", AttributeRule::Rename("srcset")),
    ("ng-style", AttributeRule::Rename("[ngStyle]")),
    ("ng-bind-html", AttributeRule::Rename("[innerHTML]")),
    // Events
    ("ng-blur", AttributeRule::Rename("(blur)")),
    ("ng-change", AttributeRule::Rename("(change)")),
    ("ng-click", AttributeRule::Rename("(click)")),
    ("ng-copy", AttributeRule::Rename("(copy)")),
    ("ng-cut", AttributeRule::Rename("(cut)")),
    ("ng-dblclick", AttributeRule::Rename("(dblclick)")),
    ("ng-focus", AttributeRule::Rename("(focus)")),
    ("ng-keydown", AttributeRule::Rename("(keydown)")),
    ("ng-keypress", AttributeRule::Rename("(keypress)")),
    ("ng-keyup", AttributeRule::Rename("(keyup)")),
    ("ng-mousedown", AttributeRule::Rename("(mousedown)")),
    ("ng-mouseenter", AttributeRule::Rename("(mouseenter)")),
    ("ng-mouseleave", AttributeRule::Rename("(mouseleave)")),
    ("ng-mousemove", AttributeRule::Rename("(mousemove)")),
    ("ng-mouseover", AttributeRule::Rename("(mouseover)")),
    ("ng-mouseup", AttributeRule::Rename("(mouseup)")),
    ("ng-paste", AttributeRule::Rename("(paste)")),
    ("ng-submit", AttributeRule::Rename("(submit)")),
];

static ATTRIBUTE_MAPPING: LazyLock<HashMap<&'static str, AttributeRule>> =
    LazyLock::new(|| RULES.iter().copied().collect());

// Exactly one span: the inner text must not open or close another one.
static SINGLE_INTERPOLATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*\{\{(.+)\}\}\s*$").expect("Invalid single interpolation regex")
});

fn rewrite_repeat(attr: Attribute) -> Vec<Attribute> {
    vec![Attribute::new("*ngFor", transform_repeat_expression(&attr.value))]
}

// Angular has no `show`, only `hidden`.
fn rewrite_show(attr: Attribute) -> Vec<Attribute> {
    vec![Attribute::new("[hidden]", negate_expression(&attr.value))]
}

/// Look up the rule for an exact, case-sensitive attribute name.
pub fn resolve(name: &str) -> Option<&'static AttributeRule> {
    ATTRIBUTE_MAPPING.get(name)
}

/// Upgrade one attribute into its replacement list.
///
/// Unmapped attributes come back unchanged as a one-element list, except
/// `ng-attr-*` attributes whose value is exactly one interpolation span.
pub fn map_attribute(attr: Attribute) -> Vec<Attribute> {
    match resolve(&attr.name) {
        Some(AttributeRule::Rename(target)) => vec![Attribute::new(*target, attr.value)],
        Some(AttributeRule::Rewrite(rewrite)) => rewrite(attr),
        None if attr.name.starts_with(NG_ATTR_PREFIX) => vec![transform_ng_attr(attr)],
        None => vec![attr],
    }
}

/// Turn `ng-attr-x="{{ expr }}"` into `[attr.x]="expr"`.
fn transform_ng_attr(attr: Attribute) -> Attribute {
    let suffix = &attr.name[NG_ATTR_PREFIX.len()..];
    if suffix.is_empty() {
        return attr;
    }

    let inner = SINGLE_INTERPOLATION_RE
        .captures(&attr.value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|inner| !inner.contains("{{") && !inner.contains("}}"));

    match inner {
        Some(expression) => Attribute::new(format!("[attr.{}]", suffix), expression.trim()),
        None => attr,
    }
}
