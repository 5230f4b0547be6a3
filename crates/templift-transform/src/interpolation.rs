//! Interpolation-aware expression rewriting.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::expression::strip_controller_prefix;

// The first `}}` after a `{{` closes the span; spans do not nest.
static INTERPOLATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("Invalid interpolation regex"));

/// Check whether a value contains at least one `{{ }}` span.
pub fn has_interpolation(value: &str) -> bool {
    INTERPOLATION_RE.is_match(value)
}

/// Strip controller aliases from an attribute or text value.
///
/// With interpolation spans, each span's expression is rewritten on its own
/// and the literal text around the spans is kept as is. Without any span, the
/// whole value is a bare directive expression and is rewritten directly.
pub fn rewrite_value<S: AsRef<str>>(value: &str, aliases: &[S]) -> String {
    if !has_interpolation(value) {
        return strip_controller_prefix(value, aliases);
    }

    INTERPOLATION_RE
        .replace_all(value, |caps: &Captures| {
            format!("{{{{{}}}}}", strip_controller_prefix(&caps[1], aliases))
        })
        .into_owned()
}
