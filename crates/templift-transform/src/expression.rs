//! Binding expression rewrites.
//!
//! These functions pattern-match on expression text; they do not parse or
//! validate the expression language. String literals are skipped verbatim and
//! everything else is scanned character by character.

use regex::Regex;
use std::sync::LazyLock;

/// Strip controller aliases from member references.
///
/// `$ctrl.user.name` becomes `user.name` when `$ctrl` is one of `aliases`.
/// Identifiers reached through a member access (`a.$ctrl.b`), bare aliases
/// with no member (`fn($ctrl)`) and string literals are left alone. Applying
/// this twice gives the same result as applying it once.
pub fn strip_controller_prefix<S: AsRef<str>>(expression: &str, aliases: &[S]) -> String {
    if aliases.is_empty() {
        return expression.to_string();
    }

    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if is_quote(c) {
            let end = skip_string(&chars, i);
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }

        if c.is_ascii_digit() {
            let end = scan_while(&chars, i, |c| c.is_alphanumeric() || c == '.' || c == '_');
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }

        if is_ident_start(c) {
            let end = scan_while(&chars, i, is_ident_char);

            if !follows_member_access(&out) {
                let ident: String = chars[i..end].iter().collect();
                if aliases.iter().any(|a| a.as_ref() == ident) {
                    if let Some(member) = member_after(&chars, end) {
                        // Resume at the member; it is scanned as a fresh
                        // reference, so chained aliases are stripped too.
                        i = member;
                        continue;
                    }
                }
            }

            out.extend(&chars[i..end]);
            i = end;
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Wrap an expression in a single logical negation.
///
/// Operands (identifiers, member chains, calls, literals, parenthesized
/// groups) are prefixed with `!` directly; anything with a top-level operator
/// is parenthesized first. An expression that is already a negated operand
/// has its negation removed instead of gaining a second one.
pub fn negate_expression(expression: &str) -> String {
    let expr = expression.trim();

    // An empty binding is falsy, so its negation is always true.
    if expr.is_empty() {
        return "true".to_string();
    }

    if let Some(rest) = expr.strip_prefix('!') {
        let rest = rest.trim_start();
        let inner = strip_wrapping_parens(rest);
        if is_operand(rest) && !inner.is_empty() {
            return inner.to_string();
        }
    }

    if is_operand(expr) {
        format!("!{}", expr)
    } else {
        format!("!({})", expr)
    }
}

static REPEAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(.+?)\s+in\s+(.+?)(?:\s+as\s+(.+?))?(?:\s+track\s+by\s+(.+?))?\s*$")
        .expect("Invalid repeat regex")
});

static REPEAT_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[$\w]+$").expect("Invalid repeat item regex"));

static TRAILING_ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+as\s+\S").expect("Invalid trailing alias regex"));

/// Translate an `ng-repeat` clause into `*ngFor` microsyntax.
///
/// `item in items` becomes `let item of items`; an `as alias` clause is kept
/// as `of items as alias`, and filters carry over unchanged since they read
/// the same as pipes. `track by` clauses are dropped, unless an alias
/// follows them, in which case the clause is left unchanged. Key/value tuples
/// (`(key, value) in object`) and anything else that does not match the
/// clause grammar are returned unchanged.
pub fn transform_repeat_expression(expression: &str) -> String {
    let Some(caps) = REPEAT_RE.captures(expression) else {
        tracing::warn!("Unrecognized repeat expression left as is: {}", expression);
        return expression.to_string();
    };

    let item = caps[1].trim();
    let collection = caps[2].trim();

    if !REPEAT_ITEM_RE.is_match(item) {
        tracing::warn!("Repeat over `{}` cannot be expressed with ngFor, left as is", item);
        return expression.to_string();
    }

    if let Some(track_by) = caps.get(4) {
        // `as` after `track by` is out of order; dropping it would lose the alias.
        if TRAILING_ALIAS_RE.is_match(track_by.as_str()) {
            tracing::warn!("Repeat with `as` after `track by` left as is: {}", expression);
            return expression.to_string();
        }
        tracing::debug!("Dropping `track by {}` from repeat over {}", track_by.as_str(), collection);
    }

    match caps.get(3) {
        Some(alias) => format!("let {} of {} as {}", item, collection, alias.as_str().trim()),
        None => format!("let {} of {}", item, collection),
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn scan_while(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

/// Index just past the string literal opening at `start`.
/// Unterminated literals run to the end of input.
fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Whether the text emitted so far ends in a member access (`.` or `?.`),
/// as opposed to a spread (`...`).
fn follows_member_access(out: &str) -> bool {
    let trimmed = out.trim_end();
    trimmed.ends_with('.') && !trimmed.ends_with("...")
}

/// If `.member` or `?.member` follows position `end`, the index where
/// `member` starts.
fn member_after(chars: &[char], end: usize) -> Option<usize> {
    let mut dot = scan_while(chars, end, char::is_whitespace);
    if chars.get(dot) == Some(&'?') {
        dot += 1;
    }
    if chars.get(dot) != Some(&'.') {
        return None;
    }
    let member = scan_while(chars, dot + 1, char::is_whitespace);
    chars
        .get(member)
        .filter(|c| is_ident_start(**c))
        .map(|_| member)
}

/// An expression with no top-level operators: it binds tighter than `!`.
fn is_operand(expr: &str) -> bool {
    let expr = expr.trim_start_matches(|c: char| c == '!' || c.is_whitespace());
    let chars: Vec<char> = expr.chars().collect();
    if chars.is_empty() {
        return false;
    }

    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_quote(c) {
            i = skip_string(&chars, i);
            continue;
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            _ if depth > 0 => {}
            '.' => {}
            '?' if chars.get(i + 1) == Some(&'.') => {}
            c if is_ident_char(c) => {}
            _ => return false,
        }
        i += 1;
    }

    depth == 0
}

/// Remove one pair of parentheses enclosing the whole expression.
fn strip_wrapping_parens(expr: &str) -> &str {
    let chars: Vec<char> = expr.chars().collect();
    if chars.first() != Some(&'(') {
        return expr;
    }

    let mut depth = 0usize;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_quote(c) {
            i = skip_string(&chars, i);
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return if i == chars.len() - 1 {
                        expr[1..expr.len() - 1].trim()
                    } else {
                        expr
                    };
                }
            }
            _ => {}
        }
        i += 1;
    }

    expr
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: &[&str] = &["$ctrl"];

    #[test]
    fn strips_controller_prefix() {
        assert_eq!(strip_controller_prefix("$ctrl.name", CTRL), "name");
        assert_eq!(strip_controller_prefix("$ctrl.user.name", CTRL), "user.name");
        assert_eq!(
            strip_controller_prefix("$ctrl.a && !$ctrl.b(1, $ctrl.c)", CTRL),
            "a && !b(1, c)"
        );
        assert_eq!(strip_controller_prefix("  $ctrl . name ", CTRL), "  name ");
    }

    #[test]
    fn leaves_other_identifiers_alone() {
        assert_eq!(strip_controller_prefix("vm.name", CTRL), "vm.name");
        assert_eq!(strip_controller_prefix("my$ctrl.name", CTRL), "my$ctrl.name");
        assert_eq!(strip_controller_prefix("a.$ctrl.name", CTRL), "a.$ctrl.name");
        assert_eq!(strip_controller_prefix("a?.$ctrl.name", CTRL), "a?.$ctrl.name");
        assert_eq!(strip_controller_prefix("save($ctrl)", CTRL), "save($ctrl)");
        assert_eq!(strip_controller_prefix("{ $ctrl: 1 }", CTRL), "{ $ctrl: 1 }");
    }

    #[test]
    fn leaves_string_literals_alone() {
        assert_eq!(
            strip_controller_prefix(r#"$ctrl.t('$ctrl.key') + "$ctrl.x""#, CTRL),
            r#"t('$ctrl.key') + "$ctrl.x""#
        );
        assert_eq!(
            strip_controller_prefix(r"'it\'s $ctrl.x' + $ctrl.y", CTRL),
            r"'it\'s $ctrl.x' + y"
        );
    }

    #[test]
    fn strips_optional_chained_prefix() {
        assert_eq!(strip_controller_prefix("$ctrl?.a", CTRL), "a");
        assert_eq!(strip_controller_prefix("$ctrl?.user?.name", CTRL), "user?.name");
        assert_eq!(strip_controller_prefix("$ctrl ? .5 : 1", CTRL), "$ctrl ? .5 : 1");
        assert_eq!(strip_controller_prefix("$ctrl?a:b", CTRL), "$ctrl?a:b");
    }

    #[test]
    fn strips_spread_references() {
        assert_eq!(strip_controller_prefix("[...$ctrl.items]", CTRL), "[...items]");
    }

    #[test]
    fn strips_any_configured_alias() {
        let aliases = ["vm", "ctrl"];
        assert_eq!(
            strip_controller_prefix("vm.a + ctrl.b + $ctrl.c", &aliases),
            "a + b + $ctrl.c"
        );
    }

    #[test]
    fn empty_alias_set_is_a_no_op() {
        let none: &[&str] = &[];
        assert_eq!(strip_controller_prefix("$ctrl.name", none), "$ctrl.name");
    }

    #[test]
    fn stripping_is_idempotent() {
        let inputs = [
            "$ctrl.name",
            "$ctrl.$ctrl.name",
            "a.$ctrl.b + $ctrl.c",
            "'$ctrl.x' + $ctrl.y",
            "fn($ctrl)",
            "1.5e3 + $ctrl.n",
        ];
        for input in inputs {
            let once = strip_controller_prefix(input, CTRL);
            let twice = strip_controller_prefix(&once, CTRL);
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn keeps_numbers_intact() {
        assert_eq!(strip_controller_prefix("1.5 * $ctrl.n", CTRL), "1.5 * n");
    }

    #[test]
    fn negates_operands_without_parens() {
        assert_eq!(negate_expression("visible"), "!visible");
        assert_eq!(negate_expression("user.profile.visible"), "!user.profile.visible");
        assert_eq!(negate_expression("isOpen(item, 'a b')"), "!isOpen(item, 'a b')");
        assert_eq!(negate_expression("items[0]"), "!items[0]");
        assert_eq!(negate_expression("user?.visible"), "!user?.visible");
        assert_eq!(negate_expression("(a || b)"), "!(a || b)");
    }

    #[test]
    fn parenthesizes_compound_expressions() {
        assert_eq!(negate_expression("a && b"), "!(a && b)");
        assert_eq!(negate_expression("count > 0"), "!(count > 0)");
        assert_eq!(negate_expression("a ? b : c"), "!(a ? b : c)");
        assert_eq!(negate_expression("items | async"), "!(items | async)");
        assert_eq!(negate_expression("(a) || (b)"), "!((a) || (b))");
    }

    #[test]
    fn removes_existing_negation() {
        assert_eq!(negate_expression("!visible"), "visible");
        assert_eq!(negate_expression("!(a && b)"), "a && b");
        assert_eq!(negate_expression("!!visible"), "!visible");
        assert_eq!(negate_expression("!a && b"), "!(!a && b)");
    }

    #[test]
    fn negates_empty_expression() {
        assert_eq!(negate_expression("  "), "true");
    }

    #[test]
    fn never_unwraps_to_an_empty_binding() {
        assert_eq!(negate_expression("!()"), "!!()");
        assert_eq!(negate_expression("!( )"), "!!( )");
    }

    #[test]
    fn translates_basic_repeat() {
        assert_eq!(transform_repeat_expression("item in items"), "let item of items");
        assert_eq!(
            transform_repeat_expression("  user in users.active  "),
            "let user of users.active"
        );
    }

    #[test]
    fn keeps_filters_and_aliases() {
        assert_eq!(
            transform_repeat_expression("item in items | filter:query as results"),
            "let item of items | filter:query as results"
        );
    }

    #[test]
    fn drops_track_by() {
        assert_eq!(
            transform_repeat_expression("item in items track by item.id"),
            "let item of items"
        );
        assert_eq!(
            transform_repeat_expression("item in items as shown track by $index"),
            "let item of items as shown"
        );
    }

    #[test]
    fn keeps_alias_after_track_by_unchanged() {
        let clause = "item in items | orderBy:'name' track by item.id as shown";
        assert_eq!(transform_repeat_expression(clause), clause);
    }

    #[test]
    fn leaves_tuple_repeats_unchanged() {
        assert_eq!(
            transform_repeat_expression("(key, value) in object"),
            "(key, value) in object"
        );
    }

    #[test]
    fn leaves_unrecognized_repeats_unchanged() {
        assert_eq!(transform_repeat_expression("items"), "items");
    }
}
