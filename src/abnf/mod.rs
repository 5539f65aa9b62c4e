//! A tiny parser combinator toolkit for ABNF grammars (RFC 5234).
//!
//! Rules are first-class values that can be composed, stored, and applied
//! repeatedly. Applying a rule to an input string either consumes a prefix
//! of it and produces a value, or fails without consuming anything at all.
//! That all-or-nothing property is what makes the combinators safe to
//! backtrack through: on failure the caller still holds the original input.
//!
//! The grammar core defined in [RFC 5234 Appendix
//! B.1](https://tools.ietf.org/html/rfc5234#appendix-B.1) is available in
//! the [`core`] submodule.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

pub mod core;

/// Result of applying a [`Rule`] to an input string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Match<'a, T> {
    /// The rule matched a prefix of the input.
    Ok {
        /// The input left over after the match.
        remaining: &'a str,

        /// The value the rule produced.
        value: T,
    },

    /// The rule did not match. `remaining` is the original input, untouched.
    Fail {
        /// The original input string.
        remaining: &'a str,
    },
}

impl<'a, T> Match<'a, T> {
    /// Whether this match succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Match::Ok { .. })
    }

    /// Convert into the remaining input and value of a successful match.
    pub fn ok(self) -> Option<(&'a str, T)> {
        match self {
            Match::Ok { remaining, value } => Some((remaining, value)),
            Match::Fail { .. } => None,
        }
    }
}

/// A first-class ABNF rule producing values of type `T`.
///
/// Rules are cheap to clone (internally reference-counted) and are pure:
/// applying one has no side effects and the same input always produces the
/// same result.
pub struct Rule<T> {
    f: Arc<dyn for<'a> Fn(&'a str) -> Match<'a, T> + Send + Sync>,
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Rule { f: self.f.clone() }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Rule")
    }
}

impl<T: 'static> Rule<T> {
    /// Create a rule from a raw matching function.
    ///
    /// The function must uphold the no-partial-consumption contract: when
    /// it fails it must return the input it was given, unmodified.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a str) -> Match<'a, T> + Send + Sync + 'static,
    {
        Rule { f: Arc::new(f) }
    }

    /// Apply this rule to the given input.
    pub fn apply<'a>(&self, input: &'a str) -> Match<'a, T> {
        (self.f)(input)
    }

    /// Apply this rule, requiring it to consume the entire input.
    pub fn parse_all(&self, input: &str) -> Option<T> {
        match self.apply(input) {
            Match::Ok { remaining, value } if remaining.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Transform the value of a successful match. Failures pass through
    /// untouched.
    pub fn map<U, F>(self, f: F) -> Rule<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Rule::new(move |input| match self.apply(input) {
            Match::Ok { remaining, value } => Match::Ok {
                remaining,
                value: f(value),
            },
            Match::Fail { remaining } => Match::Fail { remaining },
        })
    }
}

/// Match a literal terminal string.
///
/// Literals are matched case-insensitively, as ABNF string literals are.
/// The hex form `%xHH` matches exactly one character with that code.
///
/// The produced value is the text actually consumed from the input.
pub fn terminal(literal: &str) -> Rule<String> {
    if let Some(c) = parse_hex_char(literal) {
        return Rule::new(move |input| match input.strip_prefix(c) {
            Some(remaining) => Match::Ok {
                remaining,
                value: c.to_string(),
            },
            None => Match::Fail { remaining: input },
        });
    }

    let literal = literal.to_owned();

    Rule::new(move |input| match input.get(..literal.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(&literal) => Match::Ok {
            remaining: &input[literal.len()..],
            value: prefix.to_owned(),
        },
        _ => Match::Fail { remaining: input },
    })
}

/// Match a single character whose code point lies in the inclusive range
/// given in the ABNF hex form `%xAA-BB`.
///
/// # Panics
///
/// Panics if the range notation itself is malformed, since that is a bug
/// in the grammar definition rather than in the input.
pub fn range(notation: &str) -> Rule<String> {
    let (low, high) = parse_hex_range(notation)
        .unwrap_or_else(|| panic!("malformed ABNF range notation: {}", notation));

    Rule::new(move |input| match input.chars().next() {
        Some(c) if c >= low && c <= high => Match::Ok {
            remaining: &input[c.len_utf8()..],
            value: c.to_string(),
        },
        _ => Match::Fail { remaining: input },
    })
}

/// Match all of the given rules in order, producing their values as a
/// sequence. All-or-nothing: if any child fails, the whole sequence fails
/// and no input is consumed.
pub fn seq<T: 'static>(rules: Vec<Rule<T>>) -> Rule<Vec<T>> {
    Rule::new(move |input| {
        let mut remaining = input;
        let mut values = Vec::with_capacity(rules.len());

        for rule in &rules {
            match rule.apply(remaining) {
                Match::Ok {
                    remaining: rest,
                    value,
                } => {
                    remaining = rest;
                    values.push(value);
                }
                Match::Fail { .. } => return Match::Fail { remaining: input },
            }
        }

        Match::Ok {
            remaining,
            value: values,
        }
    })
}

/// Match the first of the given rules that succeeds (left-biased
/// alternation). Fails only if every alternative fails.
pub fn alt<T: 'static>(rules: Vec<Rule<T>>) -> Rule<T> {
    Rule::new(move |input| {
        for rule in &rules {
            if let m @ Match::Ok { .. } = rule.apply(input) {
                return m;
            }
        }

        Match::Fail { remaining: input }
    })
}

/// Greedily match between `min` and `max` repetitions of a rule. A `max` of
/// `None` means unbounded (`*` in ABNF).
///
/// Another occurrence is attempted only while the count is strictly below
/// `max`, and the final count is validated against `min`; a repetition that
/// stops making progress also stops matching, so `repeat(0, None, ...)`
/// never fails and never loops.
pub fn repeat<T: 'static>(min: usize, max: Option<usize>, rule: Rule<T>) -> Rule<Vec<T>> {
    Rule::new(move |input| {
        let mut remaining = input;
        let mut values = Vec::new();

        while max.map_or(true, |max| values.len() < max) {
            match rule.apply(remaining) {
                Match::Ok {
                    remaining: rest,
                    value,
                } => {
                    // A zero-width match would repeat forever.
                    if rest.len() == remaining.len() {
                        values.push(value);
                        break;
                    }

                    remaining = rest;
                    values.push(value);
                }
                Match::Fail { .. } => break,
            }
        }

        if values.len() < min {
            Match::Fail { remaining: input }
        } else {
            Match::Ok {
                remaining,
                value: values,
            }
        }
    })
}

/// Match zero or one occurrence of a rule. Never fails.
pub fn opt<T: 'static>(rule: Rule<T>) -> Rule<Option<T>> {
    Rule::new(move |input| match rule.apply(input) {
        Match::Ok { remaining, value } => Match::Ok {
            remaining,
            value: Some(value),
        },
        Match::Fail { remaining } => Match::Ok {
            remaining,
            value: None,
        },
    })
}

/// Lazily construct a rule on first use, memoizing the result.
///
/// This breaks forward-reference cycles in mutually recursive grammars: the
/// closure is evaluated at most once, the first time the rule is applied.
pub fn rule<T, F>(f: F) -> Rule<T>
where
    T: 'static,
    F: Fn() -> Rule<T> + Send + Sync + 'static,
{
    let cell: OnceCell<Rule<T>> = OnceCell::new();

    Rule::new(move |input| cell.get_or_init(&f).apply(input))
}

/// Match a sequence of string-valued rules and concatenate their text.
pub fn concat(rules: Vec<Rule<String>>) -> Rule<String> {
    seq(rules).map(|parts| parts.concat())
}

fn parse_hex_char(s: &str) -> Option<char> {
    let digits = s.strip_prefix("%x")?;

    if digits.contains('-') {
        return None;
    }

    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}

fn parse_hex_range(s: &str) -> Option<(char, char)> {
    let digits = s.strip_prefix("%x")?;
    let (low, high) = digits.split_once('-')?;
    let low = u32::from_str_radix(low, 16).ok().and_then(char::from_u32)?;
    let high = u32::from_str_radix(high, 16).ok().and_then(char::from_u32)?;

    Some((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_is_case_insensitive() {
        let rule = terminal("GMT");

        assert_eq!(rule.apply("gmt rest").ok(), Some((" rest", "gmt".into())));
        assert_eq!(rule.apply("GmT").ok(), Some(("", "GmT".into())));
        assert!(!rule.apply("gm").is_ok());
    }

    #[test]
    fn terminal_hex_form_matches_exact_byte() {
        let rule = terminal("%x3B");

        assert_eq!(rule.apply(";x").ok(), Some(("x", ";".into())));
        assert!(!rule.apply(":x").is_ok());
    }

    #[test]
    fn range_matches_single_character() {
        let rule = range("%x30-39");

        assert_eq!(rule.apply("7a").ok(), Some(("a", "7".into())));
        assert!(!rule.apply("a7").is_ok());
        assert!(!rule.apply("").is_ok());
    }

    #[test]
    fn failure_preserves_input() {
        let rule = concat(vec![terminal("ab"), terminal("cd")]);

        match rule.apply("abXX") {
            Match::Fail { remaining } => assert_eq!(remaining, "abXX"),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn seq_is_all_or_nothing() {
        let rule = seq(vec![terminal("a"), terminal("b")]);

        assert_eq!(
            rule.apply("abc").ok(),
            Some(("c", vec!["a".to_string(), "b".to_string()]))
        );
        assert!(!rule.apply("ac").is_ok());
    }

    #[test]
    fn alt_is_left_biased() {
        let rule = alt(vec![
            terminal("a").map(|_| 1),
            terminal("ab").map(|_| 2),
            terminal("b").map(|_| 3),
        ]);

        assert_eq!(rule.apply("ab").ok(), Some(("b", 1)));
        assert_eq!(rule.apply("ba").ok(), Some(("a", 3)));
        assert!(!rule.apply("c").is_ok());
    }

    #[test]
    fn repeat_enforces_bounds() {
        let digit = range("%x30-39");

        assert!(!repeat(2, None, digit.clone()).apply("1x").is_ok());
        assert_eq!(
            repeat(1, Some(2), digit.clone()).apply("1234").ok(),
            Some(("34", vec!["1".to_string(), "2".to_string()]))
        );
        // 0* never fails, even on no input.
        assert_eq!(repeat(0, None, digit).apply("x").ok(), Some(("x", vec![])));
    }

    #[test]
    fn opt_never_fails() {
        let rule = opt(terminal("a"));

        assert_eq!(rule.apply("ab").ok(), Some(("b", Some("a".into()))));
        assert_eq!(rule.apply("b").ok(), Some(("b", None)));
    }

    #[test]
    fn lazy_rule_permits_forward_references() {
        // balanced = "(" *balanced ")"
        fn balanced() -> Rule<String> {
            concat(vec![
                terminal("("),
                repeat(0, None, rule(balanced)).map(|inner| inner.concat()),
                terminal(")"),
            ])
        }

        assert_eq!(balanced().parse_all("()"), Some("()".to_string()));
        assert_eq!(balanced().parse_all("(()())"), Some("(()())".to_string()));
        assert_eq!(balanced().parse_all("(()"), None);
    }

    #[test]
    fn parse_all_requires_full_consumption() {
        let rule = terminal("ab");

        assert_eq!(rule.parse_all("ab"), Some("ab".to_string()));
        assert_eq!(rule.parse_all("abc"), None);
    }

    #[test]
    fn map_passes_failure_through() {
        let rule = terminal("a").map(|s| s.len());

        assert_eq!(rule.apply("ab").ok(), Some(("b", 1)));

        match rule.apply("b") {
            Match::Fail { remaining } => assert_eq!(remaining, "b"),
            _ => panic!("expected failure"),
        }
    }
}
