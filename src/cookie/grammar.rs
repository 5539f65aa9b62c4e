//! ABNF rules for cookie strings: the `token` rule of [RFC 2616, section
//! 2.2](https://tools.ietf.org/html/rfc2616#section-2.2) and the
//! `cookie-value` rule of [RFC 6265, section
//! 4.1.1](https://tools.ietf.org/html/rfc6265#section-4.1.1).

use once_cell::sync::Lazy;

use crate::abnf::{alt, concat, core::dquote, range, repeat, Rule};

/// `token = 1*tchar`, where tchar is any CHAR except CTLs and separators.
static TOKEN: Lazy<Rule<String>> =
    Lazy::new(|| repeat(1, None, tchar()).map(|chars| chars.concat()));

/// `cookie-value = *cookie-octet / ( DQUOTE *cookie-octet DQUOTE )`
static COOKIE_VALUE: Lazy<Rule<String>> = Lazy::new(|| {
    let octets = || repeat(0, None, cookie_octet()).map(|chars| chars.concat());

    // Quoted first; the unquoted form matches the empty string and would
    // otherwise always win.
    alt(vec![
        concat(vec![dquote(), octets(), dquote()]),
        octets(),
    ])
});

/// VCHAR minus the separators of RFC 2616.
fn tchar() -> Rule<String> {
    alt(vec![
        range("%x21-21"),
        range("%x23-27"),
        range("%x2A-2B"),
        range("%x2D-2E"),
        range("%x30-39"),
        range("%x41-5A"),
        range("%x5E-7A"),
        range("%x7C-7C"),
        range("%x7E-7E"),
    ])
}

/// `cookie-octet`: VCHAR except DQUOTE, comma, semicolon, and backslash.
fn cookie_octet() -> Rule<String> {
    alt(vec![
        range("%x21-21"),
        range("%x23-2B"),
        range("%x2D-3A"),
        range("%x3C-5B"),
        range("%x5D-7E"),
    ])
}

pub(crate) fn is_token(input: &str) -> bool {
    TOKEN.parse_all(input).is_some()
}

pub(crate) fn is_cookie_value(input: &str) -> bool {
    COOKIE_VALUE.parse_all(input).is_some()
}

pub(crate) fn contains_control_chars(input: &str) -> bool {
    input.chars().any(|c| matches!(c, '\x00'..='\x1F'))
}
