//! The core grammar defined in [RFC 5234 Appendix
//! B.1](https://tools.ietf.org/html/rfc5234#appendix-B.1).
//!
//! Each function returns a fresh [`Rule`] for the corresponding core rule.
//! All rules produce the matched text.

use super::{alt, concat, range, repeat, terminal, Rule};

/// `ALPHA = %x41-5A / %x61-7A` (A-Z / a-z)
pub fn alpha() -> Rule<String> {
    alt(vec![range("%x41-5A"), range("%x61-7A")])
}

/// `BIT = "0" / "1"`
pub fn bit() -> Rule<String> {
    alt(vec![terminal("0"), terminal("1")])
}

/// `CHAR = %x01-7F` (any 7-bit US-ASCII character, excluding NUL)
pub fn chr() -> Rule<String> {
    range("%x01-7F")
}

/// `CR = %x0D` (carriage return)
pub fn cr() -> Rule<String> {
    terminal("%x0D")
}

/// `CRLF = CR LF` (Internet standard newline)
pub fn crlf() -> Rule<String> {
    concat(vec![cr(), lf()])
}

/// `CTL = %x00-1F / %x7F` (controls)
pub fn ctl() -> Rule<String> {
    alt(vec![range("%x00-1F"), terminal("%x7F")])
}

/// `DIGIT = %x30-39` (0-9)
pub fn digit() -> Rule<String> {
    range("%x30-39")
}

/// `DQUOTE = %x22` (double quote)
pub fn dquote() -> Rule<String> {
    terminal("%x22")
}

/// `HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"`
pub fn hexdig() -> Rule<String> {
    alt(vec![
        digit(),
        terminal("A"),
        terminal("B"),
        terminal("C"),
        terminal("D"),
        terminal("E"),
        terminal("F"),
    ])
}

/// `HTAB = %x09` (horizontal tab)
pub fn htab() -> Rule<String> {
    terminal("%x09")
}

/// `LF = %x0A` (linefeed)
pub fn lf() -> Rule<String> {
    terminal("%x0A")
}

/// `LWSP = *(WSP / CRLF WSP)` (linear whitespace, use with caution)
pub fn lwsp() -> Rule<String> {
    repeat(0, None, alt(vec![wsp(), concat(vec![crlf(), wsp()])]))
        .map(|parts| parts.concat())
}

/// `OCTET = %x00-FF` (8 bits of data)
pub fn octet() -> Rule<String> {
    range("%x00-FF")
}

/// `SP = %x20` (space)
pub fn sp() -> Rule<String> {
    terminal("%x20")
}

/// `VCHAR = %x21-7E` (visible printing characters)
pub fn vchar() -> Rule<String> {
    range("%x21-7E")
}

/// `WSP = SP / HTAB` (whitespace)
pub fn wsp() -> Rule<String> {
    alt(vec![sp(), htab()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_matches_letters_only() {
        assert!(alpha().apply("a").is_ok());
        assert!(alpha().apply("Z").is_ok());
        assert!(!alpha().apply("1").is_ok());
    }

    #[test]
    fn hexdig_matches_either_case() {
        for input in ["0", "9", "a", "f", "A", "F"] {
            assert!(hexdig().parse_all(input).is_some(), "{}", input);
        }

        assert!(hexdig().parse_all("g").is_none());
    }

    #[test]
    fn crlf_matches_newline_pair() {
        assert_eq!(crlf().parse_all("\r\n"), Some("\r\n".to_string()));
        assert!(crlf().parse_all("\n").is_none());
    }

    #[test]
    fn lwsp_matches_folded_whitespace() {
        assert_eq!(lwsp().parse_all(" \t \r\n "), Some(" \t \r\n ".to_string()));
        assert_eq!(lwsp().parse_all(""), Some(String::new()));
    }

    #[test]
    fn ctl_includes_delete() {
        assert!(ctl().apply("\u{7F}").is_ok());
        assert!(ctl().apply("\u{01}").is_ok());
        assert!(!ctl().apply("a").is_ok());
    }
}
