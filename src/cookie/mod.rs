//! The cookie value model: parsing, serialization, and the attribute
//! semantics of [RFC 6265](https://tools.ietf.org/html/rfc6265).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::canonical_domain;
use crate::error::Error;

mod date;
mod grammar;

/// The latest expiry instant a cookie may carry, in milliseconds since the
/// Unix epoch. Many consumers still persist expiry as a signed 32-bit
/// seconds field, so `Max-Age` arithmetic is clamped here (2038-01-19).
pub(crate) const MAX_TIME_MS: i64 = 2_147_483_647_000;

/// Value of the `SameSite` cookie attribute.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// The cookie is only sent on requests originating from its own site.
    Strict,

    /// The cookie is also sent on top-level cross-site navigations.
    Lax,

    /// The cookie is sent on all requests. Requires the `Secure` attribute.
    None,
}

impl FromStr for SameSite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("strict") {
            Ok(SameSite::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Ok(SameSite::Lax)
        } else if s.eq_ignore_ascii_case("none") {
            Ok(SameSite::None)
        } else {
            Err(Error::Parse("unrecognized SameSite value"))
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Value of the `Max-Age` cookie attribute.
///
/// The infinite variants do not occur in parsed headers, but can appear in
/// serialized jars and cookies built programmatically.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaxAge {
    /// A lifetime in seconds. Zero or negative means already expired.
    Seconds(i64),

    /// Never expires.
    Infinity,

    /// Expired before any representable time.
    NegInfinity,
}

impl fmt::Display for MaxAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxAge::Seconds(seconds) => write!(f, "{}", seconds),
            MaxAge::Infinity => f.write_str("Infinity"),
            MaxAge::NegInfinity => f.write_str("-Infinity"),
        }
    }
}

/// A cookie's resolved expiry instant, combining the `Expires` and
/// `Max-Age` attributes (`Max-Age` wins when both are present).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Expiry {
    /// Expired before any representable time.
    Past,

    /// Expires at the given instant.
    At(DateTime<Utc>),

    /// Never expires; a session cookie.
    Never,
}

impl Expiry {
    /// Whether a cookie with this expiry is expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            Expiry::Past => true,
            Expiry::At(at) => *at <= now,
            Expiry::Never => false,
        }
    }
}

/// Options controlling how cookie strings are parsed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    loose: bool,
}

impl ParseOptions {
    /// Create the default parse options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable loose parsing: tolerate a missing `=` in the name/value pair
    /// (the whole pair becomes the value) and skip the token and
    /// cookie-octet grammar checks that strict parsing performs.
    pub fn loose(mut self, loose: bool) -> Self {
        self.loose = loose;
        self
    }

    pub(crate) fn is_loose(&self) -> bool {
        self.loose
    }
}

/// Information stored about an HTTP cookie.
///
/// A freshly parsed cookie carries only what the `Set-Cookie` header said.
/// The ingestion bookkeeping (`host_only`, default path, creation times,
/// creation index) is filled in by the jar when the cookie is accepted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cookie {
    /// The name of the cookie.
    pub(crate) key: String,

    /// The cookie value.
    pub(crate) value: String,

    /// Time when this cookie expires. `None` is the "never expires"
    /// sentinel; such a cookie lives only for the client session.
    pub(crate) expires: Option<DateTime<Utc>>,

    /// Lifetime from the `Max-Age` attribute. Takes precedence over
    /// `expires` when present.
    pub(crate) max_age: Option<MaxAge>,

    /// The domain the cookie belongs to, canonicalized. `None` until the
    /// jar assigns one.
    pub(crate) domain: Option<String>,

    /// A path prefix that this cookie belongs to.
    pub(crate) path: Option<String>,

    /// True if the cookie is marked as secure (limited in scope to HTTPS).
    pub(crate) secure: bool,

    /// True if the cookie is unavailable to non-HTTP APIs.
    pub(crate) http_only: bool,

    /// The `SameSite` attribute, if the server specified one.
    pub(crate) same_site: Option<SameSite>,

    /// True if the request's host must exactly match the domain of the
    /// cookie. Derived at ingestion: set when the header had no `Domain`.
    pub(crate) host_only: bool,

    /// True if the path was computed from the request rather than sent by
    /// the server.
    pub(crate) path_is_default: bool,

    /// When the jar first ingested this cookie.
    pub(crate) creation: Option<DateTime<Utc>>,

    /// When the cookie was last sent on a request.
    pub(crate) last_accessed: Option<DateTime<Utc>>,

    /// Jar-local ordinal breaking creation-time ties deterministically.
    pub(crate) creation_index: u64,

    /// Unrecognized attributes, kept verbatim in order of appearance.
    pub(crate) extensions: Vec<String>,
}

impl Cookie {
    /// Create a new session cookie with the given name and value and no
    /// scoping attributes.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Parse a cookie from a `Set-Cookie` header value, as defined in [RFC
    /// 6265, section 5.2](https://tools.ietf.org/html/rfc6265#section-5.2).
    ///
    /// Unknown attributes do not cause a parsing error; they are collected
    /// into [`extensions`](Cookie::extensions). Recognized attributes with
    /// malformed values are ignored, as the RFC requires. Only a malformed
    /// name/value pair makes the whole parse fail.
    pub fn parse(header: &str, options: &ParseOptions) -> Result<Self, Error> {
        let header = header.trim();

        let (pair, attributes) = match header.split_once(';') {
            Some((pair, attributes)) => (pair, Some(attributes)),
            None => (header, None),
        };

        let (key, value) = parse_pair(pair, options)?;

        let mut cookie = Cookie::new(key, value);

        for attribute in attributes.unwrap_or("").split(';') {
            let attribute = attribute.trim();

            if attribute.is_empty() {
                continue;
            }

            let (name, value) = match attribute.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (attribute, None),
            };

            // Later occurrences of the same attribute override earlier
            // ones.
            match name.to_ascii_lowercase().as_str() {
                "expires" => {
                    if let Some(time) = value.and_then(date::parse) {
                        cookie.expires = Some(time);
                    }
                }
                "max-age" => {
                    if let Some(max_age) = value.and_then(parse_max_age) {
                        cookie.max_age = Some(max_age);
                    }
                }
                "domain" => {
                    if let Some(domain) = value {
                        let domain = domain.strip_prefix('.').unwrap_or(domain).trim();

                        if !domain.is_empty() {
                            cookie.domain = Some(domain.to_ascii_lowercase());
                        }
                    }
                }
                "path" => {
                    if let Some(path) = value.filter(|p| p.starts_with('/')) {
                        cookie.path = Some(path.to_owned());
                    }
                }
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                "samesite" => {
                    cookie.same_site = value.and_then(|v| v.parse().ok());
                }
                _ => cookie.extensions.push(attribute.to_owned()),
            }
        }

        Ok(cookie)
    }

    /// Get the name of the cookie.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value of the cookie.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the expiry instant from the `Expires` attribute, if any.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Get the `Max-Age` attribute, if any.
    pub fn max_age(&self) -> Option<MaxAge> {
        self.max_age
    }

    /// Get the domain the cookie is scoped to, if assigned.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Get the path the cookie is scoped to, if assigned.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get whether this cookie was marked as being secure only.
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Get whether this cookie is hidden from non-HTTP APIs.
    #[inline]
    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Get the `SameSite` attribute, if the server specified one.
    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Get whether this cookie only matches the exact host that set it.
    pub fn is_host_only(&self) -> bool {
        self.host_only
    }

    /// Get whether the cookie's path was computed from the request URL
    /// rather than sent by the server.
    pub fn path_is_default(&self) -> bool {
        self.path_is_default
    }

    /// When the jar first ingested this cookie.
    pub fn creation(&self) -> Option<DateTime<Utc>> {
        self.creation
    }

    /// When the cookie was last sent on a request.
    pub fn last_accessed(&self) -> Option<DateTime<Utc>> {
        self.last_accessed
    }

    /// Jar-local ordinal assigned at ingestion.
    pub fn creation_index(&self) -> u64 {
        self.creation_index
    }

    /// Unrecognized attributes, verbatim in order of appearance.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Set the cookie's name.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Set the cookie's value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Set or clear the `Expires` attribute.
    pub fn set_expires(&mut self, expires: Option<DateTime<Utc>>) {
        self.expires = expires;
    }

    /// Set or clear the `Max-Age` attribute.
    pub fn set_max_age(&mut self, max_age: Option<MaxAge>) {
        self.max_age = max_age;
    }

    /// Set or clear the cookie's domain. The domain is canonicalized; a
    /// domain that cannot be canonicalized clears the attribute.
    pub fn set_domain(&mut self, domain: Option<&str>) {
        self.domain = domain.and_then(canonical_domain);
    }

    /// Set or clear the cookie's path.
    pub fn set_path(&mut self, path: Option<&str>) {
        self.path = path.map(str::to_owned);
        self.path_is_default = false;
    }

    /// Set the `Secure` attribute.
    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    /// Set the `HttpOnly` attribute.
    pub fn set_http_only(&mut self, http_only: bool) {
        self.http_only = http_only;
    }

    /// Set or clear the `SameSite` attribute.
    pub fn set_same_site(&mut self, same_site: Option<SameSite>) {
        self.same_site = same_site;
    }

    /// Append an unrecognized attribute to the cookie.
    pub fn add_extension(&mut self, extension: impl Into<String>) {
        self.extensions.push(extension.into());
    }

    /// Render just the `key=value` part of the cookie, as it would appear
    /// in a `Cookie` request header.
    pub fn cookie_string(&self) -> String {
        if self.key.is_empty() {
            self.value.clone()
        } else {
            format!("{}={}", self.key, self.value)
        }
    }

    /// Resolve when this cookie expires.
    ///
    /// `Max-Age` is relative to the time the cookie was last accessed (or
    /// `now` for a cookie that never was), and is clamped so the result
    /// stays within a 32-bit seconds field. Pass `None` as `now` to use the
    /// current time.
    pub fn expiry_time(&self, now: Option<DateTime<Utc>>) -> Expiry {
        if let Some(max_age) = self.max_age {
            let relative_to = self.last_accessed.or(now).unwrap_or_else(Utc::now);

            return match max_age {
                MaxAge::NegInfinity => Expiry::Past,
                MaxAge::Infinity => Expiry::Never,
                MaxAge::Seconds(seconds) if seconds <= 0 => Expiry::Past,
                MaxAge::Seconds(seconds) => {
                    let millis = relative_to
                        .timestamp_millis()
                        .saturating_add(seconds.saturating_mul(1000))
                        .min(MAX_TIME_MS);

                    Utc.timestamp_millis_opt(millis)
                        .single()
                        .map(Expiry::At)
                        .unwrap_or(Expiry::Never)
                }
            };
        }

        match self.expires {
            Some(at) => Expiry::At(at),
            None => Expiry::Never,
        }
    }

    /// Resolve when this cookie expires, as a concrete instant. Cookies
    /// that never expire report the maximum representable expiry, already
    /// expired ones the Unix epoch.
    pub fn expiry_date(&self, now: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match self.expiry_time(now) {
            Expiry::Past => DateTime::<Utc>::UNIX_EPOCH,
            Expiry::At(at) => at,
            Expiry::Never => Utc
                .timestamp_millis_opt(MAX_TIME_MS)
                .single()
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Milliseconds until this cookie expires, negative if it already has.
    /// Returns `None` for a cookie that never expires, and `i64::MIN` for
    /// one expired before any representable time.
    pub fn ttl(&self, now: Option<DateTime<Utc>>) -> Option<i64> {
        let now = now.unwrap_or_else(Utc::now);

        match self.expiry_time(Some(now)) {
            Expiry::Past => Some(i64::MIN),
            Expiry::At(at) => Some(at.timestamp_millis() - now.timestamp_millis()),
            Expiry::Never => None,
        }
    }

    /// Whether the cookie carries an expiry (`Expires` or `Max-Age`) and
    /// thus outlives the client session.
    pub fn is_persistent(&self) -> bool {
        self.max_age.is_some() || self.expires.is_some()
    }

    /// The cookie's domain in canonical form.
    pub fn canonicalized_domain(&self) -> Option<String> {
        self.domain.as_deref().and_then(canonical_domain)
    }

    /// Check the cookie's fields against the grammar rules of RFC 6265.
    ///
    /// Parsed cookies always pass; this catches invalid values introduced
    /// when building or mutating cookies programmatically.
    pub fn validate(&self) -> Result<(), Error> {
        if !grammar::is_token(&self.key) {
            return Err(Error::Parse("cookie name is not a valid token"));
        }

        if !grammar::is_cookie_value(&self.value) {
            return Err(Error::Parse("cookie value contains invalid characters"));
        }

        match self.max_age {
            Some(MaxAge::Seconds(seconds)) if seconds <= 0 => {
                return Err(Error::Parse("Max-Age must be a positive number of seconds"));
            }
            Some(MaxAge::NegInfinity) => {
                return Err(Error::Parse("Max-Age must be a positive number of seconds"));
            }
            _ => {}
        }

        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                return Err(Error::Parse("cookie path must begin with a slash"));
            }
        }

        if let Some(domain) = &self.domain {
            if domain.ends_with('.') {
                return Err(Error::Parse("cookie domain must not end with a dot"));
            }

            if self.canonicalized_domain().as_deref() != Some(domain) {
                return Err(Error::Parse("cookie domain is not in canonical form"));
            }
        }

        Ok(())
    }
}

impl FromStr for Cookie {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &ParseOptions::default())
    }
}

impl fmt::Display for Cookie {
    /// Render the full `Set-Cookie` serialization of the cookie.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cookie_string())?;

        if let Some(expires) = self.expires {
            write!(f, "; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT"))?;
        }

        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }

        // A host-only domain was derived from the request, not sent by the
        // server, and is not echoed back.
        if !self.host_only {
            if let Some(domain) = &self.domain {
                write!(f, "; Domain={}", domain)?;
            }
        }

        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }

        if self.secure {
            f.write_str("; Secure")?;
        }

        if self.http_only {
            f.write_str("; HttpOnly")?;
        }

        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site)?;
        }

        for extension in &self.extensions {
            write!(f, "; {}", extension)?;
        }

        Ok(())
    }
}

/// Compare two cookies by sending precedence, per [RFC 6265, section
/// 5.4](https://tools.ietf.org/html/rfc6265#section-5.4): longer paths
/// first, then earlier creation, then earlier ingestion order.
///
/// Cookies without a creation time sort last, and the creation index is a
/// jar-unique tiebreaker, so within one jar this is a total order.
pub fn cookie_compare(a: &Cookie, b: &Cookie) -> Ordering {
    fn path_len(cookie: &Cookie) -> usize {
        cookie.path.as_deref().map_or(0, str::len)
    }

    fn creation_millis(cookie: &Cookie) -> i64 {
        cookie.creation.map_or(MAX_TIME_MS, |t| t.timestamp_millis())
    }

    path_len(b)
        .cmp(&path_len(a))
        .then_with(|| creation_millis(a).cmp(&creation_millis(b)))
        .then_with(|| a.creation_index.cmp(&b.creation_index))
}

/// Parse a cookie date string, such as the value of the `Expires`
/// attribute, using the forgiving algorithm of [RFC 6265, section
/// 5.1.1](https://tools.ietf.org/html/rfc6265#section-5.1.1).
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    date::parse(input)
}

fn parse_pair(pair: &str, options: &ParseOptions) -> Result<(String, String), Error> {
    let mut pair = pair.trim();
    let mut first_eq = pair.find('=');

    if options.is_loose() {
        // Tolerate a stray leading "=".
        if first_eq == Some(0) {
            pair = &pair[1..];
            first_eq = pair.find('=');
        }
    } else if first_eq.map_or(true, |i| i == 0) {
        return Err(Error::Parse("cookie name/value pair is missing an `=`"));
    }

    let (key, value) = match first_eq {
        Some(i) if i > 0 => (pair[..i].trim(), pair[i + 1..].trim()),
        // Only reachable in loose mode: the whole pair is the value.
        _ => ("", pair.trim()),
    };

    if grammar::contains_control_chars(key) || grammar::contains_control_chars(value) {
        return Err(Error::Parse("cookie name or value contains control characters"));
    }

    if !options.is_loose() {
        if !grammar::is_token(key) {
            return Err(Error::Parse("cookie name is not a valid token"));
        }

        if !grammar::is_cookie_value(value) {
            return Err(Error::Parse("cookie value contains invalid characters"));
        }
    }

    Ok((key.to_owned(), value.to_owned()))
}

fn parse_max_age(value: &str) -> Option<MaxAge> {
    let digits = value.strip_prefix('-').unwrap_or(value);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(match value.parse::<i64>() {
        Ok(seconds) => MaxAge::Seconds(seconds),
        // Too many digits to represent; saturate in the right direction.
        Err(_) if value.starts_with('-') => MaxAge::NegInfinity,
        Err(_) => MaxAge::Infinity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parse_set_cookie_header() {
        let cookie: Cookie =
            "foo=bar; Path=/sub;Secure; DOMAIN=baz.com;expires=Wed, 21 Oct 2015 07:28:00 GMT"
                .parse()
                .unwrap();

        assert_eq!(cookie.key(), "foo");
        assert_eq!(cookie.value(), "bar");
        assert_eq!(cookie.path(), Some("/sub"));
        assert_eq!(cookie.domain(), Some("baz.com"));
        assert!(cookie.is_secure());
        assert!(!cookie.is_http_only());
        assert_eq!(
            cookie.expires().map(|t| t.timestamp()),
            Some(1_445_412_480)
        );
    }

    #[test]
    fn parse_applies_expires_attribute() {
        let cookie: Cookie = "a=b; Expires=Wed, 09 Jun 2021 10:18:14 GMT".parse().unwrap();

        assert_eq!(cookie.expires(), Some(utc(2021, 6, 9, 10, 18, 14)));
    }

    #[test]
    fn parse_same_site_and_extensions() {
        let cookie: Cookie = "id=1; SameSite=LAX; Fancy=very; Plain".parse().unwrap();

        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.extensions(), ["Fancy=very", "Plain"]);
    }

    #[test]
    fn parse_ignores_malformed_attributes() {
        let cookie: Cookie = "a=b; Expires=nonsense; Max-Age=1x; Domain=; Path=relative"
            .parse()
            .unwrap();

        assert_eq!(cookie.expires(), None);
        assert_eq!(cookie.max_age(), None);
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.path(), None);
    }

    #[test]
    fn parse_requires_name_value_pair() {
        assert!("justvalue".parse::<Cookie>().is_err());
        assert!("=value".parse::<Cookie>().is_err());
        assert!("sp ace=value".parse::<Cookie>().is_err());
        assert!("a=b\x07c".parse::<Cookie>().is_err());
    }

    #[test]
    fn loose_mode_accepts_bare_values() {
        let options = ParseOptions::new().loose(true);

        let cookie = Cookie::parse("justvalue", &options).unwrap();
        assert_eq!(cookie.key(), "");
        assert_eq!(cookie.value(), "justvalue");

        let cookie = Cookie::parse("=bar", &options).unwrap();
        assert_eq!(cookie.key(), "");
        assert_eq!(cookie.value(), "bar");

        let cookie = Cookie::parse("spaced = also fine", &options).unwrap();
        assert_eq!(cookie.key(), "spaced");
        assert_eq!(cookie.value(), "also fine");
    }

    #[test]
    fn max_age_parsing() {
        let cookie: Cookie = "a=b; Max-Age=100".parse().unwrap();
        assert_eq!(cookie.max_age(), Some(MaxAge::Seconds(100)));

        let cookie: Cookie = "a=b; Max-Age=-1".parse().unwrap();
        assert_eq!(cookie.max_age(), Some(MaxAge::Seconds(-1)));

        // Saturates rather than failing.
        let cookie: Cookie = "a=b; Max-Age=99999999999999999999999".parse().unwrap();
        assert_eq!(cookie.max_age(), Some(MaxAge::Infinity));
    }

    #[test]
    fn last_attribute_wins() {
        let cookie: Cookie = "a=b; Path=/one; Path=/two".parse().unwrap();

        assert_eq!(cookie.path(), Some("/two"));
    }

    #[test]
    fn quoted_values_are_preserved() {
        let cookie: Cookie = "a=\"quoted\"".parse().unwrap();

        assert_eq!(cookie.value(), "\"quoted\"");
        assert_eq!(cookie.to_string(), "a=\"quoted\"");
    }

    #[test]
    fn to_string_round_trips() {
        let mut cookie = Cookie::new("name", "value");
        cookie.set_domain(Some("example.com"));
        cookie.set_path(Some("/foo"));
        cookie.set_secure(true);
        cookie.set_http_only(true);
        cookie.set_same_site(Some(SameSite::Strict));
        cookie.set_max_age(Some(MaxAge::Seconds(86400)));
        cookie.set_expires(Some(utc(2021, 6, 9, 10, 18, 14)));
        cookie.add_extension("Partitioned");

        assert_eq!(
            cookie.to_string(),
            "name=value; Expires=Wed, 09 Jun 2021 10:18:14 GMT; Max-Age=86400; \
             Domain=example.com; Path=/foo; Secure; HttpOnly; SameSite=Strict; Partitioned"
        );

        let reparsed: Cookie = cookie.to_string().parse().unwrap();

        assert_eq!(reparsed, cookie);
    }

    #[test]
    fn host_only_cookies_do_not_echo_domain() {
        let mut cookie = Cookie::new("a", "b");
        cookie.set_domain(Some("example.com"));
        cookie.host_only = true;

        assert_eq!(cookie.to_string(), "a=b");
    }

    #[test]
    fn expiry_prefers_max_age_over_expires() {
        let now = utc(2021, 6, 9, 0, 0, 0);

        let mut cookie = Cookie::new("a", "b");
        cookie.set_expires(Some(utc(2030, 1, 1, 0, 0, 0)));
        cookie.set_max_age(Some(MaxAge::Seconds(60)));

        assert_eq!(
            cookie.expiry_time(Some(now)),
            Expiry::At(now + chrono::Duration::seconds(60))
        );
    }

    #[test]
    fn zero_or_negative_max_age_expires_immediately() {
        let now = utc(2021, 6, 9, 0, 0, 0);

        for seconds in [0, -1] {
            let mut cookie = Cookie::new("a", "b");
            cookie.set_max_age(Some(MaxAge::Seconds(seconds)));

            assert_eq!(cookie.expiry_time(Some(now)), Expiry::Past);
            assert!(cookie.expiry_time(Some(now)).is_expired(now));
            assert_eq!(cookie.expiry_date(Some(now)), DateTime::<Utc>::UNIX_EPOCH);
            assert_eq!(cookie.ttl(Some(now)), Some(i64::MIN));
        }
    }

    #[test]
    fn max_age_clamps_to_max_time() {
        let now = utc(2021, 6, 9, 0, 0, 0);

        let mut cookie = Cookie::new("a", "b");
        cookie.set_max_age(Some(MaxAge::Seconds(i64::MAX)));

        assert_eq!(
            cookie.expiry_time(Some(now)),
            Expiry::At(Utc.timestamp_millis_opt(MAX_TIME_MS).unwrap())
        );
    }

    #[test]
    fn session_cookies_never_expire() {
        let now = utc(2021, 6, 9, 0, 0, 0);
        let cookie = Cookie::new("a", "b");

        assert_eq!(cookie.expiry_time(Some(now)), Expiry::Never);
        assert_eq!(cookie.ttl(Some(now)), None);
        assert!(!cookie.is_persistent());
        assert!(!cookie.expiry_time(Some(now)).is_expired(now));
    }

    #[test]
    fn validate_catches_bad_fields() {
        assert!(Cookie::new("ok", "fine").validate().is_ok());
        assert!(Cookie::new("", "fine").validate().is_err());
        assert!(Cookie::new("bad key", "fine").validate().is_err());
        assert!(Cookie::new("ok", "bad value").validate().is_err());

        let mut cookie = Cookie::new("ok", "fine");
        cookie.path = Some("relative".into());
        assert!(cookie.validate().is_err());

        let mut cookie = Cookie::new("ok", "fine");
        cookie.domain = Some("EXAMPLE.com".into());
        assert!(cookie.validate().is_err());

        let mut cookie = Cookie::new("ok", "fine");
        cookie.set_max_age(Some(MaxAge::Seconds(0)));
        assert!(cookie.validate().is_err());
    }

    #[test]
    fn compare_orders_longer_paths_first() {
        let now = utc(2021, 6, 9, 0, 0, 0);

        let mut a = Cookie::new("a", "1");
        a.path = Some("/".into());
        a.creation = Some(now);
        a.creation_index = 1;

        let mut b = Cookie::new("b", "2");
        b.path = Some("/foo".into());
        b.creation = Some(now);
        b.creation_index = 2;

        assert_eq!(cookie_compare(&b, &a), Ordering::Less);

        let mut cookies = vec![a.clone(), b.clone()];
        cookies.sort_by(cookie_compare);
        assert_eq!(cookies, vec![b, a]);
    }

    #[test]
    fn compare_breaks_creation_ties_by_index() {
        let now = utc(2021, 6, 9, 0, 0, 0);

        let mut a = Cookie::new("a", "1");
        a.path = Some("/".into());
        a.creation = Some(now);
        a.creation_index = 7;

        let mut b = Cookie::new("b", "2");
        b.path = Some("/".into());
        b.creation = Some(now);
        b.creation_index = 8;

        assert_eq!(cookie_compare(&a, &b), Ordering::Less);
        assert_eq!(cookie_compare(&b, &a), Ordering::Greater);
        assert_eq!(cookie_compare(&a, &a.clone()), Ordering::Equal);
    }

    #[test]
    fn compare_sorts_missing_creation_last() {
        let mut a = Cookie::new("a", "1");
        a.creation = Some(utc(2021, 6, 9, 0, 0, 0));

        let b = Cookie::new("b", "2");

        assert_eq!(cookie_compare(&a, &b), Ordering::Less);
    }
}
