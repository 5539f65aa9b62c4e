//! Host and domain handling for cookie scoping, as defined in [RFC 6265,
//! section 5.1.3](https://tools.ietf.org/html/rfc6265#section-5.1.3).

use std::net::{Ipv4Addr, Ipv6Addr};

/// Domains reserved for special use by [RFC
/// 6761](https://tools.ietf.org/html/rfc6761) and friends. Cookies may not
/// be scoped to these unless the jar opts in.
const SPECIAL_USE_DOMAINS: &[&str] = &["local", "example", "invalid", "localhost", "test"];

/// Put a host name into its canonical form: trimmed, lowercased, with any
/// single leading dot removed and non-ASCII labels converted to ASCII via
/// IDNA (punycode).
///
/// Returns `None` for an empty host or one that cannot be IDNA-encoded.
/// Canonicalization is idempotent on well-formed ASCII hosts.
///
/// ```
/// use gingersnap::canonical_domain;
///
/// assert_eq!(canonical_domain(".EXAMPLE.com"), Some("example.com".into()));
/// ```
pub fn canonical_domain(domain: &str) -> Option<String> {
    let mut domain = domain.trim();

    if domain.is_empty() {
        return None;
    }

    if let Some(stripped) = domain.strip_prefix('.') {
        domain = stripped;
    }

    // IPv6 literals may arrive in URI bracket form.
    if let Some(stripped) = domain
        .strip_prefix('[')
        .and_then(|d| d.strip_suffix(']'))
    {
        domain = stripped;
    }

    if domain.is_ascii() {
        Some(domain.to_ascii_lowercase())
    } else {
        idna::domain_to_ascii(domain).ok().filter(|d| !d.is_empty())
    }
}

/// Determine whether a request host is within the scope of a cookie domain
/// per [RFC 6265, section
/// 5.1.3](https://tools.ietf.org/html/rfc6265#section-5.1.3).
///
/// This is true when the two are identical after canonicalization, or when
/// the cookie domain is a dot-bounded suffix of the host and the host is
/// not an IP address. There are no partial-label matches: `ample.com` does
/// not cover `example.com`.
pub fn domain_match(host: &str, domain: &str) -> bool {
    let (host, domain) = match (canonical_domain(host), canonical_domain(domain)) {
        (Some(host), Some(domain)) => (host, domain),
        _ => return false,
    };

    if host == domain {
        return true;
    }

    host.ends_with(&domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
        && !is_ip_address(&host)
}

/// Whether the given host is an IPv4 or IPv6 literal.
pub(crate) fn is_ip_address(host: &str) -> bool {
    host.parse::<Ipv4Addr>().is_ok() || host.parse::<Ipv6Addr>().is_ok()
}

/// Whether the domain is, or is nested under, a special-use domain.
pub(crate) fn is_special_use_domain(domain: &str) -> bool {
    SPECIAL_USE_DOMAINS
        .iter()
        .any(|s| domain == *s || domain.strip_suffix(s).map_or(false, |d| d.ends_with('.')))
}

/// All domains that could hold a cookie visible to the given host: the host
/// itself plus every parent suffix, most specific first.
pub(crate) fn permute_domain(domain: &str) -> Vec<String> {
    let mut permutations = vec![domain.to_owned()];
    let mut rest = domain;

    while let Some((_, parent)) = rest.split_once('.') {
        permutations.push(parent.to_owned());
        rest = parent;
    }

    permutations
}
