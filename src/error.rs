//! Types for error handling.

use std::{error::Error as StdError, fmt};

/// All possible types of errors that can be returned from a cookie jar.
///
/// Malformed input is normal in cookie handling, so most of these are
/// "rejection" values describing why a cookie was not accepted rather than
/// programming errors. Nothing in this crate panics on bad input.
#[derive(Debug)]
pub enum Error {
    /// A cookie string or serialized cookie could not be parsed. Contains
    /// the reason the parser gave up.
    Parse(&'static str),

    /// The cookie's `Domain` attribute was set to a public suffix (such as
    /// `com` or `co.uk`) that differs from the request host.
    PublicSuffix,

    /// The cookie's `Domain` attribute does not domain-match the request
    /// host.
    DomainMismatch,

    /// The cookie's `Domain` attribute was set to a special-use domain
    /// (such as `localhost` or `*.local`) and the jar is not configured to
    /// allow them.
    SpecialUseDomain,

    /// An HttpOnly cookie was set or overwritten through a non-HTTP API.
    HttpOnly,

    /// A non-secure request attempted to overwrite a Secure cookie.
    SecureOverwrite,

    /// The cookie violated a SameSite rule. Contains a description of the
    /// violated rule.
    SameSite(&'static str),

    /// The cookie violated the requirements of its `__Secure-` or
    /// `__Host-` name prefix. Contains a description of the violated rule.
    Prefix(&'static str),

    /// The backing cookie store failed.
    Store(String),

    /// A serialized jar could not be encoded or decoded as JSON.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(reason) => write!(f, "invalid cookie string: {}", reason),
            Error::PublicSuffix => f.write_str("cookie domain is a public suffix"),
            Error::DomainMismatch => {
                f.write_str("cookie domain does not match the request host")
            }
            Error::SpecialUseDomain => {
                f.write_str("cookie domain is a special-use domain, which is not allowed")
            }
            Error::HttpOnly => {
                f.write_str("HttpOnly cookie cannot be set through a non-HTTP API")
            }
            Error::SecureOverwrite => {
                f.write_str("secure cookie cannot be overwritten by a non-secure request")
            }
            Error::SameSite(reason) => write!(f, "SameSite violation: {}", reason),
            Error::Prefix(reason) => write!(f, "cookie name prefix violation: {}", reason),
            Error::Store(reason) => write!(f, "cookie store error: {}", reason),
            Error::Json(e) => write!(f, "serialized cookie jar error: {}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[doc(hidden)]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}
