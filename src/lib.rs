//! The tough little cookie jar for HTTP clients.
//!
//! Gingersnap is an embeddable implementation of [RFC
//! 6265](https://tools.ietf.org/html/rfc6265) HTTP state management for
//! HTTP client implementations: it parses `Set-Cookie` headers, validates
//! them against the request they arrived on, stores them, and produces the
//! `Cookie` header for outgoing requests, honoring the full set of
//! attribute semantics (`Domain`, `Path`, `Expires`, `Max-Age`, `Secure`,
//! `HttpOnly`, and `SameSite`).
//!
//! It is deliberately *not* an HTTP client: bring your own transport, hand
//! the jar your request URIs and response headers, and it keeps the cookie
//! state straight across any number of origins.
//!
//! ## Getting started
//!
//! ```rust
//! use gingersnap::CookieJar;
//!
//! # fn run() -> Result<(), gingersnap::Error> {
//! let jar = CookieJar::new();
//! let uri = "https://example.com/login".parse().unwrap();
//!
//! // A response to `uri` carried a Set-Cookie header:
//! jar.set_cookie("session=0xdeadbeef; Path=/; Secure; HttpOnly", &uri)?;
//!
//! // A later request to the same site should carry it back:
//! assert_eq!(jar.get_cookie_string(&uri)?, "session=0xdeadbeef");
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! ## Storage
//!
//! Cookies live in a [`CookieStore`](store::CookieStore). The default
//! in-memory store suits most clients; implement the trait to persist
//! cookies to disk or a database, then hand the store to
//! [`CookieJar::builder`]. Jars and their stores are shareable across
//! threads, and cloning a jar is cheap: clones share the same store.
//!
//! ## Public suffixes
//!
//! With a [`SuffixSource`] configured, the jar refuses cookies scoped to a
//! public suffix like `com` or `co.uk` (a malicious site could otherwise
//! plant cookies for every site under that suffix). Enable the `psl`
//! feature to use a `publicsuffix::List` loaded by your application as the
//! source.
//!
//! ## Logging
//!
//! Soft failures, such as dropped cookies and failed background cleanup,
//! are logged with the [tracing] crate.
//!
//! [tracing]: https://docs.rs/tracing

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(
    future_incompatible,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]

pub mod abnf;
pub mod store;

mod cookie;
mod domain;
mod error;
mod jar;
mod path;
mod psl;
mod serialize;

pub use crate::{
    cookie::{cookie_compare, parse_date, Cookie, Expiry, MaxAge, ParseOptions, SameSite},
    domain::{canonical_domain, domain_match},
    error::Error,
    jar::{CookieJar, CookieJarBuilder, GetCookieOptions, PrefixSecurity, SetCookieOptions},
    path::{default_path, path_match},
    psl::SuffixSource,
    serialize::{MaxAgeRepr, SerializedCookie, SerializedCookieJar},
};

/// Re-export of the http crate whose `Uri` type this crate's API accepts.
pub use http;
