//! Pluggable cookie persistence.
//!
//! A [`CookieStore`] is a logical mapping from `(domain, path, key)` triples
//! to cookies. The jar owns all of the RFC 6265 policy; a store only has to
//! index cookies well enough that [`CookieStore::find_cookies`] returns a
//! superset of what a request may receive. The bundled
//! [`MemoryCookieStore`] is sufficient for most clients; implement the
//! trait to back cookies onto disk or a database.

use std::fmt;

use crate::cookie::Cookie;
use crate::error::Error;

mod memory;

pub use memory::MemoryCookieStore;

/// A backing store for the cookies in a cookie jar.
///
/// Stores are shared among all clones of a jar and may be called from
/// multiple threads, so implementations provide their own interior
/// mutability and synchronization.
pub trait CookieStore: fmt::Debug + Send + Sync {
    /// Retrieve the cookie stored under an exact `(domain, path, key)`
    /// triple, if any.
    fn find_cookie(&self, domain: &str, path: &str, key: &str)
        -> Result<Option<Cookie>, Error>;

    /// Retrieve all cookies that a request to `domain` could receive: those
    /// stored under the domain itself or any parent domain, path-matched
    /// against `path` unless it is `None`.
    ///
    /// Host-only cookies must be included if and only if their domain
    /// equals the request domain. The result may over-approximate beyond
    /// that; the jar re-checks every cookie it returns to callers.
    fn find_cookies(
        &self,
        domain: &str,
        path: Option<&str>,
        allow_special_use_domain: bool,
    ) -> Result<Vec<Cookie>, Error>;

    /// Insert or replace the cookie stored under this cookie's
    /// `(domain, path, key)` triple.
    fn put_cookie(&self, cookie: Cookie) -> Result<(), Error>;

    /// Replace `old` with `new`, which share a triple.
    ///
    /// Stores that maintain secondary indexes or dirty tracking can use the
    /// old cookie to update them; for everything else the default upsert is
    /// fine.
    fn update_cookie(&self, old: &Cookie, new: Cookie) -> Result<(), Error> {
        let _ = old;
        self.put_cookie(new)
    }

    /// Remove the cookie stored under the given triple, if any.
    fn remove_cookie(&self, domain: &str, path: &str, key: &str) -> Result<(), Error>;

    /// Remove all cookies for a domain, or only those under one of its
    /// paths when `path` is given.
    fn remove_cookies(&self, domain: &str, path: Option<&str>) -> Result<(), Error>;

    /// Remove every cookie in the store.
    fn remove_all_cookies(&self) -> Result<(), Error>;

    /// Enumerate every cookie in the store.
    ///
    /// This is an optional capability, but jar serialization requires it.
    fn get_all_cookies(&self) -> Result<Vec<Cookie>, Error> {
        Err(Error::Store(format!(
            "{} does not support enumerating all cookies",
            self.type_name()
        )))
    }

    /// Whether operations complete without suspending on I/O. Stores backed
    /// by external storage should return `false` so callers can keep them
    /// off latency-sensitive paths.
    fn is_synchronous(&self) -> bool {
        true
    }

    /// Name recorded in serialized jars to identify the store kind.
    fn type_name(&self) -> &'static str {
        "CookieStore"
    }
}
