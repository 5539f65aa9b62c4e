//! Cookie state management.
//!
//! This module provides the cookie jar implementation conforming to RFC
//! 6265: [`CookieJar::set`] is the ingestion algorithm of section 5.3, and
//! [`CookieJar::get_cookies`] the retrieval algorithm of section 5.4.

use std::fmt;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use http::Uri;
use serde::{Deserialize, Serialize};

use crate::cookie::{cookie_compare, Cookie, ParseOptions, SameSite};
use crate::domain::{canonical_domain, domain_match, is_special_use_domain};
use crate::error::Error;
use crate::path::{default_path, path_match};
use crate::psl::SuffixSource;
use crate::store::{CookieStore, MemoryCookieStore};

/// How strictly the `__Secure-` and `__Host-` cookie name prefixes are
/// enforced during ingestion.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixSecurity {
    /// Cookies violating their name prefix are dropped without an error.
    ///
    /// This is the default.
    Silent,

    /// Cookies violating their name prefix are rejected with
    /// [`Error::Prefix`].
    Strict,

    /// Name prefixes carry no special meaning.
    #[serde(rename = "unsafe-disabled")]
    Disabled,
}

impl Default for PrefixSecurity {
    fn default() -> Self {
        PrefixSecurity::Silent
    }
}

/// Options for [`CookieJar::set`] describing the context the cookie
/// arrived in.
#[derive(Clone, Copy, Debug)]
pub struct SetCookieOptions {
    pub(crate) http: bool,
    pub(crate) secure: Option<bool>,
    pub(crate) same_site_context: Option<SameSite>,
    pub(crate) ignore_error: bool,
    pub(crate) now: Option<DateTime<Utc>>,
}

impl Default for SetCookieOptions {
    fn default() -> Self {
        Self {
            http: true,
            secure: None,
            same_site_context: None,
            ignore_error: false,
            now: None,
        }
    }
}

impl SetCookieOptions {
    /// Create the default options: an HTTP request whose security is
    /// inferred from the URL scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare whether the cookie arrived over an HTTP API. Non-HTTP
    /// callers (such as a scripting environment) may not touch HttpOnly
    /// cookies. Defaults to true.
    pub fn http(mut self, http: bool) -> Self {
        self.http = http;
        self
    }

    /// Override whether the transport is considered secure, instead of
    /// inferring it from the URL scheme.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Declare the SameSite context of the response that carried the
    /// cookie. When the context is [`SameSite::None`] (cross-site),
    /// same-site cookies are rejected.
    pub fn same_site_context(mut self, context: SameSite) -> Self {
        self.same_site_context = Some(context);
        self
    }

    /// Turn rejections into silent drops: `set` returns `Ok(None)` instead
    /// of an error when the cookie is refused. Store failures still
    /// surface.
    pub fn ignore_error(mut self, ignore_error: bool) -> Self {
        self.ignore_error = ignore_error;
        self
    }

    /// Use the given instant as the current time. Defaults to the system
    /// clock.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

/// Options for [`CookieJar::get_cookies`] describing the request being
/// prepared.
#[derive(Clone, Copy, Debug)]
pub struct GetCookieOptions {
    pub(crate) http: bool,
    pub(crate) secure: Option<bool>,
    pub(crate) same_site_context: Option<SameSite>,
    pub(crate) all_paths: bool,
    pub(crate) expire: bool,
    pub(crate) sort: bool,
    pub(crate) now: Option<DateTime<Utc>>,
}

impl Default for GetCookieOptions {
    fn default() -> Self {
        Self {
            http: true,
            secure: None,
            same_site_context: None,
            all_paths: false,
            expire: true,
            sort: true,
            now: None,
        }
    }
}

impl GetCookieOptions {
    /// Create the default options: an HTTP request whose security is
    /// inferred from the URL scheme, with expiry sweeping and sorting on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare whether the request is made over an HTTP API. Defaults to
    /// true; non-HTTP callers do not see HttpOnly cookies.
    pub fn http(mut self, http: bool) -> Self {
        self.http = http;
        self
    }

    /// Override whether the transport is considered secure, instead of
    /// inferring it from the URL scheme.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Declare the SameSite context of the request being prepared.
    pub fn same_site_context(mut self, context: SameSite) -> Self {
        self.same_site_context = Some(context);
        self
    }

    /// Return cookies for every path, not just those matching the request
    /// path.
    pub fn all_paths(mut self, all_paths: bool) -> Self {
        self.all_paths = all_paths;
        self
    }

    /// Whether expired cookies encountered during retrieval are also
    /// removed from the store. Defaults to true.
    pub fn expire(mut self, expire: bool) -> Self {
        self.expire = expire;
        self
    }

    /// Whether results are sorted by sending precedence (longest path
    /// first, then oldest first). Defaults to true.
    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Use the given instant as the current time. Defaults to the system
    /// clock.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

/// Provides automatic cookie session management using a pluggable cookie
/// store.
///
/// Cookie jars are designed to be shareable across many concurrent
/// requests, so cloning the jar simply returns a new reference to the same
/// jar instead of doing a deep clone. Use
/// [`deep_clone`](CookieJar::deep_clone) for an independent copy.
pub struct CookieJar {
    pub(crate) store: Arc<dyn CookieStore>,
    pub(crate) suffix_source: Option<Arc<dyn SuffixSource>>,
    pub(crate) reject_public_suffixes: bool,
    pub(crate) loose_mode: bool,
    pub(crate) allow_special_use_domain: bool,
    pub(crate) prefix_security: PrefixSecurity,
    pub(crate) creation_index: Arc<AtomicU64>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Clone for CookieJar {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            suffix_source: self.suffix_source.clone(),
            reject_public_suffixes: self.reject_public_suffixes,
            loose_mode: self.loose_mode,
            allow_special_use_domain: self.allow_special_use_domain,
            prefix_security: self.prefix_security,
            creation_index: self.creation_index.clone(),
        }
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("store", &self.store)
            .field("reject_public_suffixes", &self.reject_public_suffixes)
            .field("loose_mode", &self.loose_mode)
            .field("allow_special_use_domain", &self.allow_special_use_domain)
            .field("prefix_security", &self.prefix_security)
            .finish()
    }
}

/// A builder for configuring a [`CookieJar`].
#[derive(Default)]
pub struct CookieJarBuilder {
    store: Option<Arc<dyn CookieStore>>,
    suffix_source: Option<Arc<dyn SuffixSource>>,
    accept_public_suffixes: bool,
    loose_mode: bool,
    allow_special_use_domain: bool,
    prefix_security: PrefixSecurity,
}

impl fmt::Debug for CookieJarBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJarBuilder")
            .field("store", &self.store)
            .field("reject_public_suffixes", &!self.accept_public_suffixes)
            .field("loose_mode", &self.loose_mode)
            .field("allow_special_use_domain", &self.allow_special_use_domain)
            .field("prefix_security", &self.prefix_security)
            .finish()
    }
}

impl CookieJarBuilder {
    /// Use the given store as the jar's backing storage instead of the
    /// default in-memory store.
    pub fn store(mut self, store: impl CookieStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use the given shared store as the jar's backing storage.
    pub fn shared_store(mut self, store: Arc<dyn CookieStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Consult the given source of public suffix information when
    /// validating cookie domains. Without one, no domain is treated as a
    /// public suffix.
    pub fn suffix_source(mut self, source: impl SuffixSource + 'static) -> Self {
        self.suffix_source = Some(Arc::new(source));
        self
    }

    /// Whether cookies whose domain is a public suffix are rejected.
    /// Defaults to true.
    pub fn reject_public_suffixes(mut self, reject: bool) -> Self {
        self.accept_public_suffixes = !reject;
        self
    }

    /// Parse cookie headers leniently, accepting some malformed name/value
    /// pairs that strict parsing rejects. Defaults to false.
    pub fn loose_mode(mut self, loose: bool) -> Self {
        self.loose_mode = loose;
        self
    }

    /// Allow cookies scoped to special-use domains such as `localhost` or
    /// `*.local`. Defaults to false.
    pub fn allow_special_use_domain(mut self, allow: bool) -> Self {
        self.allow_special_use_domain = allow;
        self
    }

    /// How strictly `__Secure-` and `__Host-` name prefixes are enforced.
    /// Defaults to [`PrefixSecurity::Silent`].
    pub fn prefix_security(mut self, prefix_security: PrefixSecurity) -> Self {
        self.prefix_security = prefix_security;
        self
    }

    /// Build the configured cookie jar.
    pub fn build(self) -> CookieJar {
        CookieJar {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryCookieStore::default())),
            suffix_source: self.suffix_source,
            reject_public_suffixes: !self.accept_public_suffixes,
            loose_mode: self.loose_mode,
            allow_special_use_domain: self.allow_special_use_domain,
            prefix_security: self.prefix_security,
            creation_index: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl CookieJar {
    /// Create a cookie jar with the default configuration and an in-memory
    /// store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a builder for configuring a cookie jar.
    pub fn builder() -> CookieJarBuilder {
        CookieJarBuilder::default()
    }

    /// Parse a `Set-Cookie` header value and ingest it in the context of
    /// the given request URI, with default options.
    ///
    /// Returns the cookie as stored, or `None` if it was silently dropped.
    pub fn set_cookie(&self, header: &str, uri: &Uri) -> Result<Option<Cookie>, Error> {
        self.set_cookie_with_options(header, uri, &SetCookieOptions::default())
    }

    /// Parse a `Set-Cookie` header value and ingest it in the context of
    /// the given request URI.
    pub fn set_cookie_with_options(
        &self,
        header: &str,
        uri: &Uri,
        options: &SetCookieOptions,
    ) -> Result<Option<Cookie>, Error> {
        let parse_options = ParseOptions::new().loose(self.loose_mode);

        match Cookie::parse(header, &parse_options) {
            Ok(cookie) => self.set(cookie, uri, options),
            Err(e) if options.ignore_error => {
                tracing::warn!("could not parse Set-Cookie header: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Ingest a cookie in the context of the given request URI, validating
    /// it per [RFC 6265, section
    /// 5.3](https://tools.ietf.org/html/rfc6265#section-5.3).
    ///
    /// On success the stored cookie is returned, with its domain, path,
    /// and bookkeeping fields filled in. `Ok(None)` means the cookie was
    /// dropped without being an error (a silent prefix violation, or any
    /// rejection when `ignore_error` is set).
    pub fn set(
        &self,
        cookie: Cookie,
        uri: &Uri,
        options: &SetCookieOptions,
    ) -> Result<Option<Cookie>, Error> {
        match self.try_set(cookie, uri, options) {
            Err(e) if options.ignore_error && !matches!(e, Error::Store(_)) => {
                tracing::debug!("cookie dropped: {}", e);
                Ok(None)
            }
            result => result,
        }
    }

    fn try_set(
        &self,
        mut cookie: Cookie,
        uri: &Uri,
        options: &SetCookieOptions,
    ) -> Result<Option<Cookie>, Error> {
        let now = options.now.unwrap_or_else(Utc::now);
        let (host, request_path, transport_secure) = self.request_context(uri)?;
        let secure_transport = options.secure.unwrap_or(transport_secure);

        if cookie.domain().is_some() {
            let domain = cookie.canonicalized_domain().ok_or(Error::DomainMismatch)?;

            // The origin may not plant cookies for an entire registry
            // (e.g. `Domain=co.uk`).
            if self.reject_public_suffixes && domain != host && self.is_public_suffix(&domain) {
                return Err(Error::PublicSuffix);
            }

            if is_special_use_domain(&domain)
                && !self.allow_special_use_domain
                && domain != host
            {
                return Err(Error::SpecialUseDomain);
            }

            if !domain_match(&host, &domain) {
                return Err(Error::DomainMismatch);
            }

            cookie.domain = Some(domain);
            cookie.host_only = false;
        } else {
            cookie.domain = Some(host.clone());
            cookie.host_only = true;
        }

        if cookie.path().map_or(true, |p| !p.starts_with('/')) {
            cookie.path = Some(default_path(&request_path).to_owned());
            cookie.path_is_default = true;
        }

        if cookie.is_http_only() && !options.http {
            return Err(Error::HttpOnly);
        }

        if cookie.same_site() == Some(SameSite::None) && !cookie.is_secure() {
            return Err(Error::SameSite("SameSite=None requires the Secure attribute"));
        }

        if options.same_site_context == Some(SameSite::None)
            && matches!(cookie.same_site(), Some(SameSite::Strict) | Some(SameSite::Lax))
        {
            return Err(Error::SameSite(
                "same-site cookie may not be set by a cross-site response",
            ));
        }

        if self.prefix_security != PrefixSecurity::Disabled {
            if let Some(violation) = prefix_violation(&cookie, secure_transport) {
                if self.prefix_security == PrefixSecurity::Strict {
                    return Err(Error::Prefix(violation));
                }

                tracing::debug!("cookie '{}' dropped: {}", cookie.key(), violation);
                return Ok(None);
            }
        }

        let domain = cookie.domain().unwrap_or_default().to_owned();
        let path = cookie.path().unwrap_or_default().to_owned();
        let existing = self.store.find_cookie(&domain, &path, cookie.key())?;

        if let Some(old) = existing {
            // A non-secure request may not clobber a secure cookie.
            if old.is_secure() && !secure_transport {
                return Err(Error::SecureOverwrite);
            }

            if old.is_http_only() && !options.http {
                return Err(Error::HttpOnly);
            }

            cookie.creation = old.creation();
            cookie.last_accessed = Some(now);
            cookie.creation_index = self.next_creation_index();
            self.store.update_cookie(&old, cookie.clone())?;
        } else {
            cookie.creation = cookie.creation.or(Some(now));
            cookie.last_accessed = Some(now);
            cookie.creation_index = self.next_creation_index();
            self.store.put_cookie(cookie.clone())?;
        }

        Ok(Some(cookie))
    }

    /// Retrieve the cookies that a request to the given URI should carry,
    /// with default options.
    ///
    /// Cookies are filtered per [RFC 6265, section
    /// 5.4](https://tools.ietf.org/html/rfc6265#section-5.4) and returned
    /// in sending order. Expired cookies encountered along the way are
    /// removed from the store as a side effect.
    pub fn get_cookies(&self, uri: &Uri) -> Result<Vec<Cookie>, Error> {
        self.get_cookies_with_options(uri, &GetCookieOptions::default())
    }

    /// Retrieve the cookies that a request to the given URI should carry.
    pub fn get_cookies_with_options(
        &self,
        uri: &Uri,
        options: &GetCookieOptions,
    ) -> Result<Vec<Cookie>, Error> {
        let now = options.now.unwrap_or_else(Utc::now);
        let (host, request_path, transport_secure) = self.request_context(uri)?;
        let secure_transport = options.secure.unwrap_or(transport_secure);

        let path = if options.all_paths {
            None
        } else {
            Some(request_path.as_str())
        };

        let found = self
            .store
            .find_cookies(&host, path, self.allow_special_use_domain)?;

        let mut results = Vec::new();

        for mut cookie in found {
            match cookie.domain() {
                Some(domain) if cookie.is_host_only() => {
                    if domain != host {
                        continue;
                    }
                }
                Some(domain) => {
                    if !domain_match(&host, domain) {
                        continue;
                    }
                }
                None => continue,
            }

            if !options.all_paths && !path_match(&request_path, cookie.path().unwrap_or("/")) {
                continue;
            }

            if cookie.is_secure() && !secure_transport {
                continue;
            }

            if cookie.is_http_only() && !options.http {
                continue;
            }

            if let Some(context) = options.same_site_context {
                if !permits_same_site(&cookie, context) {
                    continue;
                }
            }

            if cookie.expiry_time(Some(now)).is_expired(now) {
                if options.expire {
                    self.sweep_expired(&cookie);
                }

                continue;
            }

            let old = cookie.clone();
            cookie.last_accessed = Some(now);
            self.store.update_cookie(&old, cookie.clone())?;

            results.push(cookie);
        }

        if options.sort {
            results.sort_by(cookie_compare);
        }

        Ok(results)
    }

    /// Render the `Cookie` request header value for the given URI, with
    /// default options.
    pub fn get_cookie_string(&self, uri: &Uri) -> Result<String, Error> {
        self.get_cookie_string_with_options(uri, &GetCookieOptions::default())
    }

    /// Render the `Cookie` request header value for the given URI.
    pub fn get_cookie_string_with_options(
        &self,
        uri: &Uri,
        options: &GetCookieOptions,
    ) -> Result<String, Error> {
        Ok(self
            .get_cookies_with_options(uri, options)?
            .iter()
            .map(Cookie::cookie_string)
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Render the full `Set-Cookie` serializations of the cookies a
    /// request to the given URI would carry, with default options.
    pub fn get_set_cookie_strings(&self, uri: &Uri) -> Result<Vec<String>, Error> {
        self.get_set_cookie_strings_with_options(uri, &GetCookieOptions::default())
    }

    /// Render the full `Set-Cookie` serializations of the cookies a
    /// request to the given URI would carry.
    pub fn get_set_cookie_strings_with_options(
        &self,
        uri: &Uri,
        options: &GetCookieOptions,
    ) -> Result<Vec<String>, Error> {
        Ok(self
            .get_cookies_with_options(uri, options)?
            .iter()
            .map(Cookie::to_string)
            .collect())
    }

    /// Remove the cookie stored under the given `(domain, path, key)`
    /// triple, if any.
    pub fn remove_cookie(&self, domain: &str, path: &str, key: &str) -> Result<(), Error> {
        self.store.remove_cookie(domain, path, key)
    }

    /// Remove every cookie in the jar.
    pub fn remove_all_cookies(&self) -> Result<(), Error> {
        self.store.remove_all_cookies()
    }

    fn sweep_expired(&self, cookie: &Cookie) {
        let result = self.store.remove_cookie(
            cookie.domain().unwrap_or_default(),
            cookie.path().unwrap_or("/"),
            cookie.key(),
        );

        // The sweep is best-effort cleanup; the cookie was already
        // filtered out of the results.
        if let Err(e) = result {
            tracing::warn!("could not remove expired cookie: {}", e);
        }
    }

    fn request_context(&self, uri: &Uri) -> Result<(String, String, bool), Error> {
        let scheme = uri.scheme_str().unwrap_or("");
        let secure = matches!(scheme, "https" | "wss");

        // file: and data: URIs name no remote host (any authority they do
        // carry is "localhost" or empty, per RFC 8089); they map to the
        // localhost special-use domain when the jar allows it.
        let host = if matches!(scheme, "file" | "data") {
            if self.allow_special_use_domain {
                Some("localhost".to_owned())
            } else {
                None
            }
        } else {
            uri.host().and_then(canonical_domain)
        }
        .ok_or(Error::Parse("request URI has no usable host"))?;

        let path = match uri.path() {
            "" => "/".to_owned(),
            path => path.to_owned(),
        };

        Ok((host, path, secure))
    }

    fn is_public_suffix(&self, domain: &str) -> bool {
        self.suffix_source
            .as_ref()
            .map_or(false, |source| {
                source.public_suffix(domain).as_deref() == Some(domain)
            })
    }

    fn next_creation_index(&self) -> u64 {
        self.creation_index.fetch_add(1, Ordering::SeqCst)
    }
}

/// Whether a cookie may be sent in the given SameSite request context.
fn permits_same_site(cookie: &Cookie, context: SameSite) -> bool {
    match cookie.same_site() {
        Some(SameSite::Strict) => context == SameSite::Strict,
        Some(SameSite::Lax) => context != SameSite::None,
        // SameSite=None and unspecified cookies are unrestricted.
        _ => true,
    }
}

fn prefix_violation(cookie: &Cookie, secure_transport: bool) -> Option<&'static str> {
    if cookie.key().starts_with("__Secure-") && !(cookie.is_secure() && secure_transport) {
        return Some("__Secure- cookies require the Secure attribute over a secure connection");
    }

    if cookie.key().starts_with("__Host-")
        && !(cookie.is_secure()
            && cookie.is_host_only()
            && !cookie.path_is_default()
            && cookie.path() == Some("/"))
    {
        return Some("__Host- cookies require Secure, an explicit Path=/, and no Domain");
    }

    None
}
