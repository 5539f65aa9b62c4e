//! The stable JSON representation of jars and cookies.
//!
//! The format is wire-compatible with the `tough-cookie` serialized jar
//! format, so jars can be exchanged with clients built on that lineage:
//! instants are ISO 8601 strings, the "never expires" sentinel is the
//! string `"Infinity"`, and `Max-Age` may be a number or one of the
//! `"Infinity"`/`"-Infinity"` strings.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::cookie::{Cookie, MaxAge, SameSite};
use crate::error::Error;
use crate::jar::{CookieJar, PrefixSecurity};
use crate::store::{CookieStore, MemoryCookieStore};

/// Identifies the serialized format produced by this crate. The name keeps
/// the `tough-cookie` lineage for compatibility; anything with this prefix
/// is accepted on deserialization.
const VERSION_PREFIX: &str = "tough-cookie@";

/// A cookie jar in its serialized form.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedCookieJar {
    /// Format version identifier.
    pub version: String,

    /// Name of the store type the jar was using.
    pub store_type: Option<String>,

    /// Whether the jar rejected cookies scoped to public suffixes.
    pub reject_public_suffixes: bool,

    /// Whether the jar parsed cookie headers leniently.
    pub enable_loose_mode: bool,

    /// Whether the jar allowed special-use cookie domains.
    pub allow_special_use_domain: bool,

    /// The jar's name-prefix enforcement mode.
    pub prefix_security: PrefixSecurity,

    /// Every cookie that was in the jar's store.
    pub cookies: Vec<SerializedCookie>,
}

/// A cookie in its serialized form.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedCookie {
    /// The name of the cookie.
    pub key: String,

    /// The cookie value.
    pub value: String,

    /// ISO 8601 expiry instant, or `"Infinity"` for a session cookie.
    #[serde(default)]
    pub expires: Option<String>,

    /// The `Max-Age` attribute: a number of seconds, or `"Infinity"` /
    /// `"-Infinity"`.
    #[serde(default)]
    pub max_age: Option<MaxAgeRepr>,

    /// The domain the cookie belongs to.
    #[serde(default)]
    pub domain: Option<String>,

    /// The path the cookie belongs to.
    #[serde(default)]
    pub path: Option<String>,

    /// The `Secure` attribute.
    pub secure: bool,

    /// The `HttpOnly` attribute.
    pub http_only: bool,

    /// The `SameSite` attribute, lowercased, if any.
    #[serde(default)]
    pub same_site: Option<SameSite>,

    /// Whether the cookie matches only the exact host that set it.
    pub host_only: bool,

    /// Whether the path was derived from the request URL.
    pub path_is_default: bool,

    /// ISO 8601 instant the cookie was first ingested.
    #[serde(default)]
    pub creation: Option<String>,

    /// ISO 8601 instant the cookie was last sent.
    #[serde(default)]
    pub last_accessed: Option<String>,

    /// The jar-local ingestion ordinal.
    #[serde(default)]
    pub creation_index: u64,

    /// Unrecognized attributes, verbatim.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Wire form of [`MaxAge`]: JSON number or infinity string.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MaxAgeRepr {
    /// A finite number of seconds.
    Seconds(i64),

    /// `"Infinity"` or `"-Infinity"`.
    Text(String),
}

impl From<MaxAge> for MaxAgeRepr {
    fn from(max_age: MaxAge) -> Self {
        match max_age {
            MaxAge::Seconds(seconds) => MaxAgeRepr::Seconds(seconds),
            MaxAge::Infinity => MaxAgeRepr::Text("Infinity".to_owned()),
            MaxAge::NegInfinity => MaxAgeRepr::Text("-Infinity".to_owned()),
        }
    }
}

impl TryFrom<MaxAgeRepr> for MaxAge {
    type Error = Error;

    fn try_from(repr: MaxAgeRepr) -> Result<Self, Self::Error> {
        match repr {
            MaxAgeRepr::Seconds(seconds) => Ok(MaxAge::Seconds(seconds)),
            MaxAgeRepr::Text(text) => match text.as_str() {
                "Infinity" => Ok(MaxAge::Infinity),
                "-Infinity" => Ok(MaxAge::NegInfinity),
                _ => Err(Error::Parse("unrecognized Max-Age in serialized cookie")),
            },
        }
    }
}

impl From<&Cookie> for SerializedCookie {
    fn from(cookie: &Cookie) -> Self {
        Self {
            key: cookie.key().to_owned(),
            value: cookie.value().to_owned(),
            expires: Some(
                cookie
                    .expires()
                    .map(iso)
                    .unwrap_or_else(|| "Infinity".to_owned()),
            ),
            max_age: cookie.max_age().map(MaxAgeRepr::from),
            domain: cookie.domain().map(str::to_owned),
            path: cookie.path().map(str::to_owned),
            secure: cookie.is_secure(),
            http_only: cookie.is_http_only(),
            same_site: cookie.same_site(),
            host_only: cookie.is_host_only(),
            path_is_default: cookie.path_is_default(),
            creation: cookie.creation().map(iso),
            last_accessed: cookie.last_accessed().map(iso),
            creation_index: cookie.creation_index(),
            extensions: cookie.extensions().to_vec(),
        }
    }
}

impl TryFrom<&SerializedCookie> for Cookie {
    type Error = Error;

    fn try_from(serialized: &SerializedCookie) -> Result<Self, Self::Error> {
        let mut cookie = Cookie::new(serialized.key.clone(), serialized.value.clone());

        cookie.expires = match serialized.expires.as_deref() {
            None | Some("Infinity") => None,
            Some(instant) => Some(parse_iso(instant)?),
        };
        cookie.max_age = serialized
            .max_age
            .clone()
            .map(MaxAge::try_from)
            .transpose()?;
        cookie.domain = serialized.domain.clone();
        cookie.path = serialized.path.clone();
        cookie.secure = serialized.secure;
        cookie.http_only = serialized.http_only;
        cookie.same_site = serialized.same_site;
        cookie.host_only = serialized.host_only;
        cookie.path_is_default = serialized.path_is_default;
        cookie.creation = serialized
            .creation
            .as_deref()
            .map(parse_iso)
            .transpose()?;
        cookie.last_accessed = serialized
            .last_accessed
            .as_deref()
            .map(parse_iso)
            .transpose()?;
        cookie.creation_index = serialized.creation_index;
        cookie.extensions = serialized.extensions.clone();

        Ok(cookie)
    }
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_iso(instant: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(instant)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Error::Parse("invalid instant in serialized cookie"))
}

impl CookieJar {
    /// Serialize the jar's configuration and every stored cookie.
    ///
    /// Requires the store to support enumeration; the bundled in-memory
    /// store does.
    pub fn serialize(&self) -> Result<SerializedCookieJar, Error> {
        let cookies = self.store.get_all_cookies()?;

        Ok(SerializedCookieJar {
            version: format!("{}{}", VERSION_PREFIX, env!("CARGO_PKG_VERSION")),
            store_type: Some(self.store.type_name().to_owned()),
            reject_public_suffixes: self.reject_public_suffixes,
            enable_loose_mode: self.loose_mode,
            allow_special_use_domain: self.allow_special_use_domain,
            prefix_security: self.prefix_security,
            cookies: cookies.iter().map(SerializedCookie::from).collect(),
        })
    }

    /// Serialize the jar to a JSON string.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.serialize()?)?)
    }

    /// Reconstruct a jar from its serialized form, loading the cookies
    /// into the given store.
    ///
    /// The creation counter resumes past the highest stored creation
    /// index, so future ingestion keeps ordering deterministic.
    pub fn deserialize(
        serialized: &SerializedCookieJar,
        store: Arc<dyn CookieStore>,
    ) -> Result<CookieJar, Error> {
        if !serialized.version.starts_with(VERSION_PREFIX) {
            return Err(Error::Parse("unrecognized serialized jar version"));
        }

        let jar = CookieJar::builder()
            .shared_store(store)
            .reject_public_suffixes(serialized.reject_public_suffixes)
            .loose_mode(serialized.enable_loose_mode)
            .allow_special_use_domain(serialized.allow_special_use_domain)
            .prefix_security(serialized.prefix_security)
            .build();

        let mut highest_index = 0;

        for serialized in &serialized.cookies {
            let cookie = Cookie::try_from(serialized)?;

            highest_index = highest_index.max(cookie.creation_index());
            jar.store.put_cookie(cookie)?;
        }

        jar.creation_index
            .store(highest_index + 1, std::sync::atomic::Ordering::SeqCst);

        Ok(jar)
    }

    /// Reconstruct a jar from a JSON string into a fresh in-memory store.
    pub fn from_json(json: &str) -> Result<CookieJar, Error> {
        let serialized: SerializedCookieJar = serde_json::from_str(json)?;

        Self::deserialize(&serialized, Arc::new(MemoryCookieStore::default()))
    }

    /// Deep-clone the jar and its cookies into a fresh in-memory store.
    pub fn deep_clone(&self) -> Result<CookieJar, Error> {
        self.clone_into_store(Arc::new(MemoryCookieStore::default()))
    }

    /// Deep-clone the jar and its cookies into the given store.
    pub fn clone_into_store(&self, store: Arc<dyn CookieStore>) -> Result<CookieJar, Error> {
        Self::deserialize(&self.serialize()?, store)
    }
}

impl Serialize for CookieJar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CookieJar::serialize(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
