//! Public-suffix awareness.
//!
//! Domains like `com` or `co.uk` are "public suffixes": names under which
//! registrations are made, and under which no single site should be able to
//! set cookies. The jar consults a [`SuffixSource`] during ingestion to
//! reject cookies scoped to such a suffix.
//!
//! This crate does not bundle the [Public Suffix
//! List](https://publicsuffix.org) itself; lists go stale, and how fresh a
//! copy an application wants is its own call. With the `psl` feature
//! enabled, a `publicsuffix::List` loaded by the host can be used as a
//! source directly. Without a source configured, the jar treats no domain
//! as a public suffix.

/// A source of public suffix information for cookie domain validation.
pub trait SuffixSource: Send + Sync {
    /// Returns the public suffix of the given host, or `None` when the
    /// host has no known suffix.
    ///
    /// A host that is itself a public suffix is returned unchanged, which
    /// is exactly the case the jar rejects.
    fn public_suffix(&self, host: &str) -> Option<String>;
}

#[cfg(feature = "psl")]
impl SuffixSource for publicsuffix::List {
    fn public_suffix(&self, host: &str) -> Option<String> {
        use publicsuffix::Psl;

        self.suffix(host.as_bytes())
            .and_then(|suffix| std::str::from_utf8(suffix.as_bytes()).ok())
            .map(str::to_owned)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::SuffixSource;

    /// A toy suffix source good enough for exercising jar validation.
    pub(crate) struct FixedSuffixes(pub(crate) Vec<&'static str>);

    impl SuffixSource for FixedSuffixes {
        fn public_suffix(&self, host: &str) -> Option<String> {
            self.0
                .iter()
                .filter(|suffix| {
                    host == **suffix || host.ends_with(&format!(".{}", suffix))
                })
                .max_by_key(|suffix| suffix.len())
                .map(|suffix| (*suffix).to_owned())
        }
    }
}
