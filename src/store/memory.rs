use std::collections::HashMap;
use std::sync::RwLock;

use crate::cookie::Cookie;
use crate::domain::permute_domain;
use crate::error::Error;
use crate::path::path_match;

use super::CookieStore;

/// The default, in-memory cookie store.
///
/// Cookies are indexed by domain, then path, then name, mirroring the
/// `(domain, path, key)` identity the jar works with. Everything lives
/// behind a single `RwLock`; lookups take the read side, mutations the
/// write side.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    idx: RwLock<HashMap<String, HashMap<String, HashMap<String, Cookie>>>>,
}

impl CookieStore for MemoryCookieStore {
    fn find_cookie(
        &self,
        domain: &str,
        path: &str,
        key: &str,
    ) -> Result<Option<Cookie>, Error> {
        Ok(self
            .idx
            .read()
            .unwrap()
            .get(domain)
            .and_then(|paths| paths.get(path))
            .and_then(|keys| keys.get(key))
            .cloned())
    }

    fn find_cookies(
        &self,
        domain: &str,
        path: Option<&str>,
        _allow_special_use_domain: bool,
    ) -> Result<Vec<Cookie>, Error> {
        let idx = self.idx.read().unwrap();
        let mut results = Vec::new();

        for candidate in permute_domain(domain) {
            let paths = match idx.get(&candidate) {
                Some(paths) => paths,
                None => continue,
            };

            for keys in paths.values() {
                for cookie in keys.values() {
                    // Host-only cookies are visible to their exact host
                    // only, never to subdomains.
                    if cookie.is_host_only() && candidate != domain {
                        continue;
                    }

                    if let Some(path) = path {
                        if !path_match(path, cookie.path().unwrap_or("/")) {
                            continue;
                        }
                    }

                    results.push(cookie.clone());
                }
            }
        }

        Ok(results)
    }

    fn put_cookie(&self, cookie: Cookie) -> Result<(), Error> {
        let domain = cookie.domain().unwrap_or("").to_owned();
        let path = cookie.path().unwrap_or("/").to_owned();
        let key = cookie.key().to_owned();

        self.idx
            .write()
            .unwrap()
            .entry(domain)
            .or_default()
            .entry(path)
            .or_default()
            .insert(key, cookie);

        Ok(())
    }

    fn remove_cookie(&self, domain: &str, path: &str, key: &str) -> Result<(), Error> {
        let mut idx = self.idx.write().unwrap();

        if let Some(paths) = idx.get_mut(domain) {
            if let Some(keys) = paths.get_mut(path) {
                keys.remove(key);
            }
        }

        Ok(())
    }

    fn remove_cookies(&self, domain: &str, path: Option<&str>) -> Result<(), Error> {
        let mut idx = self.idx.write().unwrap();

        match path {
            Some(path) => {
                if let Some(paths) = idx.get_mut(domain) {
                    paths.remove(path);
                }
            }
            None => {
                idx.remove(domain);
            }
        }

        Ok(())
    }

    fn remove_all_cookies(&self) -> Result<(), Error> {
        self.idx.write().unwrap().clear();

        Ok(())
    }

    fn get_all_cookies(&self) -> Result<Vec<Cookie>, Error> {
        Ok(self
            .idx
            .read()
            .unwrap()
            .values()
            .flat_map(|paths| paths.values())
            .flat_map(|keys| keys.values())
            .cloned()
            .collect())
    }

    fn type_name(&self) -> &'static str {
        "MemoryCookieStore"
    }
}
