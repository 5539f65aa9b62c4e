use chrono::{TimeZone, Utc};
use gingersnap::{
    http::Uri, CookieJar, Error, GetCookieOptions, PrefixSecurity, SetCookieOptions,
    SuffixSource,
};

fn uri(s: &str) -> Uri {
    s.parse().unwrap()
}

fn at(timestamp: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0).unwrap()
}

struct Suffixes(&'static [&'static str]);

impl SuffixSource for Suffixes {
    fn public_suffix(&self, host: &str) -> Option<String> {
        self.0
            .iter()
            .find(|s| host == **s || host.ends_with(&format!(".{}", s)))
            .map(|s| (*s).to_owned())
    }
}

#[test]
fn cookie_lifecycle() {
    let jar = CookieJar::new();
    let uri = uri("https://example.com/foo");

    jar.set_cookie("foo=bar", &uri).unwrap();
    jar.set_cookie("baz=123", &uri).unwrap();

    assert_eq!(jar.get_cookie_string(&uri).unwrap(), "foo=bar; baz=123");

    // Expire one of them.
    jar.set_cookie("foo=; Expires=Wed, 21 Oct 2015 07:28:00 GMT", &uri)
        .unwrap();

    assert_eq!(jar.get_cookie_string(&uri).unwrap(), "baz=123");
}

#[test]
fn cookies_are_scoped_to_their_domain() {
    let jar = CookieJar::new();

    let cookie = jar
        .set_cookie(
            "key=value; Domain=example.com; Path=/; Secure",
            &uri("https://foo.example.com/a/b"),
        )
        .unwrap()
        .unwrap();

    assert!(!cookie.is_host_only());
    assert_eq!(cookie.domain(), Some("example.com"));
    assert_eq!(cookie.path(), Some("/"));
    assert!(cookie.is_secure());

    // Visible to the whole domain tree, over HTTPS.
    assert_eq!(
        jar.get_cookie_string(&uri("https://example.com/")).unwrap(),
        "key=value"
    );
    assert_eq!(
        jar.get_cookie_string(&uri("https://bar.example.com/"))
            .unwrap(),
        "key=value"
    );

    // But not over plain HTTP, and not to other domains.
    assert_eq!(
        jar.get_cookie_string(&uri("http://example.com/")).unwrap(),
        ""
    );
    assert_eq!(
        jar.get_cookie_string(&uri("https://example.org/")).unwrap(),
        ""
    );
}

#[test]
fn host_only_cookies_stay_on_their_host() {
    let jar = CookieJar::new();

    let cookie = jar
        .set_cookie("a=1", &uri("http://example.com/x/y/z"))
        .unwrap()
        .unwrap();

    assert!(cookie.is_host_only());
    assert!(cookie.path_is_default());
    assert_eq!(cookie.domain(), Some("example.com"));
    assert_eq!(cookie.path(), Some("/x/y"));

    assert_eq!(
        jar.get_cookie_string(&uri("http://example.com/x/y")).unwrap(),
        "a=1"
    );
    assert_eq!(
        jar.get_cookie_string(&uri("http://www.example.com/x/y"))
            .unwrap(),
        ""
    );
}

#[test]
fn longer_paths_are_sent_first() {
    let jar = CookieJar::new();
    let options = SetCookieOptions::new().now(at(1_600_000_000));

    jar.set_cookie_with_options("A=1; Path=/", &uri("http://h/foo/bar"), &options)
        .unwrap();
    jar.set_cookie_with_options("B=2; Path=/foo", &uri("http://h/foo/bar"), &options)
        .unwrap();

    let cookies = jar.get_cookies(&uri("http://h/foo/bar")).unwrap();

    assert_eq!(
        cookies.iter().map(|c| c.key()).collect::<Vec<_>>(),
        ["B", "A"]
    );
    assert_eq!(jar.get_cookie_string(&uri("http://h/foo/bar")).unwrap(), "B=2; A=1");
}

#[test]
fn creation_ties_break_by_ingestion_order() {
    let jar = CookieJar::new();
    // Same creation instant for both.
    let options = SetCookieOptions::new().now(at(1_600_000_000));

    jar.set_cookie_with_options("first=1; Path=/", &uri("http://h/"), &options)
        .unwrap();
    jar.set_cookie_with_options("second=2; Path=/", &uri("http://h/"), &options)
        .unwrap();

    assert_eq!(
        jar.get_cookie_string(&uri("http://h/")).unwrap(),
        "first=1; second=2"
    );
}

#[test]
fn max_age_zero_expires_and_sweeps() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    jar.set_cookie("x=1; Max-Age=0", &uri).unwrap();

    assert!(jar.get_cookies(&uri).unwrap().is_empty());

    // The retrieval swept the expired cookie out of the store.
    assert!(jar.serialize().unwrap().cookies.is_empty());
}

#[test]
fn expiry_sweep_can_be_disabled() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    jar.set_cookie("x=1; Max-Age=0", &uri).unwrap();

    let options = GetCookieOptions::new().expire(false);
    assert!(jar.get_cookies_with_options(&uri, &options).unwrap().is_empty());

    assert_eq!(jar.serialize().unwrap().cookies.len(), 1);
}

#[test]
fn host_prefix_rules() {
    let jar = CookieJar::builder()
        .prefix_security(PrefixSecurity::Strict)
        .build();
    let secure_uri = uri("https://a.com/");

    assert!(jar
        .set_cookie("__Host-id=1; Secure; Path=/", &secure_uri)
        .unwrap()
        .is_some());

    // The path must be explicit, not defaulted.
    assert!(matches!(
        jar.set_cookie("__Host-id=1; Secure", &secure_uri),
        Err(Error::Prefix(_))
    ));

    // No Domain attribute allowed.
    assert!(matches!(
        jar.set_cookie("__Host-id=1; Secure; Path=/; Domain=a.com", &secure_uri),
        Err(Error::Prefix(_))
    ));

    assert!(matches!(
        jar.set_cookie("__Secure-id=1; Path=/", &secure_uri),
        Err(Error::Prefix(_))
    ));

    assert!(matches!(
        jar.set_cookie("__Secure-id=1; Secure; Path=/", &uri("http://a.com/")),
        Err(Error::Prefix(_))
    ));
}

#[test]
fn silent_prefix_mode_drops_quietly() {
    let jar = CookieJar::new();

    assert_eq!(
        jar.set_cookie("__Host-id=1; Secure", &uri("https://a.com/"))
            .unwrap(),
        None
    );

    assert!(jar.get_cookies(&uri("https://a.com/")).unwrap().is_empty());
}

#[test]
fn disabled_prefix_mode_ignores_prefixes() {
    let jar = CookieJar::builder()
        .prefix_security(PrefixSecurity::Disabled)
        .build();

    assert!(jar
        .set_cookie("__Host-id=1", &uri("http://a.com/"))
        .unwrap()
        .is_some());
}

#[test]
fn public_suffixes_are_protected() {
    let jar = CookieJar::builder()
        .suffix_source(Suffixes(&["com", "co.uk"]))
        .build();

    assert!(matches!(
        jar.set_cookie("a=1; Domain=co.uk", &uri("http://foo.co.uk/")),
        Err(Error::PublicSuffix)
    ));

    assert!(jar
        .set_cookie("a=1; Domain=foo.co.uk", &uri("http://www.foo.co.uk/"))
        .unwrap()
        .is_some());
}

#[test]
fn http_only_cookies_hide_from_non_http_callers() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    jar.set_cookie("secret=1; HttpOnly", &uri).unwrap();
    jar.set_cookie("public=2", &uri).unwrap();

    assert_eq!(jar.get_cookie_string(&uri).unwrap(), "secret=1; public=2");

    let options = GetCookieOptions::new().http(false);
    assert_eq!(
        jar.get_cookie_string_with_options(&uri, &options).unwrap(),
        "public=2"
    );
}

#[test]
fn same_site_contexts_gate_retrieval() {
    let jar = CookieJar::new();
    let uri = uri("https://example.com/");

    jar.set_cookie("strict=1; SameSite=Strict", &uri).unwrap();
    jar.set_cookie("lax=2; SameSite=Lax", &uri).unwrap();
    jar.set_cookie("both=3", &uri).unwrap();

    use gingersnap::SameSite;

    let strict = GetCookieOptions::new().same_site_context(SameSite::Strict);
    assert_eq!(
        jar.get_cookie_string_with_options(&uri, &strict).unwrap(),
        "strict=1; lax=2; both=3"
    );

    let lax = GetCookieOptions::new().same_site_context(SameSite::Lax);
    assert_eq!(
        jar.get_cookie_string_with_options(&uri, &lax).unwrap(),
        "lax=2; both=3"
    );

    let cross = GetCookieOptions::new().same_site_context(SameSite::None);
    assert_eq!(
        jar.get_cookie_string_with_options(&uri, &cross).unwrap(),
        "both=3"
    );
}

#[test]
fn all_paths_option_ignores_path_scope() {
    let jar = CookieJar::new();

    jar.set_cookie("deep=1; Path=/some/deep/path", &uri("http://h/some/deep/path"))
        .unwrap();

    assert_eq!(jar.get_cookie_string(&uri("http://h/")).unwrap(), "");

    let options = GetCookieOptions::new().all_paths(true);
    assert_eq!(
        jar.get_cookie_string_with_options(&uri("http://h/"), &options)
            .unwrap(),
        "deep=1"
    );
}

#[test]
fn overwriting_preserves_creation_time() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    jar.set_cookie_with_options("a=1", &uri, &SetCookieOptions::new().now(at(1_000)))
        .unwrap();
    jar.set_cookie_with_options("a=2", &uri, &SetCookieOptions::new().now(at(2_000)))
        .unwrap();

    let cookies = jar.get_cookies(&uri).unwrap();

    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value(), "2");
    assert_eq!(cookies[0].creation(), Some(at(1_000)));
}

#[test]
fn retrieval_updates_last_accessed() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    jar.set_cookie_with_options("a=1", &uri, &SetCookieOptions::new().now(at(1_000)))
        .unwrap();

    let options = GetCookieOptions::new().now(at(5_000));
    let cookies = jar.get_cookies_with_options(&uri, &options).unwrap();

    assert_eq!(cookies[0].last_accessed(), Some(at(5_000)));

    // The update was written back to the store.
    let cookies = jar.get_cookies_with_options(&uri, &options).unwrap();
    assert_eq!(cookies[0].last_accessed(), Some(at(5_000)));
}

#[test]
fn set_cookie_strings_render_full_attributes() {
    let jar = CookieJar::new();
    let uri = uri("https://example.com/");

    jar.set_cookie("a=1; Path=/; Secure; SameSite=Lax", &uri)
        .unwrap();

    let strings = jar.get_set_cookie_strings(&uri).unwrap();

    assert_eq!(strings, ["a=1; Path=/; Secure; SameSite=Lax"]);
}

#[test]
fn serialization_round_trips() {
    let jar = CookieJar::builder().loose_mode(true).build();
    let uri = uri("https://example.com/app/");

    jar.set_cookie(
        "session=abc; Path=/app; Secure; HttpOnly; Expires=Fri, 01 Jan 2038 00:00:00 GMT",
        &uri,
    )
    .unwrap();
    jar.set_cookie("theme=dark; Path=/", &uri).unwrap();

    let serialized = jar.serialize().unwrap();

    assert!(serialized.version.starts_with("tough-cookie@"));
    assert_eq!(serialized.store_type.as_deref(), Some("MemoryCookieStore"));
    assert!(serialized.enable_loose_mode);
    assert_eq!(serialized.cookies.len(), 2);

    let restored = CookieJar::from_json(&jar.to_json().unwrap()).unwrap();

    assert_eq!(
        restored.get_cookie_string(&uri).unwrap(),
        jar.get_cookie_string(&uri).unwrap()
    );
}

#[test]
fn deep_clones_are_independent() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    jar.set_cookie("a=1", &uri).unwrap();

    let clone = jar.deep_clone().unwrap();
    clone.set_cookie("b=2", &uri).unwrap();
    clone.remove_cookie("example.com", "/", "a").unwrap();

    assert_eq!(jar.get_cookie_string(&uri).unwrap(), "a=1");
    assert_eq!(clone.get_cookie_string(&uri).unwrap(), "b=2");
}

#[test]
fn shallow_clones_share_state() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    let clone = jar.clone();
    clone.set_cookie("a=1", &uri).unwrap();

    assert_eq!(jar.get_cookie_string(&uri).unwrap(), "a=1");
}

#[test]
fn remove_all_cookies_clears_the_jar() {
    let jar = CookieJar::new();
    let uri = uri("http://example.com/");

    jar.set_cookie("a=1", &uri).unwrap();
    jar.set_cookie("b=2", &uri).unwrap();
    jar.remove_all_cookies().unwrap();

    assert_eq!(jar.get_cookie_string(&uri).unwrap(), "");
}

#[test]
fn sorting_twice_is_sorting_once() {
    let jar = CookieJar::new();
    let uri = uri("http://h/a/b/c");

    jar.set_cookie("x=1; Path=/a", &uri).unwrap();
    jar.set_cookie("y=2; Path=/a/b", &uri).unwrap();
    jar.set_cookie("z=3; Path=/a/b/c", &uri).unwrap();

    let first = jar.get_cookie_string(&uri).unwrap();
    let second = jar.get_cookie_string(&uri).unwrap();

    assert_eq!(first, "z=3; y=2; x=1");
    assert_eq!(first, second);
}
