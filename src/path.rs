//! Request path handling for cookie scoping, as defined in [RFC 6265,
//! section 5.1.4](https://tools.ietf.org/html/rfc6265#section-5.1.4).

/// Determine whether a request path is within the scope of a cookie path.
///
/// True when the two are identical, or when the cookie path is a prefix of
/// the request path that ends on a `/` boundary.
pub fn path_match(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }

    if request_path.starts_with(cookie_path) {
        if cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/') {
            return true;
        }
    }

    false
}

/// Compute the default cookie path for a request path, used when a cookie
/// is set without a `Path` attribute.
pub fn default_path(request_path: &str) -> &str {
    if !request_path.starts_with('/') {
        return "/";
    }

    match request_path.rfind('/') {
        // There's only one slash and it's the first character.
        Some(0) | None => "/",
        Some(rightmost_slash) => &request_path[..rightmost_slash],
    }
}
