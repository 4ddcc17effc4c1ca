//! Cookie header parsing and `Set-Cookie` construction.

use axum::http::{header, HeaderMap};
use std::collections::HashMap;

/// All `Cookie` headers of a request joined into one, or `None` if there are none
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Parse a raw `Cookie` header into name/value pairs.
///
/// Pairs are split at the first `=`, so values may themselves contain `=`.
/// Pairs with an empty name or value are skipped; the first occurrence of a name wins.
pub fn parse_cookie_header(header: &str) -> HashMap<&str, &str> {
    let mut cookies = HashMap::new();

    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            continue;
        }
        cookies.entry(name).or_insert(value);
    }

    cookies
}

/// Look up a single cookie by name in a raw `Cookie` header
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    parse_cookie_header(header).get(name).copied()
}

/// Build a `Set-Cookie` value for an HTTP-only, SameSite=Lax cookie
pub fn build_cookie(name: &str, value: &str, path: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, path, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build a `Set-Cookie` value that removes the named cookie
pub fn build_removal_cookie(name: &str, path: &str, secure: bool) -> String {
    build_cookie(name, "", path, 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie_among_others() {
        let header = "a=b; session.token=S1; c=d";
        assert_eq!(find_cookie(header, "session.token"), Some("S1"));
        assert_eq!(find_cookie(header, "a"), Some("b"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn test_parse_cookie_header_edge_cases() {
        let cookies = parse_cookie_header("  x=1;;y=; =z; token=abc==; x=2; flag");
        assert_eq!(cookies.get("x"), Some(&"1"));
        assert_eq!(cookies.get("token"), Some(&"abc=="));
        assert!(!cookies.contains_key("y"));
        assert!(!cookies.contains_key(""));
        assert!(!cookies.contains_key("flag"));
    }

    #[test]
    fn test_cookie_header_joins_multiple_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(cookie_header(&headers), None);

        headers.append(header::COOKIE, "a=1".parse().unwrap());
        headers.append(header::COOKIE, "session.token=T".parse().unwrap());
        let joined = cookie_header(&headers).unwrap();
        assert_eq!(find_cookie(&joined, "session.token"), Some("T"));
    }

    #[test]
    fn test_parse_empty_header() {
        assert!(parse_cookie_header("").is_empty());
    }

    #[test]
    fn test_build_cookie_attributes() {
        assert_eq!(
            build_cookie("session.token", "abc", "/", 604_800, false),
            "session.token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );
        assert_eq!(
            build_cookie("session.token", "abc", "/", 604_800, true),
            "session.token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800; Secure"
        );
    }

    #[test]
    fn test_build_removal_cookie() {
        assert_eq!(
            build_removal_cookie("session.token", "/", false),
            "session.token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }
}
