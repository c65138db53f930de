//! URL normalization and comparison.
//!
//! Every URL the audit touches goes through this module: declared sources and
//! destinations are made absolute here, and probe results are compared here.
//!
//! Key functions:
//! - `has_protocol()` - Whether a string is an absolute URL with a host
//! - `add_www()` - Prefixes `www.` onto bare registrable domains
//! - `ensure_full_url()` - Resolves a path against the audited site
//! - `is_404_page()` - Detects error-page destinations by their last path segment
//! - `normalize_url()` / `urls_match()` - Equivalence used for destination checks

mod validate;

pub use validate::validate_base_url;

use std::net::IpAddr;

use url::Url;

/// Last path segments that mark a dedicated "not found" page.
const NOT_FOUND_SEGMENTS: &[&str] = &["404", "404.html", "404.htm"];

/// Returns true if `url` parses as an absolute URL with a scheme and a host.
///
/// `example.com:8080` parses with `example.com` as its scheme, so a host is
/// required as well.
pub fn has_protocol(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => !parsed.scheme().is_empty() && parsed.has_host(),
        Err(_) => false,
    }
}

/// Splits an input into `(before_host, host, after_host)`.
///
/// Accepts full URLs, bare hosts and host-plus-path strings. Returns `None` when
/// there is no host to speak of (IPv6 literals are left alone as well).
fn split_host(input: &str) -> Option<(&str, &str, &str)> {
    let host_start = input.find("://").map(|i| i + 3).unwrap_or(0);
    let remainder = &input[host_start..];
    let authority_end = remainder
        .find(['/', '?', '#'])
        .unwrap_or(remainder.len());
    let authority = &remainder[..authority_end];

    // Skip userinfo
    let userinfo_len = authority.rfind('@').map(|at| at + 1).unwrap_or(0);
    let host_port = &authority[userinfo_len..];
    if host_port.starts_with('[') {
        return None;
    }
    let host_len = host_port.find(':').unwrap_or(host_port.len());
    if host_len == 0 {
        return None;
    }

    let start = host_start + userinfo_len;
    let end = start + host_len;
    Some((&input[..start], &input[start..end], &input[end..]))
}

/// Prefixes `www.` when the host is a bare registrable domain.
///
/// `example.com` becomes `www.example.com`; hosts that already carry a
/// subdomain (`sub.example.com`, `www.example.com`), IP addresses, single-label
/// hosts such as `localhost`, and malformed input are returned unchanged.
/// Works on bare hosts and on full URLs alike.
pub fn add_www(host_or_url: &str) -> String {
    let Some((before, host, after)) = split_host(host_or_url) else {
        return host_or_url.to_string();
    };

    let lower = host.to_ascii_lowercase();
    if lower.starts_with("www.") || lower.parse::<IpAddr>().is_ok() {
        return host_or_url.to_string();
    }

    // Exactly one label in front of the public suffix
    match psl::domain_str(&lower) {
        Some(registrable) if registrable == lower => format!("{before}www.{host}{after}"),
        _ => host_or_url.to_string(),
    }
}

/// Scheme and authority (`host[:port]`, www-prefixed) of a base host or URL.
fn base_origin(base: &str) -> Option<(String, String)> {
    let base = base.trim();
    if has_protocol(base) {
        let parsed = Url::parse(base).ok()?;
        let host = add_www(parsed.host_str()?);
        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };
        return Some((parsed.scheme().to_string(), authority));
    }

    let (_, host, after) = split_host(base)?;
    let port = after
        .strip_prefix(':')
        .map(|rest| rest.split(['/', '?', '#']).next().unwrap_or(""))
        .filter(|port| !port.is_empty());
    let host = add_www(host);
    let authority = match port {
        Some(port) => format!("{host}:{port}"),
        None => host,
    };
    Some(("https".to_string(), authority))
}

/// Makes `path_or_url` absolute.
///
/// Input that already has a protocol is returned as is. Anything else is joined
/// onto `https://` plus the www-prefixed `base` host, with exactly one `/`
/// between host and path. When `base` is itself a URL its scheme and port are
/// kept, so a site served over plain http resolves to http.
///
/// Without a `base`, the input's own leading host is used (`example.com/a`
/// becomes `https://www.example.com/a`). Input with no usable host is returned
/// unchanged.
pub fn ensure_full_url(path_or_url: &str, base: Option<&str>) -> String {
    let input = path_or_url.trim();
    if has_protocol(input) {
        return input.to_string();
    }

    let (origin, path) = match base {
        Some(base) => (base_origin(base), input),
        None => {
            let path_start = input.find('/').unwrap_or(input.len());
            (base_origin(&input[..path_start]), &input[path_start..])
        }
    };

    match origin {
        Some((scheme, authority)) => {
            format!("{scheme}://{authority}/{}", path.trim_start_matches('/'))
        }
        None => path_or_url.to_string(),
    }
}

/// Returns true if the last path segment names a 404 page.
///
/// Matches `404`, `404.html` and `404.htm` (case-insensitive), optionally followed
/// by a single trailing slash. Query strings and fragments are ignored; a `404`
/// inside a longer segment or in the middle of the path does not count.
pub fn is_404_page(path: &str) -> bool {
    let without_fragment = path.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();

    let path_only = match Url::parse(without_query) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => without_query.to_string(),
    };

    let trimmed = path_only.strip_suffix('/').unwrap_or(&path_only);
    let last_segment = trimmed.rsplit('/').next().unwrap_or_default();
    NOT_FOUND_SEGMENTS
        .iter()
        .any(|candidate| last_segment.eq_ignore_ascii_case(candidate))
}

/// Strips trailing slashes from the path part, leaving any query untouched.
fn strip_trailing_slash(raw: &str) -> String {
    match raw.split_once('?') {
        Some((path, query)) => format!("{}?{}", path.trim_end_matches('/'), query),
        None => raw.trim_end_matches('/').to_string(),
    }
}

/// Normalized form used for URL equivalence.
///
/// Scheme and host are lowercased, default ports dropped, trailing slashes on the
/// path removed and the fragment discarded. The query string is kept verbatim:
/// `?a=1&b=2` and `?b=2&a=1` stay different.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let without_fragment = url.split('#').next().unwrap_or_default();

    match Url::parse(without_fragment) {
        Ok(parsed) if parsed.has_host() => {
            let mut normalized = format!(
                "{}://{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or_default()
            );
            if let Some(port) = parsed.port() {
                normalized.push_str(&format!(":{port}"));
            }
            normalized.push_str(parsed.path().trim_end_matches('/'));
            if let Some(query) = parsed.query() {
                normalized.push('?');
                normalized.push_str(query);
            }
            normalized
        }
        _ => strip_trailing_slash(without_fragment),
    }
}

/// Returns true if both URLs have the same normalized form.
pub fn urls_match(a: &str, b: &str) -> bool {
    normalize_url(a) == normalize_url(b)
}

/// Lowercased host of an absolute URL, without any `www.` prefix.
///
/// Used to decide whether a declared source points back at the audited site.
pub fn site_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
