// Normalizer tests.

use super::*;
use proptest::prelude::*;

#[test]
fn test_has_protocol() {
    assert!(has_protocol("https://www.example.com/path"));
    assert!(has_protocol("http://127.0.0.1:8080"));
    assert!(!has_protocol("/relative/path"));
    assert!(!has_protocol("example.com/path"));
    assert!(!has_protocol(""));
}

#[test]
fn test_has_protocol_host_with_port_is_not_a_scheme() {
    // "example.com:8080" would otherwise parse with "example.com" as the scheme
    assert!(!has_protocol("example.com:8080"));
    assert!(!has_protocol("localhost:3000/path"));
}

#[test]
fn test_add_www_bare_domain() {
    assert_eq!(add_www("example.com"), "www.example.com");
}

#[test]
fn test_add_www_subdomain_unchanged() {
    assert_eq!(add_www("sub.example.com"), "sub.example.com");
}

#[test]
fn test_add_www_idempotent() {
    assert_eq!(add_www("www.example.com"), "www.example.com");
    assert_eq!(add_www(&add_www("example.com")), "www.example.com");
}

#[test]
fn test_add_www_multi_part_suffix() {
    assert_eq!(add_www("example.co.uk"), "www.example.co.uk");
    assert_eq!(add_www("shop.example.co.uk"), "shop.example.co.uk");
}

#[test]
fn test_add_www_full_url() {
    assert_eq!(
        add_www("https://example.com/some/path?q=1"),
        "https://www.example.com/some/path?q=1"
    );
    assert_eq!(
        add_www("https://blog.example.com/some/path"),
        "https://blog.example.com/some/path"
    );
}

#[test]
fn test_add_www_leaves_ips_and_single_labels_alone() {
    assert_eq!(add_www("127.0.0.1"), "127.0.0.1");
    assert_eq!(add_www("http://127.0.0.1:8080/a"), "http://127.0.0.1:8080/a");
    assert_eq!(add_www("localhost"), "localhost");
    assert_eq!(add_www("[::1]"), "[::1]");
}

#[test]
fn test_add_www_malformed_input_unchanged() {
    assert_eq!(add_www(""), "");
    assert_eq!(add_www("/just/a/path"), "/just/a/path");
    assert_eq!(add_www("https://"), "https://");
}

#[test]
fn test_ensure_full_url_keeps_absolute_urls() {
    assert_eq!(
        ensure_full_url("https://other.example.org/page", Some("example.com")),
        "https://other.example.org/page"
    );
}

#[test]
fn test_ensure_full_url_resolves_against_bare_host() {
    assert_eq!(
        ensure_full_url("/old-page", Some("example.com")),
        "https://www.example.com/old-page"
    );
    assert_eq!(
        ensure_full_url("old-page", Some("example.com")),
        "https://www.example.com/old-page"
    );
}

#[test]
fn test_ensure_full_url_single_slash_between_host_and_path() {
    assert_eq!(
        ensure_full_url("//double/slash", Some("www.example.com/")),
        "https://www.example.com/double/slash"
    );
}

#[test]
fn test_ensure_full_url_resolves_against_base_url() {
    assert_eq!(
        ensure_full_url("/old", Some("https://example.com")),
        "https://www.example.com/old"
    );
    // Scheme and port of a URL base are kept
    assert_eq!(
        ensure_full_url("/old", Some("http://127.0.0.1:4321")),
        "http://127.0.0.1:4321/old"
    );
    assert_eq!(
        ensure_full_url("/old", Some("localhost:3000")),
        "https://localhost:3000/old"
    );
}

#[test]
fn test_ensure_full_url_uses_own_host_without_base() {
    assert_eq!(
        ensure_full_url("example.com/landing", None),
        "https://www.example.com/landing"
    );
    assert_eq!(ensure_full_url("/no/host", None), "/no/host");
}

#[test]
fn test_is_404_page_matches() {
    assert!(is_404_page("/404"));
    assert!(is_404_page("/404/"));
    assert!(is_404_page("/404.html"));
    assert!(is_404_page("/404.htm"));
    assert!(is_404_page("/errors/404.HTML"));
    assert!(is_404_page("https://www.example.com/404?from=/old#top"));
}

#[test]
fn test_is_404_page_rejects_substrings_and_middle_segments() {
    assert!(!is_404_page("/some/product/404/cleaner"));
    assert!(!is_404_page("/product-404"));
    assert!(!is_404_page("/4040"));
    assert!(!is_404_page("/404-not-found.html"));
    assert!(!is_404_page("/404//"));
    assert!(!is_404_page("https://www.example.com/"));
    assert!(!is_404_page("/page?code=404"));
}

#[test]
fn test_normalize_url_trailing_slash_and_case() {
    assert_eq!(
        normalize_url("HTTPS://WWW.Example.com/Path/"),
        "https://www.example.com/Path"
    );
    assert!(urls_match(
        "https://www.example.com/a/",
        "https://www.example.com/a"
    ));
    assert!(urls_match("https://www.example.com/", "https://www.example.com"));
}

#[test]
fn test_normalize_url_drops_default_port_and_fragment() {
    assert!(urls_match(
        "https://www.example.com:443/a#section",
        "https://www.example.com/a"
    ));
    assert!(!urls_match(
        "https://www.example.com:8443/a",
        "https://www.example.com/a"
    ));
}

#[test]
fn test_urls_match_query_is_exact() {
    assert!(urls_match(
        "https://www.example.com/a?x=1",
        "https://www.example.com/a/?x=1"
    ));
    assert!(!urls_match(
        "https://www.example.com/a?a=1",
        "https://www.example.com/a?a=1&b=2"
    ));
    assert!(!urls_match(
        "https://www.example.com/a?a=1&b=2",
        "https://www.example.com/a?b=2&a=1"
    ));
}

#[test]
fn test_urls_match_scheme_differs() {
    assert!(!urls_match("http://www.example.com/a", "https://www.example.com/a"));
}

#[test]
fn test_normalize_url_relative_input() {
    assert_eq!(normalize_url("/a/b/"), "/a/b");
    assert_eq!(normalize_url("/a/b/?q=1"), "/a/b?q=1");
}

#[test]
fn test_site_host() {
    assert_eq!(
        site_host("https://www.Example.com/path"),
        Some("example.com".to_string())
    );
    assert_eq!(
        site_host("https://shop.example.com"),
        Some("shop.example.com".to_string())
    );
    assert_eq!(site_host("/path"), None);
}

proptest! {
    #[test]
    fn test_add_www_idempotent_for_any_domain(domain in "[a-z]{3,20}\\.(com|org|net)") {
        let once = add_www(&domain);
        prop_assert_eq!(add_www(&once), once.clone());
        prop_assert!(once.starts_with("www."));
    }

    #[test]
    fn test_is_404_page_never_matches_longer_segments(
        prefix in "[a-z]{1,10}",
        suffix in "[a-z]{1,10}"
    ) {
        let path = format!("/{}/{}404{}", prefix, prefix, suffix);
        prop_assert!(!is_404_page(&path));
        let path = format!("/{}/404/{}", prefix, suffix);
        prop_assert!(!is_404_page(&path));
    }

    #[test]
    fn test_normalize_url_idempotent(
        domain in "[a-z]{3,20}\\.(com|org|net)",
        path in prop::collection::vec("[a-z]{1,10}", 0..5)
    ) {
        let url = format!("https://{}/{}/", domain, path.join("/"));
        let once = normalize_url(&url);
        prop_assert_eq!(normalize_url(&once), once);
    }
}
