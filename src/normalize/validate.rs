//! Base URL validation.

use log::warn;

/// Maximum URL length (2048 characters), matching common browser and server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Validates and normalizes the base URL of the site under audit.
///
/// Adds an `https://` prefix if the scheme is missing, then checks that the
/// result parses, uses http or https, and has a host. Trailing slashes are
/// removed so resource paths can be appended directly.
///
/// # Returns
///
/// `Some(normalized_url)` if the URL can be audited, `None` otherwise (a warning
/// is logged).
pub fn validate_base_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.len() > MAX_URL_LENGTH {
        warn!(
            "Rejecting base URL exceeding maximum length ({} > {}): {}...",
            url.len(),
            MAX_URL_LENGTH,
            url.chars().take(50).collect::<String>()
        );
        return None;
    }

    let normalized = if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://{url}")
    } else {
        url.to_string()
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Rejecting base URL exceeding maximum length after normalization ({} > {})",
            normalized.len(),
            MAX_URL_LENGTH
        );
        return None;
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) => match (parsed.scheme(), parsed.host_str()) {
            ("http" | "https", Some(host)) if !host.is_empty() => {
                Some(normalized.trim_end_matches('/').to_string())
            }
            _ => {
                warn!("Rejecting base URL without an http(s) host: {url}");
                None
            }
        },
        Err(_) => {
            warn!("Rejecting invalid base URL: {url}");
            None
        }
    }
}
