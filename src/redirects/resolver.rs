//! Redirect chain resolution.
//!
//! Each mapping entry is probed in two phases:
//! 1. a quick HEAD request that lets the client follow redirects, giving the final
//!    URL and status;
//! 2. when that request was redirected, a hop-by-hop walk with redirects disabled,
//!    counting hops and recording the path, bounded by `MAX_REDIRECT_HOPS`.
//!
//! Entries are probed concurrently, at most `max_concurrency` at a time, and the
//! results come back in input order.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use log::{debug, info, warn};
use reqwest::Url;

use crate::config::{DUPLICATED_SOURCE_MESSAGE, MAX_REDIRECT_HOPS, PROBE_FAILED_STATUS};
use crate::error_handling::{probe_error_from_reqwest, ProbeError};
use crate::normalize::{ensure_full_url, urls_match};
use crate::redirects::model::{ProbeResult, RedirectMappingEntry};

/// Result of a request that followed redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowOutcome {
    pub final_url: String,
    pub status: u16,
    /// Whether at least one redirect was followed
    pub redirected: bool,
}

/// Result of a single request with redirects disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopOutcome {
    pub status: u16,
    /// Raw `Location` header, if any
    pub location: Option<String>,
}

/// Issues the no-body requests used to probe the live site.
pub trait Prober: Send + Sync {
    /// Requests `url`, following redirects up to the transport's own limit.
    fn follow<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FollowOutcome, ProbeError>>;

    /// Requests `url` without following redirects.
    fn single_hop<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HopOutcome, ProbeError>>;
}

/// [`Prober`] issuing HTTP HEAD requests.
pub struct HttpProber {
    client: Arc<reqwest::Client>,
    redirect_client: Arc<reqwest::Client>,
}

impl HttpProber {
    /// `client` must follow redirects; `redirect_client` must not.
    pub fn new(client: Arc<reqwest::Client>, redirect_client: Arc<reqwest::Client>) -> Self {
        Self {
            client,
            redirect_client,
        }
    }
}

impl Prober for HttpProber {
    fn follow<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FollowOutcome, ProbeError>> {
        async move {
            let response = self
                .client
                .head(url)
                .send()
                .await
                .map_err(|e| probe_error_from_reqwest(url, &e))?;

            let final_url = response.url().clone();
            let redirected = Url::parse(url).map(|u| u != final_url).unwrap_or(true);
            Ok(FollowOutcome {
                final_url: final_url.to_string(),
                status: response.status().as_u16(),
                redirected,
            })
        }
        .boxed()
    }

    fn single_hop<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HopOutcome, ProbeError>> {
        async move {
            let response = self
                .redirect_client
                .head(url)
                .send()
                .await
                .map_err(|e| probe_error_from_reqwest(url, &e))?;

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            Ok(HopOutcome {
                status: response.status().as_u16(),
                location,
            })
        }
        .boxed()
    }
}

/// 301, 302, 303, 307 and 308.
pub fn is_redirect_status(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// 2xx and 3xx; anything else is recorded as an HTTP error by the resolver.
fn is_success_or_redirect(status: u16) -> bool {
    (200..400).contains(&status)
}

fn http_error_message(status: u16, url: &str) -> String {
    format!("HTTP error {status} for {url}")
}

/// Outcome of the hop-by-hop walk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HopWalk {
    hops: usize,
    path: Vec<String>,
    /// Last URL reached; never fetched when the walk was capped
    last_url: String,
    /// Status of the last response received
    last_status: Option<u16>,
    error: Option<(u16, String)>,
}

/// Follows a redirect chain one hop at a time.
///
/// Stops at the first non-redirect response, on any failure, or once
/// `MAX_REDIRECT_HOPS` hops have been taken. At the bound the next target is
/// recorded but never requested.
async fn walk_redirect_chain(prober: &dyn Prober, start_url: &str) -> HopWalk {
    let mut walk = HopWalk {
        hops: 0,
        path: vec![start_url.to_string()],
        last_url: start_url.to_string(),
        last_status: None,
        error: None,
    };

    while walk.hops < MAX_REDIRECT_HOPS {
        let hop = match prober.single_hop(&walk.last_url).await {
            Ok(hop) => hop,
            Err(e) => {
                walk.error = Some((PROBE_FAILED_STATUS, e.to_string()));
                return walk;
            }
        };
        walk.last_status = Some(hop.status);

        if !is_redirect_status(hop.status) {
            if !is_success_or_redirect(hop.status) {
                walk.error = Some((hop.status, http_error_message(hop.status, &walk.last_url)));
            }
            return walk;
        }

        let Some(location) = hop.location else {
            warn!(
                "Redirect status {} for {} but no Location header",
                hop.status, walk.last_url
            );
            return walk;
        };

        let next = match Url::parse(&location)
            .or_else(|_| Url::parse(&walk.last_url).and_then(|base| base.join(&location)))
        {
            Ok(next) => next.to_string(),
            Err(_) => {
                let e = ProbeError::InvalidLocation {
                    url: walk.last_url.clone(),
                    location,
                };
                walk.error = Some((PROBE_FAILED_STATUS, e.to_string()));
                return walk;
            }
        };

        walk.hops += 1;
        walk.path.push(next.clone());
        walk.last_url = next;
    }

    debug!(
        "Stopped counting redirects for {} after {} hops",
        start_url, walk.hops
    );
    walk
}

/// Full URLs of an entry; an empty destination stands for the source itself.
fn full_urls(entry: &RedirectMappingEntry, base_url: &str) -> (String, String) {
    let full_source = ensure_full_url(&entry.original_source, Some(base_url));
    let full_destination = if entry.original_destination.trim().is_empty() {
        full_source.clone()
    } else {
        ensure_full_url(&entry.original_destination, Some(base_url))
    };
    (full_source, full_destination)
}

fn finish(mut result: ProbeResult) -> ProbeResult {
    result.final_matches_declared_destination = result
        .final_url
        .as_deref()
        .map(|final_url| urls_match(final_url, &result.full_destination_url))
        .unwrap_or(false);
    result
}

/// Resolves one mapping entry against the live site.
///
/// Duplicate sources are never probed. Failures are recorded on the result and
/// never returned as errors.
pub async fn resolve_entry(
    prober: &dyn Prober,
    entry: &RedirectMappingEntry,
    base_url: &str,
) -> ProbeResult {
    let (full_source_url, full_destination_url) = full_urls(entry, base_url);
    let mut result = ProbeResult {
        entry: entry.clone(),
        full_source_url,
        full_destination_url,
        final_url: None,
        final_status_code: PROBE_FAILED_STATUS,
        was_redirected: false,
        redirect_hop_count: 0,
        redirect_chain_path: Vec::new(),
        final_matches_declared_destination: false,
        error_message: None,
    };

    if entry.is_duplicate_source {
        result.final_status_code = 200;
        result.error_message = Some(DUPLICATED_SOURCE_MESSAGE.to_string());
        return result;
    }

    let source = result.full_source_url.clone();
    match prober.follow(&source).await {
        Ok(outcome) => {
            result.final_url = Some(outcome.final_url);
            result.final_status_code = outcome.status;
            result.was_redirected = outcome.redirected;
            if !is_success_or_redirect(outcome.status) {
                result.error_message = Some(http_error_message(outcome.status, &source));
                return finish(result);
            }
        }
        Err(ProbeError::RedirectLimit { .. }) => {
            // The client gave up, so there is at least one redirect to count
            debug!("Client redirect limit hit for {source}; counting hops manually");
            result.was_redirected = true;
        }
        Err(e) => {
            debug!("Probe failed for {source}: {e}");
            result.error_message = Some(e.to_string());
            return finish(result);
        }
    }

    if !result.was_redirected {
        result.redirect_chain_path = vec![source];
        return finish(result);
    }

    let walk = walk_redirect_chain(prober, &source).await;
    result.redirect_hop_count = walk.hops;
    result.redirect_chain_path = walk.path;

    match walk.error {
        Some((status, message)) => {
            result.final_status_code = status;
            result.error_message = Some(message);
            if result.final_url.is_none() {
                result.final_url = Some(walk.last_url);
            }
        }
        // The quick probe's final URL and status stand; the walk only supplies
        // them when the client gave up on the chain
        None if result.final_url.is_none() => {
            result.final_url = Some(walk.last_url);
            if let Some(status) = walk.last_status {
                result.final_status_code = status;
            }
        }
        None => {}
    }

    finish(result)
}

/// Resolves every entry with at most `max_concurrency` probes in flight.
///
/// The output has one result per entry, in the same order as `entries`.
pub async fn resolve_all(
    prober: &dyn Prober,
    entries: &[RedirectMappingEntry],
    base_url: &str,
    max_concurrency: usize,
) -> Vec<ProbeResult> {
    info!(
        "Resolving {} redirect rules ({} at a time)",
        entries.len(),
        max_concurrency.max(1)
    );

    let results: Vec<ProbeResult> = stream::iter(entries)
        .map(|entry| resolve_entry(prober, entry, base_url))
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    let failed = results
        .iter()
        .filter(|r| r.final_status_code == PROBE_FAILED_STATUS)
        .count();
    info!(
        "Resolved {} redirect rules ({} unreachable)",
        results.len(),
        failed
    );
    results
}

#[cfg(test)]
mod tests {
    include!("resolver_tests.rs");
}
