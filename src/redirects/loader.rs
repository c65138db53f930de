//! Redirect map loading.
//!
//! Fetches the site's declared redirect map (`/redirects.json`), follows up on
//! paginated responses, and flags structural problems in the declared rules:
//! duplicate sources, over-qualified sources and no-op rules.
//!
//! The loader never fails: a missing, unreachable or malformed map is logged and
//! treated as an empty map.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio_retry::RetryIf;

use crate::config::REDIRECTS_RESOURCE;
use crate::error_handling::{categorize_reqwest_error, get_retry_strategy, FetchError};
use crate::normalize::{ensure_full_url, has_protocol, site_host, urls_match};
use crate::redirects::model::RedirectMappingEntry;

/// One rule as it appears in the map document.
///
/// Both `Source`/`Destination` and `source`/`destination` spellings are accepted;
/// missing keys default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawMapping {
    #[serde(rename = "Source", alias = "source", default)]
    pub source: String,
    #[serde(rename = "Destination", alias = "destination", default)]
    pub destination: String,
}

/// One page of the map document: `{ "data": [...], "total": N }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectMapPage {
    #[serde(default)]
    pub data: Option<Vec<RawMapping>>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Response to a map fetch that reached the server.
#[derive(Debug, Clone)]
pub enum MapResponse {
    /// The site declares no redirect map (HTTP 404).
    NotFound,
    Page(RedirectMapPage),
}

/// Retrieves redirect map documents.
pub trait MapFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<MapResponse, FetchError>>;
}

/// [`MapFetcher`] over HTTP GET.
pub struct HttpMapFetcher {
    client: Arc<reqwest::Client>,
}

impl HttpMapFetcher {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

impl MapFetcher for HttpMapFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<MapResponse, FetchError>> {
        async move {
            let transport_error = |e: reqwest::Error| FetchError::Transport {
                kind: categorize_reqwest_error(&e),
                url: url.to_string(),
                message: e.to_string(),
            };

            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Ok(MapResponse::NotFound);
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = response.bytes().await.map_err(transport_error)?;
            let page = serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            Ok(MapResponse::Page(page))
        }
        .boxed()
    }
}

/// URL of the map resource for a site.
pub fn redirects_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), REDIRECTS_RESOURCE)
}

/// Fetches `url`, retrying transient transport failures with backoff.
async fn fetch_with_retry(
    fetcher: &dyn MapFetcher,
    url: &str,
) -> Result<MapResponse, FetchError> {
    RetryIf::spawn(
        get_retry_strategy(),
        || fetcher.fetch(url),
        |e: &FetchError| {
            let transient = e.is_transient();
            if transient {
                debug!("Retrying redirect map fetch after transient error: {e}");
            }
            transient
        },
    )
    .await
}

/// Loads and annotates the redirect map declared by `base_url`.
///
/// Returns the entries sorted by source. When the first response holds fewer
/// rules than its `total`, the map is fetched again with `?limit={total}`; if that
/// follow-up does not deliver a non-empty `data` array the whole map is dropped
/// rather than audited partially.
pub async fn load_redirect_map(fetcher: &dyn MapFetcher, base_url: &str) -> Vec<RedirectMappingEntry> {
    let map_url = redirects_url(base_url);

    let page = match fetch_with_retry(fetcher, &map_url).await {
        Ok(MapResponse::Page(page)) => page,
        Ok(MapResponse::NotFound) => {
            info!("No redirect map found at {map_url}");
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to fetch redirect map: {e}");
            return Vec::new();
        }
    };

    let data = page.data.unwrap_or_default();
    let total = page.total.unwrap_or(data.len());

    let data = if data.len() < total {
        info!(
            "Redirect map at {map_url} returned {} of {total} rules; fetching all",
            data.len()
        );
        let full_url = format!("{map_url}?limit={total}");
        match fetch_with_retry(fetcher, &full_url).await {
            Ok(MapResponse::Page(RedirectMapPage {
                data: Some(full), ..
            })) if !full.is_empty() => full,
            Ok(_) => {
                warn!("Follow-up fetch of {full_url} returned no rules; skipping redirect map");
                return Vec::new();
            }
            Err(e) => {
                warn!("Follow-up fetch of redirect map failed: {e}; skipping redirect map");
                return Vec::new();
            }
        }
    } else {
        data
    };

    let entries = build_entries(data, &map_url, base_url);
    info!("Loaded {} redirect rules from {map_url}", entries.len());
    entries
}

/// Sorts raw rules by source and computes their structural flags.
///
/// For a source declared `k` times, the first `k - 1` occurrences (in sorted
/// order, which keeps file order among equal sources) are duplicates with
/// ordinals `1..k-1`; the last occurrence is the rule that takes effect.
pub fn build_entries(
    mut raw: Vec<RawMapping>,
    referenced_by: &str,
    base_url: &str,
) -> Vec<RedirectMappingEntry> {
    raw.sort_by(|a, b| a.source.cmp(&b.source));

    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for mapping in &raw {
        *occurrences.entry(mapping.source.clone()).or_insert(0) += 1;
    }

    let own_host = site_host(base_url);
    let mut seen: HashMap<String, usize> = HashMap::new();

    raw.into_iter()
        .map(|mapping| {
            let total = occurrences.get(&mapping.source).copied().unwrap_or(1);
            let position = seen.entry(mapping.source.clone()).or_insert(0);
            *position += 1;
            let is_duplicate_source = *position < total;

            RedirectMappingEntry {
                referenced_by: referenced_by.to_string(),
                is_duplicate_source,
                duplicate_ordinal: if is_duplicate_source { *position } else { 0 },
                is_over_qualified: is_over_qualified(&mapping.source, own_host.as_deref()),
                has_identical_source_and_destination: is_same_source_and_destination(
                    &mapping.source,
                    &mapping.destination,
                    base_url,
                ),
                original_source: mapping.source,
                original_destination: mapping.destination,
            }
        })
        .collect()
}

/// A source written as an absolute URL on the audited site itself.
fn is_over_qualified(source: &str, own_host: Option<&str>) -> bool {
    match own_host {
        Some(own_host) if has_protocol(source) => site_host(source).as_deref() == Some(own_host),
        _ => false,
    }
}

/// A rule whose destination is its own source.
fn is_same_source_and_destination(source: &str, destination: &str, base_url: &str) -> bool {
    if destination.trim().is_empty() {
        return false;
    }
    urls_match(
        &ensure_full_url(source, Some(base_url)),
        &ensure_full_url(destination, Some(base_url)),
    )
}
