//! Redirect audit entry point.
//!
//! Runs load -> resolve -> classify -> fix for one site. Persisting the result is
//! a separate step (see [`crate::opportunity::generate_opportunity`]).

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::normalize::validate_base_url;
use crate::redirects::{
    classify, generate_fixes, load_redirect_map, resolve_all, AggregateCounts, HttpMapFetcher,
    HttpProber, MapFetcher, Prober, RedirectIssue,
};

/// Reason recorded when the base URL cannot be audited.
pub const INVALID_URL_REASON: &str = "INVALID URL";

/// Collaborators used by an audit run.
#[derive(Clone)]
pub struct AuditContext {
    pub fetcher: Arc<dyn MapFetcher>,
    pub prober: Arc<dyn Prober>,
    /// Live-site probes in flight at once
    pub max_concurrency: usize,
}

impl AuditContext {
    /// Context backed by real HTTP clients.
    ///
    /// `client` must follow redirects and `redirect_client` must not.
    pub fn from_clients(
        client: Arc<reqwest::Client>,
        redirect_client: Arc<reqwest::Client>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            fetcher: Arc::new(HttpMapFetcher::new(Arc::clone(&client))),
            prober: Arc::new(HttpProber::new(client, redirect_client)),
            max_concurrency,
        }
    }
}

/// Why an audit did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReason {
    pub value: String,
    pub error: String,
}

/// Findings of a successful audit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDetails {
    pub issues: Vec<RedirectIssue>,
    pub counts: AggregateCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<AuditReason>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AuditDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRunnerOutput {
    pub audit_result: AuditResult,
    pub full_audit_ref: String,
}

/// Audits the redirect map declared by `base_url`.
///
/// Never fails: an unusable base URL gives an unsuccessful result (and no
/// network traffic), and every other problem is reported as part of the result.
pub async fn redirects_audit_runner(base_url: &str, ctx: &AuditContext) -> AuditRunnerOutput {
    let Some(site) = validate_base_url(base_url) else {
        return AuditRunnerOutput {
            audit_result: AuditResult {
                success: false,
                reasons: Some(vec![AuditReason {
                    value: base_url.to_string(),
                    error: INVALID_URL_REASON.to_string(),
                }]),
                details: None,
            },
            full_audit_ref: base_url.to_string(),
        };
    };

    info!("Auditing redirects for {site}");
    let entries = load_redirect_map(ctx.fetcher.as_ref(), &site).await;
    let results = resolve_all(ctx.prober.as_ref(), &entries, &site, ctx.max_concurrency).await;
    let classification = classify(&results);
    let issues = generate_fixes(classification.problems);

    info!(
        "Found {} redirect issues in {} rules for {site}",
        issues.len(),
        classification.counts.total_entries
    );

    AuditRunnerOutput {
        audit_result: AuditResult {
            success: true,
            reasons: None,
            details: Some(AuditDetails {
                issues,
                counts: classification.counts,
            }),
        },
        full_audit_ref: site,
    }
}
