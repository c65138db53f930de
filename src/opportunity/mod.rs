//! Opportunity and suggestion persistence.
//!
//! An audit run with at least one issue becomes one opportunity; each issue
//! becomes one suggestion attached to it. Storage is behind [`OpportunityStore`]
//! so the audit never depends on a particular backend.

mod store;

pub use store::JsonFileStore;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use log::info;
use serde::{Deserialize, Serialize};

use crate::audit::AuditDetails;
use crate::config::{OPPORTUNITY_TYPE, SUGGESTION_TYPE};
use crate::error_handling::PersistenceError;
use crate::redirects::{RedirectIssue, TrafficMetrics};

/// Descriptive part of an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityData {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl OpportunityData {
    /// Descriptive data for the redirect audit.
    pub fn redirect_chains() -> Self {
        Self {
            title: "Redirect issues found with the redirects.json file".to_string(),
            description: "Broken, looping and misconfigured redirects waste crawl budget and \
                          send visitors to the wrong page."
                .to_string(),
            tags: vec!["Traffic acquisition".to_string(), "Redirects".to_string()],
        }
    }
}

/// A persisted opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    #[serde(rename = "type")]
    pub opportunity_type: String,
    pub audit_url: String,
    pub data: OpportunityData,
    pub metrics: TrafficMetrics,
    pub updated_at: DateTime<Utc>,
}

/// A persisted suggestion; `data` is the issue it proposes to fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRecord {
    pub opportunity_id: String,
    #[serde(rename = "type")]
    pub suggestion_type: String,
    /// Lower is more urgent
    pub rank: usize,
    pub data: RedirectIssue,
}

/// Arguments for [`OpportunityStore::convert_to_opportunity`].
pub struct NewOpportunity<'a> {
    pub audit_url: &'a str,
    pub audit_data: &'a AuditDetails,
    pub opportunity_data: OpportunityData,
    pub opportunity_type: &'a str,
    pub metrics: TrafficMetrics,
}

/// Arguments for [`OpportunityStore::sync_suggestions`].
pub struct SyncSuggestions<'a> {
    pub opportunity: &'a Opportunity,
    pub new_data: &'a [RedirectIssue],
    /// Identity of an issue; suggestions with the same key are replaced
    pub build_key: &'a (dyn Fn(&RedirectIssue) -> String + Send + Sync),
    pub map_new_suggestion: &'a (dyn Fn(&RedirectIssue) -> SuggestionRecord + Send + Sync),
}

/// Persistence backend for opportunities and their suggestions.
pub trait OpportunityStore: Send + Sync {
    /// Creates the opportunity for an audit, or updates the existing one.
    fn convert_to_opportunity<'a>(
        &'a self,
        request: NewOpportunity<'a>,
    ) -> BoxFuture<'a, Result<Opportunity, PersistenceError>>;

    /// Replaces the opportunity's suggestions with `new_data`.
    fn sync_suggestions<'a>(
        &'a self,
        request: SyncSuggestions<'a>,
    ) -> BoxFuture<'a, Result<(), PersistenceError>>;
}

/// Maps an issue onto the suggestion persisted for it.
pub fn map_new_suggestion(opportunity_id: &str, issue: &RedirectIssue) -> SuggestionRecord {
    SuggestionRecord {
        opportunity_id: opportunity_id.to_string(),
        suggestion_type: SUGGESTION_TYPE.to_string(),
        rank: issue.issue.problem_category.precedence(),
        data: issue.clone(),
    }
}

/// Persists an audit's findings.
///
/// Nothing is written when the audit found no issues. Storage failures are
/// returned to the caller.
pub async fn generate_opportunity(
    store: &dyn OpportunityStore,
    audit_url: &str,
    details: &AuditDetails,
) -> Result<Option<Opportunity>, PersistenceError> {
    if details.issues.is_empty() {
        info!("No redirect issues for {audit_url}; skipping opportunity creation");
        return Ok(None);
    }

    let opportunity = store
        .convert_to_opportunity(NewOpportunity {
            audit_url,
            audit_data: details,
            opportunity_data: OpportunityData::redirect_chains(),
            opportunity_type: OPPORTUNITY_TYPE,
            metrics: details.counts.traffic,
        })
        .await?;

    let opportunity_id = opportunity.id.clone();
    let build_key = |issue: &RedirectIssue| issue.key.clone();
    let map_suggestion = move |issue: &RedirectIssue| map_new_suggestion(&opportunity_id, issue);
    store
        .sync_suggestions(SyncSuggestions {
            opportunity: &opportunity,
            new_data: &details.issues,
            build_key: &build_key,
            map_new_suggestion: &map_suggestion,
        })
        .await?;

    info!(
        "Saved opportunity {} with {} suggestions for {audit_url}",
        opportunity.id,
        details.issues.len()
    );
    Ok(Some(opportunity))
}
