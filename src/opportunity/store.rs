//! JSON file persistence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{NewOpportunity, Opportunity, OpportunityStore, SuggestionRecord, SyncSuggestions};
use crate::error_handling::PersistenceError;
use crate::redirects::AggregateCounts;

/// On-disk layout of a [`JsonFileStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAudit {
    pub opportunity: Opportunity,
    pub counts: AggregateCounts,
    pub suggestions: Vec<SuggestionRecord>,
}

/// [`OpportunityStore`] keeping one audit's opportunity and suggestions in a
/// pretty-printed JSON file.
///
/// Re-running an audit for the same URL updates the stored opportunity in place
/// and keeps its id.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored audit, if the file exists.
    pub async fn load(&self) -> Result<Option<StoredAudit>, PersistenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, stored: &StoredAudit) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(stored)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}

impl OpportunityStore for JsonFileStore {
    fn convert_to_opportunity<'a>(
        &'a self,
        request: NewOpportunity<'a>,
    ) -> BoxFuture<'a, Result<Opportunity, PersistenceError>> {
        async move {
            let _guard = self.lock.lock().await;
            let now = Utc::now();

            let existing = self.load().await?.filter(|stored| {
                stored.opportunity.audit_url == request.audit_url
                    && stored.opportunity.opportunity_type == request.opportunity_type
            });

            let stored = match existing {
                Some(mut stored) => {
                    info!("Updating opportunity {}", stored.opportunity.id);
                    stored.opportunity.data = request.opportunity_data;
                    stored.opportunity.metrics = request.metrics;
                    stored.opportunity.updated_at = now;
                    stored.counts = request.audit_data.counts.clone();
                    stored
                }
                None => {
                    let opportunity = Opportunity {
                        id: format!("oppty-{}", now.timestamp_millis()),
                        opportunity_type: request.opportunity_type.to_string(),
                        audit_url: request.audit_url.to_string(),
                        data: request.opportunity_data,
                        metrics: request.metrics,
                        updated_at: now,
                    };
                    info!("Creating opportunity {}", opportunity.id);
                    StoredAudit {
                        opportunity,
                        counts: request.audit_data.counts.clone(),
                        suggestions: Vec::new(),
                    }
                }
            };

            self.save(&stored).await?;
            Ok(stored.opportunity)
        }
        .boxed()
    }

    fn sync_suggestions<'a>(
        &'a self,
        request: SyncSuggestions<'a>,
    ) -> BoxFuture<'a, Result<(), PersistenceError>> {
        async move {
            let _guard = self.lock.lock().await;
            let id = &request.opportunity.id;

            let mut stored = match self.load().await? {
                Some(stored) if stored.opportunity.id == *id => stored,
                _ => {
                    return Err(PersistenceError::Suggestions {
                        id: id.clone(),
                        message: format!("opportunity not found in {}", self.path.display()),
                    })
                }
            };

            let previous: HashSet<String> = stored
                .suggestions
                .iter()
                .map(|record| (request.build_key)(&record.data))
                .collect();
            let current: HashSet<String> = request
                .new_data
                .iter()
                .map(|issue| (request.build_key)(issue))
                .collect();

            stored.suggestions = request
                .new_data
                .iter()
                .map(|issue| (request.map_new_suggestion)(issue))
                .collect();

            info!(
                "Synced suggestions for {id}: {} new, {} updated, {} outdated",
                current.difference(&previous).count(),
                current.intersection(&previous).count(),
                previous.difference(&current).count()
            );
            self.save(&stored).await
        }
        .boxed()
    }
}
