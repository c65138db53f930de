// Shared test helpers: HTTP collaborators pointed at mock servers and in-memory stores.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use redirect_audit::error_handling::{FetchError, PersistenceError, ProbeError};
use redirect_audit::initialization::{init_client, init_redirect_client};
use redirect_audit::opportunity::{
    NewOpportunity, Opportunity, OpportunityStore, SuggestionRecord, SyncSuggestions,
};
use redirect_audit::redirects::{FollowOutcome, HopOutcome, MapFetcher, MapResponse, Prober};
use redirect_audit::{AuditContext, Config, LogFormat, LogLevel};

/// Config for tests: quiet logging and short timeouts.
#[allow(dead_code)] // Used by other test files
pub fn test_config(base_url: &str) -> Config {
    Config {
        base_url: base_url.to_string(),
        log_level: LogLevel::Error,
        log_format: LogFormat::Plain,
        max_concurrency: 4,
        timeout_seconds: 5,
        user_agent: "redirect_audit_test/1.0".to_string(),
        output: None,
    }
}

/// Audit context with real HTTP clients.
#[allow(dead_code)]
pub fn http_context() -> AuditContext {
    let config = test_config("");
    let client = init_client(&config).expect("Failed to build client");
    let redirect_client = init_redirect_client(&config).expect("Failed to build redirect client");
    AuditContext::from_clients(client, redirect_client, config.max_concurrency)
}

/// Serves `rules` as the mock site's redirect map.
#[allow(dead_code)]
pub async fn mount_redirect_map(server: &MockServer, rules: &[(&str, &str)]) {
    let data: Vec<_> = rules
        .iter()
        .map(|(source, destination)| json!({ "Source": source, "Destination": destination }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/redirects.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "total": rules.len(),
        })))
        .mount(server)
        .await;
}

/// Answers HEAD `from` with a redirect to `location`.
#[allow(dead_code)]
pub async fn mount_redirect(server: &MockServer, from: &str, status: u16, location: &str) {
    Mock::given(method("HEAD"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(status).insert_header("Location", location))
        .mount(server)
        .await;
}

/// Answers HEAD `at` with `status`.
#[allow(dead_code)]
pub async fn mount_status(server: &MockServer, at: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Fetcher and prober that count calls and never touch the network.
#[derive(Default)]
#[allow(dead_code)]
pub struct OfflineCollaborators {
    pub calls: AtomicUsize,
}

impl MapFetcher for OfflineCollaborators {
    fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<MapResponse, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(MapResponse::NotFound) }.boxed()
    }
}

impl Prober for OfflineCollaborators {
    fn follow<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FollowOutcome, ProbeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            Ok(FollowOutcome {
                final_url: url.to_string(),
                status: 200,
                redirected: false,
            })
        }
        .boxed()
    }

    fn single_hop<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<HopOutcome, ProbeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async {
            Ok(HopOutcome {
                status: 200,
                location: None,
            })
        }
        .boxed()
    }
}

/// In-memory store recording every call.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingStore {
    pub opportunities: Mutex<Vec<Opportunity>>,
    pub suggestions: Mutex<Vec<SuggestionRecord>>,
    pub keys: Mutex<Vec<String>>,
    pub convert_calls: AtomicUsize,
    pub sync_calls: AtomicUsize,
}

impl OpportunityStore for RecordingStore {
    fn convert_to_opportunity<'a>(
        &'a self,
        request: NewOpportunity<'a>,
    ) -> BoxFuture<'a, Result<Opportunity, PersistenceError>> {
        async move {
            let call = self.convert_calls.fetch_add(1, Ordering::SeqCst);
            let opportunity = Opportunity {
                id: format!("oppty-test-{call}"),
                opportunity_type: request.opportunity_type.to_string(),
                audit_url: request.audit_url.to_string(),
                data: request.opportunity_data,
                metrics: request.metrics,
                updated_at: Utc::now(),
            };
            self.opportunities.lock().unwrap().push(opportunity.clone());
            Ok(opportunity)
        }
        .boxed()
    }

    fn sync_suggestions<'a>(
        &'a self,
        request: SyncSuggestions<'a>,
    ) -> BoxFuture<'a, Result<(), PersistenceError>> {
        async move {
            self.sync_calls.fetch_add(1, Ordering::SeqCst);
            let mut keys = self.keys.lock().unwrap();
            let mut suggestions = self.suggestions.lock().unwrap();
            for issue in request.new_data {
                keys.push((request.build_key)(issue));
                suggestions.push((request.map_new_suggestion)(issue));
            }
            Ok(())
        }
        .boxed()
    }
}

/// Store whose backend is down.
#[allow(dead_code)]
pub struct FailingStore {
    /// Fail on suggestion sync instead of opportunity creation
    pub fail_on_sync: bool,
}

impl OpportunityStore for FailingStore {
    fn convert_to_opportunity<'a>(
        &'a self,
        request: NewOpportunity<'a>,
    ) -> BoxFuture<'a, Result<Opportunity, PersistenceError>> {
        async move {
            if !self.fail_on_sync {
                return Err(PersistenceError::Opportunity("backend unavailable".into()));
            }
            Ok(Opportunity {
                id: "oppty-failing".into(),
                opportunity_type: request.opportunity_type.to_string(),
                audit_url: request.audit_url.to_string(),
                data: request.opportunity_data,
                metrics: request.metrics,
                updated_at: Utc::now(),
            })
        }
        .boxed()
    }

    fn sync_suggestions<'a>(
        &'a self,
        request: SyncSuggestions<'a>,
    ) -> BoxFuture<'a, Result<(), PersistenceError>> {
        let id = request.opportunity.id.clone();
        async move {
            Err(PersistenceError::Suggestions {
                id,
                message: "backend unavailable".into(),
            })
        }
        .boxed()
    }
}

/// Wraps collaborators so one value can serve as both fetcher and prober.
#[allow(dead_code)]
pub fn offline_context(collaborators: Arc<OfflineCollaborators>) -> AuditContext {
    AuditContext {
        fetcher: collaborators.clone(),
        prober: collaborators,
        max_concurrency: 2,
    }
}
