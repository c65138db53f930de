//! redirect_audit library: redirect map auditing
//!
//! This library loads a site's declared redirect map (`/redirects.json`), probes
//! every rule against the live site, and reports broken, looping and
//! misconfigured redirects together with suggested fixes.
//!
//! # Example
//!
//! ```no_run
//! use redirect_audit::{run_audit, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     base_url: "https://www.example.com".to_string(),
//!     max_concurrency: 5,
//!     ..Default::default()
//! };
//!
//! let report = run_audit(config).await?;
//! println!("{} issues in {} rules", report.issue_count, report.total_entries);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod audit;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod normalize;
pub mod opportunity;
pub mod redirects;

// Re-export public API
pub use audit::{
    redirects_audit_runner, AuditContext, AuditDetails, AuditReason, AuditResult,
    AuditRunnerOutput,
};
pub use config::{Config, LogFormat, LogLevel};
pub use opportunity::{generate_opportunity, JsonFileStore, OpportunityStore};
pub use run::{run_audit, AuditReport};

// Internal run module (wires real clients and storage around the audit)
mod run {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use log::{info, warn};

    use crate::audit::{redirects_audit_runner, AuditContext, AuditRunnerOutput};
    use crate::config::Config;
    use crate::initialization::{init_client, init_redirect_client};
    use crate::opportunity::{generate_opportunity, JsonFileStore};

    /// Results of an audit run.
    #[derive(Debug, Clone)]
    pub struct AuditReport {
        /// Whether the audit ran; false when the base URL was rejected
        pub success: bool,
        /// Number of rules in the redirect map
        pub total_entries: usize,
        /// Number of rules with a problem
        pub issue_count: usize,
        /// Id of the saved opportunity, when one was written
        pub opportunity_id: Option<String>,
        /// File the opportunity was written to
        pub output: Option<PathBuf>,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
        /// Full audit output
        pub output_data: AuditRunnerOutput,
    }

    /// Runs a redirect audit with the provided configuration.
    ///
    /// Builds the HTTP clients, audits `config.base_url` and, when
    /// `config.output` is set, saves the findings there as an opportunity with
    /// its suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built or the findings
    /// cannot be saved. Problems with the audited site are never errors; they are
    /// part of the report.
    pub async fn run_audit(config: Config) -> Result<AuditReport> {
        let start_time = std::time::Instant::now();

        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let redirect_client =
            init_redirect_client(&config).context("Failed to initialize redirect client")?;
        let ctx = AuditContext::from_clients(client, redirect_client, config.max_concurrency);

        let output_data = redirects_audit_runner(&config.base_url, &ctx).await;
        let success = output_data.audit_result.success;

        let (total_entries, issue_count, opportunity_id) = match &output_data.audit_result.details {
            Some(details) => {
                let opportunity_id = match &config.output {
                    Some(path) => {
                        let store = JsonFileStore::new(path);
                        generate_opportunity(&store, &output_data.full_audit_ref, details)
                            .await
                            .with_context(|| {
                                format!("Failed to save audit results to {}", path.display())
                            })?
                            .map(|opportunity| opportunity.id)
                    }
                    None => {
                        info!("No output file configured; findings are not persisted");
                        None
                    }
                };
                (details.counts.total_entries, details.issues.len(), opportunity_id)
            }
            None => {
                warn!("Audit of {} did not run", config.base_url);
                (0, 0, None)
            }
        };

        Ok(AuditReport {
            success,
            total_entries,
            issue_count,
            opportunity_id,
            output: config.output.clone(),
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
            output_data,
        })
    }
}
