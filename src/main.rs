//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `redirect_audit` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use redirect_audit::config::{DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use redirect_audit::initialization::init_logger_with;
use redirect_audit::{run_audit, Config, LogFormat, LogLevel};

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Audit a site and print a summary
/// redirect_audit https://www.example.com
///
/// # Save the opportunity and its suggestions
/// redirect_audit example.com --output audit.json --max-concurrency 4
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "redirect_audit",
    about = "Audits a site's redirects.json against the live site."
)]
struct Cli {
    /// Site to audit (scheme optional, https assumed)
    base_url: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    /// Maximum concurrent live-site probes
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    max_concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// JSON file the opportunity and its suggestions are written to
    #[arg(long, value_parser)]
    output: Option<PathBuf>,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            base_url: cli.base_url,
            log_level: cli.log_level,
            log_format: cli.log_format,
            max_concurrency: cli.max_concurrency,
            timeout_seconds: cli.timeout_seconds,
            user_agent: cli.user_agent,
            output: cli.output,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from(Cli::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_audit(config).await {
        Ok(report) if report.success => {
            println!(
                "Audited {} redirect rule{} ({} with issues) in {:.1}s",
                report.total_entries,
                if report.total_entries == 1 { "" } else { "s" },
                report.issue_count,
                report.elapsed_seconds
            );
            if let (Some(id), Some(path)) = (&report.opportunity_id, &report.output) {
                println!("Saved opportunity {} to {}", id, path.display());
            }
            Ok(())
        }
        Ok(report) => {
            eprintln!(
                "redirect_audit error: invalid base URL {}",
                report.output_data.full_audit_ref
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!("redirect_audit error: {:#}", e);
            process::exit(1);
        }
    }
}
