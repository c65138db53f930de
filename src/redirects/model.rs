//! Data types flowing through the redirect audit.
//!
//! Each stage wraps the previous stage's type instead of copying its fields:
//! `RedirectMappingEntry` -> `ProbeResult` -> `ClassifiedIssue` -> `RedirectIssue`.
//! All of them serialize flat, in camelCase, so a suggestion's `data` carries every
//! field gathered along the way.

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

/// One declared source -> destination rule from the redirect map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectMappingEntry {
    /// URL of the map resource the rule came from
    pub referenced_by: String,
    pub original_source: String,
    /// May be empty, meaning "just check that the source loads"
    pub original_destination: String,
    pub is_duplicate_source: bool,
    /// 0 when not a duplicate, else the 1-based index among same-source entries
    pub duplicate_ordinal: usize,
    pub is_over_qualified: bool,
    pub has_identical_source_and_destination: bool,
}

/// Outcome of resolving one mapping entry against the live site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    #[serde(flatten)]
    pub entry: RedirectMappingEntry,
    pub full_source_url: String,
    pub full_destination_url: String,
    /// URL actually reached; `None` when the probe never got a response
    pub final_url: Option<String>,
    /// HTTP status, or `PROBE_FAILED_STATUS` when no response was received
    pub final_status_code: u16,
    pub was_redirected: bool,
    /// Never larger than `MAX_REDIRECT_HOPS`
    pub redirect_hop_count: usize,
    pub redirect_chain_path: Vec<String>,
    pub final_matches_declared_destination: bool,
    pub error_message: Option<String>,
}

/// The single headline problem reported for an entry.
///
/// Variants are listed in selection precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum ProblemCategory {
    #[serde(rename = "duplicate-source")]
    DuplicateSource,
    #[serde(rename = "over-qualified")]
    OverQualified,
    #[serde(rename = "same-source-destination")]
    SameSourceDestination,
    #[serde(rename = "http-error")]
    HttpError,
    #[serde(rename = "redirects-to-404-page")]
    RedirectsTo404Page,
    #[serde(rename = "max-redirects-exceeded")]
    MaxRedirectsExceeded,
    #[serde(rename = "too-many-redirects")]
    TooManyRedirects,
    #[serde(rename = "destination-mismatch")]
    DestinationMismatch,
}

impl ProblemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemCategory::DuplicateSource => "duplicate-source",
            ProblemCategory::OverQualified => "over-qualified",
            ProblemCategory::SameSourceDestination => "same-source-destination",
            ProblemCategory::HttpError => "http-error",
            ProblemCategory::RedirectsTo404Page => "redirects-to-404-page",
            ProblemCategory::MaxRedirectsExceeded => "max-redirects-exceeded",
            ProblemCategory::TooManyRedirects => "too-many-redirects",
            ProblemCategory::DestinationMismatch => "destination-mismatch",
        }
    }

    /// 1-based position in the selection precedence.
    pub fn precedence(&self) -> usize {
        match self {
            ProblemCategory::DuplicateSource => 1,
            ProblemCategory::OverQualified => 2,
            ProblemCategory::SameSourceDestination => 3,
            ProblemCategory::HttpError => 4,
            ProblemCategory::RedirectsTo404Page => 5,
            ProblemCategory::MaxRedirectsExceeded => 6,
            ProblemCategory::TooManyRedirects => 7,
            ProblemCategory::DestinationMismatch => 8,
        }
    }
}

impl std::fmt::Display for ProblemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine tag for the kind of fix a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum FixType {
    #[serde(rename = "duplicate-src")]
    DuplicateSrc,
    #[serde(rename = "too-qualified")]
    TooQualified,
    #[serde(rename = "same-src-dest")]
    SameSrcDest,
    #[serde(rename = "manual-check")]
    ManualCheck,
    #[serde(rename = "final-mismatch")]
    FinalMismatch,
    #[serde(rename = "high-redirect-count")]
    HighRedirectCount,
    #[serde(rename = "404-page")]
    NotFoundPage,
    #[serde(rename = "max-redirects-exceeded")]
    MaxRedirectsExceeded,
}

impl FixType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixType::DuplicateSrc => "duplicate-src",
            FixType::TooQualified => "too-qualified",
            FixType::SameSrcDest => "same-src-dest",
            FixType::ManualCheck => "manual-check",
            FixType::FinalMismatch => "final-mismatch",
            FixType::HighRedirectCount => "high-redirect-count",
            FixType::NotFoundPage => "404-page",
            FixType::MaxRedirectsExceeded => "max-redirects-exceeded",
        }
    }
}

impl std::fmt::Display for FixType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A probe result with its headline problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedIssue {
    #[serde(flatten)]
    pub probe: ProbeResult,
    pub problem_category: ProblemCategory,
}

/// A classified issue with its remediation; the `data` of a persisted suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectIssue {
    #[serde(flatten)]
    pub issue: ClassifiedIssue,
    /// Stable identity used to match suggestions across audit runs
    pub key: String,
    pub fix: String,
    pub fix_type: FixType,
    pub can_apply_fix_automatically: bool,
}

/// Projected traffic impact of an audit's issues.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficMetrics {
    pub projected_traffic_lost: u64,
    pub projected_traffic_value: f64,
}

/// Summary tallies for one audit run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateCounts {
    pub total_entries: usize,
    pub count_redirected: usize,
    pub count_duplicate_source: usize,
    pub count_over_qualified: usize,
    pub count_same_source_destination: usize,
    pub count_http_errors: usize,
    pub count_redirects_to_404_page: usize,
    pub count_max_redirects_exceeded: usize,
    pub count_too_many_redirects: usize,
    pub count_destination_mismatch: usize,
    #[serde(flatten)]
    pub traffic: TrafficMetrics,
}

/// Output of the classifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    pub counts: AggregateCounts,
    pub problems: Vec<ClassifiedIssue>,
}
