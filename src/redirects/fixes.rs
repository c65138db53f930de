//! Remediation for classified issues.

use crate::config::{MAX_REDIRECT_HOPS, TRAFFIC_LOSS_RATE, TRAFFIC_UNIT_VALUE};
use crate::redirects::model::{
    ClassifiedIssue, FixType, ProblemCategory, RedirectIssue, TrafficMetrics,
};

/// Fix type proposed for a category.
pub fn fix_type_for(category: ProblemCategory) -> FixType {
    match category {
        ProblemCategory::DuplicateSource => FixType::DuplicateSrc,
        ProblemCategory::OverQualified => FixType::TooQualified,
        ProblemCategory::SameSourceDestination => FixType::SameSrcDest,
        ProblemCategory::HttpError => FixType::ManualCheck,
        ProblemCategory::RedirectsTo404Page => FixType::NotFoundPage,
        ProblemCategory::MaxRedirectsExceeded => FixType::MaxRedirectsExceeded,
        ProblemCategory::TooManyRedirects => FixType::HighRedirectCount,
        ProblemCategory::DestinationMismatch => FixType::FinalMismatch,
    }
}

/// Whether the fix can be applied to the redirect map without a human.
pub fn can_apply_automatically(fix_type: FixType) -> bool {
    matches!(
        fix_type,
        FixType::DuplicateSrc | FixType::TooQualified | FixType::SameSrcDest | FixType::FinalMismatch
    )
}

/// Stable identity of an issue across audit runs.
pub fn issue_key(issue: &ClassifiedIssue) -> String {
    let entry = &issue.probe.entry;
    format!(
        "{}|{}|{}",
        entry.original_source, entry.original_destination, entry.duplicate_ordinal
    )
}

fn fix_text(issue: &ClassifiedIssue) -> String {
    let probe = &issue.probe;
    let source = &probe.entry.original_source;
    let final_url = probe.final_url.as_deref().unwrap_or(&probe.full_source_url);

    match issue.problem_category {
        ProblemCategory::DuplicateSource => format!(
            "Remove this rule. The source {source} is declared more than once and only the last declaration takes effect."
        ),
        ProblemCategory::OverQualified => {
            let path = url::Url::parse(source)
                .map(|url| url.path().to_string())
                .unwrap_or_else(|_| source.clone());
            format!("Use the relative path {path} as the source instead of the fully qualified URL {source}.")
        }
        ProblemCategory::SameSourceDestination => format!(
            "Remove this rule. The source {source} redirects to itself, so the redirect does nothing."
        ),
        ProblemCategory::HttpError => format!(
            "Check {} manually. The request ended with status {}.",
            probe.full_source_url, probe.final_status_code
        ),
        ProblemCategory::RedirectsTo404Page => format!(
            "Point {source} at a live page. The redirect currently ends on the error page {final_url}."
        ),
        ProblemCategory::MaxRedirectsExceeded => format!(
            "Redesign the redirects for {source}. The chain reached {MAX_REDIRECT_HOPS} hops and is likely a loop."
        ),
        ProblemCategory::TooManyRedirects => format!(
            "Redirect {source} straight to {final_url}. The chain takes {} hops to get there.",
            probe.redirect_hop_count
        ),
        ProblemCategory::DestinationMismatch => format!(
            "Replace the destination {} with {final_url}, the URL actually reached.",
            probe.full_destination_url
        ),
    }
}

/// Attaches key, fix text and fix metadata to each classified issue.
pub fn generate_fixes(problems: Vec<ClassifiedIssue>) -> Vec<RedirectIssue> {
    problems
        .into_iter()
        .map(|issue| {
            let fix_type = fix_type_for(issue.problem_category);
            RedirectIssue {
                key: issue_key(&issue),
                fix: fix_text(&issue),
                fix_type,
                can_apply_fix_automatically: can_apply_automatically(fix_type),
                issue,
            }
        })
        .collect()
}

/// Projected traffic impact of `issue_count` issues.
///
/// Linear model: each issue is assumed to lose `TRAFFIC_LOSS_RATE` of one unit of
/// traffic worth `TRAFFIC_UNIT_VALUE`.
pub fn projected_traffic(issue_count: usize) -> TrafficMetrics {
    let lost = (issue_count as f64 * TRAFFIC_LOSS_RATE).round() as u64;
    TrafficMetrics {
        projected_traffic_lost: lost,
        projected_traffic_value: lost as f64 * TRAFFIC_UNIT_VALUE,
    }
}
