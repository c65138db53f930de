//! Result classification.
//!
//! Picks one headline problem per probe result and tallies the audit-wide counts.

use log::debug;

use crate::config::MAX_REDIRECT_HOPS;
use crate::normalize::is_404_page;
use crate::redirects::fixes::projected_traffic;
use crate::redirects::model::{
    AggregateCounts, ClassifiedIssue, Classification, ProbeResult, ProblemCategory,
};
use crate::redirects::resolver::is_redirect_status;

/// A chain the client could not finish and the hop walk gave up on at the bound
/// ends on a redirect that was never followed, so its 3xx status is not an HTTP
/// error.
fn is_capped_chain(result: &ProbeResult) -> bool {
    result.redirect_hop_count >= MAX_REDIRECT_HOPS && is_redirect_status(result.final_status_code)
}

fn is_http_error(result: &ProbeResult) -> bool {
    !(200..300).contains(&result.final_status_code) && !is_capped_chain(result)
}

fn ends_on_404_page(result: &ProbeResult) -> bool {
    result.final_url.as_deref().is_some_and(is_404_page)
}

/// Headline problem for one result, or `None` when the rule is healthy.
pub fn select_category(result: &ProbeResult) -> Option<ProblemCategory> {
    let entry = &result.entry;
    if entry.is_duplicate_source {
        Some(ProblemCategory::DuplicateSource)
    } else if entry.is_over_qualified {
        Some(ProblemCategory::OverQualified)
    } else if entry.has_identical_source_and_destination {
        Some(ProblemCategory::SameSourceDestination)
    } else if is_http_error(result) {
        Some(ProblemCategory::HttpError)
    } else if ends_on_404_page(result) {
        Some(ProblemCategory::RedirectsTo404Page)
    } else if result.redirect_hop_count >= MAX_REDIRECT_HOPS {
        Some(ProblemCategory::MaxRedirectsExceeded)
    } else if result.redirect_hop_count > 1 {
        Some(ProblemCategory::TooManyRedirects)
    } else if !result.final_matches_declared_destination {
        Some(ProblemCategory::DestinationMismatch)
    } else {
        None
    }
}

/// Classifies every probe result.
///
/// Problems keep the order of `results`. The structural flags and the
/// more-than-one-hop condition are counted for every entry, whichever problem
/// ends up as its headline; the remaining categories are counted only as
/// headlines.
pub fn classify(results: &[ProbeResult]) -> Classification {
    let mut counts = AggregateCounts {
        total_entries: results.len(),
        ..AggregateCounts::default()
    };
    let mut problems = Vec::new();

    for result in results {
        let entry = &result.entry;
        if entry.is_duplicate_source {
            counts.count_duplicate_source += 1;
        }
        if entry.is_over_qualified {
            counts.count_over_qualified += 1;
        }
        if entry.has_identical_source_and_destination {
            counts.count_same_source_destination += 1;
        }
        if result.redirect_hop_count > 1 {
            counts.count_too_many_redirects += 1;
        }
        if result.was_redirected {
            counts.count_redirected += 1;
        }

        let Some(category) = select_category(result) else {
            continue;
        };
        match category {
            ProblemCategory::HttpError => counts.count_http_errors += 1,
            ProblemCategory::RedirectsTo404Page => counts.count_redirects_to_404_page += 1,
            ProblemCategory::MaxRedirectsExceeded => counts.count_max_redirects_exceeded += 1,
            ProblemCategory::DestinationMismatch => counts.count_destination_mismatch += 1,
            // Tallied above for every entry
            ProblemCategory::DuplicateSource
            | ProblemCategory::OverQualified
            | ProblemCategory::SameSourceDestination
            | ProblemCategory::TooManyRedirects => {}
        }

        debug!(
            "{} -> {}: {}",
            entry.original_source, entry.original_destination, category
        );
        problems.push(ClassifiedIssue {
            probe: result.clone(),
            problem_category: category,
        });
    }

    counts.traffic = projected_traffic(problems.len());
    Classification { counts, problems }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROBE_FAILED_STATUS;
    use crate::redirects::model::RedirectMappingEntry;

    fn healthy(source: &str) -> ProbeResult {
        let url = format!("https://www.example.com{source}");
        ProbeResult {
            entry: RedirectMappingEntry {
                referenced_by: "https://www.example.com/redirects.json".into(),
                original_source: source.into(),
                original_destination: String::new(),
                is_duplicate_source: false,
                duplicate_ordinal: 0,
                is_over_qualified: false,
                has_identical_source_and_destination: false,
            },
            full_source_url: url.clone(),
            full_destination_url: url.clone(),
            final_url: Some(url.clone()),
            final_status_code: 200,
            was_redirected: false,
            redirect_hop_count: 0,
            redirect_chain_path: vec![url],
            final_matches_declared_destination: true,
            error_message: None,
        }
    }

    fn with_hops(source: &str, hops: usize, status: u16) -> ProbeResult {
        let mut result = healthy(source);
        result.was_redirected = hops > 0;
        result.redirect_hop_count = hops;
        result.final_status_code = status;
        result
    }

    #[test]
    fn test_healthy_entry_has_no_problem() {
        assert_eq!(select_category(&healthy("/ok")), None);
    }

    #[test]
    fn test_duplicate_wins_over_everything() {
        let mut result = with_hops("/dup", 3, 500);
        result.entry.is_duplicate_source = true;
        result.entry.duplicate_ordinal = 1;
        result.entry.is_over_qualified = true;
        result.entry.has_identical_source_and_destination = true;
        assert_eq!(
            select_category(&result),
            Some(ProblemCategory::DuplicateSource)
        );
    }

    #[test]
    fn test_structural_flags_precede_live_checks() {
        let mut over_qualified = with_hops("/oq", 0, 404);
        over_qualified.entry.is_over_qualified = true;
        over_qualified.entry.has_identical_source_and_destination = true;
        assert_eq!(
            select_category(&over_qualified),
            Some(ProblemCategory::OverQualified)
        );

        let mut same = with_hops("/same", 0, 404);
        same.entry.has_identical_source_and_destination = true;
        assert_eq!(
            select_category(&same),
            Some(ProblemCategory::SameSourceDestination)
        );
    }

    #[test]
    fn test_http_error_and_probe_failure() {
        assert_eq!(
            select_category(&with_hops("/gone", 0, 410)),
            Some(ProblemCategory::HttpError)
        );
        assert_eq!(
            select_category(&with_hops("/down", 0, PROBE_FAILED_STATUS)),
            Some(ProblemCategory::HttpError)
        );
    }

    #[test]
    fn test_404_page_destination() {
        let mut result = with_hops("/old", 1, 200);
        result.final_url = Some("https://www.example.com/404.html".into());
        result.final_matches_declared_destination = false;
        assert_eq!(
            select_category(&result),
            Some(ProblemCategory::RedirectsTo404Page)
        );
    }

    #[test]
    fn test_hop_count_categories() {
        assert_eq!(
            select_category(&with_hops("/loop", MAX_REDIRECT_HOPS, 302)),
            Some(ProblemCategory::MaxRedirectsExceeded)
        );
        assert_eq!(
            select_category(&with_hops("/long", MAX_REDIRECT_HOPS, 200)),
            Some(ProblemCategory::MaxRedirectsExceeded)
        );
        assert_eq!(
            select_category(&with_hops("/two", 2, 200)),
            Some(ProblemCategory::TooManyRedirects)
        );
        assert_eq!(select_category(&with_hops("/one", 1, 200)), None);
    }

    #[test]
    fn test_destination_mismatch() {
        let mut result = with_hops("/old", 1, 200);
        result.final_url = Some("https://www.example.com/elsewhere".into());
        result.final_matches_declared_destination = false;
        assert_eq!(
            select_category(&result),
            Some(ProblemCategory::DestinationMismatch)
        );
    }

    #[test]
    fn test_uncapped_redirect_status_is_http_error() {
        // A 3xx without a usable Location ends the walk early
        assert_eq!(
            select_category(&with_hops("/stuck", 1, 302)),
            Some(ProblemCategory::HttpError)
        );
    }

    #[test]
    fn test_classify_counts() {
        let mut duplicate = healthy("/dup");
        duplicate.entry.is_duplicate_source = true;
        duplicate.entry.duplicate_ordinal = 1;
        duplicate.redirect_hop_count = 3;

        let mut over_qualified = healthy("/oq");
        over_qualified.entry.is_over_qualified = true;
        over_qualified.entry.has_identical_source_and_destination = true;

        let results = vec![
            duplicate,
            over_qualified,
            with_hops("/gone", 0, 404),
            with_hops("/two", 2, 200),
            with_hops("/loop", MAX_REDIRECT_HOPS, 301),
            healthy("/ok"),
        ];

        let classification = classify(&results);
        let counts = &classification.counts;

        assert_eq!(counts.total_entries, 6);
        assert_eq!(counts.count_duplicate_source, 1);
        assert_eq!(counts.count_over_qualified, 1);
        assert_eq!(counts.count_same_source_destination, 1);
        assert_eq!(counts.count_http_errors, 1);
        assert_eq!(counts.count_max_redirects_exceeded, 1);
        // Duplicate (3 hops), /two and /loop
        assert_eq!(counts.count_too_many_redirects, 3);
        assert_eq!(counts.count_redirected, 2);
        assert_eq!(counts.count_destination_mismatch, 0);

        let categories: Vec<ProblemCategory> = classification
            .problems
            .iter()
            .map(|p| p.problem_category)
            .collect();
        assert_eq!(
            categories,
            vec![
                ProblemCategory::DuplicateSource,
                ProblemCategory::OverQualified,
                ProblemCategory::HttpError,
                ProblemCategory::TooManyRedirects,
                ProblemCategory::MaxRedirectsExceeded,
            ]
        );
        assert_eq!(counts.traffic.projected_traffic_lost, 1);
    }

    #[test]
    fn test_classify_empty() {
        let classification = classify(&[]);
        assert!(classification.problems.is_empty());
        assert_eq!(classification.counts, AggregateCounts::default());
    }
}
