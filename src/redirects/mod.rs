//! Redirect map auditing.
//!
//! The pipeline runs in four stages, each in its own module:
//! - `loader` - fetch the declared map and flag structural problems
//! - `resolver` - probe every rule against the live site
//! - `classifier` - pick each rule's headline problem and tally counts
//! - `fixes` - attach remediation to each problem

mod classifier;
mod fixes;
mod loader;
mod model;
mod resolver;

pub use classifier::{classify, select_category};
pub use fixes::{
    can_apply_automatically, fix_type_for, generate_fixes, issue_key, projected_traffic,
};
pub use loader::{
    build_entries, load_redirect_map, redirects_url, HttpMapFetcher, MapFetcher, MapResponse,
    RawMapping, RedirectMapPage,
};
pub use model::{
    AggregateCounts, ClassifiedIssue, Classification, FixType, ProbeResult, ProblemCategory,
    RedirectIssue, RedirectMappingEntry, TrafficMetrics,
};
pub use resolver::{
    is_redirect_status, resolve_all, resolve_entry, FollowOutcome, HopOutcome, HttpProber, Prober,
};
