//! The fetch → enrich → classify → aggregate stages.
//!
//! `fetch` and `enrich` talk to an [`IssueSource`](crate::source::IssueSource);
//! `classify` and `stats` are pure functions over the enriched issue list and
//! feed both renderers.

pub mod classify;
pub mod enrich;
pub mod fetch;
pub mod stats;

pub use classify::{Category, Classification};
pub use enrich::{enrich_issues, EnrichOptions, EnrichmentSummary};
pub use fetch::{fetch_all_issues, FetchOptions};
pub use stats::{aggregate, DistributionRow, IssueStatistics, TypeCounts};
