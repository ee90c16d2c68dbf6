//! Attaches source snippets to fetched issues.
//!
//! Every issue with a line reference gets one snippet lookup. A failed lookup
//! only affects its own issue: the failure is logged with the issue key, the
//! issue keeps an empty `sources` list, and the remaining issues proceed.
//!
//! Lookups run on a bounded rayon pool (`workers` threads, default 1). Each
//! worker pauses for `delay` after every request, which caps the request rate
//! at roughly `workers / delay`. Workers only ever write their own issue's
//! `sources`; the shared counters are atomics.

use crate::config::ReportConfig;
use crate::core::{Issue, SourceLine};
use crate::errors::Error;
use crate::source::IssueSource;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Log a progress line every this many issues
const PROGRESS_LOG_INTERVAL: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    pub workers: usize,
    pub delay: Duration,
}

impl From<&ReportConfig> for EnrichOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            workers: config.worker_count(),
            delay: config.request_delay(),
        }
    }
}

/// What happened to one issue during enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetOutcome {
    /// No line reference (or no key); nothing was requested
    Skipped,
    /// Lookup succeeded and this many lines were attached
    Attached(usize),
    /// Lookup failed; `sources` was left empty
    Failed,
}

impl SnippetOutcome {
    fn made_request(&self) -> bool {
        !matches!(self, SnippetOutcome::Skipped)
    }
}

/// Counts reported at the end of enrichment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub processed: usize,
    pub with_line: usize,
    pub enriched: usize,
    pub failed: usize,
}

/// Look up the snippet for one issue without touching it.
///
/// `Ok(None)` means the issue has nothing to look up.
pub fn fetch_sources<S>(source: &S, issue: &Issue) -> Result<Option<Vec<SourceLine>>, Error>
where
    S: IssueSource + ?Sized,
{
    if issue.text_range.is_none() || issue.key.is_empty() {
        return Ok(None);
    }

    source
        .fetch_snippet(&issue.key)
        .map(|payload| Some(payload.sources))
        .map_err(|source| Error::Enrichment {
            key: issue.key.clone(),
            source,
        })
}

/// Enrich a single issue in place, recovering from lookup failure.
pub fn enrich_issue<S>(source: &S, issue: &mut Issue) -> SnippetOutcome
where
    S: IssueSource + ?Sized,
{
    match fetch_sources(source, issue) {
        Ok(Some(lines)) => {
            let count = lines.len();
            issue.sources = lines;
            SnippetOutcome::Attached(count)
        }
        Ok(None) => {
            issue.sources = Vec::new();
            SnippetOutcome::Skipped
        }
        Err(e) => {
            log::warn!("{}", e);
            issue.sources = Vec::new();
            SnippetOutcome::Failed
        }
    }
}

/// Enrich every issue, sequentially or on a bounded worker pool.
pub fn enrich_issues<S>(
    source: &S,
    issues: &mut [Issue],
    options: &EnrichOptions,
    progress: &ProgressBar,
) -> EnrichmentSummary
where
    S: IssueSource + ?Sized,
{
    let total = issues.len();
    let processed = AtomicUsize::new(0);
    let with_line = AtomicUsize::new(0);
    let enriched = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    log::info!("Fetching source code snippets for issues...");

    let work = |issue: &mut Issue| {
        let outcome = enrich_issue(source, issue);
        match outcome {
            SnippetOutcome::Attached(_) => {
                with_line.fetch_add(1, Ordering::Relaxed);
                enriched.fetch_add(1, Ordering::Relaxed);
            }
            SnippetOutcome::Failed => {
                with_line.fetch_add(1, Ordering::Relaxed);
                failed.fetch_add(1, Ordering::Relaxed);
            }
            SnippetOutcome::Skipped => {}
        }
        if outcome.made_request() && !options.delay.is_zero() {
            std::thread::sleep(options.delay);
        }

        let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
        progress.inc(1);
        if done % PROGRESS_LOG_INTERVAL == 0 || done == total {
            log::info!(
                "Processed {}/{} issues, fetched snippets for {} issues",
                done,
                total,
                enriched.load(Ordering::Relaxed)
            );
        }
    };

    if options.workers <= 1 {
        issues.iter_mut().for_each(&work);
    } else {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
        {
            Ok(pool) => pool.install(|| issues.par_iter_mut().for_each(&work)),
            Err(e) => {
                log::warn!(
                    "Could not start {} snippet workers ({}); continuing sequentially",
                    options.workers,
                    e
                );
                issues.iter_mut().for_each(&work);
            }
        }
    }

    let summary = EnrichmentSummary {
        processed: processed.into_inner(),
        with_line: with_line.into_inner(),
        enriched: enriched.into_inner(),
        failed: failed.into_inner(),
    };
    log::info!(
        "Successfully fetched snippets for {} out of {} issues",
        summary.enriched,
        total
    );
    summary
}

/// Give every issue an empty `sources` list without any lookups.
pub fn skip_enrichment(issues: &mut [Issue]) -> EnrichmentSummary {
    issues.iter_mut().for_each(|issue| issue.sources.clear());
    EnrichmentSummary {
        processed: issues.len(),
        ..EnrichmentSummary::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::testkit::{IssueBuilder, MockIssueSource};
    use pretty_assertions::assert_eq;

    fn sequential() -> EnrichOptions {
        EnrichOptions {
            workers: 1,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_issue_without_text_range_makes_no_request() {
        let source = MockIssueSource::new().with_snippet("AX-1", &[(1, "x")]);
        let mut issues = vec![IssueBuilder::bug("AX-1").build()];

        let summary = enrich_issues(&source, &mut issues, &sequential(), &ProgressBar::hidden());

        assert!(source.snippet_requests().is_empty());
        assert!(issues[0].sources.is_empty());
        assert_eq!(summary.enriched, 0);
        assert_eq!(summary.processed, 1);
    }

    #[test]
    fn test_failed_lookup_is_contained() {
        let source = MockIssueSource::new()
            .with_snippet_error(
                "AX-1",
                SourceError::Status {
                    code: 500,
                    url: "mock://snippets".into(),
                },
            )
            .with_snippet("AX-2", &[(9, "b();"), (10, "c();")]);
        let mut issues = vec![
            IssueBuilder::bug("AX-1").line(4).build(),
            IssueBuilder::bug("AX-2").line(10).build(),
        ];

        let summary = enrich_issues(&source, &mut issues, &sequential(), &ProgressBar::hidden());

        assert!(issues[0].sources.is_empty());
        assert_eq!(issues[1].sources.len(), 2);
        assert_eq!(
            summary,
            EnrichmentSummary {
                processed: 2,
                with_line: 2,
                enriched: 1,
                failed: 1,
            }
        );
        assert_eq!(source.snippet_requests(), vec!["AX-1", "AX-2"]);
    }

    #[test]
    fn test_missing_key_makes_no_request() {
        let source = MockIssueSource::new();
        let mut issue = IssueBuilder::bug("").line(3).build();

        let outcome = enrich_issue(&source, &mut issue);

        assert_eq!(outcome, SnippetOutcome::Skipped);
        assert!(source.snippet_requests().is_empty());
    }

    #[test]
    fn test_enrichment_replaces_stale_sources() {
        let source = MockIssueSource::new();
        let mut issue = IssueBuilder::bug("AX-9").line(3).sources(1, 5).build();

        let outcome = enrich_issue(&source, &mut issue);

        assert_eq!(outcome, SnippetOutcome::Failed);
        assert!(issue.sources.is_empty());
    }

    #[test]
    fn test_worker_pool_enriches_every_issue_once() {
        let mut source = MockIssueSource::new();
        let mut issues = Vec::new();
        for i in 0..40u32 {
            let key = format!("AX-{i}");
            source = source.with_snippet(key.clone(), &[(i + 1, "line")]);
            issues.push(IssueBuilder::code_smell(key).line(i + 1).build());
        }
        let options = EnrichOptions {
            workers: 4,
            delay: Duration::ZERO,
        };

        let summary = enrich_issues(&source, &mut issues, &options, &ProgressBar::hidden());

        assert_eq!(summary.enriched, 40);
        assert_eq!(source.snippet_requests().len(), 40);
        for (i, issue) in issues.iter().enumerate() {
            assert_eq!(issue.sources[0].line, i as u32 + 1);
        }
    }

    #[test]
    fn test_skip_enrichment_clears_sources() {
        let mut issues = vec![IssueBuilder::bug("AX-1").line(2).sources(1, 3).build()];
        let summary = skip_enrichment(&mut issues);
        assert!(issues[0].sources.is_empty());
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.enriched, 0);
    }
}
