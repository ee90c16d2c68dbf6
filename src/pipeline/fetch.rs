//! Page-by-page retrieval of the issue listing.

use crate::config::ReportConfig;
use crate::core::Issue;
use crate::errors::{Error, Result};
use crate::source::IssueSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub page_size: u32,
    /// Page count at which the run is aborted instead of continuing
    pub max_pages: u32,
}

impl From<&ReportConfig> for FetchOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }
}

// Pure function: the feed is exhausted on an empty page or once the
// declared total from page 1 has been reached
fn is_exhausted(page_len: usize, fetched: usize, declared_total: u64) -> bool {
    page_len == 0 || fetched as u64 >= declared_total
}

/// Fetch every issue page, preserving page order.
///
/// The total declared by page 1 decides termination even if later pages
/// disagree. Any page failure aborts the whole fetch, as does reaching
/// `max_pages` without exhausting the feed.
pub fn fetch_all_issues<S>(source: &S, options: &FetchOptions) -> Result<Vec<Issue>>
where
    S: IssueSource + ?Sized,
{
    let mut issues = Vec::new();
    let mut declared_total = 0;
    let mut page = 1;

    loop {
        let response = source
            .fetch_page(page, options.page_size)
            .map_err(|source| Error::Fetch { page, source })?;

        if page == 1 {
            declared_total = response.declared_total();
            log::debug!("Issue listing declares {} issues", declared_total);
        }

        let page_len = response.issues.len();
        log::info!("Processing {} issues from page: {}", page_len, page);
        issues.extend(response.issues);

        if is_exhausted(page_len, issues.len(), declared_total) {
            break;
        }
        if page >= options.max_pages {
            return Err(Error::PageLimit {
                ceiling: options.max_pages,
                fetched: issues.len(),
            });
        }
        page += 1;
    }

    Ok(issues)
}
