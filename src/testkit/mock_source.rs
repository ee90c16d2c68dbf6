//! In-memory issue service for tests.
//!
//! [`MockIssueSource`] implements [`IssueSource`] over canned pages and
//! snippets and records every request it receives, so tests can assert both
//! the pipeline's output and how many round-trips it made.
//!
//! The internal state uses `Arc<RwLock<_>>`, making the mock `Send + Sync +
//! Clone` and safe to share with the enricher's worker pool.

use crate::core::{Issue, SourceLine};
use crate::errors::SourceError;
use crate::source::{IssuePage, IssueSource, SnippetPayload};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct MockState {
    pages: Vec<Result<IssuePage, SourceError>>,
    endless_page: Option<IssuePage>,
    snippets: HashMap<String, Result<SnippetPayload, SourceError>>,
    page_requests: Vec<u32>,
    snippet_requests: Vec<String>,
}

/// Scripted [`IssueSource`] with request recording.
///
/// # Example
///
/// ```rust
/// use sonarmap::testkit::{IssueBuilder, MockIssueSource};
/// use sonarmap::source::IssueSource;
///
/// let source = MockIssueSource::new()
///     .with_page(vec![IssueBuilder::bug("AX-1").build()], 1)
///     .with_snippet("AX-1", &[(10, "let x = 1;")]);
///
/// assert_eq!(source.fetch_page(1, 500).unwrap().issues.len(), 1);
/// assert_eq!(source.page_requests(), vec![1]);
/// ```
#[derive(Clone, Default)]
pub struct MockIssueSource {
    state: Arc<RwLock<MockState>>,
}

impl MockIssueSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page; `total` is the declared total the page reports.
    pub fn with_page(self, issues: Vec<Issue>, total: u64) -> Self {
        self.state
            .write()
            .expect("Lock poisoned")
            .pages
            .push(Ok(IssuePage::new(issues, total)));
        self
    }

    /// Append a page request that fails.
    pub fn with_page_error(self, error: SourceError) -> Self {
        self.state
            .write()
            .expect("Lock poisoned")
            .pages
            .push(Err(error));
        self
    }

    /// Serve `page_len` fresh issues on every page past the scripted ones,
    /// with a declared total the feed never reaches.
    pub fn with_endless_pages(self, page_len: usize) -> Self {
        let issues = (0..page_len)
            .map(|i| IssueBuilder::code_smell(format!("ENDLESS-{i}")).build())
            .collect();
        self.state.write().expect("Lock poisoned").endless_page =
            Some(IssuePage::new(issues, u64::MAX));
        self
    }

    /// Register a snippet for an issue key.
    pub fn with_snippet(self, key: impl Into<String>, lines: &[(u32, &str)]) -> Self {
        let key = key.into();
        let payload = SnippetPayload {
            component: format!("component-of-{key}"),
            sources: lines
                .iter()
                .map(|(line, code)| SourceLine {
                    line: *line,
                    code: code.to_string(),
                })
                .collect(),
        };
        self.state
            .write()
            .expect("Lock poisoned")
            .snippets
            .insert(key, Ok(payload));
        self
    }

    /// Make the snippet lookup for `key` fail.
    pub fn with_snippet_error(self, key: impl Into<String>, error: SourceError) -> Self {
        self.state
            .write()
            .expect("Lock poisoned")
            .snippets
            .insert(key.into(), Err(error));
        self
    }

    /// Page numbers requested so far, in request order.
    pub fn page_requests(&self) -> Vec<u32> {
        self.state
            .read()
            .expect("Lock poisoned")
            .page_requests
            .clone()
    }

    /// Issue keys whose snippet was requested, in request order.
    pub fn snippet_requests(&self) -> Vec<String> {
        self.state
            .read()
            .expect("Lock poisoned")
            .snippet_requests
            .clone()
    }
}

impl IssueSource for MockIssueSource {
    fn fetch_page(&self, page: u32, _page_size: u32) -> Result<IssuePage, SourceError> {
        let mut state = self.state.write().expect("Lock poisoned");
        state.page_requests.push(page);

        let index = page.saturating_sub(1) as usize;
        match state.pages.get(index) {
            Some(scripted) => scripted.clone(),
            None => Ok(state.endless_page.clone().unwrap_or_default()),
        }
    }

    fn fetch_snippet(&self, issue_key: &str) -> Result<SnippetPayload, SourceError> {
        let mut state = self.state.write().expect("Lock poisoned");
        state.snippet_requests.push(issue_key.to_string());

        state
            .snippets
            .get(issue_key)
            .cloned()
            .unwrap_or_else(|| {
                Err(SourceError::Status {
                    code: 404,
                    url: format!("mock://snippets/{issue_key}"),
                })
            })
    }
}

/// Fluent builder for test issues.
pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn new(key: impl Into<String>, issue_type: &str) -> Self {
        let mut issue = Issue::new(key, issue_type.to_string().into());
        issue.component = "shop:src/main/java/Cart.java".to_string();
        issue.status = Some("OPEN".to_string());
        issue.severity = Some(crate::core::Severity::Major);
        Self { issue }
    }

    pub fn vulnerability(key: impl Into<String>) -> Self {
        Self::new(key, "VULNERABILITY")
    }

    pub fn bug(key: impl Into<String>) -> Self {
        Self::new(key, "BUG")
    }

    pub fn code_smell(key: impl Into<String>) -> Self {
        Self::new(key, "CODE_SMELL")
    }

    pub fn severity(mut self, severity: &str) -> Self {
        self.issue.severity = Some(severity.to_string().into());
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.issue.status = Some(status.to_string());
        self
    }

    pub fn component(mut self, component: &str) -> Self {
        self.issue.component = component.to_string();
        self
    }

    pub fn line(mut self, start_line: u32) -> Self {
        self.issue.text_range = Some(crate::core::TextRange {
            start_line,
            end_line: Some(start_line),
            start_offset: None,
            end_offset: None,
        });
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.issue.message = message.to_string();
        self
    }

    pub fn comment(mut self, author: &str, created_at: &str, html_text: &str) -> Self {
        self.issue.comments.push(crate::core::Comment {
            author: author.to_string(),
            created_at: created_at.to_string(),
            html_text: html_text.to_string(),
            extra: Default::default(),
        });
        self
    }

    /// Attach `count` consecutive source lines starting at `first_line`.
    pub fn sources(mut self, first_line: u32, count: u32) -> Self {
        self.issue.sources = (first_line..first_line + count)
            .map(|line| SourceLine {
                line,
                code: format!("statement_{line}();"),
            })
            .collect();
        self
    }

    pub fn build(self) -> Issue {
        self.issue
    }
}
