//! SonarQube Web API client built on `ureq`.

use super::{decode_page, decode_snippet, IssuePage, IssueSource, SnippetPayload};
use crate::config::ReportConfig;
use crate::errors::SourceError;
use std::io::Read;

const ISSUES_SEARCH_PATH: &str = "/api/issues/search";
const ISSUE_SNIPPETS_PATH: &str = "/api/sources/issue_snippets";
const SESSION_COOKIE: &str = "JWT-SESSION";

/// Filters applied to every listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilters {
    pub component: String,
    pub branch: String,
    pub scopes: String,
    pub impact_severities: String,
    pub impact_software_qualities: String,
    pub issue_statuses: String,
}

impl From<&ReportConfig> for ListingFilters {
    fn from(config: &ReportConfig) -> Self {
        Self {
            component: config.project_id.clone(),
            branch: config.branch.clone(),
            scopes: config.scopes.clone(),
            impact_severities: config.impact_severities.clone(),
            impact_software_qualities: config.impact_software_qualities.clone(),
            issue_statuses: config.issue_statuses.clone(),
        }
    }
}

impl ListingFilters {
    /// Query pairs for one listing page
    pub fn query(&self, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
        vec![
            ("components", self.component.clone()),
            ("branch", self.branch.clone()),
            ("scopes", self.scopes.clone()),
            ("impactSeverities", self.impact_severities.clone()),
            ("impactSoftwareQualities", self.impact_software_qualities.clone()),
            ("issueStatuses", self.issue_statuses.clone()),
            ("ps", page_size.to_string()),
            ("p", page.to_string()),
            ("additionalFields", "_all".to_string()),
        ]
    }
}

/// Issue source backed by a SonarQube server
pub struct HttpIssueSource {
    agent: ureq::Agent,
    base_url: String,
    session_cookie: String,
    filters: ListingFilters,
}

impl HttpIssueSource {
    pub fn new(config: &ReportConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .user_agent(concat!("sonarmap/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            base_url: config.base_url().to_string(),
            session_cookie: format!("{}={}", SESSION_COOKIE, config.session_token),
            filters: ListingFilters::from(config),
        }
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let request = query.iter().fold(
            self.agent
                .get(&url)
                .set("Accept", "application/json")
                .set("Cookie", &self.session_cookie),
            |request, (name, value)| request.query(name, value),
        );

        log::trace!("GET {}", url);
        match request.call() {
            Ok(response) => {
                let mut body = String::new();
                response
                    .into_reader()
                    .read_to_string(&mut body)
                    .map_err(|e| SourceError::Transport(e.to_string()))?;
                Ok(body)
            }
            Err(ureq::Error::Status(code, _)) => Err(SourceError::Status { code, url }),
            Err(ureq::Error::Transport(transport)) => {
                Err(SourceError::Transport(transport.to_string()))
            }
        }
    }
}

impl IssueSource for HttpIssueSource {
    fn fetch_page(&self, page: u32, page_size: u32) -> Result<IssuePage, SourceError> {
        let body = self.get(ISSUES_SEARCH_PATH, &self.filters.query(page, page_size))?;
        decode_page(&body)
    }

    fn fetch_snippet(&self, issue_key: &str) -> Result<SnippetPayload, SourceError> {
        let body = self.get(ISSUE_SNIPPETS_PATH, &[("issueKey", issue_key.to_string())])?;
        decode_snippet(&body)
    }
}
