//! Access to the remote issue service.
//!
//! The pipeline only sees the [`IssueSource`] trait, so fetching and
//! enrichment can be exercised against [`crate::testkit::MockIssueSource`]
//! without a network. [`HttpIssueSource`] is the production implementation.
//!
//! Response bodies are decoded here, schema first: an issue page is
//! `{issues: [...], total}` and a snippet payload is a map whose single entry
//! (keyed by a service-generated component id) holds a `sources` array.

pub mod http;

pub use http::HttpIssueSource;

use crate::core::{Issue, SourceLine};
use crate::errors::SourceError;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::fmt;

/// Read access to issue listings and per-issue snippets.
///
/// Implementations must be `Send + Sync`; the enricher shares one source
/// across its worker pool.
pub trait IssueSource: Send + Sync {
    /// Fetch one page (1-indexed) of the issue listing.
    fn fetch_page(&self, page: u32, page_size: u32) -> Result<IssuePage, SourceError>;

    /// Fetch the source snippet surrounding an issue.
    fn fetch_snippet(&self, issue_key: &str) -> Result<SnippetPayload, SourceError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    #[serde(default)]
    pub page_index: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
}

/// One page of the issue listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuePage {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl IssuePage {
    pub fn new(issues: Vec<Issue>, total: u64) -> Self {
        Self {
            issues,
            total: Some(total),
            paging: None,
        }
    }

    /// Total number of matching issues as announced by the service.
    ///
    /// Falls back to `paging.total` for servers that only report it there.
    pub fn declared_total(&self) -> u64 {
        self.total
            .or_else(|| self.paging.as_ref().map(|paging| paging.total))
            .unwrap_or(0)
    }
}

/// Decoded snippet response: the first component entry and its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetPayload {
    pub component: String,
    pub sources: Vec<SourceLine>,
}

#[derive(Deserialize)]
struct SnippetComponent {
    sources: Vec<SourceLine>,
}

impl<'de> Deserialize<'de> for SnippetPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = SnippetPayload;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map whose first entry holds a `sources` array")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let (component, body) = map
                    .next_entry::<String, SnippetComponent>()?
                    .ok_or_else(|| de::Error::custom("empty snippet payload"))?;
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(SnippetPayload {
                    component,
                    sources: body.sources,
                })
            }
        }

        deserializer.deserialize_map(PayloadVisitor)
    }
}

/// Decode an issue listing page.
pub fn decode_page(body: &str) -> Result<IssuePage, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))
}

/// Decode a snippet payload and order its lines by line number.
///
/// Invalid JSON is a `Decode` error; valid JSON of the wrong shape is a
/// `Shape` error.
/// The text is decoded directly rather than through `serde_json::Value` so
/// the first entry is the first one in the document.
pub fn decode_snippet(body: &str) -> Result<SnippetPayload, SourceError> {
    let mut payload =
        serde_json::from_str::<SnippetPayload>(body).map_err(|e| match e.classify() {
            Category::Data => SourceError::Shape(e.to_string()),
            Category::Syntax | Category::Eof | Category::Io => SourceError::Decode(e.to_string()),
        })?;
    payload.sources.sort_by_key(|source| source.line);
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_decode_page_reads_total() {
        let page = decode_page(r#"{"issues": [{"key": "A"}, {"key": "B"}], "total": 1037}"#)
            .unwrap();
        assert_eq!(page.issues.len(), 2);
        assert_eq!(page.declared_total(), 1037);
    }

    #[test]
    fn test_decode_page_falls_back_to_paging_total() {
        let page = decode_page(
            r#"{"issues": [], "paging": {"pageIndex": 1, "pageSize": 500, "total": 12}}"#,
        )
        .unwrap();
        assert_eq!(page.declared_total(), 12);
    }

    #[test]
    fn test_decode_page_without_total_is_zero() {
        let page = decode_page(r#"{"issues": []}"#).unwrap();
        assert_eq!(page.declared_total(), 0);
    }

    #[test]
    fn test_decode_page_rejects_garbage() {
        assert!(matches!(
            decode_page("<html>login</html>"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_snippet_takes_dynamic_first_entry() {
        let body = indoc! {r#"
            {
                "AYx3-generated-id": {
                    "component": {"key": "shop:src/Cart.java"},
                    "sources": [
                        {"line": 12, "code": "b();"},
                        {"line": 11, "code": "a();", "scmAuthor": "bob"}
                    ]
                }
            }
        "#};
        let payload = decode_snippet(body).unwrap();
        assert_eq!(payload.component, "AYx3-generated-id");
        let lines: Vec<u32> = payload.sources.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![11, 12]);
        assert_eq!(payload.sources[0].code, "a();");
    }

    #[test]
    fn test_decode_snippet_keeps_document_order() {
        let body = indoc! {r#"
            {
                "zzz-main": {
                    "sources": [{"line": 10, "code": "main_file();"}]
                },
                "aaa-flow": {
                    "sources": [{"line": 99, "code": "other_file();"}]
                }
            }
        "#};
        let payload = decode_snippet(body).unwrap();
        assert_eq!(payload.component, "zzz-main");
        assert_eq!(payload.sources.len(), 1);
        assert_eq!(payload.sources[0].line, 10);
        assert_eq!(payload.sources[0].code, "main_file();");
    }

    #[test]
    fn test_decode_snippet_empty_payload_is_shape_error() {
        assert!(matches!(decode_snippet("{}"), Err(SourceError::Shape(_))));
    }

    #[test]
    fn test_decode_snippet_missing_sources_is_shape_error() {
        let result = decode_snippet(r#"{"x": {"component": {}}}"#);
        assert!(matches!(result, Err(SourceError::Shape(_))));
    }

    #[test]
    fn test_decode_snippet_non_object_is_shape_error() {
        assert!(matches!(decode_snippet("[1, 2]"), Err(SourceError::Shape(_))));
        assert!(matches!(decode_snippet("nope"), Err(SourceError::Decode(_))));
    }
}
