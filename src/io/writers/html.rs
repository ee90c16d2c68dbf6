//! Single-file HTML report.
//!
//! The page shell lives in `templates/report.html`; this module renders the
//! data-dependent fragments (distribution rows, category sections, issue cards)
//! and fills the shell's `{{{NAME}}}` placeholders in one pass, so text coming
//! from the service can never be mistaken for a placeholder.

use super::i18n;
use crate::config::Locale;
use crate::core::{Comment, Issue};
use crate::errors::Error;
use crate::io::write_atomic;
use crate::pipeline::{Category, Classification, DistributionRow, IssueStatistics, TypeCounts};
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime};
use html_escape::{decode_html_entities, encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

const TEMPLATE: &str = include_str!("templates/report.html");

/// Snippet rows shown per issue card
pub const SNIPPET_LINE_LIMIT: usize = 15;

const COMMENT_DATE_FORMAT: &str = "%d.%m.%y %H:%M";
const HEADER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const NOT_AVAILABLE: &str = "N/A";

/// Everything the HTML document is rendered from
pub struct HtmlReport<'a> {
    pub project_name: &'a str,
    pub project_version: &'a str,
    pub generated_at: NaiveDateTime,
    pub default_locale: Locale,
    pub classification: &'a Classification<'a>,
    pub statistics: &'a IssueStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmlSummary {
    pub total_issues: usize,
    pub type_counts: TypeCounts,
    pub html_file: PathBuf,
}

pub struct HtmlWriter<W: Write> {
    writer: W,
    template: &'static str,
}

impl<W: Write> HtmlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            template: TEMPLATE,
        }
    }

    pub fn write_report(&mut self, report: &HtmlReport<'_>) -> Result<()> {
        let html = render_document(self.template, report)?;
        self.writer.write_all(html.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Render `report` and write it to `path`
pub fn write_html_report(path: &Path, report: &HtmlReport<'_>) -> Result<HtmlSummary, Error> {
    let mut buffer = Vec::new();
    HtmlWriter::new(&mut buffer)
        .write_report(report)
        .map_err(|e| Error::render("html", e.to_string()))?;
    write_atomic(path, &buffer)
        .map_err(|e| Error::render("html", format!("cannot write {}: {}", path.display(), e)))?;

    log::info!("HTML report generated: {}", path.display());
    Ok(HtmlSummary {
        total_issues: report.statistics.total,
        type_counts: TypeCounts::from_classification(report.classification),
        html_file: path.to_path_buf(),
    })
}

fn render_document(template: &str, report: &HtmlReport<'_>) -> Result<String> {
    let counts = TypeCounts::from_classification(report.classification);
    let translations = serde_json::to_string(&i18n::dictionary_json())?.replace("</", "<\\/");

    let values = [
        ("PROJECT_NAME", encode_text(report.project_name).into_owned()),
        (
            "PROJECT_NAME_ATTR",
            encode_double_quoted_attribute(report.project_name).into_owned(),
        ),
        ("PROJECT_VERSION", encode_text(report.project_version).into_owned()),
        (
            "TIMESTAMP",
            report.generated_at.format(HEADER_DATE_FORMAT).to_string(),
        ),
        ("TOTAL_ISSUES", report.statistics.total.to_string()),
        ("VULNERABILITY_COUNT", counts.vulnerabilities.to_string()),
        ("BUG_COUNT", counts.bugs.to_string()),
        ("CODE_SMELL_COUNT", counts.code_smells.to_string()),
        (
            "SEVERITY_ROWS",
            render_distribution_rows(&report.statistics.severity, i18n::severity_key),
        ),
        (
            "STATUS_ROWS",
            render_distribution_rows(&report.statistics.status, i18n::status_key),
        ),
        (
            "CATEGORY_SECTIONS",
            render_category_sections(report.classification),
        ),
        ("TRANSLATIONS", translations),
        ("DEFAULT_LOCALE", report.default_locale.code().to_string()),
    ];

    Ok(fill_placeholders(template, &values))
}

/// Substitute every `{{{NAME}}}` in `template` with its value.
///
/// Unknown placeholders are left as they are.
pub fn fill_placeholders(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        let Some(end) = after.find("}}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 3 + end + 3]),
        }
        rest = &after[end + 3..];
    }

    out.push_str(rest);
    out
}

/// Text node carrying a dictionary key, or plain text when the label has no
/// translation.
fn translatable(tag: &str, attrs: &str, key: &str, label: &str) -> String {
    let text = encode_text(label);
    if i18n::has_key(key) {
        format!(r#"<{tag}{attrs} data-i18n-key="{key}">{text}</{tag}>"#)
    } else {
        format!("<{tag}{attrs}>{text}</{tag}>")
    }
}

fn render_distribution_rows(rows: &[DistributionRow], key_of: fn(&str) -> String) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "                        <tr>{}<td>{}</td><td>{:.1}%</td></tr>\n",
                translatable("td", "", &key_of(&row.label), &row.label),
                row.count,
                row.percentage
            )
        })
        .collect()
}

fn render_category_sections(classification: &Classification<'_>) -> String {
    classification
        .iter()
        .filter(|(_, issues)| !issues.is_empty())
        .map(|(category, issues)| render_category_section(category, issues))
        .collect()
}

fn render_category_section(category: Category, issues: &[&Issue]) -> String {
    let mut out = format!(
        "            <div class=\"category-section\">\n                <h2 class=\"category-header\"><span data-i18n-key=\"category-header-{}\">{}</span> ({})</h2>\n",
        category.issue_type(),
        category.heading(),
        issues.len()
    );
    for (index, issue) in issues.iter().enumerate() {
        out.push_str(&render_issue_card(index + 1, issue));
    }
    out.push_str("            </div>\n");
    out
}

fn badge(kind: &str, label: &str) -> String {
    let key = format!("{kind}-{label}");
    let attrs = format!(
        r#" class="{kind}-badge {}""#,
        encode_double_quoted_attribute(&key)
    );
    translatable("span", &attrs, &key, label)
}

fn detail_item(key: &str, label: &str, value: &str) -> String {
    let value = if value.is_empty() { NOT_AVAILABLE } else { value };
    format!(
        r#"<div class="detail-item"><div class="detail-label" data-i18n-key="{key}">{label}</div><div class="detail-value">{}</div></div>"#,
        encode_text(value)
    )
}

fn render_issue_card(number: usize, issue: &Issue) -> String {
    let language = issue.language();
    let start_line = issue
        .start_line()
        .map(|line| line.to_string())
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str("                <div class=\"issue-card\">\n");
    out.push_str(&format!(
        "                    <div class=\"issue-header\"><span class=\"issue-number\">{number}</span> <span class=\"issue-source-file\">{} : <span>{start_line}</span></span>{}{}</div>\n",
        encode_text(issue.file_path()),
        badge("severity", issue.severity_label()),
        badge("status", issue.status_label()),
    ));

    out.push_str("                    <div class=\"issue-details\">\n");
    out.push_str("                        <div class=\"detail-grid\">");
    out.push_str(&detail_item("key", "Key", &issue.key));
    out.push_str(&detail_item("type", "Type", issue.issue_type.as_str()));
    out.push_str(&detail_item("author", "Author", &issue.author));
    out.push_str(&detail_item("rule", "Rule", &issue.rule));
    out.push_str(&detail_item("language", "Language", language.display_name()));
    out.push_str("</div>\n");

    out.push_str(&format!(
        "                        <div class=\"error-message-block\"><div class=\"error-message-header\"><span class=\"error-message-title\" data-i18n-key=\"issue-description\">Issue Description</span></div><div class=\"error-message-content\">{}</div></div>\n",
        encode_text(&issue.message)
    ));

    out.push_str(&render_snippet(issue));
    out.push_str(&render_comments(&issue.comments));
    out.push_str("                    </div>\n                </div>\n");
    out
}

/// Plain text of a service code line.
///
/// The service marks up syntax with `<span>` tags and sends literal `<`, `>`
/// and `&` as entities, so tags are dropped and entities decoded. An
/// unterminated `<` is kept as text.
fn plain_code(code: &str) -> String {
    let mut stripped = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(open) = rest.find('<') {
        stripped.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }
    stripped.push_str(rest);
    decode_html_entities(&stripped).into_owned()
}

/// Snippet table limited to [`SNIPPET_LINE_LIMIT`] rows; the row at the
/// issue's start line is highlighted. Empty when the issue has no sources.
fn render_snippet(issue: &Issue) -> String {
    if issue.sources.is_empty() {
        return String::new();
    }

    let language = issue.language();
    let token = language.highlight_token();
    let start_line = issue.start_line();

    let mut out = format!(
        "                        <div class=\"source-code\"><div class=\"code-header\"><span data-i18n-key=\"source-code\">Source Code</span><span class=\"code-language\">{}</span></div><div class=\"code-content\"><table class=\"code-table\">\n",
        encode_text(language.display_name())
    );
    for source in issue.sources.iter().take(SNIPPET_LINE_LIMIT) {
        let class = if Some(source.line) == start_line {
            "highlighted-line"
        } else {
            ""
        };
        out.push_str(&format!(
            "                            <tr class=\"{class}\"><td class=\"line-number\">{}</td><td class=\"line-content\"><pre><code class=\"language-{token}\">{}</code></pre></td></tr>\n",
            source.line,
            encode_text(&plain_code(&source.code))
        ));
    }
    out.push_str("                        </table></div></div>\n");
    out
}

fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return String::new();
    }

    let mut out = String::from(
        "                        <div class=\"comments-section\"><div class=\"detail-label\" data-i18n-key=\"comments\">Comments</div>\n",
    );
    for comment in comments {
        let author = if comment.author.is_empty() {
            "Unknown"
        } else {
            comment.author.as_str()
        };
        // htmlText is rendered markup from the service
        out.push_str(&format!(
            "                            <div class=\"comment\"><div class=\"comment-header\"><span>{}</span><span>{}</span></div><div class=\"comment-content\">{}</div></div>\n",
            encode_text(author),
            format_comment_date(&comment.created_at),
            comment.html_text
        ));
    }
    out.push_str("                        </div>\n");
    out
}

/// Pure function: parse a service timestamp in any of the accepted forms.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Comment timestamp as display HTML.
///
/// Keeps the wall-clock time of the original offset. Unparseable input is
/// shown as-is; an empty timestamp becomes the translated "unknown date".
pub fn format_comment_date(raw: &str) -> String {
    if raw.is_empty() {
        return r#"<span data-i18n-key="unknown-date">Unknown date</span>"#.to_string();
    }
    match parse_timestamp(raw) {
        Some(parsed) => parsed.format(COMMENT_DATE_FORMAT).to_string(),
        None => encode_text(raw).into_owned(),
    }
}
