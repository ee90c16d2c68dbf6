use super::language::Language;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Defect type of an issue.
///
/// Unrecognised tokens are kept verbatim in `Other` so they still reach the
/// JSON dump and the statistics, while staying out of every category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    Vulnerability,
    Bug,
    CodeSmell,
    Other(String),
}

impl IssueType {
    pub fn as_str(&self) -> &str {
        match self {
            IssueType::Vulnerability => "VULNERABILITY",
            IssueType::Bug => "BUG",
            IssueType::CodeSmell => "CODE_SMELL",
            IssueType::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, IssueType::Other(_))
    }

    fn is_missing(&self) -> bool {
        matches!(self, IssueType::Other(raw) if raw.is_empty())
    }
}

impl Default for IssueType {
    fn default() -> Self {
        IssueType::Other(String::new())
    }
}

impl From<String> for IssueType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "VULNERABILITY" => IssueType::Vulnerability,
            "BUG" => IssueType::Bug,
            "CODE_SMELL" => IssueType::CodeSmell,
            _ => IssueType::Other(raw),
        }
    }
}

impl From<IssueType> for String {
    fn from(issue_type: IssueType) -> Self {
        match issue_type {
            IssueType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue severity. Ordering of the named variants is display priority.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
    Other(String),
}

impl Severity {
    pub const PRIORITY_ORDER: [Severity; 5] = [
        Severity::Blocker,
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Blocker => "BLOCKER",
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
            Severity::Other(raw) => raw,
        }
    }

    /// Position in the display order; unrecognised severities sort last.
    pub fn rank(&self) -> usize {
        Self::PRIORITY_ORDER
            .iter()
            .position(|s| s == self)
            .unwrap_or(Self::PRIORITY_ORDER.len())
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "BLOCKER" => Severity::Blocker,
            "CRITICAL" => Severity::Critical,
            "MAJOR" => Severity::Major,
            "MINOR" => Severity::Minor,
            "INFO" => Severity::Info,
            _ => Severity::Other(raw),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "login", alias = "author", default)]
    pub author: String,
    #[serde(default)]
    pub created_at: String,
    /// Pre-rendered rich text from the service, embedded without escaping.
    #[serde(default)]
    pub html_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One line of a snippet attached during enrichment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    pub line: u32,
    #[serde(default)]
    pub code: String,
}

/// A single static-analysis finding as returned by the issue listing.
///
/// Fields the pipeline does not interpret are kept in `extra` so the JSON
/// dump reproduces the full service record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type", default, skip_serializing_if = "IssueType::is_missing")]
    pub issue_type: IssueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_range: Option<TextRange>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_rule_engine: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub sources: Vec<SourceLine>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Label used in distributions for an issue that carries no severity/status.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

impl Issue {
    pub fn new(key: impl Into<String>, issue_type: IssueType) -> Self {
        Self {
            key: key.into(),
            issue_type,
            severity: None,
            status: None,
            component: String::new(),
            text_range: None,
            message: String::new(),
            author: String::new(),
            rule: String::new(),
            resolution: None,
            external_rule_engine: None,
            comments: Vec::new(),
            sources: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Path of the file inside the project, without the module key.
    pub fn file_path(&self) -> &str {
        extract_filename(&self.component)
    }

    pub fn language(&self) -> Language {
        Language::from_path(self.file_path())
    }

    pub fn start_line(&self) -> Option<u32> {
        self.text_range.as_ref().map(|range| range.start_line)
    }

    pub fn severity_label(&self) -> &str {
        self.severity
            .as_ref()
            .map(Severity::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn first_comment(&self) -> Option<&Comment> {
        self.comments.first()
    }
}

/// Split a `"<moduleKey>:<filePath>"` component at its first colon.
///
/// Components without a colon are returned whole.
pub fn extract_filename(component: &str) -> &str {
    component
        .split_once(':')
        .map(|(_, path)| path)
        .unwrap_or(component)
}
