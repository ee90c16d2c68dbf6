use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on parallel snippet lookups
pub const MAX_SNIPPET_WORKERS: usize = 16;

/// Locale the HTML report starts in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Ru,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

/// Run configuration read from the file named on the command line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Base URL of the SonarQube server
    #[serde(default)]
    pub url: String,

    /// Component (project key) whose issues are listed
    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub project_name: String,

    #[serde(default)]
    pub project_version: String,

    #[serde(default)]
    pub branch: String,

    /// Session cookie value, accepted under its cookie name as well
    #[serde(default, alias = "JWT-SESSION")]
    pub session_token: String,

    /// Issues requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Hard ceiling on pages fetched before the run is aborted
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Pause each snippet worker takes after a lookup
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Concurrent snippet lookups; 1 keeps enrichment sequential
    #[serde(default = "default_snippet_workers")]
    pub snippet_workers: usize,

    #[serde(default = "default_scopes")]
    pub scopes: String,

    #[serde(default = "default_impact_severities")]
    pub impact_severities: String,

    #[serde(default = "default_impact_software_qualities")]
    pub impact_software_qualities: String,

    #[serde(default = "default_issue_statuses")]
    pub issue_statuses: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_json_output")]
    pub json_output: String,

    #[serde(default = "default_excel_output")]
    pub excel_output: String,

    #[serde(default = "default_html_output")]
    pub html_output: String,

    #[serde(default)]
    pub default_locale: Locale,
}

// Default values
pub fn default_page_size() -> u32 {
    500
}

pub fn default_max_pages() -> u32 {
    20
}

pub fn default_request_delay_ms() -> u64 {
    100
}

pub fn default_request_timeout_secs() -> u64 {
    30
}

pub fn default_snippet_workers() -> usize {
    1
}

pub fn default_scopes() -> String {
    "MAIN".to_string()
}

pub fn default_impact_severities() -> String {
    "BLOCKER,HIGH,MEDIUM,INFO,LOW".to_string()
}

pub fn default_impact_software_qualities() -> String {
    "RELIABILITY,SECURITY".to_string()
}

pub fn default_issue_statuses() -> String {
    "CONFIRMED,FALSE_POSITIVE,FIXED,OPEN".to_string()
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_json_output() -> String {
    "response_output.json".to_string()
}

pub fn default_excel_output() -> String {
    "sonarqube_issues_report.xlsx".to_string()
}

pub fn default_html_output() -> String {
    "sonarqube_comprehensive_report.html".to_string()
}

/// Where the three artifacts of a run are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub excel: PathBuf,
    pub html: PathBuf,
}

impl ReportConfig {
    /// Names of required fields that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("url", &self.url),
            ("project_id", &self.project_id),
            ("project_name", &self.project_name),
            ("project_version", &self.project_version),
            ("branch", &self.branch),
            ("session_token", &self.session_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(Error::Config {
                message: format!("missing required field(s): {}", missing.join(", ")),
                path: None,
                field: missing.first().map(|f| f.to_string()),
            });
        }
        if self.page_size == 0 {
            return Err(Error::config_field("page_size must be positive", "page_size"));
        }
        if self.max_pages == 0 {
            return Err(Error::config_field("max_pages must be positive", "max_pages"));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Worker count clamped to `1..=MAX_SNIPPET_WORKERS`
    pub fn worker_count(&self) -> usize {
        self.snippet_workers.clamp(1, MAX_SNIPPET_WORKERS)
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            json: self.output_dir.join(&self.json_output),
            excel: self.output_dir.join(&self.excel_output),
            html: self.output_dir.join(&self.html_output),
        }
    }
}

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Parse config text; TOML when `toml_format`, JSON otherwise
pub fn parse_config(contents: &str, toml_format: bool) -> Result<ReportConfig> {
    if toml_format {
        toml::from_str::<ReportConfig>(contents)
            .map_err(|e| Error::config(format!("invalid TOML: {}", e)))
    } else {
        serde_json::from_str::<ReportConfig>(contents)
            .map_err(|e| Error::config(format!("invalid JSON: {}", e)))
    }
}

/// Load and validate the configuration at `path`
pub fn load_config(path: &Path) -> Result<ReportConfig> {
    let contents = read_config_file(path).map_err(|e| {
        let message = if e.kind() == std::io::ErrorKind::NotFound {
            format!("config file '{}' not found", path.display())
        } else {
            format!("failed to read config file '{}': {}", path.display(), e)
        };
        Error::config_with_path(message, path)
    })?;

    let config = parse_config(&contents, is_toml(path)).map_err(|e| with_path(e, path))?;
    config.validate().map_err(|e| with_path(e, path))?;

    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn with_path(error: Error, config_path: &Path) -> Error {
    match error {
        Error::Config { message, field, .. } => Error::Config {
            message,
            path: Some(config_path.to_path_buf()),
            field,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    const FULL_JSON: &str = indoc! {r#"
        {
            "url": "https://sonar.example.com/",
            "project_id": "shop",
            "project_name": "Shop",
            "project_version": "1.4.0",
            "branch": "main",
            "JWT-SESSION": "token-123"
        }
    "#};

    #[test]
    fn test_parse_json_with_cookie_alias() {
        let config = parse_config(FULL_JSON, false).unwrap();
        assert_eq!(config.session_token, "token-123");
        assert_eq!(config.base_url(), "https://sonar.example.com");
        assert_eq!(config.page_size, 500);
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.default_locale, Locale::Ru);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let text = indoc! {r#"
            url = "https://sonar.example.com"
            project_id = "shop"
            project_name = "Shop"
            project_version = "1.4.0"
            branch = "develop"
            session_token = "abc"
            snippet_workers = 4
            default_locale = "en"
        "#};
        let config = parse_config(text, true).unwrap();
        assert_eq!(config.branch, "develop");
        assert_eq!(config.worker_count(), 4);
        assert_eq!(config.default_locale, Locale::En);
    }

    #[test]
    fn test_missing_fields_are_listed_together() {
        let config = parse_config(r#"{"url": "https://x", "branch": ""}"#, false).unwrap();
        let missing = config.missing_fields();
        assert_eq!(
            missing,
            vec![
                "project_id",
                "project_name",
                "project_version",
                "branch",
                "session_token"
            ]
        );
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("session_token"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = parse_config(FULL_JSON, false).unwrap();
        config.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_worker_count_is_bounded() {
        let mut config = parse_config(FULL_JSON, false).unwrap();
        config.snippet_workers = 0;
        assert_eq!(config.worker_count(), 1);
        config.snippet_workers = 500;
        assert_eq!(config.worker_count(), MAX_SNIPPET_WORKERS);
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_config(&temp_dir.path().join("nope.json")).unwrap_err();
        match err {
            Error::Config { message, path, .. } => {
                assert!(message.contains("not found"));
                assert!(path.is_some());
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_config_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_output_paths_join_output_dir() {
        let mut config = parse_config(FULL_JSON, false).unwrap();
        config.output_dir = PathBuf::from("/tmp/out");
        let paths = config.output_paths();
        assert_eq!(paths.json, PathBuf::from("/tmp/out/response_output.json"));
        assert_eq!(
            paths.html,
            PathBuf::from("/tmp/out/sonarqube_comprehensive_report.html")
        );
    }
}
