//! Error types for the fetch → enrich → classify → render pipeline.
//!
//! Errors fall into four groups that determine how far they travel:
//!
//! - **Configuration** (`Error::Config`): fatal before any network activity.
//! - **Fetch** (`Error::Fetch`, `Error::PageLimit`): fatal, the run produces no
//!   artifacts.
//! - **Enrichment** (`Error::Enrichment`): recovered per issue by the enricher;
//!   it only ever surfaces as a warning and an empty `sources` list.
//! - **Render** (`Error::Render`): caught at the top of each renderer so the
//!   other renderer still runs.
//!
//! Failures of the remote service are described by [`SourceError`], which the
//! pipeline wraps with the page number or issue key it was working on.

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the issue service or decoding one of its responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {code} from {url}")]
    Status { code: u16, url: String },

    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not valid JSON for the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The body was JSON but not in the expected shape.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// Main error type for sonarmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Missing, unreadable or malformed configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        field: Option<String>,
    },

    /// A page of the issue listing could not be retrieved
    #[error("Failed to fetch issue page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: SourceError,
    },

    /// Pagination hit the configured page ceiling before the feed was exhausted
    #[error(
        "Reached the page limit of {ceiling} pages ({fetched} issues fetched); \
         narrow the issue filters so the result set is smaller"
    )]
    PageLimit { ceiling: u32, fetched: usize },

    /// Snippet lookup for a single issue failed
    #[error("Failed to fetch snippet for issue {key}: {source}")]
    Enrichment {
        key: String,
        #[source]
        source: SourceError,
    },

    /// Building or writing one of the report artifacts failed
    #[error("Failed to render {artifact}: {message}")]
    Render {
        artifact: &'static str,
        message: String,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
            field: None,
        }
    }

    /// Create a configuration error tied to the file it came from
    pub fn config_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path.into()),
            field: None,
        }
    }

    /// Create a configuration error for a single offending field
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
            field: Some(field.into()),
        }
    }

    /// Create a render error for the named artifact
    pub fn render(artifact: &'static str, message: impl Into<String>) -> Self {
        Self::Render {
            artifact,
            message: message.into(),
        }
    }

    /// Whether the error must stop the whole run.
    ///
    /// Enrichment and render failures are contained by the stage that
    /// produced them.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Enrichment { .. } | Self::Render { .. })
    }

    /// Process exit code for a fatal error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Fetch { .. } | Self::PageLimit { .. } => 3,
            _ => 1,
        }
    }
}

/// Result type alias for sonarmap operations
pub type Result<T> = std::result::Result<T, Error>;
