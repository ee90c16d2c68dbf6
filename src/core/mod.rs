//! Issue data model shared by every pipeline stage.

pub mod issue;
pub mod language;

pub use issue::{
    extract_filename, Comment, Issue, IssueType, Severity, SourceLine, TextRange, UNKNOWN_LABEL,
};
pub use language::{language_from_extension, Language, PLAIN_TEXT_TOKEN};
