use serde::{Deserialize, Serialize};
use std::path::Path;

/// Programming language of an issue's file, derived from its extension.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum Language {
    Java,
    Python,
    JavaScript,
    TypeScript,
    ReactJsx,
    ReactTsx,
    Cpp,
    C,
    CSharp,
    Php,
    Ruby,
    Go,
    Rust,
    Swift,
    Kotlin,
    Scala,
    Html,
    Css,
    Xml,
    Json,
    Yaml,
    Sql,
    Shell,
    Batch,
    PowerShell,
    Markdown,
    Docker,
    Terraform,
    Unknown,
}

static EXTENSION_MAP: &[(&[&str], Language)] = &[
    (&["java"], Language::Java),
    (&["py"], Language::Python),
    (&["js"], Language::JavaScript),
    (&["ts"], Language::TypeScript),
    (&["jsx"], Language::ReactJsx),
    (&["tsx"], Language::ReactTsx),
    (&["cpp"], Language::Cpp),
    (&["c"], Language::C),
    (&["cs"], Language::CSharp),
    (&["php"], Language::Php),
    (&["rb"], Language::Ruby),
    (&["go"], Language::Go),
    (&["rs"], Language::Rust),
    (&["swift"], Language::Swift),
    (&["kt"], Language::Kotlin),
    (&["scala"], Language::Scala),
    (&["html"], Language::Html),
    (&["css"], Language::Css),
    (&["xml"], Language::Xml),
    (&["json", "jsn"], Language::Json),
    (&["yaml", "yml"], Language::Yaml),
    (&["sql"], Language::Sql),
    (&["sh"], Language::Shell),
    (&["bat"], Language::Batch),
    (&["ps1"], Language::PowerShell),
    (&["md"], Language::Markdown),
    (&["dockerfile"], Language::Docker),
    (&["tf"], Language::Terraform),
];

// (language, display name, highlight.js identifier)
static LANGUAGE_TABLE: &[(Language, &str, &str)] = &[
    (Language::Java, "Java", "java"),
    (Language::Python, "Python", "python"),
    (Language::JavaScript, "JavaScript", "javascript"),
    (Language::TypeScript, "TypeScript", "typescript"),
    (Language::ReactJsx, "React JSX", "javascript"),
    (Language::ReactTsx, "React TSX", "typescript"),
    (Language::Cpp, "C++", "cpp"),
    (Language::C, "C", "c"),
    (Language::CSharp, "C#", "csharp"),
    (Language::Php, "PHP", "php"),
    (Language::Ruby, "Ruby", "ruby"),
    (Language::Go, "Go", "go"),
    (Language::Rust, "Rust", "rust"),
    (Language::Swift, "Swift", "swift"),
    (Language::Kotlin, "Kotlin", "kotlin"),
    (Language::Scala, "Scala", "scala"),
    (Language::Html, "HTML", "html"),
    (Language::Css, "CSS", "css"),
    (Language::Xml, "XML", "xml"),
    (Language::Json, "JSON", "json"),
    (Language::Yaml, "YAML", "yaml"),
    (Language::Sql, "SQL", "sql"),
    (Language::Shell, "Shell", "bash"),
    (Language::Batch, "Batch", "batch"),
    (Language::PowerShell, "PowerShell", "powershell"),
    (Language::Markdown, "Markdown", "markdown"),
    (Language::Docker, "Docker", "dockerfile"),
    (Language::Terraform, "Terraform", "hcl"),
    (Language::Unknown, "Unknown", PLAIN_TEXT_TOKEN),
];

/// Highlight.js identifier used when a language has no dedicated grammar.
pub const PLAIN_TEXT_TOKEN: &str = "plaintext";

impl Language {
    /// Match a bare extension (no leading dot), ignoring ASCII case.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map(|(_, lang)| *lang)
            .unwrap_or(Language::Unknown)
    }

    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn display_name(&self) -> &'static str {
        self.lookup().map(|(_, name, _)| *name).unwrap_or("Unknown")
    }

    /// Syntax-highlighting identifier for the report's code blocks.
    pub fn highlight_token(&self) -> &'static str {
        self.lookup()
            .map(|(_, _, token)| *token)
            .unwrap_or(PLAIN_TEXT_TOKEN)
    }

    fn lookup(&self) -> Option<&'static (Language, &'static str, &'static str)> {
        LANGUAGE_TABLE.iter().find(|(l, _, _)| l == self)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Display name of the language for a file path, `"Unknown"` when unmapped.
pub fn language_from_extension(file_path: &str) -> &'static str {
    Language::from_path(file_path).display_name()
}
