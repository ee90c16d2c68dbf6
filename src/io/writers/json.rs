use crate::core::Issue;
use crate::errors::Result;
use crate::io::write_atomic;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::Write;
use std::path::Path;

/// Writes the enriched issue list as indented UTF-8 JSON
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_issues(&mut self, issues: &[Issue]) -> Result<()> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut self.writer, formatter);
        issues.serialize(&mut serializer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Dump `issues` to `path`, replacing any previous dump atomically.
///
/// Failures are `Error::Io` or `Error::Json`; both are fatal for the run.
pub fn write_issues_json(path: &Path, issues: &[Issue]) -> Result<()> {
    let mut buffer = Vec::new();
    JsonWriter::new(&mut buffer).write_issues(issues)?;
    write_atomic(path, &buffer)?;
    Ok(())
}
