//! Spreadsheet report: one sheet per category.
//!
//! Rendering is split in two so the layout can be checked without parsing a
//! workbook: [`SheetModel::build`] lays out the cells, widths and filter range,
//! and [`render_workbook`] turns the models into `.xlsx` bytes.

use crate::core::Issue;
use crate::errors::Error;
use crate::io::write_atomic;
use crate::pipeline::{Category, Classification};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{Color, DocProperties, ExcelDateTime, Format, Workbook, XlsxError};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const HEADERS: [&str; 12] = [
    "Key",
    "External Rule Engine",
    "File",
    "Line",
    "Language",
    "Message",
    "Status",
    "Severity",
    "Resolution",
    "Comment",
    "Comment Author",
    "Code Author",
];

pub const COLUMN_COUNT: usize = HEADERS.len();

/// Widest a column is ever auto-sized to
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Longest string Excel accepts in a cell
const MAX_CELL_CHARS: usize = 32_767;

const HEADER_BACKGROUND: u32 = 0x366092;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    fn text(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else if value.chars().count() > MAX_CELL_CHARS {
            CellValue::Text(value.chars().take(MAX_CELL_CHARS).collect())
        } else {
            CellValue::Text(value.to_string())
        }
    }

    fn display_len(&self) -> usize {
        match self {
            CellValue::Text(text) => text.chars().count(),
            CellValue::Number(number) => number.to_string().len(),
            CellValue::Empty => 0,
        }
    }
}

/// Cells, column widths and filter range of one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetModel {
    pub name: &'static str,
    pub rows: Vec<[CellValue; COLUMN_COUNT]>,
    pub column_widths: [usize; COLUMN_COUNT],
}

/// Inclusive cell range `(first_row, first_col, last_row, last_col)`
pub type FilterRange = (u32, u16, u32, u16);

fn issue_row(issue: &Issue) -> [CellValue; COLUMN_COUNT] {
    let file_path = issue.file_path();
    let (comment, comment_author) = issue
        .first_comment()
        .map(|c| (c.html_text.as_str(), c.author.as_str()))
        .unwrap_or(("", ""));

    [
        CellValue::text(&issue.key),
        CellValue::text(issue.external_rule_engine.as_deref().unwrap_or("")),
        CellValue::text(file_path),
        issue
            .start_line()
            .map(|line| CellValue::Number(f64::from(line)))
            .unwrap_or(CellValue::Empty),
        CellValue::text(issue.language().display_name()),
        CellValue::text(&issue.message),
        CellValue::text(issue.status.as_deref().unwrap_or("")),
        CellValue::text(issue.severity.as_ref().map(|s| s.as_str()).unwrap_or("")),
        CellValue::text(issue.resolution.as_deref().unwrap_or("")),
        CellValue::text(comment),
        CellValue::text(comment_author),
        CellValue::text(&issue.author),
    ]
}

impl SheetModel {
    pub fn build(category: Category, issues: &[&Issue]) -> Self {
        let rows: Vec<[CellValue; COLUMN_COUNT]> = issues.iter().map(|i| issue_row(i)).collect();

        let mut column_widths = [0; COLUMN_COUNT];
        for (col, header) in HEADERS.iter().enumerate() {
            let widest = rows
                .iter()
                .map(|row| row[col].display_len())
                .max()
                .unwrap_or(0)
                .max(header.chars().count());
            column_widths[col] = (widest + 2).min(MAX_COLUMN_WIDTH);
        }

        Self {
            name: category.sheet_name(),
            rows,
            column_widths,
        }
    }

    /// Header plus every data row
    pub fn filter_range(&self) -> FilterRange {
        (0, 0, self.rows.len() as u32, (COLUMN_COUNT - 1) as u16)
    }
}

/// Sheet models for all three categories, in report order
pub fn build_workbook_model(classification: &Classification<'_>) -> Vec<SheetModel> {
    classification
        .iter()
        .map(|(category, issues)| SheetModel::build(category, issues))
        .collect()
}

fn excel_datetime(at: NaiveDateTime) -> Result<ExcelDateTime, XlsxError> {
    ExcelDateTime::from_ymd(at.year() as u16, at.month() as u8, at.day() as u8)?.and_hms(
        at.hour() as u16,
        at.minute() as u8,
        at.second() as u8,
    )
}

/// Serialize sheet models into `.xlsx` bytes.
///
/// The workbook's creation time is pinned to `created_at`, so the same
/// models and timestamp always give the same bytes.
pub fn render_workbook(
    sheets: &[SheetModel],
    created_at: NaiveDateTime,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let properties = DocProperties::new().set_creation_datetime(&excel_datetime(created_at)?);
    workbook.set_properties(&properties);
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BACKGROUND));

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (index, row) in sheet.rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    CellValue::Text(text) => {
                        worksheet.write_string(row_num, col as u16, text)?;
                    }
                    CellValue::Number(number) => {
                        worksheet.write_number(row_num, col as u16, *number)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }

        for (col, width) in sheet.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width as f64)?;
        }

        let (first_row, first_col, last_row, last_col) = sheet.filter_range();
        worksheet.autofilter(first_row, first_col, last_row, last_col)?;
    }

    workbook.save_to_buffer()
}

/// Per-category row counts of a written workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcelSummary {
    pub vulnerabilities: usize,
    pub bugs: usize,
    pub code_smells: usize,
    pub excel_file: PathBuf,
}

/// Build and write the spreadsheet report to `path`
pub fn write_excel_report(
    path: &Path,
    classification: &Classification<'_>,
    generated_at: NaiveDateTime,
) -> Result<ExcelSummary, Error> {
    let sheets = build_workbook_model(classification);
    let bytes = render_workbook(&sheets, generated_at)
        .map_err(|e| Error::render("spreadsheet", e.to_string()))?;
    write_atomic(path, &bytes).map_err(|e| {
        Error::render("spreadsheet", format!("cannot write {}: {}", path.display(), e))
    })?;

    log::info!("Excel report generated: {}", path.display());
    Ok(ExcelSummary {
        vulnerabilities: classification.vulnerabilities.len(),
        bugs: classification.bugs.len(),
        code_smells: classification.code_smells.len(),
        excel_file: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::IssueBuilder;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 5, 30))
            .unwrap()
    }

    fn sample_issues() -> Vec<Issue> {
        vec![
            IssueBuilder::vulnerability("V1")
                .component("shop:src/app.py")
                .line(7)
                .message("Use a parameterized query")
                .comment("alice", "2024-01-15T10:30:00+0000", "first")
                .comment("bob", "2024-01-16T10:30:00+0000", "second")
                .build(),
            IssueBuilder::bug("B1").build(),
        ]
    }

    #[test]
    fn test_row_layout() {
        let issues = sample_issues();
        let classification = Classification::classify(&issues);
        let sheet = SheetModel::build(Category::Vulnerabilities, &classification.vulnerabilities);

        let row = &sheet.rows[0];
        assert_eq!(row[0], CellValue::Text("V1".into()));
        assert_eq!(row[1], CellValue::Empty);
        assert_eq!(row[2], CellValue::Text("src/app.py".into()));
        assert_eq!(row[3], CellValue::Number(7.0));
        assert_eq!(row[4], CellValue::Text("Python".into()));
        assert_eq!(row[9], CellValue::Text("first".into()));
        assert_eq!(row[10], CellValue::Text("alice".into()));
    }

    #[test]
    fn test_missing_line_is_blank() {
        let issues = sample_issues();
        let classification = Classification::classify(&issues);
        let sheet = SheetModel::build(Category::Bugs, &classification.bugs);
        assert_eq!(sheet.rows[0][3], CellValue::Empty);
    }

    #[test]
    fn test_column_widths_are_capped() {
        let long = "x".repeat(300);
        let issues = vec![IssueBuilder::bug("B1").message(&long).build()];
        let classification = Classification::classify(&issues);
        let sheet = SheetModel::build(Category::Bugs, &classification.bugs);

        assert_eq!(sheet.column_widths[5], MAX_COLUMN_WIDTH);
        // "External Rule Engine" header drives its empty column
        assert_eq!(sheet.column_widths[1], "External Rule Engine".len() + 2);
    }

    #[test]
    fn test_filter_range_covers_header_and_rows() {
        let issues = sample_issues();
        let classification = Classification::classify(&issues);
        let sheets = build_workbook_model(&classification);

        let names: Vec<&str> = sheets.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["VULNERABILITIES", "BUGS", "CODE_SMELLS"]);
        assert_eq!(sheets[0].filter_range(), (0, 0, 1, 11));
        // empty category keeps a header-only filter
        assert_eq!(sheets[2].filter_range(), (0, 0, 0, 11));
    }

    #[test]
    fn test_model_is_deterministic() {
        let issues = sample_issues();
        let classification = Classification::classify(&issues);
        assert_eq!(
            build_workbook_model(&classification),
            build_workbook_model(&classification)
        );
    }

    #[test]
    fn test_rendering_twice_gives_identical_bytes() {
        let issues = sample_issues();
        let classification = Classification::classify(&issues);
        let sheets = build_workbook_model(&classification);

        let first = render_workbook(&sheets, generated_at()).unwrap();
        let second = render_workbook(&sheets, generated_at()).unwrap();

        assert_eq!(&first[..2], b"PK");
        assert!(first == second, "workbook bytes differ between renders");
    }

    #[test]
    fn test_oversized_text_is_truncated() {
        let huge = "y".repeat(MAX_CELL_CHARS + 10);
        match CellValue::text(&huge) {
            CellValue::Text(text) => assert_eq!(text.chars().count(), MAX_CELL_CHARS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_write_excel_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.xlsx");
        let issues = sample_issues();
        let classification = Classification::classify(&issues);

        let summary = write_excel_report(&path, &classification, generated_at()).unwrap();

        assert_eq!(summary.vulnerabilities, 1);
        assert_eq!(summary.bugs, 1);
        assert_eq!(summary.code_smells, 0);
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_excel_report_to_bad_path_is_render_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("report.xlsx");
        let issues = sample_issues();
        let classification = Classification::classify(&issues);

        let err = write_excel_report(&path, &classification, generated_at()).unwrap_err();
        assert!(matches!(err, Error::Render { artifact: "spreadsheet", .. }));
    }
}
