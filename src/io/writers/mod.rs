pub mod excel;
pub mod html;
pub mod i18n;
pub mod json;

pub use excel::{write_excel_report, ExcelSummary};
pub use html::{write_html_report, HtmlReport, HtmlSummary, HtmlWriter};
pub use json::{write_issues_json, JsonWriter};
