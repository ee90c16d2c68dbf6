//! The end-to-end report run: fetch, enrich, dump, classify, render.

use crate::config::ReportConfig;
use crate::errors::Error;
use crate::io::writers::{
    write_excel_report, write_html_report, write_issues_json, ExcelSummary, HtmlReport,
    HtmlSummary,
};
use crate::io::ensure_dir;
use crate::pipeline::enrich::skip_enrichment;
use crate::pipeline::{
    aggregate, enrich_issues, fetch_all_issues, Classification, EnrichOptions, EnrichmentSummary,
    FetchOptions, TypeCounts,
};
use crate::progress::{ProgressConfig, ProgressManager, TEMPLATE_SNIPPETS};
use crate::source::IssueSource;
use anyhow::{Context, Result};
use chrono::Local;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Attach no snippets and make no snippet requests
    pub skip_snippets: bool,
    pub progress: ProgressConfig,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub issues_fetched: usize,
    pub enrichment: EnrichmentSummary,
    pub type_counts: TypeCounts,
    pub json_file: PathBuf,
    pub excel: Option<ExcelSummary>,
    pub html: Option<HtmlSummary>,
    /// Messages of renderers that failed; the run itself still succeeded
    pub render_failures: Vec<String>,
}

impl RunSummary {
    pub fn all_artifacts_written(&self) -> bool {
        self.render_failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Issues fetched: {}", self.issues_fetched)?;
        writeln!(
            f,
            "Snippets attached: {} of {} issues with a line reference ({} failed)",
            self.enrichment.enriched, self.enrichment.with_line, self.enrichment.failed
        )?;
        writeln!(
            f,
            "Vulnerabilities: {}, Bugs: {}, Code smells: {}",
            self.type_counts.vulnerabilities, self.type_counts.bugs, self.type_counts.code_smells
        )?;
        writeln!(f, "JSON dump: {}", self.json_file.display())?;
        if let Some(excel) = &self.excel {
            writeln!(f, "Excel report: {}", excel.excel_file.display())?;
        }
        if let Some(html) = &self.html {
            writeln!(f, "HTML report: {}", html.html_file.display())?;
        }
        for failure in &self.render_failures {
            writeln!(f, "Not generated: {}", failure)?;
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

/// Run one renderer, turning a panic into a render error for `artifact`.
fn render_guarded<T>(
    artifact: &'static str,
    render: impl FnOnce() -> Result<T, Error>,
) -> Result<T, Error> {
    panic::catch_unwind(AssertUnwindSafe(render)).unwrap_or_else(|payload| {
        Err(Error::render(
            artifact,
            format!("renderer panicked: {}", panic_message(payload.as_ref())),
        ))
    })
}

/// Contained render failures are logged and listed; fatal ones end the run.
fn record_render<T>(
    result: Result<T, Error>,
    failures: &mut Vec<String>,
) -> Result<Option<T>, Error> {
    match result {
        Ok(summary) => Ok(Some(summary)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            log::error!("{}", e);
            failures.push(e.to_string());
            Ok(None)
        }
    }
}

/// Run the whole pipeline against `source`.
///
/// Fetch failures, the page ceiling and an unwritable JSON dump abort the
/// run. The two renderers run concurrently and a failure in one is recorded
/// in the summary without affecting the other.
pub fn run_report<S>(config: &ReportConfig, source: &S, options: &RunOptions) -> Result<RunSummary>
where
    S: IssueSource + ?Sized,
{
    log::info!(
        "Fetching issues for {} (branch {})",
        config.project_id,
        config.branch
    );
    let mut issues = fetch_all_issues(source, &FetchOptions::from(config))?;
    log::info!("Fetched {} issues", issues.len());

    let enrichment = if options.skip_snippets {
        log::info!("Skipping snippet lookups");
        skip_enrichment(&mut issues)
    } else {
        let manager = ProgressManager::new(options.progress.clone());
        let progress = manager.create_bar(issues.len() as u64, TEMPLATE_SNIPPETS);
        progress.set_message("Fetching snippets");
        let summary = enrich_issues(source, &mut issues, &EnrichOptions::from(config), &progress);
        progress.finish_and_clear();
        summary
    };

    let paths = config.output_paths();
    ensure_dir(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    write_issues_json(&paths.json, &issues)
        .with_context(|| format!("Failed to write {}", paths.json.display()))?;
    log::info!("Issue dump written: {}", paths.json.display());

    let classification = Classification::classify(&issues);
    let statistics = aggregate(&issues);
    let generated_at = Local::now().naive_local();
    let html_report = HtmlReport {
        project_name: &config.project_name,
        project_version: &config.project_version,
        generated_at,
        default_locale: config.default_locale,
        classification: &classification,
        statistics: &statistics,
    };

    let (excel_result, html_result) = rayon::join(
        || {
            render_guarded("spreadsheet", || {
                write_excel_report(&paths.excel, &classification, generated_at)
            })
        },
        || render_guarded("html", || write_html_report(&paths.html, &html_report)),
    );

    let mut render_failures = Vec::new();
    let excel = record_render(excel_result, &mut render_failures)?;
    let html = record_render(html_result, &mut render_failures)?;
    if let Some(summary) = &excel {
        log::debug!("{:?}", summary);
    }
    if let Some(summary) = &html {
        log::debug!("{:?}", summary);
    }

    Ok(RunSummary {
        issues_fetched: issues.len(),
        enrichment,
        type_counts: TypeCounts::from_classification(&classification),
        json_file: paths.json,
        excel,
        html,
        render_failures,
    })
}
