//! Severity and status distributions over the full issue set.

use super::classify::{Category, Classification};
use crate::core::{Issue, Severity};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of a distribution table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    pub label: String,
    pub count: usize,
    /// Share of the whole issue set, 0.0..=100.0
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub vulnerabilities: usize,
    pub bugs: usize,
    pub code_smells: usize,
}

impl TypeCounts {
    pub fn from_classification(classification: &Classification<'_>) -> Self {
        Self {
            vulnerabilities: classification.vulnerabilities.len(),
            bugs: classification.bugs.len(),
            code_smells: classification.code_smells.len(),
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Vulnerabilities => self.vulnerabilities,
            Category::Bugs => self.bugs,
            Category::CodeSmells => self.code_smells,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueStatistics {
    pub total: usize,
    /// Priority order; unrecognised severities follow, sorted by label
    pub severity: Vec<DistributionRow>,
    /// Lexicographic order of the status token
    pub status: Vec<DistributionRow>,
}

/// Percentage of `count` in `total`; zero for an empty set
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn to_rows<'a>(counts: impl IntoIterator<Item = (&'a str, usize)>, total: usize) -> Vec<DistributionRow> {
    counts
        .into_iter()
        .map(|(label, count)| DistributionRow {
            label: label.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Count every issue by severity and by status.
///
/// Values that appear on no issue are omitted rather than zero-filled.
pub fn aggregate(issues: &[Issue]) -> IssueStatistics {
    let total = issues.len();

    let mut by_severity: BTreeMap<(usize, &str), usize> = BTreeMap::new();
    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for issue in issues {
        let rank = issue
            .severity
            .as_ref()
            .map(Severity::rank)
            .unwrap_or(Severity::PRIORITY_ORDER.len());
        *by_severity.entry((rank, issue.severity_label())).or_default() += 1;
        *by_status.entry(issue.status_label()).or_default() += 1;
    }

    IssueStatistics {
        total,
        severity: to_rows(
            by_severity
                .into_iter()
                .map(|((_, label), count)| (label, count)),
            total,
        ),
        status: to_rows(by_status, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::IssueBuilder;
    use proptest::prelude::*;

    fn labels(rows: &[DistributionRow]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn test_severity_uses_priority_order() {
        let issues = vec![
            IssueBuilder::bug("1").severity("INFO").build(),
            IssueBuilder::bug("2").severity("BLOCKER").build(),
            IssueBuilder::bug("3").severity("MAJOR").build(),
            IssueBuilder::bug("4").severity("MAJOR").build(),
        ];
        let stats = aggregate(&issues);

        assert_eq!(labels(&stats.severity), vec!["BLOCKER", "MAJOR", "INFO"]);
        assert_eq!(stats.severity[1].count, 2);
        assert_eq!(stats.severity[1].percentage, 50.0);
    }

    #[test]
    fn test_unrecognised_values_are_counted() {
        let mut no_severity = IssueBuilder::bug("3").build();
        no_severity.severity = None;
        let issues = vec![
            IssueBuilder::bug("1").severity("TRIVIAL").status("TO_REVIEW").build(),
            IssueBuilder::bug("2").severity("CRITICAL").status("OPEN").build(),
            no_severity,
        ];
        let stats = aggregate(&issues);

        assert_eq!(
            labels(&stats.severity),
            vec!["CRITICAL", "TRIVIAL", "UNKNOWN"]
        );
        assert_eq!(labels(&stats.status), vec!["OPEN", "TO_REVIEW"]);
        assert_eq!(stats.status[0].count, 2);
    }

    #[test]
    fn test_status_is_lexicographic() {
        let issues = vec![
            IssueBuilder::bug("1").status("REOPENED").build(),
            IssueBuilder::bug("2").status("CLOSED").build(),
            IssueBuilder::bug("3").status("OPEN").build(),
        ];
        let stats = aggregate(&issues);
        assert_eq!(labels(&stats.status), vec!["CLOSED", "OPEN", "REOPENED"]);
    }

    #[test]
    fn test_empty_set_has_no_rows_and_zero_percentages() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.severity.is_empty());
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn test_percentages_use_full_total_not_category() {
        let issues = vec![
            IssueBuilder::bug("1").severity("MAJOR").build(),
            IssueBuilder::new("2", "SECURITY_HOTSPOT").severity("MAJOR").build(),
        ];
        let stats = aggregate(&issues);
        assert_eq!(stats.severity[0].percentage, 100.0);
        assert_eq!(stats.total, 2);
    }

    fn severity_token() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("BLOCKER".to_string()),
            Just("CRITICAL".to_string()),
            Just("MAJOR".to_string()),
            Just("MINOR".to_string()),
            Just("INFO".to_string()),
            "[A-Z]{1,6}",
        ]
    }

    proptest! {
        #[test]
        fn prop_severity_percentages_sum_to_100(severities in prop::collection::vec(severity_token(), 1..80)) {
            let issues: Vec<Issue> = severities
                .iter()
                .enumerate()
                .map(|(i, s)| IssueBuilder::bug(format!("K{i}")).severity(s).build())
                .collect();
            let stats = aggregate(&issues);

            let counted: usize = stats.severity.iter().map(|r| r.count).sum();
            let share: f64 = stats.severity.iter().map(|r| r.percentage).sum();
            prop_assert_eq!(counted, issues.len());
            prop_assert!((share - 100.0).abs() < 1e-6);
        }
    }
}
