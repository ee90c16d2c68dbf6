//! Partition of the issue set into the three reported categories.

use crate::core::{Issue, IssueType};
use serde::Serialize;

/// One of the three recognised issue types, as reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Vulnerabilities,
    Bugs,
    CodeSmells,
}

impl Category {
    /// Report order
    pub const ALL: [Category; 3] = [
        Category::Vulnerabilities,
        Category::Bugs,
        Category::CodeSmells,
    ];

    pub fn issue_type(&self) -> IssueType {
        match self {
            Category::Vulnerabilities => IssueType::Vulnerability,
            Category::Bugs => IssueType::Bug,
            Category::CodeSmells => IssueType::CodeSmell,
        }
    }

    pub fn of(issue_type: &IssueType) -> Option<Category> {
        match issue_type {
            IssueType::Vulnerability => Some(Category::Vulnerabilities),
            IssueType::Bug => Some(Category::Bugs),
            IssueType::CodeSmell => Some(Category::CodeSmells),
            IssueType::Other(_) => None,
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Category::Vulnerabilities => "VULNERABILITIES",
            Category::Bugs => "BUGS",
            Category::CodeSmells => "CODE_SMELLS",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Category::Vulnerabilities => "VULNERABILITIES",
            Category::Bugs => "BUGS",
            Category::CodeSmells => "CODE SMELLS",
        }
    }
}

/// Issues bucketed by category, each bucket in input order.
///
/// Issues of any other type are in no bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification<'a> {
    pub vulnerabilities: Vec<&'a Issue>,
    pub bugs: Vec<&'a Issue>,
    pub code_smells: Vec<&'a Issue>,
}

impl<'a> Classification<'a> {
    pub fn classify(issues: &'a [Issue]) -> Self {
        let mut classification = Self::default();
        for issue in issues {
            match Category::of(&issue.issue_type) {
                Some(Category::Vulnerabilities) => classification.vulnerabilities.push(issue),
                Some(Category::Bugs) => classification.bugs.push(issue),
                Some(Category::CodeSmells) => classification.code_smells.push(issue),
                None => {}
            }
        }
        classification
    }

    pub fn get(&self, category: Category) -> &[&'a Issue] {
        match category {
            Category::Vulnerabilities => &self.vulnerabilities,
            Category::Bugs => &self.bugs,
            Category::CodeSmells => &self.code_smells,
        }
    }

    /// Categories with their buckets, in report order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[&'a Issue])> + '_ {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// Number of issues that landed in some bucket
    pub fn classified_len(&self) -> usize {
        self.vulnerabilities.len() + self.bugs.len() + self.code_smells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::IssueBuilder;
    use proptest::prelude::*;

    #[test]
    fn test_partition_keeps_input_order() {
        let issues = vec![
            IssueBuilder::bug("B1").build(),
            IssueBuilder::vulnerability("V1").build(),
            IssueBuilder::bug("B2").build(),
            IssueBuilder::code_smell("S1").build(),
        ];
        let classification = Classification::classify(&issues);

        let keys = |bucket: &[&Issue]| bucket.iter().map(|i| i.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys(&classification.bugs), vec!["B1", "B2"]);
        assert_eq!(keys(&classification.vulnerabilities), vec!["V1"]);
        assert_eq!(keys(&classification.code_smells), vec!["S1"]);
    }

    #[test]
    fn test_unknown_type_is_in_no_bucket() {
        let issues = vec![
            IssueBuilder::new("H1", "SECURITY_HOTSPOT").build(),
            IssueBuilder::bug("B1").build(),
        ];
        let classification = Classification::classify(&issues);
        assert_eq!(classification.classified_len(), 1);
    }

    #[test]
    fn test_lowercase_type_is_recognised() {
        let issues = vec![IssueBuilder::new("B1", "bug").build()];
        let classification = Classification::classify(&issues);
        assert_eq!(classification.bugs.len(), 1);
    }

    #[test]
    fn test_iter_follows_report_order() {
        let classification = Classification::default();
        let order: Vec<Category> = classification.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert_eq!(Category::CodeSmells.sheet_name(), "CODE_SMELLS");
        assert_eq!(Category::CodeSmells.heading(), "CODE SMELLS");
    }

    fn type_token() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("VULNERABILITY".to_string()),
            Just("BUG".to_string()),
            Just("CODE_SMELL".to_string()),
            Just("SECURITY_HOTSPOT".to_string()),
            "[a-z_]{0,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_buckets_never_exceed_input(types in prop::collection::vec(type_token(), 0..60)) {
            let issues: Vec<Issue> = types
                .iter()
                .enumerate()
                .map(|(i, t)| IssueBuilder::new(format!("K{i}"), t).build())
                .collect();
            let classification = Classification::classify(&issues);
            let all_recognised = issues.iter().all(|i| i.issue_type.is_recognized());

            prop_assert!(classification.classified_len() <= issues.len());
            prop_assert_eq!(classification.classified_len() == issues.len(), all_recognised);
        }
    }
}
