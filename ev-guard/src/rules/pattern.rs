//! Regex rule: every non-null value fully matches a pattern.

use super::sample_value;
use crate::core::{render_sample, Rule, RuleKind, RuleMetadata, Violation, SAMPLE_LIMIT};
use crate::dataset::ColumnRef;
use crate::error::{GuardError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

/// Pattern for ISO 3166-1 alpha-2 style country codes.
pub const COUNTRY_CODE_PATTERN: &str = "[A-Z]{2}";

static COUNTRY_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&anchor(COUNTRY_CODE_PATTERN)).expect("country code pattern is valid")
});

fn anchor(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

/// Reports non-null values whose whole text does not match a pattern.
///
/// The pattern is anchored on both ends, so `[A-Z]{2}` accepts `"US"` but
/// rejects `"USA"`. Values of any column kind are matched on their text form.
#[derive(Debug, Clone)]
pub struct RegexMatchRule {
    pattern: String,
    regex: Regex,
}

impl RegexMatchRule {
    /// Creates a rule for `pattern`. Existing `^`/`$` anchors are harmless.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&anchor(&pattern)).map_err(|e| {
            GuardError::configuration(format!("Invalid regex pattern '{pattern}': {e}"))
        })?;
        Ok(Self { pattern, regex })
    }

    /// A rule accepting exactly two uppercase ASCII letters.
    pub fn country_code() -> Self {
        Self {
            pattern: COUNTRY_CODE_PATTERN.to_string(),
            regex: COUNTRY_CODE_REGEX.clone(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the whole of `value` matches.
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl Rule for RegexMatchRule {
    #[instrument(skip(self, column), fields(column = %column.name(), pattern = %self.pattern))]
    fn evaluate(&self, column: &ColumnRef<'_>) -> Result<Option<Violation>> {
        let mut count = 0usize;
        let mut sample = Vec::with_capacity(SAMPLE_LIMIT);

        for value in column.text_values()?.into_iter().flatten() {
            if !self.matches(&value) {
                count += 1;
                if sample.len() < SAMPLE_LIMIT {
                    sample.push(sample_value(&value));
                }
            }
        }

        if count == 0 {
            return Ok(None);
        }

        let subject = column.qualified_name();
        let message = format!(
            "{subject}: {count} values do not match regex {}. Sample: {}",
            self.pattern,
            render_sample(&sample)
        );
        Ok(Some(Violation::new(
            RuleKind::RegexMatch,
            subject,
            count,
            sample,
            message,
        )))
    }

    fn name(&self) -> &str {
        "regex_match"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::RegexMatch
    }

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::new()
            .with_description(format!("Checks that values fully match {}", self.pattern))
            .with_parameter("pattern", &self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Table;

    #[test]
    fn test_country_code_matching_is_anchored() {
        let rule = RegexMatchRule::country_code();
        assert!(rule.matches("US"));
        assert!(!rule.matches("us"));
        assert!(!rule.matches("USA"));
        assert!(!rule.matches("xUSx"));
        assert!(!rule.matches(""));
    }

    #[test]
    fn test_explicit_anchors_are_accepted() {
        let rule = RegexMatchRule::new(r"^[A-Z]{2}$").unwrap();
        assert!(rule.matches("DE"));
        assert!(!rule.matches("DEU"));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = RegexMatchRule::new("[A-Z").unwrap_err();
        assert!(matches!(err, GuardError::Configuration(_)));
    }

    #[test]
    fn test_nulls_are_ignored() {
        let table =
            Table::from_csv_bytes("stations.csv", b"country_code,id\nUS,1\n,2\nDE,3\n").unwrap();
        let outcome = RegexMatchRule::country_code()
            .evaluate(&table.column("country_code").unwrap())
            .unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn test_violation_summarizes_column() {
        let table =
            Table::from_csv_bytes("stations.csv", b"country_code\nUS\nus\nUSA\nFR\n").unwrap();
        let violation = RegexMatchRule::country_code()
            .evaluate(&table.column("country_code").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(violation.kind(), RuleKind::RegexMatch);
        assert_eq!(violation.count(), 2);
        assert_eq!(violation.sample(), ["us", "USA"]);
        assert_eq!(
            violation.message(),
            "stations.csv.country_code: 2 values do not match regex [A-Z]{2}. Sample: [us, USA]"
        );
    }

    #[test]
    fn test_numeric_columns_match_on_text() {
        let table = Table::from_csv_bytes("t.csv", b"zip\n12345\n123\n").unwrap();
        let violation = RegexMatchRule::new(r"\d{5}")
            .unwrap()
            .evaluate(&table.column("zip").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(violation.sample(), ["123"]);
    }
}
