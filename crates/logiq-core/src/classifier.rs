//! Line classification.
//!
//! A line is recognised only if the whole of it has the shape
//! `YYYY-MM-DD HH:MM:SS <INFO|WARN|ERROR> <message>`, with one or more
//! whitespace characters between the parts. Anything else is not an error;
//! [`Classifier::classify`] just returns `None` and the caller skips the line.
//!
//! Root causes come from a fixed lookup table of `(keyword, tag)` pairs. The
//! keyword occurring earliest in the message (case-sensitive) decides the
//! tag; keywords found at the same position are ranked by table order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{LogLevel, LogRecord, RootCause, Timestamp};

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})(?-u:\s)+(INFO|WARN|ERROR)(?-u:\s)+(.*)$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Built-in keyword table, highest priority first.
pub const DEFAULT_ROOT_CAUSE_RULES: [(&str, RootCause); 3] = [
    ("NullPointer", RootCause::NullPointer),
    ("Timeout", RootCause::Timeout),
    ("IndexOutOfBounds", RootCause::IndexOutOfBounds),
];

/// Maps a message keyword to a root cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCauseRule {
    /// Substring searched for in the message
    pub keyword: String,
    /// Tag assigned when the keyword is present
    pub cause: RootCause,
}

impl RootCauseRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(keyword: impl Into<String>, cause: RootCause) -> Self {
        Self {
            keyword: keyword.into(),
            cause,
        }
    }
}

/// Parses raw lines into [`LogRecord`]s.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<RootCauseRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Creates a classifier with the built-in root-cause table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(
            DEFAULT_ROOT_CAUSE_RULES
                .iter()
                .map(|(keyword, cause)| RootCauseRule::new(*keyword, *cause))
                .collect(),
        )
    }

    /// Creates a classifier with a custom rule table; earlier rules win ties.
    #[must_use]
    pub const fn with_rules(rules: Vec<RootCauseRule>) -> Self {
        Self { rules }
    }

    /// The rule table in priority order.
    #[must_use]
    pub fn rules(&self) -> &[RootCauseRule] {
        &self.rules
    }

    /// Classifies one raw line, without its line terminator.
    ///
    /// Timestamp, level and message are taken verbatim from the line.
    #[must_use]
    pub fn classify(&self, line: &str) -> Option<LogRecord> {
        let caps = LINE_PATTERN.captures(line)?;
        let timestamp = caps.get(1)?.as_str();
        let level = caps.get(2)?.as_str().parse::<LogLevel>().ok()?;
        let message = caps.get(3).map_or("", |m| m.as_str());

        Some(LogRecord {
            timestamp: Timestamp::from_matched(timestamp),
            level,
            message: message.to_string(),
            root_cause: self.root_cause_of(message),
        })
    }

    /// Infers the root cause of a message; the first keyword occurrence wins.
    #[must_use]
    pub fn root_cause_of(&self, message: &str) -> Option<RootCause> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(rank, rule)| {
                message
                    .find(rule.keyword.as_str())
                    .map(|position| (position, rank, rule.cause))
            })
            .min_by_key(|&(position, rank, _)| (position, rank))
            .map(|(_, _, cause)| cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn classify_well_formed_line() {
        let record = Classifier::new().classify("2025-10-04 15:45:00 INFO hello");
        let record = record.map(|r| (r.timestamp.to_string(), r.level, r.message, r.root_cause));
        assert_eq!(
            record,
            Some((
                "2025-10-04 15:45:00".to_string(),
                LogLevel::Info,
                "hello".to_string(),
                None
            ))
        );
    }

    #[test_case("2025-10-04 15:45:00 ERROR NullPointer in handler", Some(RootCause::NullPointer) ; "null pointer")]
    #[test_case("2025-10-04 15:45:00 ERROR Timeout then NullPointer", Some(RootCause::Timeout) ; "earliest keyword wins")]
    #[test_case("2025-10-04 15:45:00 WARN IndexOutOfBounds at 3", Some(RootCause::IndexOutOfBounds) ; "index out of bounds")]
    #[test_case("2025-10-04 15:45:00 ERROR IndexOutOfBounds after Timeout", Some(RootCause::IndexOutOfBounds) ; "position beats table rank")]
    #[test_case("2025-10-04 15:45:00 ERROR nullpointer lowercase", None ; "case sensitive")]
    #[test_case("2025-10-04 15:45:00 INFO System started", None ; "no keyword")]
    fn classify_root_cause(line: &str, expected: Option<RootCause>) {
        let record = Classifier::new().classify(line);
        assert!(record.is_some());
        assert_eq!(record.and_then(|r| r.root_cause), expected);
    }

    #[test_case("2025-10-04 15:45:00 hello" ; "missing level")]
    #[test_case("2025-10-4 15:45:00 INFO hello" ; "malformed timestamp")]
    #[test_case("prefix 2025-10-04 15:45:00 INFO hello" ; "extra leading text")]
    #[test_case("2025-10-04 15:45:00 DEBUG hello" ; "unknown level")]
    #[test_case("2025-10-04 15:45:00 info hello" ; "lower case level")]
    #[test_case("2025-10-04 15:45:00 INFO" ; "no separator after level")]
    #[test_case("2025-10-04T15:45:00 INFO hello" ; "iso timestamp")]
    #[test_case("" ; "empty line")]
    fn classify_rejects(line: &str) {
        assert_eq!(Classifier::new().classify(line), None);
    }

    #[test]
    fn classify_allows_empty_message() {
        let record = Classifier::new().classify("2025-10-04 15:45:00 WARN ");
        assert_eq!(record.map(|r| r.message), Some(String::new()));
    }

    #[test]
    fn classify_consumes_all_separator_whitespace() {
        let record = Classifier::new().classify("2025-10-04 15:45:00\t\tERROR   spaced  out ");
        let record = record.map(|r| (r.level, r.message));
        assert_eq!(record, Some((LogLevel::Error, "spaced  out ".to_string())));
    }

    #[test]
    fn classify_keeps_internal_whitespace_distinct() {
        let classifier = Classifier::new();
        let a = classifier.classify("2025-10-04 15:45:00 INFO a b");
        let b = classifier.classify("2025-10-04 15:45:00 INFO a  b");
        assert!(a.is_some() && b.is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn custom_rules_break_ties_by_table_order() {
        let classifier = Classifier::with_rules(vec![
            RootCauseRule::new("Null", RootCause::IndexOutOfBounds),
            RootCauseRule::new("NullPointer", RootCause::NullPointer),
        ]);
        assert_eq!(
            classifier.root_cause_of("NullPointer here"),
            Some(RootCause::IndexOutOfBounds)
        );
        assert_eq!(classifier.rules().len(), 2);
    }

    #[test]
    fn default_rules_follow_table() {
        let classifier = Classifier::default();
        let keywords: Vec<_> = classifier.rules().iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, ["NullPointer", "Timeout", "IndexOutOfBounds"]);
    }

    proptest! {
        #[test]
        fn well_formed_lines_keep_message_verbatim(
            message in "[A-Za-z0-9][ -~]{0,60}",
            level in prop::sample::select(LogLevel::ALL.to_vec()),
        ) {
            let classifier = Classifier::new();
            let line = format!("2024-01-31 23:59:59 {} {message}", level.as_str());
            let record = classifier.classify(&line);
            prop_assert!(record.is_some());
            if let Some(record) = record {
                prop_assert_eq!(record.level, level);
                prop_assert_eq!(record.timestamp.as_str(), "2024-01-31 23:59:59");
                prop_assert_eq!(record.root_cause, classifier.root_cause_of(&message));
                prop_assert_eq!(record.message, message);
            }
        }

        #[test]
        fn leading_text_is_rejected(prefix in "[A-Za-z]{1,8}", message in "[ -~]{0,30}") {
            let line = format!("{prefix} 2024-01-31 23:59:59 INFO {message}");
            prop_assert!(Classifier::new().classify(&line).is_none());
        }
    }
}
